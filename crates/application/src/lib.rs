//! Application services and ports.

#![forbid(unsafe_code)]

mod file_stager;
mod form_validator;
mod session_service;
mod settings;
mod submission_pipeline;
mod submission_widget;
mod submit_control;
mod widget_ports;

#[cfg(test)]
mod test_support;

pub use file_stager::{FileStager, StagingOutcome};
pub use form_validator::FormValidator;
pub use session_service::SessionLoader;
pub use settings::{
    AccountUpdateStrategy, FormLayout, FormMessages, RecordFieldNames, WidgetSettings,
};
pub use submission_pipeline::SubmissionPipeline;
pub use submission_widget::{SubmissionWidget, SubmitAttempt};
pub use widget_ports::{
    CrmRecordGateway, ProcedureArguments, RecordUpdate, SelectedFileContent, SelectedFileReader,
    WidgetSurface,
};
