//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod form;
mod record;
mod session;
mod staged_file;
mod submission;

pub use form::{ErrorScope, FieldError, FieldKey, FormInputs, ValidationReport};
pub use record::{AccountRef, CrmRecord, PageLoadEvent, ParentRecordRef};
pub use session::SessionState;
pub use staged_file::{FileSelection, StagedFile};
pub use submission::{PipelineStage, SubmissionOutcome};
