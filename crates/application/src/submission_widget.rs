use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{info, warn};
use vatdr_core::AppResult;
use vatdr_domain::{
    FileSelection, FormInputs, PageLoadEvent, SessionState, SubmissionOutcome, ValidationReport,
};

use crate::file_stager::{FileStager, StagingOutcome};
use crate::form_validator::FormValidator;
use crate::session_service::SessionLoader;
use crate::settings::WidgetSettings;
use crate::submission_pipeline::SubmissionPipeline;
use crate::submit_control::{disable_submit, rearm_submit};
use crate::widget_ports::{CrmRecordGateway, SelectedFileReader, WidgetSurface};

/// Result of one submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// Validation failed; no remote call was made.
    Rejected(ValidationReport),
    /// The pipeline ran to success or failure.
    Completed(SubmissionOutcome),
    /// Another submission was still in flight.
    Ignored,
}

/// Page-scoped orchestrator wiring session state, staging, validation and
/// the submission pipeline behind the widget's event handlers.
pub struct SubmissionWidget {
    session: RwLock<SessionState>,
    in_flight: AtomicBool,
    loader: SessionLoader,
    stager: FileStager,
    validator: FormValidator,
    pipeline: SubmissionPipeline,
    surface: Arc<dyn WidgetSurface>,
    settings: Arc<WidgetSettings>,
}

impl SubmissionWidget {
    /// Creates a widget after validating its settings.
    pub fn new(
        gateway: Arc<dyn CrmRecordGateway>,
        surface: Arc<dyn WidgetSurface>,
        reader: Arc<dyn SelectedFileReader>,
        settings: WidgetSettings,
    ) -> AppResult<Self> {
        settings.validate()?;
        let settings = Arc::new(settings);

        Ok(Self {
            session: RwLock::new(SessionState::new()),
            in_flight: AtomicBool::new(false),
            loader: SessionLoader::new(gateway.clone(), settings.clone()),
            stager: FileStager::new(reader, surface.clone(), settings.clone()),
            validator: FormValidator::new(settings.clone()),
            pipeline: SubmissionPipeline::new(gateway, surface.clone(), settings.clone()),
            surface,
            settings,
        })
    }

    /// Handles the page-load notification.
    pub async fn on_page_load(&self, event: &PageLoadEvent) -> bool {
        self.loader.on_page_load(&self.session, event).await
    }

    /// Handles a change of the file input.
    pub async fn on_file_selected(&self, selection: Option<&FileSelection>) -> StagingOutcome {
        self.stager.on_file_selected(&self.session, selection).await
    }

    /// Handles a submit action.
    pub async fn on_submit(&self) -> SubmitAttempt {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("submission already in flight; ignoring submit");
            return SubmitAttempt::Ignored;
        };

        let layout = &self.settings.layout;
        self.surface.clear_field_errors().await;
        disable_submit(self.surface.as_ref(), layout).await;

        let inputs = FormInputs {
            effective_date: self.surface.read_field(&layout.date_field).await,
            reason: self.surface.read_field(&layout.reason_field).await,
        };

        let session = self.session.read().await;
        let report = self.validator.validate(&session, &inputs);
        if !report.is_empty() {
            for error in report.errors() {
                self.surface
                    .set_field_error(error.key(), error.message())
                    .await;
            }
            rearm_submit(self.surface.as_ref(), layout).await;
            info!(
                error_count = report.len(),
                "submission blocked by validation"
            );
            return SubmitAttempt::Rejected(report);
        }

        SubmitAttempt::Completed(self.pipeline.run(&session, &inputs).await)
    }

    /// Returns a copy of the current session state.
    pub async fn session_snapshot(&self) -> SessionState {
        self.session.read().await.clone()
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests;
