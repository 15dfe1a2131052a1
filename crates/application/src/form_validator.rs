use std::sync::Arc;

use chrono::NaiveDate;
use tracing::error;
use vatdr_domain::{FieldError, FormInputs, SessionState, ValidationReport};

use crate::settings::WidgetSettings;

/// Date format produced by the date input.
pub(crate) const EFFECTIVE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Gates submission. Every check runs so the user sees every problem at once.
#[derive(Clone)]
pub struct FormValidator {
    settings: Arc<WidgetSettings>,
}

impl FormValidator {
    /// Creates a form validator.
    #[must_use]
    pub fn new(settings: Arc<WidgetSettings>) -> Self {
        Self { settings }
    }

    /// Validates session preconditions and form inputs.
    #[must_use]
    pub fn validate(&self, session: &SessionState, inputs: &FormInputs) -> ValidationReport {
        let layout = &self.settings.layout;
        let messages = &self.settings.messages;
        let mut report = ValidationReport::new();

        if session.staged_file().is_none() {
            report.push(FieldError::field(
                layout.file_field.clone(),
                messages.file_required.as_str(),
            ));
        }

        match inputs.effective_date() {
            None => report.push(FieldError::field(
                layout.date_field.clone(),
                messages.date_required.as_str(),
            )),
            Some(date) if NaiveDate::parse_from_str(date, EFFECTIVE_DATE_FORMAT).is_err() => {
                report.push(FieldError::field(
                    layout.date_field.clone(),
                    messages.date_invalid.as_str(),
                ));
            }
            Some(_) => {}
        }

        if inputs.reason().is_none() {
            report.push(FieldError::field(
                layout.reason_field.clone(),
                messages.reason_required.as_str(),
            ));
        }

        if session.account().is_none() {
            error!(
                record_id = session.parent().map(|parent| parent.id()).unwrap_or("<none>"),
                "account id is missing; submission blocked"
            );
            report.push(FieldError::action(
                layout.submit_control.clone(),
                messages.account_missing.as_str(),
            ));
        }

        report
    }
}
