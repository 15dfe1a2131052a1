use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use vatdr_core::{AppError, AppResult};

/// Stable key of one form control on the widget surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey(String);

impl FieldKey {
    /// Creates a validated field key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "field key '{value}' must be non-empty and contain no whitespace"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inline error slot id paired with this field.
    #[must_use]
    pub fn error_slot(&self) -> String {
        format!("error-{}", self.0)
    }
}

impl Display for FieldKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Where a validation message is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    /// Message belongs to one input field.
    Field,
    /// Message belongs to the submit action itself.
    Action,
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    field: FieldKey,
    message: String,
    scope: ErrorScope,
}

impl FieldError {
    /// Creates a field-scoped error.
    #[must_use]
    pub fn field(field: FieldKey, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            scope: ErrorScope::Field,
        }
    }

    /// Creates an action-scoped error.
    #[must_use]
    pub fn action(field: FieldKey, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            scope: ErrorScope::Action,
        }
    }

    /// Returns the key the message is attached to.
    #[must_use]
    pub fn key(&self) -> &FieldKey {
        &self.field
    }

    /// Returns the user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the error scope.
    #[must_use]
    pub fn scope(&self) -> ErrorScope {
        self.scope
    }
}

/// Aggregated result of one validation pass. Empty means proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one failure.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Returns true when no check failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns all failures in check order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the failure attached to a key, if any.
    #[must_use]
    pub fn error_for(&self, key: &FieldKey) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.key() == key)
    }
}

/// Raw form values read at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    /// Effective date as entered, `YYYY-MM-DD` when well formed.
    pub effective_date: Option<String>,
    /// Free-text reason.
    pub reason: Option<String>,
}

impl FormInputs {
    /// Returns the trimmed effective date when non-blank.
    #[must_use]
    pub fn effective_date(&self) -> Option<&str> {
        non_blank(self.effective_date.as_deref())
    }

    /// Returns the trimmed reason when non-blank.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        non_blank(self.reason.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
