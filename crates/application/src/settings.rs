use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::FieldKey;

const MIB: u64 = 1024 * 1024;

/// How the linked account receives the effective date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountUpdateStrategy {
    /// The server procedure mutates the account.
    DelegatedProcedure,
    /// The widget updates the account record directly.
    InlineRecordUpdate,
    /// Direct account update followed by the server procedure.
    InlineThenProcedure,
}

impl AccountUpdateStrategy {
    /// Returns stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DelegatedProcedure => "delegated",
            Self::InlineRecordUpdate => "inline",
            Self::InlineThenProcedure => "inline_then_procedure",
        }
    }

    /// Returns true when the account record is written by the widget.
    #[must_use]
    pub fn updates_inline(&self) -> bool {
        matches!(self, Self::InlineRecordUpdate | Self::InlineThenProcedure)
    }

    /// Returns true when the server procedure is invoked.
    #[must_use]
    pub fn invokes_procedure(&self) -> bool {
        matches!(self, Self::DelegatedProcedure | Self::InlineThenProcedure)
    }
}

impl FromStr for AccountUpdateStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "delegated" | "delegated_procedure" => Ok(Self::DelegatedProcedure),
            "inline" | "inline_record_update" => Ok(Self::InlineRecordUpdate),
            "inline_then_procedure" => Ok(Self::InlineThenProcedure),
            _ => Err(AppError::Validation(format!(
                "unknown account update strategy '{value}'"
            ))),
        }
    }
}

/// Host entity and field API names written by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFieldNames {
    /// Parent entity module name.
    pub application_entity: String,
    /// Linked account module name.
    pub account_entity: String,
    /// Lookup field on the parent that references the account.
    pub account_lookup_field: String,
    /// Parent field receiving the reason text.
    pub reason_field: String,
    /// Repeating sub-list receiving the dated entry.
    pub dates_subform_field: String,
    /// Sub-list column naming the kind of date.
    pub date_type_field: String,
    /// Sub-list column holding the date value.
    pub date_value_field: String,
    /// Date kind written into `date_type_field`.
    pub date_type_label: String,
    /// Top-level parent field mirroring the date.
    pub issuance_date_field: String,
    /// Account field receiving the date on inline updates.
    pub account_date_field: String,
}

/// Control keys and labels of the widget form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    /// File input.
    pub file_field: FieldKey,
    /// Effective date input.
    pub date_field: FieldKey,
    /// Reason input.
    pub reason_field: FieldKey,
    /// Submit control; its slot also receives action-scoped errors.
    pub submit_control: FieldKey,
    /// Idle submit label.
    pub submit_label: String,
    /// Submit label while a run is in flight.
    pub submitting_label: String,
}

impl FormLayout {
    /// Creates a layout from raw control keys.
    pub fn new(
        file_field: &str,
        date_field: &str,
        reason_field: &str,
        submit_control: &str,
    ) -> AppResult<Self> {
        Ok(Self {
            file_field: FieldKey::new(file_field)?,
            date_field: FieldKey::new(date_field)?,
            reason_field: FieldKey::new(reason_field)?,
            submit_control: FieldKey::new(submit_control)?,
            submit_label: "Submit".to_owned(),
            submitting_label: "Submitting...".to_owned(),
        })
    }
}

/// User-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessages {
    /// File could not be read.
    pub file_read_failed: String,
    /// No staged file at submit time.
    pub file_required: String,
    /// Empty date.
    pub date_required: String,
    /// Date not in `YYYY-MM-DD` form.
    pub date_invalid: String,
    /// Empty reason.
    pub reason_required: String,
    /// Parent record has no linked account.
    pub account_missing: String,
    /// Generic pipeline failure.
    pub submission_failed: String,
}

impl Default for FormMessages {
    fn default() -> Self {
        Self {
            file_read_failed: "Failed to read file.".to_owned(),
            file_required: "Please upload the Certificate of VAT De-Registration.".to_owned(),
            date_required: "Effective De-registration Date is required.".to_owned(),
            date_invalid: "Effective De-registration Date must be a valid date (YYYY-MM-DD)."
                .to_owned(),
            reason_required: "Reason for De-registration is required.".to_owned(),
            account_missing: "Error: Associated Account ID is missing. Cannot proceed.".to_owned(),
            submission_failed: "Submission failed. Please try again.".to_owned(),
        }
    }
}

/// Tunables of one widget deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSettings {
    /// Largest accepted file, inclusive.
    pub max_upload_bytes: u64,
    /// Pause after staging before the busy indicator is hidden.
    pub staging_delay_ms: u64,
    /// Server procedure invoked for the account update.
    pub account_procedure_name: String,
    /// Account update strategy.
    pub account_update_strategy: AccountUpdateStrategy,
    /// Extra fields written on inline account updates.
    pub account_static_fields: Map<String, Value>,
    /// Entity and field API names.
    pub records: RecordFieldNames,
    /// Form control keys and labels.
    pub layout: FormLayout,
    /// User-facing messages.
    pub messages: FormMessages,
}

impl WidgetSettings {
    /// Returns the VAT de-registration deployment defaults.
    pub fn vat_deregistration() -> AppResult<Self> {
        Ok(Self {
            max_upload_bytes: 20 * MIB,
            staging_delay_ms: 3000,
            account_procedure_name: "ta_vatdr_complete_to_auth_update_account".to_owned(),
            account_update_strategy: AccountUpdateStrategy::DelegatedProcedure,
            account_static_fields: Map::new(),
            records: RecordFieldNames {
                application_entity: "Applications1".to_owned(),
                account_entity: "Accounts".to_owned(),
                account_lookup_field: "Account_Name".to_owned(),
                reason_field: "Reason_for_De_registration".to_owned(),
                dates_subform_field: "Subform_2".to_owned(),
                date_type_field: "Type_of_Dates".to_owned(),
                date_value_field: "Date".to_owned(),
                date_type_label: "Effective De-registration Date".to_owned(),
                issuance_date_field: "Application_Issuance_Date".to_owned(),
                account_date_field: "Effective_De_registration_Date".to_owned(),
            },
            layout: FormLayout::new(
                "cert-vat-de-registration",
                "effective-de-registration-date",
                "reason-de-registration",
                "submit_button_id",
            )?,
            messages: FormMessages::default(),
        })
    }

    /// Checks invariants that field types cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_upload_bytes == 0 {
            return Err(AppError::Validation(
                "max_upload_bytes must be greater than zero".to_owned(),
            ));
        }

        let names = [
            ("account_procedure_name", &self.account_procedure_name),
            ("application_entity", &self.records.application_entity),
            ("account_entity", &self.records.account_entity),
            ("account_lookup_field", &self.records.account_lookup_field),
            ("reason_field", &self.records.reason_field),
            ("dates_subform_field", &self.records.dates_subform_field),
            ("date_type_field", &self.records.date_type_field),
            ("date_value_field", &self.records.date_value_field),
            ("issuance_date_field", &self.records.issuance_date_field),
            ("account_date_field", &self.records.account_date_field),
        ];
        for (setting, value) in names {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{setting} must not be empty")));
            }
        }

        Ok(())
    }

    /// Returns the oversize message for the configured limit.
    #[must_use]
    pub fn file_too_large_message(&self) -> String {
        if self.max_upload_bytes.is_multiple_of(MIB) {
            format!(
                "File size must not exceed {}MB.",
                self.max_upload_bytes / MIB
            )
        } else {
            format!(
                "File size must not exceed {} bytes.",
                self.max_upload_bytes
            )
        }
    }
}
