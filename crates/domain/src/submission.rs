use serde::{Deserialize, Serialize};

/// Position of one pipeline run in its linear state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Not started.
    Idle,
    /// Disabling the submit control.
    DisablingUi,
    /// Writing reason and dates onto the parent record.
    UpdatingParentRecord,
    /// Applying the account-side update.
    InvokingAccountUpdate,
    /// Uploading the staged file as an attachment.
    UploadingAttachment,
    /// Advancing the record's workflow.
    AdvancingWorkflow,
    /// Closing the widget after every step succeeded.
    Closing,
    /// A step failed and the UI was re-armed.
    Failed,
}

impl PipelineStage {
    /// Returns stable stage name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DisablingUi => "disabling_ui",
            Self::UpdatingParentRecord => "updating_parent_record",
            Self::InvokingAccountUpdate => "invoking_account_update",
            Self::UploadingAttachment => "uploading_attachment",
            Self::AdvancingWorkflow => "advancing_workflow",
            Self::Closing => "closing",
            Self::Failed => "failed",
        }
    }

    /// Returns the stage that follows on success.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::DisablingUi,
            Self::DisablingUi => Self::UpdatingParentRecord,
            Self::UpdatingParentRecord => Self::InvokingAccountUpdate,
            Self::InvokingAccountUpdate => Self::UploadingAttachment,
            Self::UploadingAttachment => Self::AdvancingWorkflow,
            Self::AdvancingWorkflow => Self::Closing,
            Self::Closing => Self::Closing,
            Self::Failed => Self::Failed,
        }
    }

    /// Returns true for `Closing` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closing | Self::Failed)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Every step completed and the widget was closed.
    Success,
    /// A step failed; nothing after it ran.
    Failure {
        /// Stage that raised the error.
        stage: PipelineStage,
        /// Diagnostic reason, not shown to the user.
        reason: String,
    },
}

impl SubmissionOutcome {
    /// Returns true for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the terminal stage the run ended in.
    #[must_use]
    pub fn final_stage(&self) -> PipelineStage {
        match self {
            Self::Success => PipelineStage::Closing,
            Self::Failure { .. } => PipelineStage::Failed,
        }
    }
}
