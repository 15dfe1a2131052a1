use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{error, info};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::{FormInputs, PipelineStage, SessionState, SubmissionOutcome};

use crate::settings::WidgetSettings;
use crate::submit_control::{disable_submit, rearm_submit};
use crate::widget_ports::{CrmRecordGateway, ProcedureArguments, RecordUpdate, WidgetSurface};

/// Runs the ordered remote steps of one submission.
///
/// Steps are awaited one after another. The first error stops the run, re-arms
/// the submit control and shows one generic message; steps that already
/// committed stay committed.
#[derive(Clone)]
pub struct SubmissionPipeline {
    gateway: Arc<dyn CrmRecordGateway>,
    surface: Arc<dyn WidgetSurface>,
    settings: Arc<WidgetSettings>,
}

impl SubmissionPipeline {
    /// Creates a submission pipeline.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CrmRecordGateway>,
        surface: Arc<dyn WidgetSurface>,
        settings: Arc<WidgetSettings>,
    ) -> Self {
        Self {
            gateway,
            surface,
            settings,
        }
    }

    /// Executes the pipeline against a validated session.
    pub async fn run(&self, session: &SessionState, inputs: &FormInputs) -> SubmissionOutcome {
        let mut stage = PipelineStage::Idle;

        match self.execute(session, inputs, &mut stage).await {
            Ok(()) => {
                info!(
                    record_id = session.parent().map(|parent| parent.id()).unwrap_or("<none>"),
                    "submission completed"
                );
                SubmissionOutcome::Success
            }
            Err(error) => {
                error!(
                    stage = stage.as_str(),
                    error = %error,
                    "submission failed"
                );
                let layout = &self.settings.layout;
                rearm_submit(self.surface.as_ref(), layout).await;
                self.surface
                    .set_field_error(
                        &layout.submit_control,
                        self.settings.messages.submission_failed.as_str(),
                    )
                    .await;

                SubmissionOutcome::Failure {
                    stage,
                    reason: error.to_string(),
                }
            }
        }
    }

    async fn execute(
        &self,
        session: &SessionState,
        inputs: &FormInputs,
        stage: &mut PipelineStage,
    ) -> AppResult<()> {
        let records = &self.settings.records;

        *stage = PipelineStage::DisablingUi;
        disable_submit(self.surface.as_ref(), &self.settings.layout).await;

        *stage = PipelineStage::UpdatingParentRecord;
        let parent_id = require_parent_id(session)?;
        let effective_date = inputs
            .effective_date()
            .ok_or_else(|| AppError::Precondition("effective date is missing".to_owned()))?;
        let reason = inputs
            .reason()
            .ok_or_else(|| AppError::Precondition("reason is missing".to_owned()))?;
        self.gateway
            .update_record(
                records.application_entity.as_str(),
                self.parent_update(parent_id, effective_date, reason),
            )
            .await?;

        *stage = PipelineStage::InvokingAccountUpdate;
        let account_id = session
            .account()
            .map(|account| account.id())
            .ok_or_else(|| AppError::Precondition("account id is missing".to_owned()))?;
        self.update_account(account_id, effective_date).await?;

        *stage = PipelineStage::UploadingAttachment;
        let staged_file = session
            .staged_file()
            .ok_or_else(|| AppError::Precondition("no staged file to attach".to_owned()))?;
        let parent_id = require_parent_id(session)?;
        self.gateway
            .attach_file(records.application_entity.as_str(), parent_id, staged_file)
            .await?;

        *stage = PipelineStage::AdvancingWorkflow;
        self.gateway
            .advance_workflow(records.application_entity.as_str(), parent_id)
            .await?;

        *stage = PipelineStage::Closing;
        self.surface.close_popup().await
    }

    fn parent_update(&self, parent_id: &str, effective_date: &str, reason: &str) -> RecordUpdate {
        let records = &self.settings.records;
        let mut date_entry = Map::new();
        date_entry.insert(
            records.date_type_field.clone(),
            Value::from(records.date_type_label.as_str()),
        );
        date_entry.insert(
            records.date_value_field.clone(),
            Value::from(effective_date),
        );

        RecordUpdate::new(parent_id)
            .with_field(records.reason_field.as_str(), Value::from(reason))
            .with_field(
                records.dates_subform_field.as_str(),
                Value::Array(vec![Value::Object(date_entry)]),
            )
            .with_field(
                records.issuance_date_field.as_str(),
                Value::from(effective_date),
            )
    }

    async fn update_account(&self, account_id: &str, effective_date: &str) -> AppResult<()> {
        let strategy = self.settings.account_update_strategy;

        if strategy.updates_inline() {
            let mut update = RecordUpdate::new(account_id).with_field(
                self.settings.records.account_date_field.as_str(),
                Value::from(effective_date),
            );
            for (name, value) in &self.settings.account_static_fields {
                update = update.with_field(name.as_str(), value.clone());
            }

            self.gateway
                .update_record(self.settings.records.account_entity.as_str(), update)
                .await?;
            info!(account_id, "account record updated inline");
        }

        if strategy.invokes_procedure() {
            let arguments = ProcedureArguments::from_json(&json!({
                "account_id": account_id,
                "effective_de_reg_date": effective_date,
            }))?;
            let response = self
                .gateway
                .invoke_procedure(self.settings.account_procedure_name.as_str(), arguments)
                .await?;
            info!(
                procedure = %self.settings.account_procedure_name,
                response = %response,
                "account update procedure responded"
            );
        }

        Ok(())
    }
}

fn require_parent_id(session: &SessionState) -> AppResult<&str> {
    session
        .parent()
        .map(|parent| parent.id())
        .ok_or_else(|| AppError::Precondition("parent record id is missing".to_owned()))
}
