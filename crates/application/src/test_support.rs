use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{Mutex, Notify};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::{CrmRecord, FieldKey, FileSelection, StagedFile};

use crate::settings::WidgetSettings;
use crate::widget_ports::{
    CrmRecordGateway, ProcedureArguments, RecordUpdate, SelectedFileContent, SelectedFileReader,
    WidgetSurface,
};

/// Host-facing calls in the order fakes observed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostOperation {
    FetchRecord,
    UpdateRecord,
    InvokeProcedure,
    AttachFile,
    AdvanceWorkflow,
    ClosePopup,
}

#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<HostOperation>>>);

impl Journal {
    async fn record(&self, operation: HostOperation) {
        self.0.lock().await.push(operation);
    }

    pub(crate) async fn entries(&self) -> Vec<HostOperation> {
        self.0.lock().await.clone()
    }
}

pub(crate) fn test_settings() -> WidgetSettings {
    let mut settings = WidgetSettings::vat_deregistration().unwrap_or_else(|_| unreachable!());
    settings.staging_delay_ms = 0;
    settings
}

pub(crate) fn selection(name: &str, size_bytes: u64) -> FileSelection {
    FileSelection {
        name: name.to_owned(),
        size_bytes,
        locator: format!("/uploads/{name}"),
    }
}

pub(crate) struct FakeCrmGateway {
    journal: Journal,
    record: Mutex<Value>,
    failing: Mutex<Option<HostOperation>>,
    update_gate: Mutex<Option<Arc<Notify>>>,
    pub(crate) update_entered: Notify,
    pub(crate) updates: Mutex<Vec<(String, Value)>>,
    pub(crate) procedure_calls: Mutex<Vec<(String, String)>>,
    pub(crate) attachments: Mutex<Vec<(String, String, String, String)>>,
    pub(crate) workflow_advances: Mutex<Vec<(String, String)>>,
}

impl FakeCrmGateway {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            record: Mutex::new(json!({
                "id": "5000001",
                "Account_Name": {"id": "600000000001", "name": "Acme Trading"}
            })),
            failing: Mutex::new(None),
            update_gate: Mutex::new(None),
            update_entered: Notify::new(),
            updates: Mutex::new(Vec::new()),
            procedure_calls: Mutex::new(Vec::new()),
            attachments: Mutex::new(Vec::new()),
            workflow_advances: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn set_record(&self, record: Value) {
        *self.record.lock().await = record;
    }

    pub(crate) async fn fail_on(&self, operation: HostOperation) {
        *self.failing.lock().await = Some(operation);
    }

    /// Parks every `update_record` call until the returned gate is notified.
    pub(crate) async fn hold_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.update_gate.lock().await = Some(gate.clone());
        gate
    }

    pub(crate) async fn clear_failure(&self) {
        *self.failing.lock().await = None;
    }

    pub(crate) async fn operations(&self) -> Vec<HostOperation> {
        self.journal.entries().await
    }

    async fn enter(&self, operation: HostOperation) -> AppResult<()> {
        self.journal.record(operation).await;
        if *self.failing.lock().await == Some(operation) {
            return Err(AppError::Remote(format!(
                "simulated {operation:?} failure"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CrmRecordGateway for FakeCrmGateway {
    async fn fetch_record(&self, _entity: &str, _record_id: &str) -> AppResult<CrmRecord> {
        self.enter(HostOperation::FetchRecord).await?;
        CrmRecord::from_payload(self.record.lock().await.clone())
    }

    async fn update_record(&self, entity: &str, update: RecordUpdate) -> AppResult<()> {
        self.enter(HostOperation::UpdateRecord).await?;
        self.update_entered.notify_one();
        let gate = self.update_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.updates
            .lock()
            .await
            .push((entity.to_owned(), update.to_payload()));
        Ok(())
    }

    async fn invoke_procedure(
        &self,
        name: &str,
        arguments: ProcedureArguments,
    ) -> AppResult<Value> {
        self.enter(HostOperation::InvokeProcedure).await?;
        self.procedure_calls
            .lock()
            .await
            .push((name.to_owned(), arguments.arguments));
        Ok(json!({"code": "success"}))
    }

    async fn attach_file(
        &self,
        entity: &str,
        record_id: &str,
        file: &StagedFile,
    ) -> AppResult<()> {
        self.enter(HostOperation::AttachFile).await?;
        self.attachments.lock().await.push((
            entity.to_owned(),
            record_id.to_owned(),
            file.name().to_owned(),
            file.encoded_content().to_owned(),
        ));
        Ok(())
    }

    async fn advance_workflow(&self, entity: &str, record_id: &str) -> AppResult<()> {
        self.enter(HostOperation::AdvanceWorkflow).await?;
        self.workflow_advances
            .lock()
            .await
            .push((entity.to_owned(), record_id.to_owned()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSurface {
    journal: Journal,
    fields: Mutex<HashMap<String, String>>,
    errors: Mutex<BTreeMap<String, String>>,
    enabled: Mutex<HashMap<String, bool>>,
    labels: Mutex<HashMap<String, String>>,
    busy_visible: Mutex<bool>,
    busy_shows: Mutex<u32>,
    cleared_inputs: Mutex<Vec<String>>,
    closed: Mutex<bool>,
    fail_close: Mutex<bool>,
}

impl FakeSurface {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub(crate) async fn set_field(&self, key: &FieldKey, value: &str) {
        self.fields
            .lock()
            .await
            .insert(key.as_str().to_owned(), value.to_owned());
    }

    pub(crate) async fn fail_close(&self) {
        *self.fail_close.lock().await = true;
    }

    pub(crate) async fn errors(&self) -> BTreeMap<String, String> {
        self.errors.lock().await.clone()
    }

    pub(crate) async fn error(&self, key: &FieldKey) -> Option<String> {
        self.errors.lock().await.get(&key.error_slot()).cloned()
    }

    pub(crate) async fn control_enabled(&self, key: &FieldKey) -> Option<bool> {
        self.enabled.lock().await.get(key.as_str()).copied()
    }

    pub(crate) async fn control_label(&self, key: &FieldKey) -> Option<String> {
        self.labels.lock().await.get(key.as_str()).cloned()
    }

    pub(crate) async fn busy_visible(&self) -> bool {
        *self.busy_visible.lock().await
    }

    pub(crate) async fn busy_shows(&self) -> u32 {
        *self.busy_shows.lock().await
    }

    pub(crate) async fn cleared_inputs(&self) -> Vec<String> {
        self.cleared_inputs.lock().await.clone()
    }

    pub(crate) async fn closed(&self) -> bool {
        *self.closed.lock().await
    }
}

#[async_trait]
impl WidgetSurface for FakeSurface {
    async fn read_field(&self, key: &FieldKey) -> Option<String> {
        self.fields.lock().await.get(key.as_str()).cloned()
    }

    async fn set_field_error(&self, key: &FieldKey, message: &str) {
        self.errors
            .lock()
            .await
            .insert(key.error_slot(), message.to_owned());
    }

    async fn clear_field_errors(&self) {
        self.errors.lock().await.clear();
    }

    async fn clear_field_input(&self, key: &FieldKey) {
        self.cleared_inputs
            .lock()
            .await
            .push(key.as_str().to_owned());
    }

    async fn set_control_enabled(&self, key: &FieldKey, enabled: bool) {
        self.enabled
            .lock()
            .await
            .insert(key.as_str().to_owned(), enabled);
    }

    async fn set_control_label(&self, key: &FieldKey, label: &str) {
        self.labels
            .lock()
            .await
            .insert(key.as_str().to_owned(), label.to_owned());
    }

    async fn show_busy_indicator(&self) {
        *self.busy_visible.lock().await = true;
        *self.busy_shows.lock().await += 1;
    }

    async fn hide_busy_indicator(&self) {
        *self.busy_visible.lock().await = false;
    }

    async fn close_popup(&self) -> AppResult<()> {
        self.journal.record(HostOperation::ClosePopup).await;
        if *self.fail_close.lock().await {
            return Err(AppError::Remote("simulated popup close failure".to_owned()));
        }

        *self.closed.lock().await = true;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeFileReader {
    contents: Mutex<HashMap<String, SelectedFileContent>>,
}

impl FakeFileReader {
    pub(crate) async fn insert(&self, selection: &FileSelection, content: SelectedFileContent) {
        self.contents
            .lock()
            .await
            .insert(selection.locator.clone(), content);
    }
}

#[async_trait]
impl SelectedFileReader for FakeFileReader {
    async fn read_selected(&self, selection: &FileSelection) -> AppResult<SelectedFileContent> {
        self.contents
            .lock()
            .await
            .get(&selection.locator)
            .cloned()
            .ok_or_else(|| {
                AppError::Remote(format!("simulated read failure for '{}'", selection.name))
            })
    }
}
