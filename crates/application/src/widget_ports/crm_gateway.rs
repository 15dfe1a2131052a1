use async_trait::async_trait;
use serde_json::{Map, Value};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::{CrmRecord, StagedFile};

/// Partial record update addressed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    /// Target record id.
    pub id: String,
    /// Field API names and their new values.
    pub fields: Map<String, Value>,
}

impl RecordUpdate {
    /// Creates an empty update for one record.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Adds one field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Returns the host payload `{ "id": ..., ...fields }`.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut payload = self.fields.clone();
        payload.insert("id".to_owned(), Value::String(self.id.clone()));
        Value::Object(payload)
    }
}

/// Serialized argument payload for a server procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureArguments {
    /// JSON-encoded argument object.
    pub arguments: String,
}

impl ProcedureArguments {
    /// Serializes an argument object.
    pub fn from_json(arguments: &Value) -> AppResult<Self> {
        if !arguments.is_object() {
            return Err(AppError::Validation(
                "procedure arguments must be a JSON object".to_owned(),
            ));
        }

        let arguments = serde_json::to_string(arguments).map_err(|error| {
            AppError::Internal(format!("failed to serialize procedure arguments: {error}"))
        })?;

        Ok(Self { arguments })
    }
}

/// Port for host CRM record, function, attachment and workflow operations.
#[async_trait]
pub trait CrmRecordGateway: Send + Sync {
    /// Fetches one record.
    async fn fetch_record(&self, entity: &str, record_id: &str) -> AppResult<CrmRecord>;

    /// Applies a partial update to one record.
    async fn update_record(&self, entity: &str, update: RecordUpdate) -> AppResult<()>;

    /// Invokes a named server procedure and returns its raw response.
    async fn invoke_procedure(
        &self,
        name: &str,
        arguments: ProcedureArguments,
    ) -> AppResult<Value>;

    /// Uploads a staged file as an attachment of one record.
    async fn attach_file(
        &self,
        entity: &str,
        record_id: &str,
        file: &StagedFile,
    ) -> AppResult<()>;

    /// Moves one record to its next workflow state.
    async fn advance_workflow(&self, entity: &str, record_id: &str) -> AppResult<()>;
}
