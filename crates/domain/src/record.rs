use serde::{Deserialize, Serialize};
use serde_json::Value;
use vatdr_core::{AppError, AppResult, NonEmptyString};

/// Page-load notification delivered once per widget instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLoadEvent {
    /// Identifier of the record the widget was opened against.
    #[serde(rename = "EntityId", alias = "entity_id")]
    pub entity_id: String,
}

/// Reference to the parent application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecordRef {
    id: NonEmptyString,
}

impl ParentRecordRef {
    /// Creates a parent reference from a non-blank id.
    pub fn new(id: impl AsRef<str>) -> AppResult<Self> {
        Ok(Self {
            id: NonEmptyString::trimmed(id.as_ref())?,
        })
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Reference to the account linked from the parent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    id: NonEmptyString,
}

impl AccountRef {
    /// Creates an account reference from a non-blank id.
    pub fn new(id: impl AsRef<str>) -> AppResult<Self> {
        Ok(Self {
            id: NonEmptyString::trimmed(id.as_ref())?,
        })
    }

    /// Returns the account id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Record projection returned by the host platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmRecord {
    id: NonEmptyString,
    data: Value,
}

impl CrmRecord {
    /// Creates a validated record projection.
    pub fn new(id: impl Into<String>, data: Value) -> AppResult<Self> {
        if !data.is_object() {
            return Err(AppError::Validation(
                "crm record data must be a JSON object".to_owned(),
            ));
        }

        Ok(Self {
            id: NonEmptyString::new(id)?,
            data,
        })
    }

    /// Builds a record from a host payload carrying its own `id` member.
    pub fn from_payload(data: Value) -> AppResult<Self> {
        let id = data
            .get("id")
            .and_then(scalar_as_string)
            .ok_or_else(|| {
                AppError::Validation("crm record payload is missing an 'id' member".to_owned())
            })?;

        Self::new(id, data)
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the record JSON object.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Returns the non-blank id of a lookup field such as `{"Account_Name": {"id": "..."}}`.
    #[must_use]
    pub fn lookup_id(&self, field: &str) -> Option<String> {
        self.data
            .get(field)
            .and_then(|lookup| lookup.get("id"))
            .and_then(scalar_as_string)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }
}

// Host ids arrive as strings or as bare numbers depending on the endpoint.
fn scalar_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}
