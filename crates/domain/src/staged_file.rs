use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use vatdr_core::{AppError, AppResult, NonEmptyString};

/// File picked by the user, as reported by the file input before reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    /// Original file name.
    pub name: String,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Opaque handle the file reader resolves, a local path for the headless reader.
    pub locator: String,
}

/// File held in memory and ready for upload.
///
/// `encoded_content` is always the standard base-64 encoding of `raw_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: NonEmptyString,
    raw_bytes: Vec<u8>,
    encoded_content: String,
}

impl StagedFile {
    /// Stages raw bytes read from the selected file.
    pub fn from_bytes(name: impl Into<String>, raw_bytes: Vec<u8>) -> AppResult<Self> {
        let encoded_content = STANDARD.encode(&raw_bytes);
        Ok(Self {
            name: NonEmptyString::new(name)?,
            raw_bytes,
            encoded_content,
        })
    }

    /// Stages a `data:<mime>;base64,<payload>` string or a bare base-64 payload.
    pub fn from_data_url(name: impl Into<String>, data_url: &str) -> AppResult<Self> {
        let payload = strip_data_url_prefix(data_url);
        let raw_bytes = STANDARD.decode(payload.trim()).map_err(|error| {
            AppError::Validation(format!("file content is not valid base-64: {error}"))
        })?;

        Self::from_bytes(name, raw_bytes)
    }

    /// Returns the original file name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the file contents.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Returns the base-64 payload with no metadata prefix.
    #[must_use]
    pub fn encoded_content(&self) -> &str {
        self.encoded_content.as_str()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.raw_bytes.len() as u64
    }
}

/// Drops a `data:...,` prefix, returning the payload after the first comma.
#[must_use]
pub(crate) fn strip_data_url_prefix(value: &str) -> &str {
    if !value.starts_with("data:") {
        return value;
    }

    value
        .split_once(',')
        .map_or(value, |(_, payload)| payload)
}
