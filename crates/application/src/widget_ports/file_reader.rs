use async_trait::async_trait;
use vatdr_core::AppResult;
use vatdr_domain::FileSelection;

/// Contents produced by reading a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedFileContent {
    /// Raw file bytes.
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` string.
    DataUrl(String),
}

/// Port that reads the full contents of a user-selected file.
#[async_trait]
pub trait SelectedFileReader: Send + Sync {
    /// Reads one selection.
    async fn read_selected(&self, selection: &FileSelection) -> AppResult<SelectedFileContent>;
}
