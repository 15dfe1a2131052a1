use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use vatdr_application::{SelectedFileContent, SelectedFileReader};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::FileSelection;

/// Reads selections whose locator is a local file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileReader;

impl LocalFileReader {
    /// Creates a local file reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Describes a local file as a selection, taking the declared size from its metadata.
    pub async fn describe(&self, path: impl AsRef<Path>) -> AppResult<FileSelection> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|error| io_error(path, &error))?;
        if !metadata.is_file() {
            return Err(AppError::Validation(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AppError::Validation(format!("'{}' has no file name", path.display()))
            })?;

        Ok(FileSelection {
            name,
            size_bytes: metadata.len(),
            locator: path.to_string_lossy().into_owned(),
        })
    }
}

#[async_trait]
impl SelectedFileReader for LocalFileReader {
    async fn read_selected(&self, selection: &FileSelection) -> AppResult<SelectedFileContent> {
        let path = Path::new(selection.locator.as_str());
        tokio::fs::read(path)
            .await
            .map(SelectedFileContent::Bytes)
            .map_err(|error| io_error(path, &error))
    }
}

fn io_error(path: &Path, error: &std::io::Error) -> AppError {
    match error.kind() {
        ErrorKind::NotFound => {
            AppError::NotFound(format!("file '{}' does not exist", path.display()))
        }
        _ => AppError::Internal(format!("failed to read '{}': {error}", path.display())),
    }
}
