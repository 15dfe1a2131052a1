use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vatdr_core::AppResult;
use vatdr_domain::{FileSelection, SessionState, StagedFile};

use crate::settings::WidgetSettings;
use crate::widget_ports::{SelectedFileContent, SelectedFileReader, WidgetSurface};

/// What one file selection did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingOutcome {
    /// The change event carried no file; nothing is staged afterwards.
    Cleared,
    /// The file replaced the staged file.
    Staged {
        /// Staged file name.
        name: String,
        /// Staged size in bytes.
        size_bytes: u64,
    },
    /// The file exceeded the upload limit; the previous staged file is kept.
    Rejected {
        /// Size that was rejected.
        size_bytes: u64,
    },
    /// Reading the file failed; the previous staged file is kept.
    ReadFailed,
}

/// Validates, reads and encodes user file selections.
#[derive(Clone)]
pub struct FileStager {
    reader: Arc<dyn SelectedFileReader>,
    surface: Arc<dyn WidgetSurface>,
    settings: Arc<WidgetSettings>,
}

impl FileStager {
    /// Creates a file stager.
    #[must_use]
    pub fn new(
        reader: Arc<dyn SelectedFileReader>,
        surface: Arc<dyn WidgetSurface>,
        settings: Arc<WidgetSettings>,
    ) -> Self {
        Self {
            reader,
            surface,
            settings,
        }
    }

    /// Handles a change of the file input.
    ///
    /// Reading, encoding and the staging delay run without the session lock;
    /// the write lock is held only to swap the staged file.
    pub async fn on_file_selected(
        &self,
        session: &RwLock<SessionState>,
        selection: Option<&FileSelection>,
    ) -> StagingOutcome {
        self.surface.clear_field_errors().await;

        let Some(selection) = selection else {
            if session.write().await.clear_staged_file() {
                debug!("staged file cleared after deselection");
            }
            return StagingOutcome::Cleared;
        };

        if selection.size_bytes > self.settings.max_upload_bytes {
            return self.reject_oversized(selection, selection.size_bytes).await;
        }

        self.surface.show_busy_indicator().await;

        let staged = match self.read_and_encode(selection).await {
            Ok(staged) => staged,
            Err(error) => {
                warn!(
                    file_name = %selection.name,
                    error = %error,
                    "failed to read selected file"
                );
                self.surface.hide_busy_indicator().await;
                self.surface
                    .set_field_error(
                        &self.settings.layout.file_field,
                        self.settings.messages.file_read_failed.as_str(),
                    )
                    .await;
                return StagingOutcome::ReadFailed;
            }
        };

        // The declared size can understate what the reader returns.
        if staged.size_bytes() > self.settings.max_upload_bytes {
            self.surface.hide_busy_indicator().await;
            return self.reject_oversized(selection, staged.size_bytes()).await;
        }

        let outcome = StagingOutcome::Staged {
            name: staged.name().to_owned(),
            size_bytes: staged.size_bytes(),
        };
        info!(
            file_name = %staged.name(),
            size_bytes = staged.size_bytes(),
            "selected file staged"
        );
        session.write().await.stage_file(staged);

        if self.settings.staging_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.staging_delay_ms)).await;
        }
        self.surface.hide_busy_indicator().await;

        outcome
    }

    async fn read_and_encode(&self, selection: &FileSelection) -> AppResult<StagedFile> {
        match self.reader.read_selected(selection).await? {
            SelectedFileContent::Bytes(bytes) => {
                StagedFile::from_bytes(selection.name.as_str(), bytes)
            }
            SelectedFileContent::DataUrl(data_url) => {
                StagedFile::from_data_url(selection.name.as_str(), data_url.as_str())
            }
        }
    }

    async fn reject_oversized(&self, selection: &FileSelection, size_bytes: u64) -> StagingOutcome {
        debug!(
            file_name = %selection.name,
            size_bytes,
            max_upload_bytes = self.settings.max_upload_bytes,
            "selected file exceeds upload limit"
        );
        self.surface
            .clear_field_input(&self.settings.layout.file_field)
            .await;
        self.surface
            .set_field_error(
                &self.settings.layout.file_field,
                self.settings.file_too_large_message().as_str(),
            )
            .await;

        StagingOutcome::Rejected { size_bytes }
    }
}
