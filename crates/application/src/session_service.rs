use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};
use vatdr_core::AppResult;
use vatdr_domain::{AccountRef, PageLoadEvent, ParentRecordRef, SessionState};

use crate::settings::WidgetSettings;
use crate::widget_ports::CrmRecordGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedSession {
    parent: ParentRecordRef,
    account: Option<AccountRef>,
}

/// Bridges the page-load notification into session state.
#[derive(Clone)]
pub struct SessionLoader {
    gateway: Arc<dyn CrmRecordGateway>,
    settings: Arc<WidgetSettings>,
}

impl SessionLoader {
    /// Creates a session loader.
    #[must_use]
    pub fn new(gateway: Arc<dyn CrmRecordGateway>, settings: Arc<WidgetSettings>) -> Self {
        Self { gateway, settings }
    }

    async fn resolve(&self, event: &PageLoadEvent) -> AppResult<LoadedSession> {
        let entity_id = ParentRecordRef::new(event.entity_id.as_str())?;
        let record = self
            .gateway
            .fetch_record(
                self.settings.records.application_entity.as_str(),
                entity_id.id(),
            )
            .await?;

        let parent = ParentRecordRef::new(record.id())?;
        let account = record
            .lookup_id(self.settings.records.account_lookup_field.as_str())
            .map(AccountRef::new)
            .transpose()?;

        Ok(LoadedSession { parent, account })
    }

    /// Populates the session from a page-load event.
    ///
    /// The record is fetched without the session lock. Failures are logged and
    /// leave the session untouched, so the validator reports them at submit
    /// time. Returns whether the session was populated.
    pub async fn on_page_load(
        &self,
        session: &RwLock<SessionState>,
        event: &PageLoadEvent,
    ) -> bool {
        match self.resolve(event).await {
            Ok(loaded) => {
                if loaded.account.is_none() {
                    error!(
                        record_id = %loaded.parent.id(),
                        lookup_field = %self.settings.records.account_lookup_field,
                        "application record is missing a linked account id"
                    );
                }

                info!(
                    record_id = %loaded.parent.id(),
                    account_id = loaded.account.as_ref().map(AccountRef::id).unwrap_or("<none>"),
                    "session populated from page load"
                );
                session
                    .write()
                    .await
                    .populate(loaded.parent, loaded.account);
                true
            }
            Err(error) => {
                error!(
                    entity_id = %event.entity_id,
                    error = %error,
                    "failed to load application record"
                );
                false
            }
        }
    }
}
