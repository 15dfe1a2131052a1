use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vatdr_application::WidgetSurface;
use vatdr_core::AppResult;
use vatdr_domain::FieldKey;

#[derive(Debug, Default)]
struct SurfaceState {
    fields: HashMap<String, String>,
    errors: BTreeMap<String, String>,
    disabled_controls: HashMap<String, bool>,
    labels: HashMap<String, String>,
    busy: bool,
    closed: bool,
}

/// Headless widget surface with preset input values.
///
/// Field errors land in `error-<key>` slots and are echoed to the log, so a
/// non-interactive run still shows why a submission was refused.
#[derive(Debug, Default)]
pub struct PresetWidgetSurface {
    state: RwLock<SurfaceState>,
}

impl PresetWidgetSurface {
    /// Creates a surface whose inputs hold the given values.
    #[must_use]
    pub fn new<I, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (FieldKey, V)>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.as_str().to_owned(), value.into()))
            .collect();

        Self {
            state: RwLock::new(SurfaceState {
                fields,
                ..SurfaceState::default()
            }),
        }
    }

    /// Returns every visible error keyed by its error slot.
    pub async fn errors(&self) -> BTreeMap<String, String> {
        self.state.read().await.errors.clone()
    }

    /// Returns the current label of one control, if it was ever set.
    pub async fn control_label(&self, key: &FieldKey) -> Option<String> {
        self.state.read().await.labels.get(key.as_str()).cloned()
    }

    /// Returns whether one control is enabled.
    pub async fn is_control_enabled(&self, key: &FieldKey) -> bool {
        !self
            .state
            .read()
            .await
            .disabled_controls
            .get(key.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Returns whether the busy indicator is showing.
    pub async fn is_busy(&self) -> bool {
        self.state.read().await.busy
    }

    /// Returns whether the popup was closed.
    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

#[async_trait]
impl WidgetSurface for PresetWidgetSurface {
    async fn read_field(&self, key: &FieldKey) -> Option<String> {
        self.state.read().await.fields.get(key.as_str()).cloned()
    }

    async fn set_field_error(&self, key: &FieldKey, message: &str) {
        warn!(field = %key, message = message, "widget field error");
        self.state
            .write()
            .await
            .errors
            .insert(key.error_slot(), message.to_owned());
    }

    async fn clear_field_errors(&self) {
        self.state.write().await.errors.clear();
    }

    async fn clear_field_input(&self, key: &FieldKey) {
        self.state.write().await.fields.remove(key.as_str());
    }

    async fn set_control_enabled(&self, key: &FieldKey, enabled: bool) {
        self.state
            .write()
            .await
            .disabled_controls
            .insert(key.as_str().to_owned(), !enabled);
    }

    async fn set_control_label(&self, key: &FieldKey, label: &str) {
        debug!(control = %key, label = label, "control label changed");
        self.state
            .write()
            .await
            .labels
            .insert(key.as_str().to_owned(), label.to_owned());
    }

    async fn show_busy_indicator(&self) {
        self.state.write().await.busy = true;
    }

    async fn hide_busy_indicator(&self) {
        self.state.write().await.busy = false;
    }

    async fn close_popup(&self) -> AppResult<()> {
        self.state.write().await.closed = true;
        info!("widget popup closed");
        Ok(())
    }
}
