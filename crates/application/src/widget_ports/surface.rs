use async_trait::async_trait;
use vatdr_core::AppResult;
use vatdr_domain::FieldKey;

/// UI binding of the widget form.
///
/// Error messages are addressed by field key and land in the `error-<key>` slot.
#[async_trait]
pub trait WidgetSurface: Send + Sync {
    /// Reads the current value of one input.
    async fn read_field(&self, key: &FieldKey) -> Option<String>;

    /// Writes an inline error for one field or control.
    async fn set_field_error(&self, key: &FieldKey, message: &str);

    /// Clears every inline error slot.
    async fn clear_field_errors(&self);

    /// Resets one input to empty.
    async fn clear_field_input(&self, key: &FieldKey);

    /// Enables or disables one control.
    async fn set_control_enabled(&self, key: &FieldKey, enabled: bool);

    /// Replaces the label of one control.
    async fn set_control_label(&self, key: &FieldKey, label: &str);

    /// Shows the staging progress indicator.
    async fn show_busy_indicator(&self);

    /// Hides the staging progress indicator.
    async fn hide_busy_indicator(&self);

    /// Closes the widget popup and reloads the host page.
    async fn close_popup(&self) -> AppResult<()>;
}
