use crate::settings::FormLayout;
use crate::widget_ports::WidgetSurface;

/// Disables submit and shows the busy label. Safe to repeat.
pub(crate) async fn disable_submit(surface: &dyn WidgetSurface, layout: &FormLayout) {
    surface
        .set_control_enabled(&layout.submit_control, false)
        .await;
    surface
        .set_control_label(&layout.submit_control, layout.submitting_label.as_str())
        .await;
}

/// Re-enables submit with its idle label.
pub(crate) async fn rearm_submit(surface: &dyn WidgetSurface, layout: &FormLayout) {
    surface.set_control_enabled(&layout.submit_control, true).await;
    surface
        .set_control_label(&layout.submit_control, layout.submit_label.as_str())
        .await;
}

