use crate::config::LayoutConfig;

use super::{Canvas, EmptyLayout};

/// Centred message in place of a chart.
pub(super) fn compute_empty_layout(canvas: Canvas, config: &LayoutConfig) -> EmptyLayout {
    let height = (canvas.height - canvas.top).max(0.0);
    EmptyLayout {
        message: config.empty_message.clone(),
        x: canvas.width / 2.0,
        y: canvas.top + height / 2.0,
    }
}
