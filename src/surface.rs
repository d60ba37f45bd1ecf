//! Host surfaces the pipeline paints into.
//!
//! The pipeline never draws directly. It hands a [`Frame`] to a [`Surface`]
//! and asks the surface for overlay slots. [`SceneSurface`] is the in-crate
//! retained-mode implementation used by the CLI `--at` mode and tests.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::config::Config;
use crate::layout::Layout;
use crate::render::render_svg;
use crate::theme::Theme;
use crate::tooltip::TooltipState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OverlayId(u64);

impl OverlayId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What is visible at one instant: the layout with every in-flight
/// transition applied, the hovered shape, and the tooltip if shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub time_ms: f64,
    pub layout: Layout,
    pub highlight: Option<usize>,
    pub tooltip: Option<TooltipState>,
}

pub trait Surface {
    /// Drop every painted shape.
    fn clear(&mut self);
    fn paint(&mut self, frame: &Frame);
    fn create_overlay(&mut self) -> OverlayId;
    fn update_overlay(&mut self, id: OverlayId, state: &TooltipState);
    fn destroy_overlay(&mut self, id: OverlayId);
}

/// Keeps the last painted frame and the live overlays in memory.
#[derive(Debug, Default)]
pub struct SceneSurface {
    frame: Option<Frame>,
    overlays: BTreeMap<OverlayId, TooltipState>,
    next_overlay: u64,
    paints: usize,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&TooltipState> {
        self.overlays.get(&id)
    }

    /// Overlays currently attached.
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Overlays ever created on this surface.
    pub fn overlays_created(&self) -> u64 {
        self.next_overlay
    }

    pub fn paint_count(&self) -> usize {
        self.paints
    }

    /// SVG of the last painted frame with any visible overlay on top. Empty
    /// string when nothing has been painted yet.
    pub fn to_svg(&self, theme: &Theme, config: &Config) -> String {
        let Some(frame) = &self.frame else {
            return String::new();
        };
        let mut frame = frame.clone();
        if let Some(state) = self.overlays.values().find(|state| state.visible) {
            frame.tooltip = Some(state.clone());
        }
        render_svg(&frame, theme, config)
    }
}

impl Surface for SceneSurface {
    fn clear(&mut self) {
        self.frame = None;
    }

    fn paint(&mut self, frame: &Frame) {
        self.paints += 1;
        self.frame = Some(frame.clone());
    }

    fn create_overlay(&mut self) -> OverlayId {
        self.next_overlay += 1;
        let id = OverlayId(self.next_overlay);
        self.overlays.insert(id, TooltipState::default());
        trace!(overlay = id.0, "overlay attached");
        id
    }

    fn update_overlay(&mut self, id: OverlayId, state: &TooltipState) {
        if let Some(slot) = self.overlays.get_mut(&id) {
            *slot = state.clone();
        }
    }

    fn destroy_overlay(&mut self, id: OverlayId) {
        if self.overlays.remove(&id).is_some() {
            trace!(overlay = id.0, "overlay detached");
        }
    }
}
