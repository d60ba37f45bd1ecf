//! The hover tooltip of a chart.
//!
//! A [`TooltipController`] owns at most one overlay on its surface. The
//! overlay is created the first time a shape is hovered and lives until the
//! controller is destroyed; in between it is only ever shown, moved, or hidden.
//! Hiding after pointer-leave goes through a fade-out timer on the animation
//! scheduler, so a rebuild that cancels the scheduler also cancels any
//! pending hide.

use serde::Serialize;
use tracing::{debug, trace};

use crate::animation::{AnimationScheduler, FiredTimer, TimerHandle, TimerKind};
use crate::config::TooltipConfig;
use crate::ir::format_number;
use crate::layout::text::text_width;
use crate::layout::{ChartGeometry, ShapeDescriptor};
use crate::surface::{OverlayId, Surface};

/// What the overlay shows. `anchor` is the top-left corner of the box in
/// chart pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TooltipState {
    pub visible: bool,
    pub content: String,
    pub anchor: (f32, f32),
    pub size: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TooltipPhase {
    #[default]
    Hidden,
    Visible,
    FadingOut,
}

/// Text metrics and bounds the controller lays its box out with.
#[derive(Debug, Clone)]
pub struct TooltipStyle {
    pub config: TooltipConfig,
    pub font_family: String,
    pub fast_text_metrics: bool,
    /// Chart width and height; the box is kept inside them.
    pub bounds: (f32, f32),
}

#[derive(Debug)]
pub struct TooltipController {
    enabled: bool,
    style: TooltipStyle,
    phase: TooltipPhase,
    overlay: Option<OverlayId>,
    state: TooltipState,
    hovered: Option<usize>,
    fade_timer: Option<TimerHandle>,
}

impl TooltipController {
    /// A disabled controller ignores every call and never creates an overlay.
    pub fn new(enabled: bool, style: TooltipStyle) -> Self {
        Self {
            enabled,
            style,
            phase: TooltipPhase::Hidden,
            overlay: None,
            state: TooltipState::default(),
            hovered: None,
            fade_timer: None,
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn overlay(&self) -> Option<OverlayId> {
        self.overlay
    }

    /// Shape the tooltip currently describes, while visible or fading.
    pub fn hovered(&self) -> Option<usize> {
        match self.phase {
            TooltipPhase::Hidden => None,
            _ => self.hovered,
        }
    }

    /// Show `content` for `shape` next to the pointer. Covers pointer-enter,
    /// moving between shapes, and re-entering while fading out.
    pub fn show<S: Surface>(
        &mut self,
        surface: &mut S,
        scheduler: &mut AnimationScheduler,
        shape: usize,
        content: String,
        pointer: (f32, f32),
    ) {
        if !self.enabled {
            return;
        }
        if let Some(handle) = self.fade_timer.take() {
            scheduler.cancel_timer(handle);
        }
        let overlay = match self.overlay {
            Some(id) => id,
            None => {
                let id = surface.create_overlay();
                debug!(overlay = id.get(), "created tooltip overlay");
                self.overlay = Some(id);
                id
            }
        };
        let size = self.box_size(&content);
        self.state = TooltipState {
            visible: true,
            anchor: self.anchor_for(pointer, size),
            content,
            size,
        };
        self.hovered = Some(shape);
        self.phase = TooltipPhase::Visible;
        surface.update_overlay(overlay, &self.state);
    }

    /// Pointer left every shape. The box stays up until the fade-out timer
    /// fires.
    pub fn leave(&mut self, scheduler: &mut AnimationScheduler, now_ms: f64) {
        if self.phase != TooltipPhase::Visible {
            return;
        }
        let due = now_ms + self.style.config.fade_out_ms.max(0.0);
        self.fade_timer = Some(scheduler.schedule_timer(due, TimerKind::TooltipFadeOut));
        self.phase = TooltipPhase::FadingOut;
        trace!(due, "tooltip fading out");
    }

    /// Handle a fired timer. Returns true if it hid the tooltip; a timer that
    /// is not the pending fade-out is ignored.
    pub fn on_timer<S: Surface>(&mut self, surface: &mut S, fired: FiredTimer) -> bool {
        if fired.kind != TimerKind::TooltipFadeOut || self.fade_timer != Some(fired.handle) {
            trace!("ignoring stale tooltip timer");
            return false;
        }
        self.fade_timer = None;
        if self.phase != TooltipPhase::FadingOut {
            return false;
        }
        self.phase = TooltipPhase::Hidden;
        self.state.visible = false;
        self.hovered = None;
        if let Some(id) = self.overlay {
            surface.update_overlay(id, &self.state);
        }
        true
    }

    /// Release the overlay and any pending timer. Safe to call repeatedly.
    pub fn destroy<S: Surface>(&mut self, surface: &mut S, scheduler: &mut AnimationScheduler) {
        if let Some(handle) = self.fade_timer.take() {
            scheduler.cancel_timer(handle);
        }
        if let Some(id) = self.overlay.take() {
            surface.destroy_overlay(id);
            debug!(overlay = id.get(), "destroyed tooltip overlay");
        }
        self.phase = TooltipPhase::Hidden;
        self.state = TooltipState::default();
        self.hovered = None;
    }

    fn box_size(&self, content: &str) -> (f32, f32) {
        let cfg = &self.style.config;
        let width = text_width(
            content,
            cfg.font_size,
            &self.style.font_family,
            self.style.fast_text_metrics,
        );
        (
            width + cfg.padding * 2.0,
            cfg.font_size * 1.2 + cfg.padding * 2.0,
        )
    }

    fn anchor_for(&self, pointer: (f32, f32), size: (f32, f32)) -> (f32, f32) {
        let cfg = &self.style.config;
        let (width, height) = self.style.bounds;
        let x = (pointer.0 + cfg.offset_x).min(width - size.0).max(0.0);
        let y = (pointer.1 + cfg.offset_y).min(height - size.1).max(0.0);
        (x, y)
    }
}

/// Tooltip text for a shape, or `None` for shapes that are not hoverable.
pub fn tooltip_content(shape: &ShapeDescriptor, geometry: &ChartGeometry) -> Option<String> {
    let value = |v: f64| {
        format!(
            "{}{}{}",
            geometry.value_prefix,
            format_number(v),
            geometry.value_suffix
        )
    };
    match shape {
        ShapeDescriptor::Bar(bar) => Some(format!("{}: {}", bar.label, value(bar.value))),
        ShapeDescriptor::ArcSlice(arc) => Some(format!(
            "{}: {} ({:.1}%)",
            arc.label,
            value(arc.value),
            arc.share * 100.0
        )),
        ShapeDescriptor::PointMarker(marker) => Some(format!(
            "{} · {}: {}",
            marker.series,
            marker.label,
            value(marker.value)
        )),
        ShapeDescriptor::LineSegmentSet(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SceneSurface;

    fn controller(enabled: bool) -> TooltipController {
        TooltipController::new(
            enabled,
            TooltipStyle {
                config: TooltipConfig::default(),
                font_family: "sans-serif".to_string(),
                fast_text_metrics: true,
                bounds: (400.0, 300.0),
            },
        )
    }

    #[test]
    fn first_hover_creates_the_overlay_once() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (50.0, 80.0));
        tooltip.show(&mut surface, &mut scheduler, 1, "B: 2".into(), (90.0, 80.0));
        assert_eq!(surface.overlays_created(), 1);
        assert_eq!(tooltip.phase(), TooltipPhase::Visible);
        assert_eq!(tooltip.state().content, "B: 2");
        assert_eq!(tooltip.state().anchor, (102.0, 52.0));
        assert_eq!(tooltip.hovered(), Some(1));
    }

    #[test]
    fn fades_out_after_the_delay() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (10.0, 40.0));
        tooltip.leave(&mut scheduler, 1000.0);
        assert_eq!(tooltip.phase(), TooltipPhase::FadingOut);
        assert!(scheduler.advance(1199.0).is_empty());
        let fired = scheduler.advance(1200.0);
        assert_eq!(fired.len(), 1);
        assert!(tooltip.on_timer(&mut surface, fired[0]));
        assert_eq!(tooltip.phase(), TooltipPhase::Hidden);
        let id = tooltip.overlay().unwrap();
        assert!(!surface.overlay(id).unwrap().visible);
    }

    #[test]
    fn reentering_cancels_the_fade() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (10.0, 40.0));
        tooltip.leave(&mut scheduler, 0.0);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (12.0, 40.0));
        assert_eq!(tooltip.phase(), TooltipPhase::Visible);
        assert!(scheduler.advance(500.0).is_empty());
        assert_eq!(tooltip.phase(), TooltipPhase::Visible);
    }

    #[test]
    fn anchor_is_clamped_into_the_chart() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "Blankets: 120".into(), (395.0, 5.0));
        let state = tooltip.state();
        assert!(state.anchor.0 + state.size.0 <= 400.0 + 1e-3);
        assert_eq!(state.anchor.1, 0.0);
    }

    #[test]
    fn disabled_controller_never_creates_an_overlay() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(false);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (10.0, 40.0));
        assert_eq!(surface.overlays_created(), 0);
        assert_eq!(tooltip.phase(), TooltipPhase::Hidden);
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (10.0, 40.0));
        tooltip.leave(&mut scheduler, 0.0);
        let other = scheduler.schedule_timer(0.0, TimerKind::TooltipFadeOut);
        let stale = FiredTimer {
            handle: other,
            kind: TimerKind::TooltipFadeOut,
        };
        assert!(!tooltip.on_timer(&mut surface, stale));
        assert_eq!(tooltip.phase(), TooltipPhase::FadingOut);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut surface = SceneSurface::new();
        let mut scheduler = AnimationScheduler::new();
        let mut tooltip = controller(true);
        tooltip.show(&mut surface, &mut scheduler, 0, "A: 1".into(), (10.0, 40.0));
        tooltip.leave(&mut scheduler, 0.0);
        tooltip.destroy(&mut surface, &mut scheduler);
        tooltip.destroy(&mut surface, &mut scheduler);
        assert_eq!(surface.overlay_count(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
        assert!(tooltip.overlay().is_none());
    }
}
