//! Chart lifecycle: spec in, painted frames and tooltip out.
//!
//! Every [`RenderPipeline::render`] is a full rebuild. Whatever the previous
//! render left behind (transitions, the fade timer, the overlay, painted
//! shapes) is torn down before the new layout is computed, so nothing from
//! an older spec can ever touch the new one.

use std::f32::consts::TAU;

use serde::Serialize;
use tracing::{debug, info};

use crate::animation::{
    AnimationScheduler, ShapeProperty, Transition, TransitionTarget, TransitionValue,
};
use crate::config::Config;
use crate::ir::ChartSpec;
use crate::layout::{Layout, ShapeDescriptor, compute_layout};
use crate::surface::{Frame, Surface};
use crate::tooltip::{TooltipController, TooltipState, TooltipStyle, tooltip_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// Nothing rendered yet, or the last spec had no drawable data.
    Empty,
    Building,
    Rendered,
    Disposed,
}

pub struct RenderPipeline<S: Surface> {
    surface: S,
    config: Config,
    state: PipelineState,
    layout: Option<Layout>,
    scheduler: AnimationScheduler,
    tooltip: TooltipController,
    now_ms: f64,
}

impl<S: Surface> RenderPipeline<S> {
    pub fn new(surface: S, config: Config) -> Self {
        let tooltip = TooltipController::new(false, tooltip_style(&config, (0.0, 0.0)));
        Self {
            surface,
            config,
            state: PipelineState::Empty,
            layout: None,
            scheduler: AnimationScheduler::new(),
            tooltip,
            now_ms: 0.0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Final (post-animation) geometry of the current render.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn tooltip_state(&self) -> &TooltipState {
        self.tooltip.state()
    }

    /// Last time seen by `tick` or a pointer event.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.pending_transitions() > 0
    }

    /// Tear down the current chart and build `spec` in its place. Entrance
    /// animations start at the current clock.
    pub fn render(&mut self, spec: &ChartSpec) {
        self.teardown();
        self.state = PipelineState::Building;
        debug!(kind = spec.kind.as_str(), "building chart");

        let layout = compute_layout(spec, &self.config.theme, &self.config.layout);
        if layout.is_empty() {
            self.layout = Some(layout);
            self.state = PipelineState::Empty;
            info!(kind = spec.kind.as_str(), "rendered empty state");
            self.repaint();
            return;
        }

        let style = spec.style.sanitized(&self.config.theme.palette);
        self.scheduler.begin(self.now_ms);
        let transitions = entrance_transitions(&layout, style.animation_duration_ms, &self.config);
        let scheduled = transitions.len();
        for transition in transitions {
            self.scheduler.schedule(transition);
        }
        self.tooltip = TooltipController::new(
            style.show_tooltip,
            tooltip_style(&self.config, (layout.width, layout.height)),
        );
        self.layout = Some(layout);
        self.state = PipelineState::Rendered;
        info!(
            kind = spec.kind.as_str(),
            shapes = self.layout.as_ref().map(|l| l.shapes().len()).unwrap_or(0),
            transitions = scheduled,
            generation = self.scheduler.generation(),
            "rendered chart"
        );
        self.repaint();
    }

    /// Release everything the current chart holds. Idempotent; a later
    /// `render` mounts a fresh chart.
    pub fn dispose(&mut self) {
        if self.state == PipelineState::Disposed {
            return;
        }
        self.teardown();
        self.state = PipelineState::Disposed;
        info!("disposed chart");
    }

    /// Advance the clock: fire due timers and repaint with the new
    /// animation state.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        if self.state != PipelineState::Rendered {
            return;
        }
        let fired = self.scheduler.advance(now_ms);
        for timer in fired {
            self.tooltip.on_timer(&mut self.surface, timer);
        }
        self.repaint();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now_ms: f64) {
        self.now_ms = now_ms;
        if self.state != PipelineState::Rendered {
            return;
        }
        let Some(geometry) = self.layout.as_ref().and_then(|l| l.geometry()) else {
            return;
        };
        let hit = hit_test(&geometry.shapes, x, y, self.config.tooltip.hit_slop).and_then(|idx| {
            tooltip_content(&geometry.shapes[idx], geometry).map(|content| (idx, content))
        });
        match hit {
            Some((idx, content)) => {
                self.tooltip
                    .show(&mut self.surface, &mut self.scheduler, idx, content, (x, y));
            }
            None => self.tooltip.leave(&mut self.scheduler, now_ms),
        }
        self.repaint();
    }

    pub fn pointer_leave(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        if self.state != PipelineState::Rendered {
            return;
        }
        self.tooltip.leave(&mut self.scheduler, now_ms);
        self.repaint();
    }

    /// What should be on screen at the current clock.
    pub fn frame(&self) -> Option<Frame> {
        self.frame_at(self.now_ms)
    }

    /// What would be on screen at `now_ms`, given the transitions still live.
    pub fn frame_at(&self, now_ms: f64) -> Option<Frame> {
        let mut layout = self.layout.clone()?;
        if let Some(geometry) = layout.geometry_mut() {
            for (target, value) in self.scheduler.sample(now_ms) {
                if let Some(shape) = geometry.shapes.get_mut(target.shape) {
                    apply_value(shape, target.property, value);
                }
            }
        }
        let tooltip = self
            .tooltip
            .state()
            .visible
            .then(|| self.tooltip.state().clone());
        Some(Frame {
            time_ms: now_ms,
            layout,
            highlight: self.tooltip.hovered(),
            tooltip,
        })
    }

    fn repaint(&mut self) {
        if let Some(frame) = self.frame() {
            self.surface.paint(&frame);
        }
    }

    fn teardown(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.tooltip.destroy(&mut self.surface, &mut self.scheduler);
        self.surface.clear();
        if self.layout.take().is_some() {
            debug!(dropped, "tore down previous chart");
        }
    }
}

fn tooltip_style(config: &Config, bounds: (f32, f32)) -> TooltipStyle {
    TooltipStyle {
        config: config.tooltip.clone(),
        font_family: config.theme.font_family.clone(),
        fast_text_metrics: config.layout.fast_text_metrics,
        bounds,
    }
}

/// Entrance animation for a freshly computed layout. Bars grow from the
/// baseline with a per-index stagger, arcs sweep open together from angle 0,
/// lines are revealed left to right, and each marker pops in once the line
/// has reached it. Zero duration means no animation at all.
pub fn entrance_transitions(layout: &Layout, duration_ms: f64, config: &Config) -> Vec<Transition> {
    let Some(geometry) = layout.geometry() else {
        return Vec::new();
    };
    if duration_ms.is_nan() || duration_ms <= 0.0 {
        return Vec::new();
    }
    let easing = config.animation.easing;
    let stagger = config.animation.stagger_ms.max(0.0);
    let marker_delay = config.layout.line.marker_delay_ms.max(0.0);
    let transition = |shape: usize, property, from, to, delay_ms, duration_ms| Transition {
        target: TransitionTarget::new(shape, property),
        from,
        to,
        delay_ms,
        duration_ms,
        easing,
    };

    let mut out = Vec::new();
    for (idx, shape) in geometry.shapes.iter().enumerate() {
        match shape {
            ShapeDescriptor::Bar(bar) => {
                let delay = bar.index as f64 * stagger;
                out.push(transition(
                    idx,
                    ShapeProperty::Y,
                    TransitionValue::Scalar(bar.baseline),
                    TransitionValue::Scalar(bar.y),
                    delay,
                    duration_ms,
                ));
                out.push(transition(
                    idx,
                    ShapeProperty::Height,
                    TransitionValue::Scalar(0.0),
                    TransitionValue::Scalar(bar.height),
                    delay,
                    duration_ms,
                ));
            }
            ShapeDescriptor::ArcSlice(arc) => out.push(transition(
                idx,
                ShapeProperty::Angles,
                TransitionValue::Angles { start: 0.0, end: 0.0 },
                TransitionValue::Angles {
                    start: arc.start_angle,
                    end: arc.end_angle.min(TAU),
                },
                0.0,
                duration_ms,
            )),
            ShapeDescriptor::LineSegmentSet(_) => out.push(transition(
                idx,
                ShapeProperty::Reveal,
                TransitionValue::Scalar(0.0),
                TransitionValue::Scalar(1.0),
                0.0,
                duration_ms,
            )),
            ShapeDescriptor::PointMarker(marker) => {
                let count = geometry
                    .shapes
                    .iter()
                    .filter_map(|s| s.as_marker())
                    .filter(|m| m.series == marker.series)
                    .count();
                let delay = if count > 1 {
                    duration_ms * marker.index as f64 / (count - 1) as f64
                } else {
                    duration_ms
                };
                out.push(transition(
                    idx,
                    ShapeProperty::Radius,
                    TransitionValue::Scalar(0.0),
                    TransitionValue::Scalar(marker.radius),
                    delay,
                    marker_delay,
                ));
            }
        }
    }
    out
}

fn apply_value(shape: &mut ShapeDescriptor, property: ShapeProperty, value: TransitionValue) {
    match (shape, property, value) {
        (ShapeDescriptor::Bar(bar), ShapeProperty::Y, TransitionValue::Scalar(v)) => bar.y = v,
        (ShapeDescriptor::Bar(bar), ShapeProperty::Height, TransitionValue::Scalar(v)) => {
            bar.height = v.max(0.0)
        }
        (
            ShapeDescriptor::ArcSlice(arc),
            ShapeProperty::Angles,
            TransitionValue::Angles { start, end },
        ) => {
            arc.start_angle = start;
            arc.end_angle = end;
        }
        (ShapeDescriptor::PointMarker(marker), ShapeProperty::Radius, TransitionValue::Scalar(v)) => {
            marker.radius = v.max(0.0)
        }
        (ShapeDescriptor::LineSegmentSet(line), ShapeProperty::Reveal, TransitionValue::Scalar(v)) => {
            line.reveal = v.clamp(0.0, 1.0)
        }
        _ => {}
    }
}

/// Topmost hoverable shape under the pointer. Markers get `slop` extra
/// pixels of radius.
pub fn hit_test(shapes: &[ShapeDescriptor], x: f32, y: f32, slop: f32) -> Option<usize> {
    shapes.iter().enumerate().rev().find_map(|(idx, shape)| {
        let hit = match shape {
            ShapeDescriptor::Bar(bar) => {
                bar.height > 0.0
                    && x >= bar.x
                    && x <= bar.x + bar.width
                    && y >= bar.y
                    && y <= bar.y + bar.height
            }
            ShapeDescriptor::ArcSlice(arc) => {
                let dx = x - arc.center.0;
                let dy = y - arc.center.1;
                let distance = (dx * dx + dy * dy).sqrt();
                let angle = dx.atan2(-dy).rem_euclid(TAU);
                distance >= arc.inner_radius
                    && distance <= arc.outer_radius
                    && angle >= arc.start_angle
                    && angle < arc.end_angle
            }
            ShapeDescriptor::PointMarker(marker) => {
                let dx = x - marker.cx;
                let dy = y - marker.cy;
                (dx * dx + dy * dy).sqrt() <= marker.radius + slop
            }
            ShapeDescriptor::LineSegmentSet(_) => false,
        };
        hit.then_some(idx)
    })
}
