//! Transition scheduling for chart entrance animations.
//!
//! Time is supplied by the caller in milliseconds; nothing here owns a thread or
//! a real timer. A [`Transition`] is a plain value describing how one shape
//! property moves from `from` to `to`. The [`AnimationScheduler`] owns the set of
//! live transitions and one-shot timers, and tags each with the generation of the
//! render that created it. Cancelling bumps the generation, so anything created
//! for a superseded render can never be applied again.
//!
//! ```
//! use chart_rs_renderer::animation::*;
//!
//! let mut scheduler = AnimationScheduler::new();
//! scheduler.begin(0.0);
//! scheduler.schedule(Transition {
//!     target: TransitionTarget::new(0, ShapeProperty::Height),
//!     from: TransitionValue::Scalar(0.0),
//!     to: TransitionValue::Scalar(100.0),
//!     delay_ms: 0.0,
//!     duration_ms: 1000.0,
//!     easing: Easing::Linear,
//! });
//! let sampled = scheduler.sample(500.0);
//! assert_eq!(sampled[0].1, TransitionValue::Scalar(50.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Easing functions applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    #[default]
    CubicInOut,
    SinInOut,
}

impl Easing {
    /// Apply the easing to `t`, clamped to `[0, 1]`. Every variant maps 0 to 0
    /// and 1 to 1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    0.5 * t * t * t
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * t + 2.0)
                }
            }
            Easing::SinInOut => (1.0 - (std::f64::consts::PI * t).cos()) / 2.0,
        }
    }
}

/// The shape field a transition drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeProperty {
    /// Top edge of a bar.
    Y,
    /// Height of a bar.
    Height,
    /// Start and end angle of an arc, moved together.
    Angles,
    /// Radius of a point marker.
    Radius,
    /// Fraction of a line that is revealed, 0..1.
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransitionTarget {
    /// Index of the shape in the layout's shape list.
    pub shape: usize,
    pub property: ShapeProperty,
}

impl TransitionTarget {
    pub fn new(shape: usize, property: ShapeProperty) -> Self {
        Self { shape, property }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionValue {
    Scalar(f32),
    Angles { start: f32, end: f32 },
}

impl TransitionValue {
    /// Interpolate towards `to`. Angle pairs move jointly with the same `t`, so
    /// an arc passes through every intermediate (start, end) state in order.
    /// Mismatched kinds snap to `to` once `t` reaches 1.
    pub fn lerp(self, to: TransitionValue, t: f64) -> TransitionValue {
        let t = t as f32;
        match (self, to) {
            (TransitionValue::Scalar(a), TransitionValue::Scalar(b)) => {
                TransitionValue::Scalar(a + (b - a) * t)
            }
            (
                TransitionValue::Angles { start: s0, end: e0 },
                TransitionValue::Angles { start: s1, end: e1 },
            ) => TransitionValue::Angles {
                start: s0 + (s1 - s0) * t,
                end: e0 + (e1 - e0) * t,
            },
            (from, to) => {
                if t >= 1.0 {
                    to
                } else {
                    from
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub target: TransitionTarget,
    pub from: TransitionValue,
    pub to: TransitionValue,
    pub delay_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Transition {
    /// Raw (un-eased) progress after `elapsed_ms` since the transition was
    /// registered.
    pub fn progress(&self, elapsed_ms: f64) -> f64 {
        let local = elapsed_ms - self.delay_ms;
        if local < 0.0 {
            return 0.0;
        }
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (local / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, elapsed_ms: f64) -> TransitionValue {
        let eased = self.easing.apply(self.progress(elapsed_ms));
        self.from.lerp(self.to, eased)
    }

    pub fn end_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms.max(0.0)
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.end_ms()
    }

    /// Values at `steps + 1` evenly spaced instants over the active part of the
    /// transition. Used to bake the animation into SVG keyframes.
    pub fn keyframes(&self, steps: usize) -> Vec<TransitionValue> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                self.from.lerp(self.to, self.easing.apply(t))
            })
            .collect()
    }
}

/// What a one-shot timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    TooltipFadeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    generation: u64,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub kind: TimerKind,
}

#[derive(Debug, Clone)]
struct ScheduledTransition {
    generation: u64,
    transition: Transition,
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    handle: TimerHandle,
    due_ms: f64,
    kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct AnimationScheduler {
    generation: u64,
    origin_ms: f64,
    transitions: Vec<ScheduledTransition>,
    timers: Vec<ScheduledTimer>,
    next_timer_id: u64,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time at which the current generation's transitions start counting.
    pub fn origin_ms(&self) -> f64 {
        self.origin_ms
    }

    /// Start a new generation at `now_ms`, dropping everything still pending
    /// from the previous one.
    pub fn begin(&mut self, now_ms: f64) -> u64 {
        self.cancel_all();
        self.origin_ms = now_ms;
        self.generation
    }

    pub fn schedule(&mut self, transition: Transition) {
        self.transitions.push(ScheduledTransition {
            generation: self.generation,
            transition,
        });
    }

    pub fn schedule_timer(&mut self, due_ms: f64, kind: TimerKind) -> TimerHandle {
        self.next_timer_id += 1;
        let handle = TimerHandle {
            id: self.next_timer_id,
            generation: self.generation,
        };
        self.timers.push(ScheduledTimer {
            handle,
            due_ms,
            kind,
        });
        handle
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel_timer(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }

    /// Drop every pending transition and timer and move to a new generation.
    /// Returns how many entries were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.transitions.len() + self.timers.len();
        self.transitions.clear();
        self.timers.clear();
        self.generation += 1;
        if dropped > 0 {
            trace!(dropped, generation = self.generation, "cancelled pending animations");
        }
        dropped
    }

    /// True when `handle` belongs to the current generation and is still pending.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        handle.generation == self.generation && self.timers.iter().any(|t| t.handle == handle)
    }

    /// Current value of every live transition.
    pub fn sample(&self, now_ms: f64) -> Vec<(TransitionTarget, TransitionValue)> {
        let elapsed = now_ms - self.origin_ms;
        self.transitions
            .iter()
            .filter(|entry| entry.generation == self.generation)
            .map(|entry| {
                (
                    entry.transition.target,
                    entry.transition.value_at(elapsed),
                )
            })
            .collect()
    }

    /// Retire finished transitions and return the timers that are due.
    /// Entries from an older generation are discarded without firing.
    pub fn advance(&mut self, now_ms: f64) -> Vec<FiredTimer> {
        let elapsed = now_ms - self.origin_ms;
        let generation = self.generation;
        self.transitions.retain(|entry| {
            entry.generation == generation && !entry.transition.is_finished(elapsed)
        });

        let mut fired = Vec::new();
        let mut remaining = Vec::with_capacity(self.timers.len());
        for timer in self.timers.drain(..) {
            if timer.handle.generation != generation {
                trace!(id = timer.handle.id, "discarding stale timer");
                continue;
            }
            if timer.due_ms <= now_ms {
                fired.push(FiredTimer {
                    handle: timer.handle,
                    kind: timer.kind,
                });
            } else {
                remaining.push(timer);
            }
        }
        self.timers = remaining;
        fired
    }

    pub fn pending_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.transitions.is_empty() && self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn height_transition(delay_ms: f64, duration_ms: f64) -> Transition {
        Transition {
            target: TransitionTarget::new(0, ShapeProperty::Height),
            from: TransitionValue::Scalar(0.0),
            to: TransitionValue::Scalar(10.0),
            delay_ms,
            duration_ms,
            easing: Easing::Linear,
        }
    }

    #[test]
    fn easings_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::SinInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?} at 1");
            assert!(easing.apply(-3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn transition_waits_for_delay() {
        let transition = height_transition(100.0, 200.0);
        assert_eq!(transition.value_at(50.0), TransitionValue::Scalar(0.0));
        assert_eq!(transition.value_at(200.0), TransitionValue::Scalar(5.0));
        assert_eq!(transition.value_at(300.0), TransitionValue::Scalar(10.0));
        assert!(transition.is_finished(300.0));
    }

    #[test]
    fn zero_duration_jumps_after_delay() {
        let transition = height_transition(100.0, 0.0);
        assert_eq!(transition.value_at(99.0), TransitionValue::Scalar(0.0));
        assert_eq!(transition.value_at(100.0), TransitionValue::Scalar(10.0));
    }

    #[test]
    fn angle_pairs_move_jointly() {
        let transition = Transition {
            target: TransitionTarget::new(1, ShapeProperty::Angles),
            from: TransitionValue::Angles { start: 0.0, end: 0.0 },
            to: TransitionValue::Angles { start: 1.0, end: 3.0 },
            delay_ms: 0.0,
            duration_ms: 100.0,
            easing: Easing::Linear,
        };
        match transition.value_at(50.0) {
            TransitionValue::Angles { start, end } => {
                assert!((start - 0.5).abs() < 1e-6);
                assert!((end - 1.5).abs() < 1e-6);
            }
            other => panic!("unexpected value {other:?}"),
        }
        let frames = transition.keyframes(4);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[4], TransitionValue::Angles { start: 1.0, end: 3.0 });
    }

    #[test]
    fn cancel_all_drops_previous_generation() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.begin(0.0);
        scheduler.schedule(height_transition(0.0, 100.0));
        let handle = scheduler.schedule_timer(50.0, TimerKind::TooltipFadeOut);
        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.sample(10.0).is_empty());
        assert!(!scheduler.is_live(handle));
        assert!(scheduler.advance(100.0).is_empty());
    }

    #[test]
    fn advance_fires_due_timers_once() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.begin(0.0);
        let handle = scheduler.schedule_timer(200.0, TimerKind::TooltipFadeOut);
        assert!(scheduler.advance(100.0).is_empty());
        let fired = scheduler.advance(200.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].handle, handle);
        assert!(scheduler.advance(300.0).is_empty());
    }

    #[test]
    fn advance_retires_finished_transitions() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.begin(1000.0);
        scheduler.schedule(height_transition(0.0, 100.0));
        scheduler.advance(1050.0);
        assert_eq!(scheduler.pending_transitions(), 1);
        scheduler.advance(1100.0);
        assert!(scheduler.is_idle());
    }
}
