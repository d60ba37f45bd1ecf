//! Data-to-pixel scales.
//!
//! Three kinds cover every chart: a [`LinearScale`] for numeric values, a
//! [`BandScale`] that gives each category an equal padded slot (bars), and a
//! [`PointScale`] that gives each category one coordinate (line vertices).
//! None of them fail. Empty or degenerate input maps to the middle of the
//! pixel range so a caller can always draw something defined.

/// Number of intervals the nice-tick search aims for.
pub const TARGET_TICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Linear(LinearScale),
    Band(BandScale),
    Point(PointScale),
}

impl Scale {
    pub fn range(&self) -> (f32, f32) {
        match self {
            Scale::Linear(scale) => scale.range(),
            Scale::Band(scale) => scale.range(),
            Scale::Point(scale) => scale.range(),
        }
    }

    pub fn as_linear(&self) -> Option<&LinearScale> {
        match self {
            Scale::Linear(scale) => Some(scale),
            _ => None,
        }
    }

    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Scale::Band(scale) => Some(scale),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&PointScale> {
        match self {
            Scale::Point(scale) => Some(scale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
    ticks: Vec<f64>,
    /// No usable domain: every value maps to the range midpoint.
    constant: bool,
}

impl LinearScale {
    /// A scale with no data behind it.
    pub fn constant(range_low: f32, range_high: f32) -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (range_low, range_high),
            ticks: Vec::new(),
            constant: true,
        }
    }

    pub fn map(&self, value: f64) -> f32 {
        let (low, high) = self.range;
        if self.constant || !value.is_finite() {
            return (low + high) / 2.0;
        }
        let (min, max) = self.domain;
        let t = (value - min) / (max - min);
        low + (t as f32) * (high - low)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Spacing between ticks, if there are at least two.
    pub fn tick_step(&self) -> Option<f64> {
        match self.ticks.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }
}

/// Build a linear scale. A reversed domain is swapped, an empty one
/// (`min == max`) is widened to `min + 1`. With `nice_ticks` the domain is
/// expanded outward to whole 1/2/5 × 10^n steps before anything is mapped.
pub fn make_linear_scale(
    domain_min: f64,
    domain_max: f64,
    range_low: f32,
    range_high: f32,
    nice_ticks: bool,
) -> Scale {
    Scale::Linear(linear_scale(
        domain_min, domain_max, range_low, range_high, nice_ticks,
    ))
}

pub fn linear_scale(
    domain_min: f64,
    domain_max: f64,
    range_low: f32,
    range_high: f32,
    nice_ticks: bool,
) -> LinearScale {
    if !domain_min.is_finite() || !domain_max.is_finite() {
        return LinearScale::constant(range_low, range_high);
    }
    let (mut min, mut max) = if domain_min <= domain_max {
        (domain_min, domain_max)
    } else {
        (domain_max, domain_min)
    };
    if max == min {
        max = min + 1.0;
    }

    let step = nice_step((max - min) / TARGET_TICK_COUNT as f64);
    if nice_ticks {
        min = (min / step).floor() * step;
        max = (max / step).ceil() * step;
    }
    let ticks = ticks_within(min, max, step);

    LinearScale {
        domain: (min, max),
        range: (range_low, range_high),
        ticks,
        constant: false,
    }
}

/// Linear scale over a set of values. Empty input gives a constant scale.
/// With `include_zero` the domain always reaches the zero baseline.
pub fn linear_scale_for(
    values: &[f64],
    include_zero: bool,
    range_low: f32,
    range_high: f32,
    nice_ticks: bool,
) -> LinearScale {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return LinearScale::constant(range_low, range_high);
    }
    let (min, max) = if include_zero {
        (min.min(0.0), max.max(0.0))
    } else {
        (min, max)
    };
    linear_scale(min, max, range_low, range_high, nice_ticks)
}

/// Smallest of 1, 2, 5, 10 × 10^n that is at least `raw_step`.
pub fn nice_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn ticks_within(min: f64, max: f64, step: f64) -> Vec<f64> {
    let tolerance = step * 1e-6;
    let first = (min / step - 1e-9).ceil() * step;
    let mut ticks = Vec::new();
    let mut idx = 0usize;
    // Bounded so a pathological step can never spin.
    while idx <= TARGET_TICK_COUNT * 4 {
        let value = first + idx as f64 * step;
        if value > max + tolerance {
            break;
        }
        // Snap away float noise such as 0.30000000000000004.
        let snapped = (value / step).round() * step;
        ticks.push(if snapped.abs() < tolerance { 0.0 } else { snapped });
        idx += 1;
    }
    ticks
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub start: f32,
    pub width: f32,
}

impl Band {
    pub fn center(&self) -> f32 {
        self.start + self.width / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    categories: Vec<String>,
    range: (f32, f32),
    padding: f32,
}

/// Equal slots across the range, one per distinct category in input order.
/// Each slot loses `padding_fraction` of its width on both sides.
pub fn make_band_scale(
    categories: &[String],
    range_low: f32,
    range_high: f32,
    padding_fraction: f32,
) -> Scale {
    Scale::Band(band_scale(categories, range_low, range_high, padding_fraction))
}

pub fn band_scale(
    categories: &[String],
    range_low: f32,
    range_high: f32,
    padding_fraction: f32,
) -> BandScale {
    let padding = if padding_fraction.is_finite() {
        padding_fraction.clamp(0.0, 0.49)
    } else {
        0.0
    };
    BandScale {
        categories: distinct(categories),
        range: (range_low, range_high),
        padding,
    }
}

impl BandScale {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn slot_width(&self) -> f32 {
        let (low, high) = self.range;
        (high - low) / self.categories.len().max(1) as f32
    }

    /// Padded band for a category; unknown categories get a zero-width band at
    /// the range midpoint.
    pub fn band(&self, category: &str) -> Band {
        match self.categories.iter().position(|c| c == category) {
            Some(idx) => self.band_at(idx),
            None => self.midpoint_band(),
        }
    }

    pub fn band_at(&self, index: usize) -> Band {
        if index >= self.categories.len() {
            return self.midpoint_band();
        }
        let slot = self.slot_width();
        let slot_start = self.range.0 + index as f32 * slot;
        Band {
            start: slot_start + slot * self.padding,
            width: slot * (1.0 - 2.0 * self.padding),
        }
    }

    fn midpoint_band(&self) -> Band {
        Band {
            start: (self.range.0 + self.range.1) / 2.0,
            width: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    categories: Vec<String>,
    range: (f32, f32),
}

/// Evenly spaced coordinates: first category at `range_low`, last at
/// `range_high`, a lone category in the middle.
pub fn make_point_scale(categories: &[String], range_low: f32, range_high: f32) -> Scale {
    Scale::Point(point_scale(categories, range_low, range_high))
}

pub fn point_scale(categories: &[String], range_low: f32, range_high: f32) -> PointScale {
    PointScale {
        categories: distinct(categories),
        range: (range_low, range_high),
    }
}

impl PointScale {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn position(&self, category: &str) -> f32 {
        match self.categories.iter().position(|c| c == category) {
            Some(idx) => self.position_at(idx),
            None => (self.range.0 + self.range.1) / 2.0,
        }
    }

    pub fn position_at(&self, index: usize) -> f32 {
        let (low, high) = self.range;
        let count = self.categories.len();
        if count <= 1 || index >= count {
            return (low + high) / 2.0;
        }
        low + (high - low) * index as f32 / (count - 1) as f32
    }
}

fn distinct(categories: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(categories.len());
    for category in categories {
        if !seen.contains(category) {
            seen.push(category.clone());
        }
    }
    seen
}

/// Tick label with just enough decimals for the tick spacing.
pub fn format_tick(value: f64, step: Option<f64>) -> String {
    let decimals = match step {
        Some(step) if step > 0.0 && step < 1.0 => (-step.log10().floor()) as usize,
        _ => 0,
    };
    format!("{:.*}", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn linear_maps_domain_ends_to_range_ends() {
        for (min, max, low, high) in [
            (0.0, 10.0, 300.0, 20.0),
            (-5.0, 5.0, 0.0, 100.0),
            (2.5, 1000.0, 10.0, 590.0),
            (0.001, 0.002, 400.0, 0.0),
        ] {
            let scale = linear_scale(min, max, low, high, false);
            assert!((scale.map(min) - low).abs() < 1e-3, "{min}..{max}");
            assert!((scale.map(max) - high).abs() < 1e-3, "{min}..{max}");
        }
    }

    #[test]
    fn nice_domain_still_maps_ends_to_range() {
        let scale = linear_scale(0.0, 7.0, 300.0, 0.0, true);
        let (min, max) = scale.domain();
        assert_eq!(scale.map(min), 300.0);
        assert_eq!(scale.map(max), 0.0);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let scale = linear_scale(0.0, 0.0, 100.0, 0.0, false);
        assert_eq!(scale.domain(), (0.0, 1.0));
        assert!(scale.map(0.0).is_finite());
        let scale = linear_scale(5.0, 5.0, 0.0, 10.0, false);
        assert_eq!(scale.domain(), (5.0, 6.0));
    }

    #[test]
    fn reversed_domain_is_swapped() {
        let scale = linear_scale(10.0, 0.0, 0.0, 100.0, false);
        assert_eq!(scale.domain(), (0.0, 10.0));
    }

    #[test]
    fn nice_ticks_expand_upper_bound() {
        let scale = linear_scale(0.0, 7.0, 0.0, 100.0, true);
        let (min, max) = scale.domain();
        assert_eq!(min, 0.0);
        assert!(max >= 7.0);
        assert_eq!(scale.ticks(), &[0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(max, 8.0);
    }

    #[test]
    fn nice_step_uses_one_two_five() {
        for (raw, expected) in [(0.7, 1.0), (1.4, 2.0), (3.0, 5.0), (7.0, 10.0), (230.0, 500.0)] {
            assert!((nice_step(raw) - expected).abs() < 1e-9, "{raw}");
        }
    }

    #[test]
    fn empty_values_give_constant_scale() {
        let scale = linear_scale_for(&[], true, 0.0, 100.0, true);
        assert!(scale.is_constant());
        assert_eq!(scale.map(42.0), 50.0);
    }

    #[test]
    fn band_scale_pads_each_slot() {
        let scale = band_scale(&labels(&["A", "B", "C", "D"]), 0.0, 400.0, 0.1);
        let band = scale.band("B");
        assert!((band.start - 110.0).abs() < 1e-4);
        assert!((band.width - 80.0).abs() < 1e-4);
        let a = scale.band("A");
        assert!(a.start + a.width <= band.start);
    }

    #[test]
    fn band_scale_keeps_input_order() {
        let scale = band_scale(&labels(&["zeta", "alpha"]), 0.0, 100.0, 0.0);
        assert_eq!(scale.band("zeta").start, 0.0);
        assert_eq!(scale.band("alpha").start, 50.0);
    }

    #[test]
    fn band_scale_handles_empty_and_unknown() {
        let scale = band_scale(&[], 0.0, 100.0, 0.1);
        assert_eq!(scale.band("x"), Band { start: 50.0, width: 0.0 });
    }

    #[test]
    fn point_scale_spans_range() {
        let scale = point_scale(&labels(&["a", "b", "c"]), 10.0, 110.0);
        assert_eq!(scale.position("a"), 10.0);
        assert_eq!(scale.position("b"), 60.0);
        assert_eq!(scale.position("c"), 110.0);
        let single = point_scale(&labels(&["only"]), 0.0, 100.0);
        assert_eq!(single.position("only"), 50.0);
    }

    #[test]
    fn formats_ticks_by_step() {
        assert_eq!(format_tick(2.0, Some(2.0)), "2");
        assert_eq!(format_tick(0.2, Some(0.2)), "0.2");
        assert_eq!(format_tick(0.05, Some(0.05)), "0.05");
    }

    #[test]
    fn constructors_wrap_each_scale_kind() {
        let linear = make_linear_scale(3.0, 3.0, 200.0, 0.0, false);
        let inner = linear.as_linear().unwrap();
        assert_eq!(inner.domain(), (3.0, 4.0));
        assert_eq!(inner.map(3.0), 200.0);
        assert_eq!(inner.map(4.0), 0.0);
        assert_eq!(linear.range(), (200.0, 0.0));
        assert!(linear.as_band().is_none() && linear.as_point().is_none());

        let ends = make_linear_scale(-4.0, 12.0, 0.0, 320.0, false);
        let inner = ends.as_linear().unwrap();
        assert!((inner.map(-4.0) - 0.0).abs() < 1e-3);
        assert!((inner.map(12.0) - 320.0).abs() < 1e-3);

        let bands = make_band_scale(&[], 20.0, 220.0, 0.2);
        let band = bands.as_band().unwrap().band_at(0);
        assert_eq!(band, Band { start: 120.0, width: 0.0 });
        assert!(bands.as_linear().is_none());

        let points = make_point_scale(&labels(&["a", "b", "a"]), 0.0, 90.0);
        let inner = points.as_point().unwrap();
        assert_eq!(inner.categories().len(), 2);
        assert_eq!(inner.position("a"), 0.0);
        assert_eq!(inner.position("b"), 90.0);
        let empty = make_point_scale(&[], 0.0, 90.0);
        assert_eq!(empty.as_point().unwrap().position("missing"), 45.0);
        assert_eq!(empty.range(), (0.0, 90.0));
    }
}
