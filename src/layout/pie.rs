use std::cmp::Ordering;
use std::f32::consts::TAU;

use crate::config::LayoutConfig;
use crate::ir::{ChartKind, ChartSpec, StyleOptions};
use crate::theme::Theme;

use super::palette::ColorAssigner;
use super::path::polar;
use super::{ArcShape, Canvas, ChartGeometry, Rect, ShapeDescriptor, legend_width, place_legend};

struct PieDatum {
    index: usize,
    label: String,
    value: f64,
}

/// Pie and donut partitions. Returns `None` when nothing is positive, which
/// the caller turns into the empty state.
pub(super) fn compute_pie_layout(
    spec: &ChartSpec,
    style: &StyleOptions,
    canvas: Canvas,
    theme: &Theme,
    config: &LayoutConfig,
) -> Option<ChartGeometry> {
    let pie_cfg = &config.pie;
    let categories = spec.categories();
    let total: f64 = categories
        .iter()
        .map(|(_, value)| value.max(0.0))
        .filter(|value| value.is_finite())
        .sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    // Colours follow input order so reordering by value never repaints.
    let mut colors = ColorAssigner::new(&style.color_palette);
    for (label, _) in &categories {
        colors.resolve(label);
    }
    let colors = colors.into_pairs();

    let mut data: Vec<PieDatum> = categories
        .iter()
        .enumerate()
        .filter(|(_, (_, value))| value.is_finite() && *value > 0.0)
        .map(|(index, (label, value))| PieDatum {
            index,
            label: label.clone(),
            value: *value,
        })
        .collect();
    data.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    let legend_w = legend_width(
        &colors.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(),
        style,
        theme,
        config,
    );
    let area_width = (canvas.width - legend_w).max(1.0);
    let area_height = (canvas.height - canvas.top).max(1.0);
    let outer = (area_width.min(area_height) / 2.0 - pie_cfg.margin).max(1.0);
    let center = (area_width / 2.0, canvas.top + area_height / 2.0);
    let inner = if spec.kind == ChartKind::Donut {
        outer * pie_cfg.donut_ratio.clamp(0.0, 0.95)
    } else {
        0.0
    };
    let label_radius = if inner > 0.0 {
        (inner + outer) / 2.0
    } else {
        outer * pie_cfg.pie_label_radius
    };

    let mut shapes = Vec::with_capacity(data.len());
    let mut angle = 0.0_f32;
    let last = data.len().saturating_sub(1);
    for (pos, datum) in data.iter().enumerate() {
        let share = datum.value / total;
        let end = if pos == last {
            TAU
        } else {
            angle + (share as f32) * TAU
        };
        let fill = colors
            .iter()
            .find(|(key, _)| key == &datum.label)
            .map(|(_, color)| color.clone())
            .unwrap_or_default();
        let text = (share > pie_cfg.label_min_share).then(|| format!("{:.1}%", share * 100.0));
        shapes.push(ShapeDescriptor::ArcSlice(ArcShape {
            index: datum.index,
            label: datum.label.clone(),
            value: datum.value,
            share,
            start_angle: angle,
            end_angle: end,
            inner_radius: inner,
            outer_radius: outer,
            center,
            fill,
            stroke: theme.slice_stroke.clone(),
            stroke_width: pie_cfg.stroke_width,
            text,
            text_position: polar(center, label_radius, (angle + end) / 2.0),
        }));
        angle = end;
    }

    let legend = place_legend(
        &colors,
        center.0 + outer + pie_cfg.margin + config.legend.gap,
        center.1,
        style,
        theme,
        config,
    );

    Some(ChartGeometry {
        plot: Rect {
            x: center.0 - outer,
            y: center.1 - outer,
            width: outer * 2.0,
            height: outer * 2.0,
        },
        shapes,
        axes: None,
        legend,
        colors,
        value_scale: None,
        value_prefix: style.value_prefix.clone(),
        value_suffix: style.value_suffix.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;

    #[test]
    fn single_category_is_a_full_ring() {
        let spec = ChartSpec::donut(vec![("only".into(), 12.0)]);
        let layout = compute_layout(&spec, &Theme::modern(), &LayoutConfig::default());
        let arc = layout.shapes()[0].as_arc().unwrap();
        assert_eq!(arc.start_angle, 0.0);
        assert_eq!(arc.end_angle, TAU);
        assert_eq!(arc.text.as_deref(), Some("100.0%"));
    }

    #[test]
    fn labels_sit_inside_the_slice() {
        let spec = ChartSpec::pie(vec![("a".into(), 3.0), ("b".into(), 1.0)]);
        let layout = compute_layout(&spec, &Theme::modern(), &LayoutConfig::default());
        for shape in layout.shapes() {
            let arc = shape.as_arc().unwrap();
            let dx = arc.text_position.0 - arc.center.0;
            let dy = arc.text_position.1 - arc.center.1;
            assert!((dx * dx + dy * dy).sqrt() < arc.outer_radius);
        }
    }

    #[test]
    fn legend_lists_every_category_in_input_order() {
        let spec = ChartSpec::pie(vec![
            ("z".into(), 1.0),
            ("y".into(), 0.0),
            ("x".into(), 5.0),
        ]);
        let layout = compute_layout(&spec, &Theme::modern(), &LayoutConfig::default());
        let legend: Vec<&str> = layout
            .geometry()
            .unwrap()
            .legend
            .iter()
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(legend, vec!["z", "y", "x"]);
        assert_eq!(layout.shapes().len(), 2);
    }
}
