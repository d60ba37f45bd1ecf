mod bar;
mod empty;
mod line;
mod palette;
pub mod path;
mod pie;
pub(crate) mod text;
pub(crate) mod types;
pub use types::*;

use bar::compute_bar_layout;
use empty::compute_empty_layout;
use line::compute_line_layout;
use pie::compute_pie_layout;
use text::{text_width, truncate_to_width};

use crate::config::LayoutConfig;
use crate::ir::{ChartKind, ChartSpec, StyleOptions};
use crate::scale::{LinearScale, format_tick};
use crate::theme::Theme;
use tracing::debug;

/// Legend labels longer than this share of the chart width are truncated.
const LEGEND_MAX_WIDTH_SHARE: f32 = 0.3;

/// Drawing area after the title has been placed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    pub width: f32,
    pub height: f32,
    /// First pixel row below the title.
    pub top: f32,
}

/// Turn a chart spec into paintable geometry at its final (post-animation)
/// state. Never fails: anything without drawable data becomes an empty-state
/// layout.
pub fn compute_layout(spec: &ChartSpec, theme: &Theme, config: &LayoutConfig) -> Layout {
    let style = spec.style.sanitized(&theme.palette);
    let title = spec
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(|text| TitleLayout {
            x: style.width / 2.0,
            y: config.axis.margin_top + theme.title_font_size * 0.8,
            text: text.to_string(),
        });
    let canvas = Canvas {
        width: style.width,
        height: style.height,
        top: config.axis.margin_top
            + if title.is_some() {
                config.axis.title_height
            } else {
                0.0
            },
    };

    let geometry = if spec.has_no_data() {
        None
    } else {
        match spec.kind {
            ChartKind::Bar => Some(compute_bar_layout(spec, &style, canvas, theme, config)),
            ChartKind::Line => Some(compute_line_layout(spec, &style, canvas, theme, config)),
            ChartKind::Pie | ChartKind::Donut => {
                compute_pie_layout(spec, &style, canvas, theme, config)
            }
        }
    };

    let data = match geometry {
        Some(geometry) => {
            debug!(
                kind = spec.kind.as_str(),
                shapes = geometry.shapes.len(),
                "computed chart layout"
            );
            LayoutData::Chart(geometry)
        }
        None => {
            debug!(kind = spec.kind.as_str(), "no drawable data, using empty layout");
            LayoutData::Empty(compute_empty_layout(canvas, config))
        }
    };

    Layout {
        kind: spec.kind,
        width: style.width,
        height: style.height,
        title,
        data,
    }
}

/// Width reserved at the right edge for the legend column, including the
/// gap to the plot. Zero when the legend is hidden.
pub(crate) fn legend_width(
    labels: &[String],
    style: &StyleOptions,
    theme: &Theme,
    config: &LayoutConfig,
) -> f32 {
    if !style.show_legend || labels.is_empty() {
        return 0.0;
    }
    let max_text = style.width * LEGEND_MAX_WIDTH_SHARE;
    let text = labels
        .iter()
        .map(|label| {
            text_width(
                label,
                theme.font_size,
                &theme.font_family,
                config.fast_text_metrics,
            )
            .min(max_text)
        })
        .fold(0.0_f32, f32::max);
    config.legend.gap + config.legend.swatch_size + config.legend.spacing + text
}

/// Stack legend rows starting at `x`, vertically centred on `center_y`.
pub(crate) fn place_legend(
    entries: &[(String, String)],
    x: f32,
    center_y: f32,
    style: &StyleOptions,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<LegendItem> {
    if !style.show_legend {
        return Vec::new();
    }
    let row = config.legend.swatch_size + config.legend.spacing;
    let offset = row * entries.len() as f32 / 2.0;
    let max_text = style.width * LEGEND_MAX_WIDTH_SHARE;
    entries
        .iter()
        .enumerate()
        .map(|(idx, (label, color))| LegendItem {
            x,
            y: center_y - offset + idx as f32 * row,
            label: truncate_to_width(
                label,
                max_text,
                theme.font_size,
                &theme.font_family,
                config.fast_text_metrics,
            ),
            color: color.clone(),
            swatch_size: config.legend.swatch_size,
        })
        .collect()
}

/// Tick labels for the value axis.
pub(crate) fn value_ticks(scale: &LinearScale, style: &StyleOptions) -> Vec<AxisTick> {
    let step = scale.tick_step();
    scale
        .ticks()
        .iter()
        .map(|value| AxisTick {
            text: format!(
                "{}{}{}",
                style.value_prefix,
                format_tick(*value, step),
                style.value_suffix
            ),
            value: *value,
            y: scale.map(*value),
        })
        .collect()
}

/// Category labels under the plot, truncated to their slot.
pub(crate) fn category_labels(
    labels: &[(String, f32)],
    slot_width: f32,
    baseline_y: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<AxisLabel> {
    let y = baseline_y + config.axis.tick_size + theme.font_size + 2.0;
    labels
        .iter()
        .map(|(label, x)| AxisLabel {
            text: truncate_to_width(
                label,
                slot_width.max(theme.font_size),
                theme.font_size,
                &theme.font_family,
                config.fast_text_metrics,
            ),
            x: *x,
            y,
        })
        .collect()
}

/// Plot rectangle for bar and line charts.
pub(crate) fn axis_plot(canvas: Canvas, legend: f32, config: &LayoutConfig) -> Rect {
    let x = config.axis.margin_left;
    let right = (canvas.width - config.axis.margin_right - legend).max(x + 1.0);
    let bottom = (canvas.height - config.axis.margin_bottom).max(canvas.top + 1.0);
    Rect {
        x,
        y: canvas.top,
        width: right - x,
        height: bottom - canvas.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ChartValues, Series};
    use std::f32::consts::{PI, TAU};

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn layout_of(spec: &ChartSpec) -> Layout {
        compute_layout(spec, &Theme::modern(), &LayoutConfig::default())
    }

    fn arcs(layout: &Layout) -> Vec<&ArcShape> {
        layout.shapes().iter().filter_map(|s| s.as_arc()).collect()
    }

    #[test]
    fn tallest_bar_is_the_largest_value() {
        let spec = ChartSpec::bar(vec![3.0, 7.0, 2.0], labels(&["A", "B", "C"]));
        let layout = layout_of(&spec);
        let bars: Vec<&BarShape> = layout.shapes().iter().filter_map(|s| s.as_bar()).collect();
        assert_eq!(bars.len(), 3);
        let tallest = bars
            .iter()
            .max_by(|a, b| a.height.total_cmp(&b.height))
            .unwrap();
        assert_eq!(tallest.label, "B");
        let scale = layout.geometry().unwrap().value_scale.as_ref().unwrap();
        assert!(scale.domain().1 >= 7.0);
        for bar in &bars {
            assert!((bar.y + bar.height - bar.baseline).abs() < 1e-3);
        }
    }

    #[test]
    fn negative_bars_collapse_onto_the_baseline() {
        let spec = ChartSpec::bar(vec![4.0, -2.0], labels(&["up", "down"]));
        let layout = layout_of(&spec);
        let down = layout.shapes()[1].as_bar().unwrap();
        assert_eq!(down.height, 0.0);
        assert_eq!(down.y, down.baseline);
    }

    #[test]
    fn extra_values_and_labels_are_ignored() {
        let spec = ChartSpec::bar(vec![1.0, 2.0, 3.0], labels(&["A", "B"]));
        assert_eq!(layout_of(&spec).shapes().len(), 2);
        let spec = ChartSpec::bar(vec![1.0], labels(&["A", "B"]));
        assert_eq!(layout_of(&spec).shapes().len(), 1);
    }

    #[test]
    fn grouped_bars_share_a_slot_without_overlap() {
        let spec = ChartSpec::new(
            ChartKind::Bar,
            ChartValues::Series(vec![
                Series::new("cash", vec![1.0, 2.0]),
                Series::new("goods", vec![3.0, 4.0]),
            ]),
            labels(&["Jan", "Feb"]),
        );
        let layout = layout_of(&spec);
        let bars: Vec<&BarShape> = layout.shapes().iter().filter_map(|s| s.as_bar()).collect();
        assert_eq!(bars.len(), 4);
        let jan: Vec<&&BarShape> = bars.iter().filter(|b| b.label == "Jan").collect();
        assert!(jan[0].x + jan[0].width <= jan[1].x + 1e-3);
        assert_ne!(jan[0].fill, jan[1].fill);
        assert_eq!(layout.geometry().unwrap().legend.len(), 2);
    }

    #[test]
    fn slice_angles_cover_the_full_turn_in_descending_order() {
        let spec = ChartSpec::pie(vec![
            ("food".into(), 20.0),
            ("water".into(), 45.0),
            ("blankets".into(), 20.0),
            ("medicine".into(), 15.0),
        ]);
        let layout = layout_of(&spec);
        let slices = arcs(&layout);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].start_angle, 0.0);
        assert_eq!(slices.last().unwrap().end_angle, TAU);
        let total: f32 = slices.iter().map(|s| s.span()).sum();
        assert!((total - TAU).abs() < 1e-4);
        for pair in slices.windows(2) {
            assert!(pair[0].value >= pair[1].value);
            assert_eq!(pair[0].end_angle, pair[1].start_angle);
        }
        // Equal values keep input order.
        assert_eq!(slices[1].label, "food");
        assert_eq!(slices[2].label, "blankets");
        assert_eq!(slices[0].inner_radius, 0.0);
    }

    #[test]
    fn even_donut_splits_in_half() {
        let spec = ChartSpec::donut(vec![("a".into(), 50.0), ("b".into(), 50.0)]);
        let layout = layout_of(&spec);
        let slices = arcs(&layout);
        assert_eq!(slices.len(), 2);
        for slice in &slices {
            assert!((slice.span() - PI).abs() < 1e-4);
            assert_eq!(slice.text.as_deref(), Some("50.0%"));
            assert!((slice.inner_radius - slice.outer_radius * 0.6).abs() < 1e-4);
        }
    }

    #[test]
    fn thin_slices_lose_their_label() {
        let spec = ChartSpec::donut(vec![("a".into(), 96.0), ("b".into(), 4.0)]);
        let layout = layout_of(&spec);
        let slices = arcs(&layout);
        let a = slices.iter().find(|s| s.label == "a").unwrap();
        let b = slices.iter().find(|s| s.label == "b").unwrap();
        assert!(b.span() > 0.0);
        assert!(b.text.is_none());
        assert_eq!(a.text.as_deref(), Some("96.0%"));
    }

    #[test]
    fn zero_total_is_an_empty_layout() {
        let spec = ChartSpec::pie(vec![("a".into(), 0.0), ("b".into(), -3.0)]);
        let layout = layout_of(&spec);
        assert!(layout.is_empty());
        assert!(layout.shapes().is_empty());
        let LayoutData::Empty(empty) = &layout.data else {
            panic!("expected empty layout");
        };
        assert!(empty.x.is_finite() && empty.y.is_finite());
        assert_eq!(empty.message, "No data to display");
    }

    #[test]
    fn missing_labels_are_an_empty_layout() {
        let spec = ChartSpec::line(Vec::new(), vec![Series::new("s", vec![1.0, 2.0])]);
        assert!(layout_of(&spec).is_empty());
        let spec = ChartSpec::bar(Vec::new(), labels(&["A"]));
        assert!(layout_of(&spec).is_empty());
    }

    #[test]
    fn pie_colours_follow_input_order() {
        let before = ChartSpec::pie(vec![("a".into(), 1.0), ("b".into(), 9.0)]);
        let after = ChartSpec::pie(vec![("a".into(), 9.0), ("b".into(), 1.0)]);
        let first = layout_of(&before);
        let second = layout_of(&after);
        assert_eq!(first.color_of("a"), second.color_of("a"));
        assert_eq!(first.color_of("b"), second.color_of("b"));
        assert_ne!(first.color_of("a"), first.color_of("b"));
    }

    #[test]
    fn same_spec_gives_same_colours() {
        let spec = ChartSpec::bar(vec![1.0, 2.0, 3.0], labels(&["x", "y", "z"]));
        let a = layout_of(&spec);
        let b = layout_of(&spec);
        assert_eq!(
            a.geometry().unwrap().colors,
            b.geometry().unwrap().colors
        );
    }

    #[test]
    fn line_markers_carry_exact_values() {
        let spec = ChartSpec::line(
            labels(&["Mon", "Tue", "Wed"]),
            vec![Series::new("donations", vec![5.5, 2.0, 9.25])],
        );
        let layout = layout_of(&spec);
        let line = layout.shapes()[0].as_line().unwrap();
        assert_eq!(line.points.len(), 3);
        assert_eq!(line.reveal, 1.0);
        let values: Vec<f64> = layout
            .shapes()
            .iter()
            .filter_map(|s| s.as_marker())
            .map(|m| m.value)
            .collect();
        assert_eq!(values, vec![5.5, 2.0, 9.25]);
    }

    #[test]
    fn title_pushes_the_plot_down() {
        let spec = ChartSpec::bar(vec![1.0], labels(&["A"]));
        let plain = layout_of(&spec);
        let titled = layout_of(&spec.clone().with_title("Totals"));
        assert!(titled.title.is_some());
        assert!(titled.geometry().unwrap().plot.y > plain.geometry().unwrap().plot.y);
    }

    #[test]
    fn hidden_legend_reserves_no_space() {
        let mut spec = ChartSpec::bar(vec![1.0, 2.0], labels(&["A", "B"]));
        let with_legend = layout_of(&spec);
        spec.style.show_legend = false;
        let without = layout_of(&spec);
        assert!(without.geometry().unwrap().legend.is_empty());
        assert!(without.geometry().unwrap().plot.width > with_legend.geometry().unwrap().plot.width);
    }

    #[test]
    fn non_finite_values_draw_nothing() {
        let bars = layout_of(&ChartSpec::bar(
            vec![3.0, f64::NAN, 2.0],
            labels(&["A", "B", "C"]),
        ));
        let drawn: Vec<&str> = bars
            .shapes()
            .iter()
            .filter_map(|s| s.as_bar())
            .map(|bar| bar.label.as_str())
            .collect();
        assert_eq!(drawn, vec!["A", "C"]);
        let scale = bars.geometry().unwrap().value_scale.as_ref().unwrap();
        assert!(scale.domain().1 >= 3.0 && scale.domain().1.is_finite());

        let line = layout_of(&ChartSpec::line(
            labels(&["a", "b", "c"]),
            vec![Series::new("s", vec![1.0, f64::INFINITY, 2.0])],
        ));
        let markers: Vec<_> = line.shapes().iter().filter_map(|s| s.as_marker()).collect();
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.cy.is_finite()));
        assert_eq!(line.shapes()[0].as_line().unwrap().points.len(), 2);

        let pie = layout_of(&ChartSpec::pie(vec![
            ("a".into(), 1.0),
            ("b".into(), f64::INFINITY),
            ("c".into(), 3.0),
        ]));
        let slices = arcs(&pie);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].text.as_deref(), Some("75.0%"));
    }
}
