use crate::config::LayoutConfig;
use crate::ir::{ChartSpec, StyleOptions};
use crate::scale::{band_scale, linear_scale_for};
use crate::theme::Theme;

use super::palette::ColorAssigner;
use super::{
    AxesLayout, BarShape, Canvas, ChartGeometry, ShapeDescriptor, axis_plot, category_labels,
    legend_width, place_legend, value_ticks,
};

/// Vertical bars, one slot per label. A single series colours each category;
/// several series are grouped side by side inside the slot and coloured per
/// series.
pub(super) fn compute_bar_layout(
    spec: &ChartSpec,
    style: &StyleOptions,
    canvas: Canvas,
    theme: &Theme,
    config: &LayoutConfig,
) -> ChartGeometry {
    let bar_cfg = &config.bar;
    let (labels, series) = spec.axis_data();
    let grouped = series.len() > 1;

    let mut colors = ColorAssigner::new(&style.color_palette);
    if grouped {
        for s in &series {
            colors.resolve(&s.name);
        }
    } else {
        for label in &labels {
            colors.resolve(label);
        }
    }
    let colors = colors.into_pairs();
    let legend_w = legend_width(
        &colors.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(),
        style,
        theme,
        config,
    );
    let plot = axis_plot(canvas, legend_w, config);

    let visible: Vec<f64> = series
        .iter()
        .flat_map(|s| s.values.iter().take(labels.len()).copied())
        .filter(|value| value.is_finite())
        .collect();
    let value_scale = linear_scale_for(&visible, true, plot.bottom(), plot.y, true);
    let baseline = value_scale.map(0.0);
    let bands = band_scale(&labels, plot.x, plot.right(), bar_cfg.band_padding);

    let group_count = series.len().max(1) as f32;
    let mut shapes = Vec::new();
    for (series_idx, s) in series.iter().enumerate() {
        for (idx, (label, value)) in labels.iter().zip(s.values.iter()).enumerate() {
            // Non-finite values have no bar.
            if !value.is_finite() {
                continue;
            }
            let band = bands.band(label);
            let sub = band.width / group_count;
            let inset = sub * bar_cfg.group_padding.clamp(0.0, 0.9) / 2.0;
            let x = band.start + series_idx as f32 * sub + inset;
            let top = value_scale.map(*value).min(baseline);
            let fill_key = if grouped { &s.name } else { label };
            let fill = colors
                .iter()
                .find(|(key, _)| key == fill_key)
                .map(|(_, color)| color.clone())
                .unwrap_or_default();
            shapes.push(ShapeDescriptor::Bar(BarShape {
                index: idx,
                label: label.clone(),
                series: s.name.clone(),
                value: *value,
                x,
                y: top,
                width: (sub - inset * 2.0).max(0.0),
                height: baseline - top,
                baseline,
                fill,
                corner_radius: bar_cfg.corner_radius,
            }));
        }
    }

    let positions: Vec<(String, f32)> = bands
        .categories()
        .iter()
        .map(|label| (label.clone(), bands.band(label).center()))
        .collect();
    let axes = AxesLayout {
        x_labels: category_labels(&positions, bands.slot_width(), plot.bottom(), theme, config),
        y_ticks: value_ticks(&value_scale, style),
        baseline_y: baseline,
        tick_size: config.axis.tick_size,
        show_grid: style.show_grid,
    };
    let legend = place_legend(
        &colors,
        plot.right() + config.legend.gap,
        plot.y + plot.height / 2.0,
        style,
        theme,
        config,
    );

    ChartGeometry {
        plot,
        shapes,
        axes: Some(axes),
        legend,
        colors,
        value_scale: Some(value_scale),
        value_prefix: style.value_prefix.clone(),
        value_suffix: style.value_suffix.clone(),
    }
}
