use crate::config::LayoutConfig;
use crate::ir::{ChartSpec, StyleOptions};
use crate::scale::{linear_scale_for, point_scale};
use crate::theme::Theme;

use super::palette::ColorAssigner;
use super::path::{area_path, cardinal_path};
use super::{
    AxesLayout, Canvas, ChartGeometry, LineShape, MarkerShape, Rect, ShapeDescriptor, axis_plot,
    category_labels, legend_width, place_legend, value_ticks,
};

/// One smoothed path per series plus a marker on every data point. Lines come
/// first in the shape list so markers paint on top of them.
pub(super) fn compute_line_layout(
    spec: &ChartSpec,
    style: &StyleOptions,
    canvas: Canvas,
    theme: &Theme,
    config: &LayoutConfig,
) -> ChartGeometry {
    let line_cfg = &config.line;
    let (labels, series) = spec.axis_data();

    let mut colors = ColorAssigner::new(&style.color_palette);
    for s in &series {
        colors.resolve(&s.name);
    }
    let colors = colors.into_pairs();
    let legend_w = if series.len() > 1 {
        legend_width(
            &series.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
            style,
            theme,
            config,
        )
    } else {
        0.0
    };
    let plot = axis_plot(canvas, legend_w, config);

    let visible: Vec<f64> = series
        .iter()
        .flat_map(|s| s.values.iter().take(labels.len()).copied())
        .filter(|value| value.is_finite())
        .collect();
    let value_scale = linear_scale_for(&visible, true, plot.bottom(), plot.y, true);
    let baseline = value_scale.map(0.0);
    let points_scale = point_scale(&labels, plot.x, plot.right());
    let clip = Rect {
        x: plot.x - line_cfg.marker_radius,
        y: plot.y - line_cfg.marker_radius,
        width: plot.width + line_cfg.marker_radius * 2.0,
        height: plot.height + line_cfg.marker_radius * 2.0,
    };

    let mut lines = Vec::new();
    let mut markers = Vec::new();
    for s in &series {
        let stroke = colors
            .iter()
            .find(|(key, _)| key == &s.name)
            .map(|(_, color)| color.clone())
            .unwrap_or_default();
        let mut points = Vec::new();
        for (idx, (label, value)) in labels.iter().zip(s.values.iter()).enumerate() {
            if !value.is_finite() {
                continue;
            }
            let point = (points_scale.position(label), value_scale.map(*value));
            points.push(point);
            markers.push(ShapeDescriptor::PointMarker(MarkerShape {
                index: idx,
                series: s.name.clone(),
                label: label.clone(),
                value: *value,
                cx: point.0,
                cy: point.1,
                radius: line_cfg.marker_radius,
                fill: stroke.clone(),
                stroke: theme.background.clone(),
            }));
        }
        if points.is_empty() {
            continue;
        }
        let path = cardinal_path(&points, line_cfg.tension);
        let area = if style.show_area {
            area_path(&path, &points, baseline)
        } else {
            None
        };
        lines.push(ShapeDescriptor::LineSegmentSet(LineShape {
            series: s.name.clone(),
            points,
            path,
            area_path: area,
            stroke,
            stroke_width: line_cfg.stroke_width,
            area_opacity: line_cfg.area_opacity,
            reveal: 1.0,
            clip,
        }));
    }
    lines.extend(markers);

    let positions: Vec<(String, f32)> = points_scale
        .categories()
        .iter()
        .map(|label| (label.clone(), points_scale.position(label)))
        .collect();
    let slot = plot.width / positions.len().max(1) as f32;
    let axes = AxesLayout {
        x_labels: category_labels(&positions, slot, plot.bottom(), theme, config),
        y_ticks: value_ticks(&value_scale, style),
        baseline_y: baseline,
        tick_size: config.axis.tick_size,
        show_grid: style.show_grid,
    };
    let legend = if series.len() > 1 {
        place_legend(
            &colors,
            plot.right() + config.legend.gap,
            plot.y + plot.height / 2.0,
            style,
            theme,
            config,
        )
    } else {
        Vec::new()
    };

    ChartGeometry {
        plot,
        shapes: lines,
        axes: Some(axes),
        legend,
        colors,
        value_scale: Some(value_scale),
        value_prefix: style.value_prefix.clone(),
        value_suffix: style.value_suffix.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ChartSpec, Series};
    use crate::layout::compute_layout;

    #[test]
    fn area_is_closed_to_the_baseline() {
        let mut spec = ChartSpec::line(
            vec!["a".into(), "b".into()],
            vec![Series::new("s", vec![1.0, 3.0])],
        );
        spec.style.show_area = true;
        let layout = compute_layout(&spec, &Theme::modern(), &LayoutConfig::default());
        let line = layout.shapes()[0].as_line().unwrap();
        let area = line.area_path.as_deref().unwrap();
        assert!(area.starts_with(&line.path));
        assert!(area.ends_with('Z'));
    }

    #[test]
    fn single_series_has_no_legend() {
        let spec = ChartSpec::line(
            vec!["a".into(), "b".into()],
            vec![Series::new("s", vec![1.0, 3.0])],
        );
        let layout = compute_layout(&spec, &Theme::modern(), &LayoutConfig::default());
        assert!(layout.geometry().unwrap().legend.is_empty());
    }
}
