use crate::animation::{ShapeProperty, Transition, TransitionValue};
use crate::config::Config;
use crate::layout::path::{arc_path, polar, sweep_path};
use crate::layout::{
    AxesLayout, ChartGeometry, EmptyLayout, Layout, LayoutData, LegendItem, ShapeDescriptor,
};
use crate::surface::Frame;
use crate::theme::{Theme, lighten_color};
use crate::tooltip::{TooltipState, tooltip_content};
use anyhow::Result;
use std::path::Path;

/// Static SVG of one frame, tooltip included when it is visible.
pub fn render_svg(frame: &Frame, theme: &Theme, config: &Config) -> String {
    let layout = &frame.layout;
    let mut svg = open_svg(layout, theme);
    match &layout.data {
        LayoutData::Empty(empty) => push_empty(&mut svg, empty, theme),
        LayoutData::Chart(geometry) => {
            push_axes(&mut svg, geometry, theme);
            for (idx, shape) in geometry.shapes.iter().enumerate() {
                let highlight = frame.highlight == Some(idx);
                push_shape(
                    &mut svg,
                    idx,
                    shape,
                    config,
                    &ShapeExtras {
                        highlight,
                        ..ShapeExtras::default()
                    },
                );
            }
            push_slice_labels(&mut svg, geometry, theme, config, true);
            push_legend(&mut svg, &geometry.legend, theme);
        }
    }
    if let Some(tooltip) = frame.tooltip.as_ref().filter(|t| t.visible) {
        push_tooltip(&mut svg, tooltip, theme, config);
    }
    svg.push_str("</svg>");
    svg
}

/// Self-contained SVG that replays `transitions` with SMIL animation and
/// carries a `<title>` tooltip on every hoverable shape.
pub fn render_animated_svg(
    layout: &Layout,
    transitions: &[Transition],
    show_tooltip: bool,
    theme: &Theme,
    config: &Config,
) -> String {
    let mut svg = open_svg(layout, theme);
    svg.push_str(&format!(
        "<style>.chart-shape:hover{{fill-opacity:0.8}}.slice-label{{animation:fade-in {:.0}ms ease-in forwards;opacity:0}}@keyframes fade-in{{to{{opacity:1}}}}</style>",
        transitions
            .iter()
            .map(Transition::end_ms)
            .fold(0.0_f64, f64::max)
            .max(1.0)
    ));
    match &layout.data {
        LayoutData::Empty(empty) => push_empty(&mut svg, empty, theme),
        LayoutData::Chart(geometry) => {
            push_axes(&mut svg, geometry, theme);
            for (idx, shape) in geometry.shapes.iter().enumerate() {
                let animations: Vec<&Transition> = transitions
                    .iter()
                    .filter(|t| t.target.shape == idx)
                    .collect();
                let title = if show_tooltip {
                    tooltip_content(shape, geometry)
                } else {
                    None
                };
                push_shape(
                    &mut svg,
                    idx,
                    shape,
                    config,
                    &ShapeExtras {
                        highlight: false,
                        animations,
                        title,
                    },
                );
            }
            push_slice_labels(&mut svg, geometry, theme, config, transitions.is_empty());
            push_legend(&mut svg, &geometry.legend, theme);
        }
    }
    svg.push_str("</svg>");
    svg
}

#[derive(Default)]
struct ShapeExtras<'a> {
    highlight: bool,
    animations: Vec<&'a Transition>,
    title: Option<String>,
}

fn open_svg(layout: &Layout, theme: &Theme) -> String {
    let width = layout.width;
    let height = layout.height;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" data-chart=\"{}\">",
        layout.kind.as_str()
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    if let Some(title) = &layout.title {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
            title.x,
            title.y,
            escape_xml(&theme.font_family),
            theme.title_font_size,
            theme.text_color,
            escape_xml(&title.text)
        ));
    }
    svg
}

fn push_empty(svg: &mut String, empty: &EmptyLayout, theme: &Theme) {
    svg.push_str(&format!(
        "<text class=\"empty-state\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        empty.x,
        empty.y,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.empty_text_color,
        escape_xml(&empty.message)
    ));
}

fn push_axes(svg: &mut String, geometry: &ChartGeometry, theme: &Theme) {
    let Some(axes) = &geometry.axes else {
        return;
    };
    let plot = geometry.plot;
    push_grid(svg, axes, plot.x, plot.right(), theme);
    for tick in &axes.y_ticks {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
            plot.x - axes.tick_size,
            tick.y,
            plot.x,
            tick.y,
            theme.axis_color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            plot.x - axes.tick_size - 3.0,
            tick.y,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&tick.text)
        ));
    }
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
        plot.x,
        plot.y,
        plot.x,
        plot.bottom(),
        theme.axis_color
    ));
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
        plot.x,
        axes.baseline_y,
        plot.right(),
        axes.baseline_y,
        theme.axis_color
    ));
    for label in &axes.x_labels {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            label.x,
            label.y,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&label.text)
        ));
    }
}

fn push_grid(svg: &mut String, axes: &AxesLayout, left: f32, right: f32, theme: &Theme) {
    if !axes.show_grid {
        return;
    }
    for tick in &axes.y_ticks {
        svg.push_str(&format!(
            "<line class=\"grid\" x1=\"{left:.2}\" y1=\"{:.2}\" x2=\"{right:.2}\" y2=\"{:.2}\" stroke=\"{}\"/>",
            tick.y, tick.y, theme.grid_color
        ));
    }
}

fn push_shape(
    svg: &mut String,
    idx: usize,
    shape: &ShapeDescriptor,
    config: &Config,
    extras: &ShapeExtras<'_>,
) {
    let fill = |color: &str| {
        if extras.highlight {
            lighten_color(color, config.tooltip.hover_lighten)
        } else {
            color.to_string()
        }
    };
    let title = extras
        .title
        .as_ref()
        .map(|t| format!("<title>{}</title>", escape_xml(t)))
        .unwrap_or_default();
    let find = |property: ShapeProperty| {
        extras
            .animations
            .iter()
            .find(|t| t.target.property == property)
            .copied()
    };
    let steps = config.animation.keyframe_steps;

    match shape {
        ShapeDescriptor::Bar(bar) => {
            let y_anim = find(ShapeProperty::Y);
            let h_anim = find(ShapeProperty::Height);
            let y = y_anim.map(|t| scalar(t.from)).unwrap_or(bar.y);
            let height = h_anim.map(|t| scalar(t.from)).unwrap_or(bar.height);
            let mut animate = String::new();
            for (attr, anim) in [("y", y_anim), ("height", h_anim)] {
                if let Some(anim) = anim {
                    let values = anim
                        .keyframes(steps)
                        .into_iter()
                        .map(|v| format!("{:.2}", scalar(v)))
                        .collect::<Vec<_>>()
                        .join(";");
                    animate.push_str(&smil(attr, &values, anim));
                }
            }
            svg.push_str(&format!(
                "<rect class=\"chart-shape bar\" data-index=\"{idx}\" x=\"{:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{height:.2}\" rx=\"{:.2}\" fill=\"{}\">{title}{animate}</rect>",
                bar.x,
                bar.width,
                bar.corner_radius.min(bar.width / 2.0),
                fill(&bar.fill)
            ));
        }
        ShapeDescriptor::ArcSlice(arc) => {
            let anim = find(ShapeProperty::Angles);
            let (start, end) = anim
                .map(|t| angles(t.from))
                .unwrap_or((arc.start_angle, arc.end_angle));
            // Animated slices use one path shape for every keyframe.
            let d = if anim.is_some() {
                sweep_path(arc.center, arc.inner_radius, arc.outer_radius, start, end)
            } else {
                slice_path(arc.center, arc.inner_radius, arc.outer_radius, start, end)
            };
            let animate = anim
                .map(|anim| {
                    let values = anim
                        .keyframes(steps)
                        .into_iter()
                        .map(|v| {
                            let (s, e) = angles(v);
                            sweep_path(arc.center, arc.inner_radius, arc.outer_radius, s, e)
                        })
                        .collect::<Vec<_>>()
                        .join(";");
                    smil("d", &values, anim)
                })
                .unwrap_or_default();
            svg.push_str(&format!(
                "<path class=\"chart-shape slice\" data-index=\"{idx}\" d=\"{d}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\">{title}{animate}</path>",
                fill(&arc.fill),
                arc.stroke,
                arc.stroke_width
            ));
        }
        ShapeDescriptor::LineSegmentSet(line) => {
            let anim = find(ShapeProperty::Reveal);
            let reveal = anim.map(|t| scalar(t.from)).unwrap_or(line.reveal);
            let clip_id = format!("line-clip-{idx}");
            let animate = anim
                .map(|anim| {
                    let values = anim
                        .keyframes(steps)
                        .into_iter()
                        .map(|v| format!("{:.2}", line.clip.width * scalar(v)))
                        .collect::<Vec<_>>()
                        .join(";");
                    smil("width", &values, anim)
                })
                .unwrap_or_default();
            svg.push_str(&format!(
                "<defs><clipPath id=\"{clip_id}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\">{animate}</rect></clipPath></defs>",
                line.clip.x,
                line.clip.y,
                line.clip.width * reveal.clamp(0.0, 1.0),
                line.clip.height
            ));
            svg.push_str(&format!("<g clip-path=\"url(#{clip_id})\">"));
            if let Some(area) = &line.area_path {
                svg.push_str(&format!(
                    "<path class=\"area\" d=\"{area}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"none\"/>",
                    line.stroke, line.area_opacity
                ));
            }
            svg.push_str(&format!(
                "<path class=\"line\" data-index=\"{idx}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"/>",
                line.path, line.stroke, line.stroke_width
            ));
            svg.push_str("</g>");
        }
        ShapeDescriptor::PointMarker(marker) => {
            let anim = find(ShapeProperty::Radius);
            let radius = anim.map(|t| scalar(t.from)).unwrap_or(marker.radius);
            if anim.is_none() && radius <= 0.0 {
                return;
            }
            let animate = anim
                .map(|anim| {
                    let values = anim
                        .keyframes(steps)
                        .into_iter()
                        .map(|v| format!("{:.2}", scalar(v)))
                        .collect::<Vec<_>>()
                        .join(";");
                    smil("r", &values, anim)
                })
                .unwrap_or_default();
            svg.push_str(&format!(
                "<circle class=\"chart-shape marker\" data-index=\"{idx}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\">{title}{animate}</circle>",
                marker.cx,
                marker.cy,
                fill(&marker.fill),
                marker.stroke
            ));
        }
    }
}

fn push_slice_labels(
    svg: &mut String,
    geometry: &ChartGeometry,
    theme: &Theme,
    config: &Config,
    settled: bool,
) {
    let class = if settled {
        "slice-text"
    } else {
        "slice-text slice-label"
    };
    for shape in &geometry.shapes {
        let Some(arc) = shape.as_arc() else {
            continue;
        };
        let Some(text) = &arc.text else {
            continue;
        };
        if arc.span() <= 0.0 {
            continue;
        }
        // Labels follow the arc while it sweeps open.
        let radius = {
            let dx = arc.text_position.0 - arc.center.0;
            let dy = arc.text_position.1 - arc.center.1;
            (dx * dx + dy * dy).sqrt()
        };
        let (x, y) = polar(arc.center, radius, (arc.start_angle + arc.end_angle) / 2.0);
        svg.push_str(&format!(
            "<text class=\"{class}\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            config.layout.pie.label_font_size,
            theme.slice_text_color,
            escape_xml(text)
        ));
    }
}

fn push_legend(svg: &mut String, legend: &[LegendItem], theme: &Theme) {
    for item in legend {
        svg.push_str(&format!(
            "<rect class=\"legend-swatch\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"{}\"/>",
            item.x, item.y, item.swatch_size, item.swatch_size, item.color
        ));
        svg.push_str(&format!(
            "<text class=\"legend-label\" x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            item.x + item.swatch_size + 6.0,
            item.y + item.swatch_size / 2.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&item.label)
        ));
    }
}

fn push_tooltip(svg: &mut String, tooltip: &TooltipState, theme: &Theme, config: &Config) {
    let cfg = &config.tooltip;
    let (x, y) = tooltip.anchor;
    let (width, height) = tooltip.size;
    svg.push_str(&format!(
        "<g class=\"tooltip\" pointer-events=\"none\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
        cfg.corner_radius, theme.tooltip_background, theme.tooltip_border
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
        x + cfg.padding,
        y + height / 2.0,
        escape_xml(&theme.font_family),
        cfg.font_size,
        theme.tooltip_text_color,
        escape_xml(&tooltip.content)
    ));
}

fn smil(attribute: &str, values: &str, transition: &Transition) -> String {
    format!(
        "<animate attributeName=\"{attribute}\" values=\"{values}\" begin=\"{:.0}ms\" dur=\"{:.0}ms\" fill=\"freeze\"/>",
        transition.delay_ms,
        transition.duration_ms.max(1.0)
    )
}

fn scalar(value: TransitionValue) -> f32 {
    match value {
        TransitionValue::Scalar(v) => v,
        TransitionValue::Angles { end, .. } => end,
    }
}

fn angles(value: TransitionValue) -> (f32, f32) {
    match value {
        TransitionValue::Angles { start, end } => (start, end),
        TransitionValue::Scalar(v) => (0.0, v),
    }
}

/// Arc path that degrades to a bare move for an empty slice, so keyframe
/// lists never contain an empty value.
fn slice_path(center: (f32, f32), inner: f32, outer: f32, start: f32, end: f32) -> String {
    let d = arc_path(center, inner, outer, start, end);
    if d.is_empty() {
        format!("M {:.2} {:.2}", center.0, center.1)
    } else {
        d
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
