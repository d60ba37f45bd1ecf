use crate::animation::Easing;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarConfig {
    /// Fraction of each category slot left empty on both sides.
    pub band_padding: f32,
    /// Gap between bars of different series inside one slot, as a fraction
    /// of the per-series width.
    pub group_padding: f32,
    pub corner_radius: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            band_padding: 0.1,
            group_padding: 0.08,
            corner_radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineConfig {
    /// Cardinal spline tension; 0 is Catmull-Rom, 1 gives straight segments.
    pub tension: f32,
    pub stroke_width: f32,
    pub marker_radius: f32,
    /// Time a point marker takes to grow once the line has reached it.
    pub marker_delay_ms: f64,
    pub area_opacity: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            tension: 0.0,
            stroke_width: 2.0,
            marker_radius: 4.0,
            marker_delay_ms: 300.0,
            area_opacity: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PieConfig {
    /// Donut inner radius as a fraction of the outer radius.
    pub donut_ratio: f32,
    /// Slices whose share of the total is at or below this get no text label.
    pub label_min_share: f64,
    /// Radius of pie label anchors as a fraction of the outer radius.
    pub pie_label_radius: f32,
    pub margin: f32,
    pub stroke_width: f32,
    pub label_font_size: f32,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            donut_ratio: 0.6,
            label_min_share: 0.05,
            pie_label_radius: 0.6,
            margin: 10.0,
            stroke_width: 1.5,
            label_font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendConfig {
    pub swatch_size: f32,
    pub spacing: f32,
    /// Space between the plot and the legend column.
    pub gap: f32,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            swatch_size: 12.0,
            spacing: 8.0,
            gap: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisConfig {
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub tick_size: f32,
    pub title_height: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            margin_top: 16.0,
            margin_right: 16.0,
            margin_bottom: 32.0,
            margin_left: 48.0,
            tick_size: 5.0,
            title_height: 28.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Measure ASCII text with the built-in width table instead of loading
    /// system fonts.
    pub fast_text_metrics: bool,
    pub empty_message: String,
    pub bar: BarConfig,
    pub line: LineConfig,
    pub pie: PieConfig,
    pub legend: LegendConfig,
    pub axis: AxisConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fast_text_metrics: true,
            empty_message: "No data to display".to_string(),
            bar: BarConfig::default(),
            line: LineConfig::default(),
            pie: PieConfig::default(),
            legend: LegendConfig::default(),
            axis: AxisConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Extra delay per item index for the cascading reveal.
    pub stagger_ms: f64,
    pub easing: Easing,
    /// Samples per transition when baking SMIL keyframes.
    pub keyframe_steps: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 100.0,
            easing: Easing::CubicInOut,
            keyframe_steps: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipConfig {
    /// Delay between pointer-leave and the overlay hiding.
    pub fade_out_ms: f64,
    pub offset_x: f32,
    pub offset_y: f32,
    pub padding: f32,
    pub corner_radius: f32,
    pub font_size: f32,
    /// Extra pixels around point markers that still count as a hit.
    pub hit_slop: f32,
    /// How far a hovered shape's fill moves towards white.
    pub hover_lighten: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: 200.0,
            offset_x: 12.0,
            offset_y: -28.0,
            padding: 6.0,
            corner_radius: 4.0,
            font_size: 12.0,
            hit_slop: 4.0,
            hover_lighten: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub animation: AnimationConfig,
    pub tooltip: TooltipConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            animation: AnimationConfig::default(),
            tooltip: TooltipConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    title_font_size: Option<f32>,
    text_color: Option<String>,
    axis_color: Option<String>,
    grid_color: Option<String>,
    background: Option<String>,
    slice_stroke: Option<String>,
    tooltip_background: Option<String>,
    tooltip_text_color: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    animation: Option<AnimationConfig>,
    tooltip: Option<TooltipConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" | "base" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme {other:?}"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.title_font_size {
            config.theme.title_font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.axis_color {
            config.theme.axis_color = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.slice_stroke {
            config.theme.slice_stroke = v;
        }
        if let Some(v) = vars.tooltip_background {
            config.theme.tooltip_background = v;
        }
        if let Some(v) = vars.tooltip_text_color {
            config.theme.tooltip_text_color = v;
        }
        if let Some(v) = vars.palette
            && !v.is_empty()
        {
            config.theme.palette = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(animation) = parsed.animation {
        config.animation = animation;
    }
    if let Some(tooltip) = parsed.tooltip {
        config.tooltip = tooltip;
    }
    config.render.background = config.theme.background.clone();
    Ok(config)
}
