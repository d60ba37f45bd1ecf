pub mod animation;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod pipeline;
pub mod render;
pub mod scale;
pub mod surface;
pub mod text_metrics;
pub mod theme;
pub mod tooltip;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{ChartError, ChartResult};
pub use ir::{ChartKind, ChartSpec, ChartValues, Series, StyleOptions};
pub use pipeline::{PipelineState, RenderPipeline};
pub use surface::{Frame, SceneSurface, Surface};
pub use theme::Theme;

use layout::compute_layout;
use pipeline::entrance_transitions;
use render::{render_animated_svg, render_svg};

/// One-shot rendering settings for [`render_with_options`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub config: Config,
    /// Bake the entrance animation into the SVG.
    pub animated: bool,
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self {
            config: Config::default(),
            animated: true,
        }
    }

    pub fn classic() -> Self {
        let mut options = Self::modern();
        options.config.theme = Theme::classic();
        options.config.render.background = options.config.theme.background.clone();
        options
    }

    pub fn with_animation(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::modern()
    }
}

/// Parse a JSON/JSON5 chart spec and render it to a standalone SVG string.
pub fn render_with_options(input: &str, options: RenderOptions) -> ChartResult<String> {
    let spec = ChartSpec::from_json(input)?;
    Ok(render_spec(&spec, &options))
}

pub fn render(input: &str) -> ChartResult<String> {
    render_with_options(input, RenderOptions::default())
}

/// Render an already validated spec.
pub fn render_spec(spec: &ChartSpec, options: &RenderOptions) -> String {
    let config = &options.config;
    let layout = compute_layout(spec, &config.theme, &config.layout);
    if options.animated {
        let style = spec.style.sanitized(&config.theme.palette);
        let transitions = entrance_transitions(&layout, style.animation_duration_ms, config);
        render_animated_svg(
            &layout,
            &transitions,
            style.show_tooltip,
            &config.theme,
            config,
        )
    } else {
        let frame = Frame {
            time_ms: 0.0,
            layout,
            highlight: None,
            tooltip: None,
        };
        render_svg(&frame, &config.theme, config)
    }
}
