use crate::config::{Config, load_config};
use crate::ir::ChartSpec;
use crate::layout::{Layout, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::pipeline::{RenderPipeline, entrance_transitions};
use crate::render::{render_animated_svg, render_svg, write_output_svg};
use crate::surface::{Frame, SceneSurface};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chartr", version, about = "Animated SVG charts from JSON chart specs")]
pub struct Args {
    /// Input chart spec (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, animation, tooltip)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Override the chart width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Override the chart height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Render the still frame this many milliseconds into the entrance animation
    #[arg(long = "at")]
    pub at_ms: Option<f64>,

    /// Render the final state without SMIL animation
    #[arg(long = "static")]
    pub static_svg: bool,

    /// Write shape descriptors and transitions as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// How the chart is turned into SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// Entrance animation baked into SMIL keyframes.
    Animated,
    /// Final geometry only.
    Static,
    /// One still frame at a point in the animation.
    At(f64),
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let mut config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let mut spec = ChartSpec::from_json(&input)?;
    if let Some(width) = args.width {
        spec.style.width = width;
    }
    if let Some(height) = args.height {
        spec.style.height = height;
    }

    // PNG rasterizers do not play SMIL, so PNG output is always a still frame.
    let mode = match (args.at_ms, args.static_svg, args.output_format) {
        (Some(at), _, _) => RenderMode::At(at),
        (None, true, _) | (None, _, OutputFormat::Png) => RenderMode::Static,
        _ => RenderMode::Animated,
    };
    let (layout, svg) = render_document(&spec, &config, mode);
    config.render.width = layout.width;
    config.render.height = layout.height;
    info!(kind = spec.kind.as_str(), ?mode, bytes = svg.len(), "rendered chart");

    if let Some(path) = args.dump_layout.as_deref() {
        let transitions = entrance_transitions(
            &layout,
            spec.style.sanitized(&config.theme.palette).animation_duration_ms,
            &config,
        );
        write_layout_dump(path, &layout, &transitions)?;
        debug!(path = %path.display(), "wrote layout dump");
    }

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => write_png(&svg, args.output.as_deref(), &config)?,
    }
    Ok(())
}

/// Lay out `spec` and produce the SVG for `mode`.
pub fn render_document(spec: &ChartSpec, config: &Config, mode: RenderMode) -> (Layout, String) {
    let theme = &config.theme;
    match mode {
        RenderMode::At(at_ms) => {
            let mut pipeline = RenderPipeline::new(SceneSurface::new(), config.clone());
            pipeline.render(spec);
            pipeline.tick(at_ms.max(0.0));
            let svg = pipeline.surface().to_svg(theme, config);
            let layout = pipeline
                .layout()
                .cloned()
                .unwrap_or_else(|| compute_layout(spec, theme, &config.layout));
            (layout, svg)
        }
        RenderMode::Static => {
            let layout = compute_layout(spec, theme, &config.layout);
            let frame = Frame {
                time_ms: 0.0,
                layout,
                highlight: None,
                tooltip: None,
            };
            let svg = render_svg(&frame, theme, config);
            (frame.layout, svg)
        }
        RenderMode::Animated => {
            let layout = compute_layout(spec, theme, &config.layout);
            let style = spec.style.sanitized(&theme.palette);
            let transitions = entrance_transitions(&layout, style.animation_duration_ms, config);
            let svg = render_animated_svg(&layout, &transitions, style.show_tooltip, theme, config);
            (layout, svg)
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: Option<&Path>, config: &Config) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: Option<&Path>, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}
