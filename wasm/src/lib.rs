use chart_rs_renderer::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    /// Skip the entrance animation and emit the final frame.
    static_svg: Option<bool>,
}

fn build_render_options(options: ChartRenderOptions) -> RenderOptions {
    let mut render_options = match options.theme.as_deref() {
        Some("classic") | Some("default") => RenderOptions::classic(),
        _ => RenderOptions::modern(),
    };

    if let Some(font_family) = options.font_family {
        render_options.config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.config.theme.font_size = font_size;
    }
    if let Some(fast_text) = options.fast_text {
        render_options.config.layout.fast_text_metrics = fast_text;
    }

    render_options.with_animation(!options.static_svg.unwrap_or(false))
}

#[wasm_bindgen]
pub fn render_chart_svg(spec_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ChartRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        ChartRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(spec_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
