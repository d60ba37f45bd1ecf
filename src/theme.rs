use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordinal palette used when a chart does not bring its own colours.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
];

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());
static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9.]+)\s*)?\)$")
        .unwrap()
});
static NAMED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_font_size: f32,
    pub text_color: String,
    pub axis_color: String,
    pub grid_color: String,
    pub background: String,
    pub slice_stroke: String,
    pub tooltip_background: String,
    pub tooltip_text_color: String,
    pub tooltip_border: String,
    pub empty_text_color: String,
    /// Percentage labels drawn on top of slice fills.
    pub slice_text_color: String,
    pub palette: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            title_font_size: 16.0,
            text_color: "#333333".to_string(),
            axis_color: "#333333".to_string(),
            grid_color: "#E0E0E0".to_string(),
            background: "#FFFFFF".to_string(),
            slice_stroke: "#FFFFFF".to_string(),
            tooltip_background: "#FFFFDE".to_string(),
            tooltip_text_color: "#333333".to_string(),
            tooltip_border: "#AAAA33".to_string(),
            empty_text_color: "#888888".to_string(),
            slice_text_color: "#FFFFFF".to_string(),
            palette: default_palette(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            title_font_size: 15.0,
            text_color: "#1C2430".to_string(),
            axis_color: "#7A8AA6".to_string(),
            grid_color: "#EEF2F8".to_string(),
            background: "#FFFFFF".to_string(),
            slice_stroke: "#FFFFFF".to_string(),
            tooltip_background: "rgba(28,36,48,0.92)".to_string(),
            tooltip_text_color: "#FFFFFF".to_string(),
            tooltip_border: "#1C2430".to_string(),
            empty_text_color: "#7A8AA6".to_string(),
            slice_text_color: "#FFFFFF".to_string(),
            palette: default_palette(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    HEX_RE.is_match(value) || RGB_RE.is_match(value) || NAMED_RE.is_match(value)
}

/// Parse `#rgb`, `#rrggbb`, `rgb()` and `rgba()` into an RGB triple.
/// Named colours are valid paint but have no numeric form here.
pub fn parse_color(value: &str) -> Option<(u8, u8, u8)> {
    let value = value.trim();
    if let Some(caps) = HEX_RE.captures(value) {
        let hex = caps.get(1)?.as_str();
        let expanded: String = if hex.len() == 3 {
            hex.chars().flat_map(|c| [c, c]).collect()
        } else {
            hex.to_string()
        };
        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        return Some((r, g, b));
    }
    if let Some(caps) = RGB_RE.captures(value) {
        let channel = |idx: usize| -> Option<u8> {
            caps.get(idx)?.as_str().parse::<u16>().ok().map(|v| v.min(255) as u8)
        };
        return Some((channel(1)?, channel(2)?, channel(3)?));
    }
    None
}

/// Mix a colour towards white by `amount` (0..1). Used for hover highlight.
/// Colours without a numeric form come back unchanged.
pub fn lighten_color(value: &str, amount: f32) -> String {
    let Some((r, g, b)) = parse_color(value) else {
        return value.to_string();
    };
    let amount = amount.clamp(0.0, 1.0);
    let mix = |c: u8| -> u8 { (c as f32 + (255.0 - c as f32) * amount).round() as u8 };
    format!("#{:02x}{:02x}{:02x}", mix(r), mix(g), mix(b))
}
