use crate::text_metrics;

/// Pixel width of a single line of text.
///
/// With `fast_metrics` text is measured from the built-in width table, which
/// keeps layout deterministic across machines. Otherwise the installed font is
/// consulted, falling back to the table when it cannot be loaded.
pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Approximate advance of `ch` in ems for a proportional sans-serif face.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.25,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.88,
        '@' | '#' | '%' | '&' => 0.95,
        'A'..='Z' => 0.67,
        '0'..='9' => 0.6,
        '\u{2e80}'..='\u{9fff}' | '\u{ac00}'..='\u{d7af}' => 1.0,
        _ => 0.56,
    }
}

/// Shorten `text` with an ellipsis so it fits in `max_width`.
pub(crate) fn truncate_to_width(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> String {
    if text_width(text, font_size, font_family, fast_metrics) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{out}{ch}…");
        if text_width(&candidate, font_size, font_family, fast_metrics) > max_width {
            break;
        }
        out.push(ch);
    }
    format!("{out}…")
}
