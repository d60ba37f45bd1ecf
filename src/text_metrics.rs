use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in pixels using the first installed font of `font_family`,
/// or `None` when no font in the stack resolves.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    let metrics = guard.metrics_for(font_family)?;
    Some(metrics.width(text, font_size))
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontMetrics>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn metrics_for(&mut self, font_family: &str) -> Option<&FontMetrics> {
        let key = font_family.trim().to_string();
        if !self.cache.contains_key(&key) {
            let metrics = self.load(font_family);
            self.cache.insert(key.clone(), metrics);
        }
        self.cache.get(&key).and_then(|m| m.as_ref())
    }

    fn load(&mut self, font_family: &str) -> Option<FontMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index).ok()?;
                Some(FontMetrics::from_face(&face))
            })
            .flatten()
    }
}

/// Advance widths of the printable ASCII range plus an average for
/// everything else. Enough precision for legend columns and tooltip boxes.
struct FontMetrics {
    units_per_em: f32,
    ascii_advances: [u16; 128],
    fallback_advance: f32,
}

impl FontMetrics {
    fn from_face(face: &Face<'_>) -> Self {
        let mut ascii_advances = [0u16; 128];
        let mut total = 0u32;
        let mut counted = 0u32;
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                ascii_advances[byte as usize] = advance;
                if byte.is_ascii_alphabetic() && advance > 0 {
                    total += advance as u32;
                    counted += 1;
                }
            }
        }
        let units_per_em = face.units_per_em().max(1) as f32;
        let fallback_advance = if counted > 0 {
            total as f32 / counted as f32
        } else {
            units_per_em * 0.56
        };
        Self {
            units_per_em,
            ascii_advances,
            fallback_advance,
        }
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                let advance = if ch.is_ascii() {
                    self.ascii_advances[ch as usize] as f32
                } else {
                    0.0
                };
                if advance > 0.0 {
                    advance
                } else {
                    self.fallback_advance
                }
            })
            .sum::<f32>()
            * scale
    }
}
