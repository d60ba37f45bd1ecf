use std::collections::HashMap;

/// Ordinal colour assignment: each new key takes the next palette entry,
/// wrapping around, and keeps it for the lifetime of the assigner.
pub(crate) struct ColorAssigner<'a> {
    palette: &'a [String],
    assigned: HashMap<String, String>,
    order: Vec<String>,
}

impl<'a> ColorAssigner<'a> {
    pub(crate) fn new(palette: &'a [String]) -> Self {
        Self {
            palette,
            assigned: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub(crate) fn resolve(&mut self, key: &str) -> String {
        if let Some(color) = self.assigned.get(key) {
            return color.clone();
        }
        let color = if self.palette.is_empty() {
            "#333333".to_string()
        } else {
            self.palette[self.order.len() % self.palette.len()].clone()
        };
        self.assigned.insert(key.to_string(), color.clone());
        self.order.push(key.to_string());
        color
    }

    /// Key → colour pairs in first-seen order.
    pub(crate) fn into_pairs(mut self) -> Vec<(String, String)> {
        self.order
            .into_iter()
            .map(|key| {
                let color = self.assigned.remove(&key).unwrap_or_default();
                (key, color)
            })
            .collect()
    }
}
