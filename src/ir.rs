use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::theme::{default_palette, is_valid_color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Donut,
}

impl ChartKind {
    /// Pie and donut charts are laid out around a centre instead of on axes.
    pub fn is_radial(self) -> bool {
        matches!(self, Self::Pie | Self::Donut)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Donut => "donut",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Chart data as supplied by the caller.
///
/// In JSON this is either a list of numbers, a list of `{name, values}` series,
/// or an object. Object keys keep their input order: numeric entries become
/// categories, array entries become named series.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartValues {
    Sequence(Vec<f64>),
    Series(Vec<Series>),
    Categories(Vec<(String, f64)>),
}

impl Default for ChartValues {
    fn default() -> Self {
        Self::Sequence(Vec::new())
    }
}

impl ChartValues {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Sequence(values) => values.is_empty(),
            Self::Series(series) => series.iter().all(|s| s.values.is_empty()),
            Self::Categories(categories) => categories.is_empty(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SequenceItem {
    Number(f64),
    Series(Series),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingItem {
    Number(f64),
    Series(Vec<f64>),
}

struct ValuesVisitor;

impl<'de> Visitor<'de> for ValuesVisitor {
    type Value = ChartValues;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of numbers, a list of series, or an object of named values")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ChartValues, A::Error> {
        let mut numbers = Vec::new();
        let mut series = Vec::new();
        while let Some(item) = seq.next_element::<SequenceItem>()? {
            match item {
                SequenceItem::Number(value) => numbers.push(value),
                SequenceItem::Series(s) => series.push(s),
            }
        }
        match (numbers.is_empty(), series.is_empty()) {
            (false, false) => Err(de::Error::custom("values mix numbers and series")),
            (_, true) => Ok(ChartValues::Sequence(numbers)),
            (true, false) => Ok(ChartValues::Series(series)),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ChartValues, A::Error> {
        let mut categories = Vec::new();
        let mut series = Vec::new();
        while let Some((key, item)) = map.next_entry::<String, MappingItem>()? {
            match item {
                MappingItem::Number(value) => categories.push((key, value)),
                MappingItem::Series(values) => series.push(Series::new(key, values)),
            }
        }
        match (categories.is_empty(), series.is_empty()) {
            (false, false) => Err(de::Error::custom("values mix numbers and series")),
            (_, true) => Ok(ChartValues::Categories(categories)),
            (true, false) => Ok(ChartValues::Series(series)),
        }
    }
}

impl<'de> Deserialize<'de> for ChartValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValuesVisitor)
    }
}

/// Paint and interaction options. Every field has a default, and
/// [`StyleOptions::sanitized`] replaces unusable values with those defaults
/// before any geometry is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    pub width: f32,
    pub height: f32,
    /// Empty means "use the theme palette".
    pub color_palette: Vec<String>,
    pub show_tooltip: bool,
    pub show_legend: bool,
    pub animation_duration_ms: f64,
    pub show_grid: bool,
    /// Fill the area under line series.
    pub show_area: bool,
    /// Prepended to values in tooltips and axis ticks, e.g. a currency sign.
    pub value_prefix: String,
    pub value_suffix: String,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            color_palette: Vec::new(),
            show_tooltip: true,
            show_legend: true,
            animation_duration_ms: 1000.0,
            show_grid: true,
            show_area: false,
            value_prefix: String::new(),
            value_suffix: String::new(),
        }
    }
}

impl StyleOptions {
    /// Copy with unusable fields replaced by defaults. An empty (or entirely
    /// invalid) palette falls back to `theme_palette`, then to the built-in one.
    pub fn sanitized(&self, theme_palette: &[String]) -> StyleOptions {
        let defaults = StyleOptions::default();
        let mut style = self.clone();
        if !style.width.is_finite() || style.width <= 0.0 {
            style.width = defaults.width;
        }
        if !style.height.is_finite() || style.height <= 0.0 {
            style.height = defaults.height;
        }
        if !style.animation_duration_ms.is_finite() || style.animation_duration_ms < 0.0 {
            style.animation_duration_ms = defaults.animation_duration_ms;
        }
        style.color_palette.retain(|color| is_valid_color(color));
        if style.color_palette.is_empty() {
            style.color_palette = theme_palette
                .iter()
                .filter(|color| is_valid_color(color))
                .cloned()
                .collect();
        }
        if style.color_palette.is_empty() {
            style.color_palette = default_palette();
        }
        style
    }
}

/// Whole numbers print without decimals, everything else with up to two.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if (rounded - rounded.round()).abs() < 1e-9 {
        format!("{:.0}", rounded)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

/// Everything needed to draw one chart. A new spec is a new value; the
/// pipeline never mutates one it has been handed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(default)]
    pub values: ChartValues,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub style: StyleOptions,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, values: ChartValues, labels: Vec<String>) -> Self {
        Self {
            kind,
            values,
            labels,
            title: None,
            style: StyleOptions::default(),
        }
    }

    pub fn bar(values: Vec<f64>, labels: Vec<String>) -> Self {
        Self::new(ChartKind::Bar, ChartValues::Sequence(values), labels)
    }

    pub fn line(labels: Vec<String>, series: Vec<Series>) -> Self {
        Self::new(ChartKind::Line, ChartValues::Series(series), labels)
    }

    pub fn pie(categories: Vec<(String, f64)>) -> Self {
        Self::new(ChartKind::Pie, ChartValues::Categories(categories), Vec::new())
    }

    pub fn donut(categories: Vec<(String, f64)>) -> Self {
        Self::new(ChartKind::Donut, ChartValues::Categories(categories), Vec::new())
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a spec from JSON or JSON5 text and validate it.
    pub fn from_json(input: &str) -> ChartResult<Self> {
        let spec: ChartSpec = json5::from_str(input)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> ChartResult<()> {
        let check = |location: String, value: f64| -> ChartResult<()> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ChartError::NonFinite { location, value })
            }
        };
        match &self.values {
            ChartValues::Sequence(values) => {
                for (idx, value) in values.iter().enumerate() {
                    check(format!("values[{idx}]"), *value)?;
                }
            }
            ChartValues::Series(series) => {
                for s in series {
                    for (idx, value) in s.values.iter().enumerate() {
                        check(format!("{}[{idx}]", s.name), *value)?;
                    }
                }
            }
            ChartValues::Categories(categories) => {
                for (name, value) in categories {
                    check(name.clone(), *value)?;
                }
            }
        }
        if let Some(bad) = self
            .style
            .color_palette
            .iter()
            .find(|color| !is_valid_color(color))
        {
            return Err(ChartError::InvalidColor(bad.clone()));
        }
        Ok(())
    }

    /// True when there is nothing to draw: no values, or no labels for an
    /// axis chart.
    pub fn has_no_data(&self) -> bool {
        if self.values.is_empty() {
            return true;
        }
        if self.kind.is_radial() {
            return false;
        }
        self.axis_data().0.is_empty()
    }

    /// Ordered category→value pairs for pie and donut charts.
    pub fn categories(&self) -> Vec<(String, f64)> {
        match &self.values {
            ChartValues::Categories(categories) => categories.clone(),
            ChartValues::Sequence(values) => values
                .iter()
                .enumerate()
                .map(|(idx, value)| {
                    let label = self
                        .labels
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| format!("Item {}", idx + 1));
                    (label, *value)
                })
                .collect(),
            ChartValues::Series(series) => series
                .iter()
                .map(|s| (s.name.clone(), s.values.iter().sum()))
                .collect(),
        }
    }

    /// Category axis labels and value series for bar and line charts.
    pub fn axis_data(&self) -> (Vec<String>, Vec<Series>) {
        match &self.values {
            ChartValues::Sequence(values) => (
                self.labels.clone(),
                vec![Series::new(
                    self.title.clone().unwrap_or_else(|| "Value".to_string()),
                    values.clone(),
                )],
            ),
            ChartValues::Series(series) => (self.labels.clone(), series.clone()),
            ChartValues::Categories(categories) => {
                let labels = if self.labels.is_empty() {
                    categories.iter().map(|(name, _)| name.clone()).collect()
                } else {
                    self.labels.clone()
                };
                let values = categories.iter().map(|(_, value)| *value).collect();
                (
                    labels,
                    vec![Series::new(
                        self.title.clone().unwrap_or_else(|| "Value".to_string()),
                        values,
                    )],
                )
            }
        }
    }
}
