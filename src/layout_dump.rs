use crate::animation::Transition;
use crate::layout::{Layout, LayoutData, LegendItem, ShapeDescriptor};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub kind: String,
    pub width: f32,
    pub height: f32,
    pub title: Option<String>,
    /// Present only for the empty state.
    pub empty_message: Option<String>,
    pub shapes: Vec<ShapeDescriptor>,
    pub legend: Vec<LegendItem>,
    pub colors: Vec<ColorDump>,
    pub y_ticks: Vec<TickDump>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
pub struct ColorDump {
    pub key: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct TickDump {
    pub text: String,
    pub value: f64,
    pub y: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, transitions: &[Transition]) -> Self {
        let mut dump = LayoutDump {
            kind: layout.kind.as_str().to_string(),
            width: layout.width,
            height: layout.height,
            title: layout.title.as_ref().map(|t| t.text.clone()),
            empty_message: None,
            shapes: Vec::new(),
            legend: Vec::new(),
            colors: Vec::new(),
            y_ticks: Vec::new(),
            transitions: transitions.to_vec(),
        };
        match &layout.data {
            LayoutData::Empty(empty) => dump.empty_message = Some(empty.message.clone()),
            LayoutData::Chart(geometry) => {
                dump.shapes = geometry.shapes.clone();
                dump.legend = geometry.legend.clone();
                dump.colors = geometry
                    .colors
                    .iter()
                    .map(|(key, color)| ColorDump {
                        key: key.clone(),
                        color: color.clone(),
                    })
                    .collect();
                dump.y_ticks = geometry
                    .axes
                    .iter()
                    .flat_map(|axes| axes.y_ticks.iter())
                    .map(|tick| TickDump {
                        text: tick.text.clone(),
                        value: tick.value,
                        y: tick.y,
                    })
                    .collect();
            }
        }
        dump
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &Layout,
    transitions: &[Transition],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, transitions);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::ChartSpec;
    use crate::layout::compute_layout;
    use crate::pipeline::entrance_transitions;

    #[test]
    fn dump_serializes_tagged_shapes() {
        let config = Config::default();
        let spec = ChartSpec::donut(vec![("a".into(), 3.0), ("b".into(), 1.0)]);
        let layout = compute_layout(&spec, &config.theme, &config.layout);
        let transitions = entrance_transitions(&layout, 800.0, &config);
        let dump = LayoutDump::from_layout(&layout, &transitions);
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["kind"], "donut");
        assert_eq!(json["shapes"][0]["type"], "arcSlice");
        assert_eq!(json["shapes"][0]["label"], "a");
        assert_eq!(json["transitions"].as_array().unwrap().len(), 2);
        assert_eq!(json["transitions"][0]["target"]["property"], "angles");
        assert!(json["emptyMessage"].is_null());
    }

    #[test]
    fn empty_layout_dump_has_message() {
        let config = Config::default();
        let layout = compute_layout(&ChartSpec::pie(Vec::new()), &config.theme, &config.layout);
        let dump = LayoutDump::from_layout(&layout, &[]);
        assert_eq!(dump.empty_message.as_deref(), Some("No data to display"));
        assert!(dump.shapes.is_empty());
    }
}
