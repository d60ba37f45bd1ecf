use serde::Serialize;

use crate::ir::ChartKind;
use crate::scale::LinearScale;

/// Axis-aligned rectangle in chart pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarShape {
    /// Position of the value in its series.
    pub index: usize,
    pub label: String,
    pub series: String,
    pub value: f64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Pixel row of the zero line the bar grows from.
    pub baseline: f32,
    pub fill: String,
    pub corner_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcShape {
    /// Position of the category in the input, before sorting.
    pub index: usize,
    pub label: String,
    pub value: f64,
    /// Fraction of the total, 0..1.
    pub share: f64,
    /// Radians, clockwise from 12 o'clock.
    pub start_angle: f32,
    pub end_angle: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub center: (f32, f32),
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
    /// Percentage text, absent when the slice is too thin to label.
    pub text: Option<String>,
    pub text_position: (f32, f32),
}

impl ArcShape {
    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineShape {
    pub series: String,
    pub points: Vec<(f32, f32)>,
    /// Smoothed SVG path through `points`.
    pub path: String,
    /// Closed path down to the baseline, when areas are enabled.
    pub area_path: Option<String>,
    pub stroke: String,
    pub stroke_width: f32,
    pub area_opacity: f32,
    /// Fraction of the plot width that is drawn, 0..1.
    pub reveal: f32,
    pub clip: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerShape {
    pub index: usize,
    pub series: String,
    pub label: String,
    pub value: f64,
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub fill: String,
    pub stroke: String,
}

/// Paintable geometry. Shapes carry no behaviour; hover and animation refer
/// to them by index in [`ChartGeometry::shapes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeDescriptor {
    Bar(BarShape),
    ArcSlice(ArcShape),
    LineSegmentSet(LineShape),
    PointMarker(MarkerShape),
}

impl ShapeDescriptor {
    pub fn fill(&self) -> &str {
        match self {
            ShapeDescriptor::Bar(bar) => &bar.fill,
            ShapeDescriptor::ArcSlice(arc) => &arc.fill,
            ShapeDescriptor::LineSegmentSet(line) => &line.stroke,
            ShapeDescriptor::PointMarker(marker) => &marker.fill,
        }
    }

    pub fn as_bar(&self) -> Option<&BarShape> {
        match self {
            ShapeDescriptor::Bar(bar) => Some(bar),
            _ => None,
        }
    }

    pub fn as_arc(&self) -> Option<&ArcShape> {
        match self {
            ShapeDescriptor::ArcSlice(arc) => Some(arc),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineShape> {
        match self {
            ShapeDescriptor::LineSegmentSet(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<&MarkerShape> {
        match self {
            ShapeDescriptor::PointMarker(marker) => Some(marker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub text: String,
    pub value: f64,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesLayout {
    pub x_labels: Vec<AxisLabel>,
    pub y_ticks: Vec<AxisTick>,
    pub baseline_y: f32,
    pub tick_size: f32,
    pub show_grid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub x: f32,
    pub y: f32,
    pub label: String,
    pub color: String,
    pub swatch_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleLayout {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub plot: Rect,
    pub shapes: Vec<ShapeDescriptor>,
    pub axes: Option<AxesLayout>,
    pub legend: Vec<LegendItem>,
    /// Category or series name to colour, in first-seen order.
    pub colors: Vec<(String, String)>,
    #[serde(skip)]
    pub value_scale: Option<LinearScale>,
    pub value_prefix: String,
    pub value_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyLayout {
    pub message: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutData {
    Chart(ChartGeometry),
    Empty(EmptyLayout),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub kind: ChartKind,
    pub width: f32,
    pub height: f32,
    pub title: Option<TitleLayout>,
    pub data: LayoutData,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        matches!(self.data, LayoutData::Empty(_))
    }

    pub fn geometry(&self) -> Option<&ChartGeometry> {
        match &self.data {
            LayoutData::Chart(geometry) => Some(geometry),
            LayoutData::Empty(_) => None,
        }
    }

    pub fn geometry_mut(&mut self) -> Option<&mut ChartGeometry> {
        match &mut self.data {
            LayoutData::Chart(geometry) => Some(geometry),
            LayoutData::Empty(_) => None,
        }
    }

    pub fn shapes(&self) -> &[ShapeDescriptor] {
        self.geometry().map(|g| g.shapes.as_slice()).unwrap_or(&[])
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.geometry()?
            .colors
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, color)| color.as_str())
    }
}
