//! Slide elements: the layout-resolved output handed to a presentation
//! file writer.

use serde::Serialize;

use crate::Color;

/// A placement on the slide, in centimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One positioned leaf unit of a slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideElement {
    pub page: usize,
    /// `slide-title`, `caption`, `body-text`, or the data role a chart or
    /// table was built from.
    pub role: String,
    pub frame: Rect,
    pub content: ElementContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementContent {
    TextBox(TextBox),
    Chart(ChartSpec),
    Table(TableSpec),
}

impl ElementContent {
    pub fn as_text_box(&self) -> Option<&TextBox> {
        match self {
            Self::TextBox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_chart(&self) -> Option<&ChartSpec> {
        match self {
            Self::Chart(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableSpec> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// A span of text with uniform weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBox {
    pub runs: Vec<TextRun>,
    pub font_size: f64,
    pub color: Color,
    pub word_wrap: bool,
}

impl TextBox {
    /// The text without formatting.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Color,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarOptions {
    pub gap_width: i32,
    pub overlap: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineOptions {
    pub line_width: f64,
    pub smooth: bool,
    pub markers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub font_name: String,
    pub font_size: f64,
    pub show_legend: bool,
    pub show_data_labels: bool,
    pub show_x_axis: bool,
    pub show_y_axis: bool,
    pub value_axis_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<BarOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    /// Header cells, starting with the corner above the row labels.
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
    pub font_name: String,
    pub font_size: f64,
}
