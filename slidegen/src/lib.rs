//! Slidegen turns tabular data and declarative definitions into slide
//! descriptions.
//!
//! A [`TemplateDefinition`] selects a layout, a text pattern and a set of
//! data bindings. [`SlideConfigBuilder::build`] combines a template with the
//! datasets and variables of a [`PresentationContext`] into a
//! [`SlideRenderConfig`], and [`Renderers`] turns that config into
//! positioned [`SlideElement`]s for a presentation file writer.
//!
//! For slidegen's command line interface, see the `slidegen-cli` crate.

mod builder;
mod config;
mod context;
mod dataset;
mod element;
mod error;
mod fs;
mod hash;
pub mod pattern;
pub mod render;
mod series;
mod slide;
mod style;
mod template;
mod text;
pub mod transform;
mod value;

pub use builder::{SlideConfigBuilder, Validation};
pub use config::Definitions;
pub use context::PresentationContext;
pub use dataset::Dataset;
pub use element::{
    Axis, BarOptions, ChartSeries, ChartSpec, ChartType, ElementContent, LineOptions, Rect,
    SlideElement, TableRow, TableSpec, TextBox, TextRun,
};
pub use error::Error;
pub use hash::sha256;
pub use render::{RenderStrategy, Renderers};
pub use series::{Matrix, Series, SeriesSet, TransformedSeries};
pub use slide::{RoleData, SlideRenderConfig};
pub use style::{Color, PaletteRef, StyleBook, StyleParams, StylePatch};
pub use template::{DataBinding, LayoutType, TemplateDefinition, Templates};
pub use text::{TextField, TextPattern, TextPatterns};
pub use transform::Transform;
pub use value::{Map, Value};
