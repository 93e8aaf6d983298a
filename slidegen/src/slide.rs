use serde::Serialize;

use crate::{hash::sha256_json, Error, LayoutType, StyleParams, TransformedSeries};

/// Transformed data for one logical role of a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleData {
    pub role: String,
    /// Name of the context dataset the data came from.
    pub dataset: String,
    pub data: TransformedSeries,
}

/// The fully resolved, layout-agnostic description of one slide.
///
/// Built in one piece by [`crate::SlideConfigBuilder::build`]; a failed build
/// never yields one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideRenderConfig {
    pub template_id: String,
    pub layout_type: LayoutType,
    pub style: StyleParams,
    pub title: String,
    pub caption: Option<String>,
    pub summary: String,
    /// In the template's binding order.
    pub data: Vec<RoleData>,
}

impl SlideRenderConfig {
    pub fn data_for(&self, role: &str) -> Option<&TransformedSeries> {
        self.data.iter().find(|d| d.role == role).map(|d| &d.data)
    }

    /// Hex SHA256 digest of the config's JSON form. Equal configs have equal
    /// fingerprints.
    pub fn fingerprint(&self) -> Result<String, Error> {
        sha256_json(self)
    }
}
