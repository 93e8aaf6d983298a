//! Template definitions: which layout, text and data a slide is made of.

use std::{collections::HashSet, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Map, Transform};

/// The fixed set of slide layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    SingleColumnBar,
    SingleColumnLine,
    DoubleColumnBar,
    DoubleColumnLine,
    SingleColumnTable,
}

impl LayoutType {
    pub const ALL: [LayoutType; 5] = [
        Self::SingleColumnBar,
        Self::SingleColumnLine,
        Self::DoubleColumnBar,
        Self::DoubleColumnLine,
        Self::SingleColumnTable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleColumnBar => "single_column_bar",
            Self::SingleColumnLine => "single_column_line",
            Self::DoubleColumnBar => "double_column_bar",
            Self::DoubleColumnLine => "double_column_line",
            Self::SingleColumnTable => "single_column_table",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| Error::config(format!("unknown layout type \"{}\"", s)))
    }
}

/// Binds a logical data role of a layout (e.g. `chart_main`) to a dataset
/// in the presentation context, along with the transform that shapes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBinding {
    pub role: String,
    pub dataset: String,
    #[serde(default = "default_transform")]
    pub transform: Transform,
}

fn default_transform() -> Transform {
    Transform::Passthrough
}

impl DataBinding {
    pub fn new<R, D>(role: R, dataset: D, transform: Transform) -> Self
    where
        R: Into<String>,
        D: Into<String>,
    {
        Self {
            role: role.into(),
            dataset: dataset.into(),
            transform,
        }
    }
}

/// An immutable record describing one kind of slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    #[serde(alias = "uid")]
    pub id: String,
    pub theme_key: String,
    pub function_key: String,
    pub layout_type: LayoutType,
    #[serde(default, alias = "summary_item")]
    pub summary_variant: usize,
    #[serde(default, alias = "style_config_id")]
    pub style_profile: Option<String>,
    /// Data bindings, in the order the renderer places them.
    #[serde(default)]
    pub data: Vec<DataBinding>,
}

impl TemplateDefinition {
    pub fn new<I, T, F>(id: I, theme_key: T, function_key: F, layout_type: LayoutType) -> Self
    where
        I: Into<String>,
        T: Into<String>,
        F: Into<String>,
    {
        Self {
            id: id.into(),
            theme_key: theme_key.into(),
            function_key: function_key.into(),
            layout_type,
            summary_variant: 0,
            style_profile: None,
            data: Vec::new(),
        }
    }

    pub fn with_summary_variant(mut self, variant: usize) -> Self {
        self.summary_variant = variant;
        self
    }

    pub fn with_style_profile<P: Into<String>>(mut self, profile: P) -> Self {
        self.style_profile = Some(profile.into());
        self
    }

    pub fn with_binding(mut self, binding: DataBinding) -> Self {
        self.data.push(binding);
        self
    }

    /// Checks the parts of the definition that do not depend on other
    /// definition tables.
    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.id.trim().is_empty() {
            return Err(Error::config("template id must not be empty"));
        }
        let mut roles = HashSet::new();
        for binding in &self.data {
            if binding.role.is_empty() || binding.dataset.is_empty() {
                return Err(Error::config(format!(
                    "template \"{}\" has a data binding with an empty role or dataset name",
                    self.id
                )));
            }
            if !roles.insert(binding.role.as_str()) {
                return Err(Error::config(format!(
                    "template \"{}\" binds role \"{}\" more than once",
                    self.id, binding.role
                )));
            }
        }
        Ok(())
    }
}

/// The catalog of template definitions, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    templates: Map<String, TemplateDefinition>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML document holding either a single template definition or
    /// a list of them.
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let mut templates = Self::new();
        templates.extend_from_yaml_str(content)?;
        Ok(templates)
    }

    pub(crate) fn extend_from_yaml_str(&mut self, content: &str) -> Result<(), Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<TemplateDefinition>),
            One(Box<TemplateDefinition>),
        }
        match serde_yaml::from_str::<OneOrMany>(content)? {
            OneOrMany::Many(defs) => {
                for def in defs {
                    self.insert(def)?;
                }
            }
            OneOrMany::One(def) => self.insert(*def)?,
        }
        Ok(())
    }

    /// Adds a definition. Ids must be unique.
    pub fn insert(&mut self, template: TemplateDefinition) -> Result<(), Error> {
        template.check()?;
        if self.templates.contains_key(&template.id) {
            return Err(Error::DuplicateTemplate(template.id));
        }
        debug!(
            "Registered template {} ({}, {}/{})",
            template.id, template.layout_type, template.theme_key, template.function_key
        );
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Convenience method for constructing a catalog.
    pub fn with(mut self, template: TemplateDefinition) -> Result<Self, Error> {
        self.insert(template)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDefinition> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::BinSpec;

    const TEMPLATES: &str = r#"
- uid: supply_by_area
  layout_type: single_column_bar
  style_config_id: compact
  theme_key: supply
  function_key: area_distribution
  summary_item: 1
  data:
    - role: chart_main
      dataset: supply
      transform:
        kind: bin
        size: 20
        column: area
        values: [sets]
- id: price_table
  layout_type: single_column_table
  theme_key: price
  function_key: matrix
  data:
    - role: table_main
      dataset: deals
"#;

    #[test]
    fn loads_definitions_with_legacy_field_names() {
        let templates = Templates::from_yaml_str(TEMPLATES).unwrap();
        assert_eq!(templates.len(), 2);
        let t = templates.get("supply_by_area").unwrap();
        assert_eq!(t.layout_type, LayoutType::SingleColumnBar);
        assert_eq!(t.summary_variant, 1);
        assert_eq!(t.style_profile.as_deref(), Some("compact"));
        let mut expected = BinSpec::new(20.0, &["sets"]);
        expected.column = Some("area".to_string());
        assert_eq!(t.data[0].transform, Transform::Bin(expected));

        let table = templates.get("price_table").unwrap();
        assert_eq!(table.summary_variant, 0);
        assert_eq!(table.data[0].transform, Transform::Passthrough);
    }

    #[test]
    fn ids_are_unique() {
        let t = TemplateDefinition::new("a", "t", "f", LayoutType::SingleColumnLine);
        let err = Templates::new()
            .with(t.clone())
            .unwrap()
            .with(t)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTemplate(id) if id == "a"));
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let yaml = "id: x\nlayout_type: pie_chart\ntheme_key: t\nfunction_key: f\n";
        assert!(Templates::from_yaml_str(yaml).is_err());
        assert!("pie_chart".parse::<LayoutType>().is_err());
        assert_eq!(
            "double_column_line".parse::<LayoutType>().unwrap(),
            LayoutType::DoubleColumnLine
        );
    }

    #[test]
    fn roles_are_unique() {
        let t = TemplateDefinition::new("a", "t", "f", LayoutType::DoubleColumnBar)
            .with_binding(DataBinding::new("left", "x", Transform::Passthrough))
            .with_binding(DataBinding::new("left", "y", Transform::Passthrough));
        assert!(matches!(Templates::new().insert(t), Err(Error::Config(_))));
    }
}
