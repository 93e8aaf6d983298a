//! The read-only definition tables shared by every slide build.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use log::debug;

use crate::fs::maybe_canonicalize;
use crate::{Error, StyleBook, Templates, TextPatterns};

const TEMPLATES_DIR: &str = "templates";
const TEXT_PATTERNS_FILE: &str = "text_patterns.yaml";
const STYLES_FILE: &str = "styles.yaml";

/// Templates, text patterns and styles, validated against each other once
/// and immutable afterwards. Share it by reference across builds and
/// threads.
#[derive(Debug, Clone)]
pub struct Definitions {
    templates: Templates,
    texts: TextPatterns,
    styles: StyleBook,
}

impl Definitions {
    /// Bundles the given tables, checking that every template's text
    /// pattern, summary variant and style profile resolve.
    pub fn new(templates: Templates, texts: TextPatterns, styles: StyleBook) -> Result<Self, Error> {
        for t in templates.iter() {
            let pattern = texts.get(&t.theme_key, &t.function_key).ok_or_else(|| {
                Error::config(format!(
                    "template \"{}\" refers to missing text pattern {}/{}",
                    t.id, t.theme_key, t.function_key
                ))
            })?;
            if t.summary_variant >= pattern.summary_count() {
                return Err(Error::config(format!(
                    "template \"{}\" selects summary variant {}, but {}/{} has {}",
                    t.id,
                    t.summary_variant,
                    t.theme_key,
                    t.function_key,
                    pattern.summary_count()
                )));
            }
            styles
                .resolve(t.layout_type, t.style_profile.as_deref())
                .map_err(|e| Error::config(format!("template \"{}\": {}", t.id, e)))?;
        }
        debug!(
            "Definitions ready: {} templates, {} text patterns, {} style profiles",
            templates.len(),
            texts.len(),
            styles.profiles.len()
        );
        Ok(Self {
            templates,
            texts,
            styles,
        })
    }

    /// Parses and bundles definitions from YAML text. `styles` may be
    /// omitted to use the built-in style book.
    pub fn from_yaml(templates: &str, texts: &str, styles: Option<&str>) -> Result<Self, Error> {
        let styles = match styles {
            Some(s) => StyleBook::from_yaml_str(s)?,
            None => StyleBook::default(),
        };
        Self::new(
            Templates::from_yaml_str(templates)?,
            TextPatterns::from_yaml_str(texts)?,
            styles,
        )
    }

    /// Loads definitions from a directory laid out as:
    ///
    /// ```text
    /// templates/*.yaml     template definitions, one or many per file
    /// text_patterns.yaml   text patterns by theme and function
    /// styles.yaml          optional style book
    /// ```
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let dir = dir
            .canonicalize()
            .wrap_err_with(|| Error::FailedToLoadDefinitions(dir.to_path_buf()))?;
        debug!("Loading definitions from {}", dir.display());

        let mut templates = Templates::new();
        let pattern = dir.join(TEMPLATES_DIR).join("*.y*ml");
        let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<Result<Vec<_>, _>>()?;
        paths.sort();
        for path in paths.into_iter().filter(|p| p.is_file()) {
            let content = fs::read_to_string(&path)
                .wrap_err_with(|| Error::FailedToLoadDefinitions(path.clone()))?;
            templates
                .extend_from_yaml_str(&content)
                .wrap_err_with(|| Error::FailedToLoadDefinitions(path.clone()))?;
            debug!("Loaded templates from {}", path.display());
        }

        let texts_path = dir.join(TEXT_PATTERNS_FILE);
        let content = fs::read_to_string(&texts_path)
            .wrap_err_with(|| Error::FailedToLoadDefinitions(texts_path.clone()))?;
        let texts = TextPatterns::from_yaml_str(&content)
            .wrap_err_with(|| Error::FailedToLoadDefinitions(texts_path.clone()))?;

        let styles = match maybe_canonicalize(dir.join(STYLES_FILE))? {
            Some(styles_path) => {
                let content = fs::read_to_string(&styles_path)
                    .wrap_err_with(|| Error::FailedToLoadDefinitions(styles_path.clone()))?;
                StyleBook::from_yaml_str(&content)
                    .wrap_err_with(|| Error::FailedToLoadDefinitions(styles_path.clone()))?
            }
            None => {
                debug!("No {} found, using the built-in style book", STYLES_FILE);
                StyleBook::default()
            }
        };

        Self::new(templates, texts, styles)
            .wrap_err_with(|| Error::FailedToLoadDefinitions(dir.clone()))
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn texts(&self) -> &TextPatterns {
        &self.texts
    }

    pub fn styles(&self) -> &StyleBook {
        &self.styles
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TEMPLATES: &str = r#"
- id: t1
  layout_type: single_column_line
  theme_key: supply
  function_key: trend
  summary_variant: 1
  style_profile: compact
"#;

    const TEXTS: &str = r#"
supply:
  slide_title: "Supply"
  trend:
    summaries: ["a", "b"]
"#;

    #[test]
    fn cross_references_are_checked() {
        let styles = "profiles:\n  compact:\n    show_legend: false\n";
        let defs = Definitions::from_yaml(TEMPLATES, TEXTS, Some(styles)).unwrap();
        assert!(defs.templates().contains("t1"));

        // unknown style profile
        assert!(matches!(
            Definitions::from_yaml(TEMPLATES, TEXTS, None),
            Err(Error::Config(_))
        ));
        // summary variant out of range
        let texts = TEXTS.replace("[\"a\", \"b\"]", "[\"a\"]");
        assert!(matches!(
            Definitions::from_yaml(TEMPLATES, &texts, Some(styles)),
            Err(Error::Config(_))
        ));
        // missing text pattern
        let texts = TEXTS.replace("trend:", "volume:");
        assert!(matches!(
            Definitions::from_yaml(TEMPLATES, &texts, Some(styles)),
            Err(Error::Config(_))
        ));
    }
}
