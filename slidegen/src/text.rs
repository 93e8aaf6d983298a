//! Text patterns keyed by theme and function, and their rendering.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{hash::sha256, pattern::Pattern, Error, Map, Value};

/// Which text of a pattern to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Caption,
    Summary,
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Title => "title",
            Self::Caption => "caption",
            Self::Summary => "summary",
        };
        write!(f, "{}", s)
    }
}

/// The title, optional caption and summary variants for one
/// (theme, function) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPattern {
    theme: String,
    function: String,
    title: Pattern,
    caption: Option<Pattern>,
    summaries: Vec<Pattern>,
}

impl TextPattern {
    /// Parses the given pattern sources. At least one summary is required.
    pub fn new<T, F, S>(
        theme: T,
        function: F,
        title: &str,
        caption: Option<&str>,
        summaries: &[S],
    ) -> Result<Self, Error>
    where
        T: Into<String>,
        F: Into<String>,
        S: AsRef<str>,
    {
        let theme = theme.into();
        let function = function.into();
        if summaries.is_empty() {
            return Err(Error::config(format!(
                "text pattern {}/{} has no summary variants",
                theme, function
            )));
        }
        Ok(Self {
            title: Pattern::parse(title)?,
            caption: caption.map(Pattern::parse).transpose()?,
            summaries: summaries
                .iter()
                .map(Pattern::parse)
                .collect::<Result<Vec<_>, _>>()?,
            theme,
            function,
        })
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn has_caption(&self) -> bool {
        self.caption.is_some()
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }

    /// Looks up the pattern for a field.
    pub fn pattern(&self, field: TextField, variant: usize) -> Result<&Pattern, Error> {
        match field {
            TextField::Title => Ok(&self.title),
            TextField::Caption => self.caption.as_ref().ok_or_else(|| {
                Error::config(format!(
                    "text pattern {}/{} has no caption",
                    self.theme, self.function
                ))
            }),
            TextField::Summary => self.summaries.get(variant).ok_or_else(|| {
                Error::config(format!(
                    "summary variant {} is out of range for text pattern {}/{} ({} variants)",
                    variant,
                    self.theme,
                    self.function,
                    self.summaries.len()
                ))
            }),
        }
    }

    fn content_hash(&self) -> String {
        let mut content = String::new();
        for part in std::iter::once(&self.title)
            .chain(self.caption.iter())
            .chain(self.summaries.iter())
        {
            content.push_str(&sha256(part.source()));
        }
        sha256(content)
    }
}

/// All text patterns, keyed by (theme, function).
#[derive(Debug, Clone, Default)]
pub struct TextPatterns {
    patterns: Map<(String, String), (String, TextPattern)>,
}

impl TextPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a text pattern YAML document of the form:
    ///
    /// ```yaml
    /// supply:
    ///   slide_title: "{{ city }} supply"
    ///   area_distribution:
    ///     caption: "Unit: sets"
    ///     summaries:
    ///       - "Most supply is in the {{ top_bin }} band."
    /// ```
    ///
    /// A function may override its theme's `slide_title` with `title`.
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let themes = serde_yaml::from_str::<Map<String, ThemeDocument>>(content)?;
        let mut patterns = Self::new();
        for (theme, doc) in themes {
            for (function, f) in doc.functions {
                let title = f.title.as_ref().or(doc.slide_title.as_ref()).ok_or_else(|| {
                    Error::config(format!(
                        "text pattern {}/{} has no title and theme \"{}\" has no slide_title",
                        theme, function, theme
                    ))
                })?;
                patterns.register(TextPattern::new(
                    theme.as_str(),
                    function,
                    title,
                    f.caption.as_deref(),
                    f.summaries.as_slice(),
                )?)?;
            }
        }
        Ok(patterns)
    }

    /// Registers a pattern. Registering identical content under an existing
    /// key is a no-op; different content is an error.
    pub fn register(&mut self, pattern: TextPattern) -> Result<(), Error> {
        let key = (pattern.theme.clone(), pattern.function.clone());
        let hash = pattern.content_hash();
        if let Some((existing, _)) = self.patterns.get(&key) {
            if *existing == hash {
                debug!("Text pattern {}/{} already registered, skipping", key.0, key.1);
                return Ok(());
            }
            return Err(Error::DuplicateTextPattern(key.0, key.1));
        }
        debug!("Registered text pattern {}/{} ({})", key.0, key.1, hash);
        self.patterns.insert(key, (hash, pattern));
        Ok(())
    }

    /// Convenience method for constructing a set of patterns.
    pub fn with(mut self, pattern: TextPattern) -> Result<Self, Error> {
        self.register(pattern)?;
        Ok(self)
    }

    pub fn get(&self, theme: &str, function: &str) -> Option<&TextPattern> {
        self.patterns
            .get(&(theme.to_string(), function.to_string()))
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextPattern> {
        self.patterns.values().map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Renders one field of the pattern registered for (theme, function).
    /// `variant` only applies to [`TextField::Summary`].
    pub fn render(
        &self,
        theme: &str,
        function: &str,
        field: TextField,
        variables: &Map<String, Value>,
        variant: usize,
    ) -> Result<String, Error> {
        let pattern = self.get(theme, function).ok_or_else(|| {
            Error::config(format!("no text pattern for {}/{}", theme, function))
        })?;
        pattern.pattern(field, variant)?.render(variables)
    }
}

#[derive(Debug, Deserialize)]
struct ThemeDocument {
    #[serde(default)]
    slide_title: Option<String>,
    #[serde(flatten)]
    functions: Map<String, FunctionDocument>,
}

#[derive(Debug, Deserialize)]
struct FunctionDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "chart_caption")]
    caption: Option<String>,
    summaries: Vec<String>,
}
