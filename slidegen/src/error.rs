use std::path::PathBuf;

use thiserror::Error;

use crate::LayoutType;

/// The primary error type that can be produced by slidegen.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no template definition with id \"{0}\"")]
    TemplateNotFound(String),
    #[error("data role \"{role}\" expects dataset \"{dataset}\", but the context has no such dataset")]
    MissingDataset { role: String, dataset: String },
    #[error("schema error in dataset \"{dataset}\": {message}")]
    Schema { dataset: String, message: String },
    #[error("dataset \"{0}\" has no rows")]
    EmptyData(String),
    #[error("missing variable \"{0}\"")]
    MissingVariable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no render strategy registered for layout \"{0}\"")]
    UnsupportedLayout(LayoutType),
    #[error("failed to parse pattern \"{pattern}\": {reason}")]
    PatternSyntax { pattern: String, reason: String },
    #[error("template \"{0}\" is defined more than once")]
    DuplicateTemplate(String),
    #[error("text pattern {0} / {1} is already registered with different content")]
    DuplicateTextPattern(String, String),
    #[error("context already contains a dataset named \"{0}\"")]
    DuplicateDataset(String),
    #[error("context already contains a variable named \"{0}\"")]
    DuplicateVariable(String),
    #[error("failed to load definitions from {0}")]
    FailedToLoadDefinitions(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn schema<D, M>(dataset: D, message: M) -> Self
    where
        D: AsRef<str>,
        M: Into<String>,
    {
        Self::Schema {
            dataset: dataset.as_ref().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn config<M: Into<String>>(message: M) -> Self {
        Self::Config(message.into())
    }
}
