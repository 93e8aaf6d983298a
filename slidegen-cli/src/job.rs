//! Job files describe the decks to generate.
//!
//! ```yaml
//! decks:
//!   - name: beijing-2023
//!     variables:
//!       city: Beijing
//!     datasets:
//!       deals:
//!         path: data/deals.json
//!         category: area
//!     slides:
//!       - supply_by_area
//!       - template: price_table
//!         variables:
//!           block: Liangxiang
//! ```
//!
//! Dataset paths are relative to the job file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use serde::Deserialize;
use slidegen::{Map, PresentationContext, Value};

use crate::data::DatasetCache;

#[derive(Debug, Deserialize)]
pub struct Job {
    pub decks: Vec<Deck>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Deck {
    pub name: String,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub datasets: Map<String, DatasetSource>,
    pub slides: Vec<SlideRef>,
}

#[derive(Debug, Deserialize)]
pub struct DatasetSource {
    pub path: PathBuf,
    #[serde(default)]
    pub category: Option<String>,
    /// Column order. Defaults to the sorted record keys.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SlideRef {
    Template(String),
    Detailed {
        template: String,
        #[serde(default)]
        variables: Map<String, Value>,
    },
}

impl SlideRef {
    pub fn template(&self) -> &str {
        match self {
            Self::Template(t) => t,
            Self::Detailed { template, .. } => template,
        }
    }

    /// The deck context, extended with this slide's own variables if it has
    /// any.
    pub fn context(&self, deck: &PresentationContext) -> Result<PresentationContext> {
        let mut ctx = deck.clone();
        if let Self::Detailed { variables, .. } = self {
            for (name, value) in variables {
                ctx.add_variable(name, value.clone())?;
            }
        }
        Ok(ctx)
    }
}

impl Job {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read job file {}", path.display()))?;
        let mut job: Self = serde_yaml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse job file {}", path.display()))?;
        job.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(job)
    }

    /// Builds the presentation context for a deck: its variables and every
    /// dataset it names.
    pub fn context(&self, deck: &Deck, cache: &mut DatasetCache) -> Result<PresentationContext> {
        let mut ctx = PresentationContext::new();
        for (name, value) in &deck.variables {
            ctx.add_variable(name, value.clone())?;
        }
        for (name, source) in &deck.datasets {
            let dataset = cache
                .load(
                    self.base_dir.join(&source.path),
                    source.category.as_deref(),
                    source.columns.as_deref(),
                )
                .wrap_err_with(|| format!("deck {}: dataset {}", deck.name, name))?;
            ctx.add_dataset(name, dataset)?;
        }
        Ok(ctx)
    }
}
