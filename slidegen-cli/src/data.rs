//! Datasets are read from record files on the file system and cached for the
//! rest of the run.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use eyre::{bail, Result, WrapErr};
use log::debug;
use slidegen::{Dataset, Map, Value};

type Records = Vec<Map<String, Value>>;

/// Loaded record files, keyed by canonical path.
#[derive(Debug, Default)]
pub struct DatasetCache {
    records: HashMap<PathBuf, Records>,
}

impl DatasetCache {
    /// Load the record file at the given path into a dataset, reusing the
    /// records if the same file was loaded before.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        path: P,
        category: Option<&str>,
        columns: Option<&[String]>,
    ) -> Result<Dataset> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .wrap_err_with(|| format!("failed to find dataset file {}", path.display()))?;
        let records = match self.records.get(&path) {
            Some(records) => {
                debug!("Using cached records for {}", path.display());
                records.clone()
            }
            None => {
                let records = load_records(&path)
                    .wrap_err_with(|| format!("failed to load dataset file {}", path.display()))?;
                debug!("Loaded {} records from {}", records.len(), path.display());
                self.records.insert(path.clone(), records.clone());
                records
            }
        };
        let dataset = Dataset::from_records(records, columns.map(<[String]>::to_vec))?;
        Ok(match category {
            Some(c) => dataset.with_category(c)?,
            None => dataset,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Load a list of records from the given JSON or YAML file.
fn load_records(path: &Path) -> Result<Records> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;
    Ok(match ext {
        "json" => serde_json::from_str(&content)?,
        "yml" | "yaml" => serde_yaml::from_str(&content)?,
        _ => bail!("cannot determine file type of file: {}", path.display()),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn records_are_cached_by_canonical_path() {
        let dir = std::env::temp_dir().join(format!("slidegen-data-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deals.yaml");
        fs::write(&path, "- {area: 10, sets: 2}\n- {area: 35, sets: 7}\n").unwrap();

        let mut cache = DatasetCache::default();
        let ds = cache.load(&path, Some("area"), None).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.category_column(), Some("area"));
        assert_eq!(ds.columns(), &["area".to_string(), "sets".to_string()]);

        let again = dir.join(".").join("deals.yaml");
        let columns = vec!["sets".to_string(), "area".to_string()];
        let ds = cache.load(&again, None, Some(&columns)).unwrap();
        assert_eq!(ds.columns(), columns.as_slice());
        assert_eq!(cache.len(), 1);

        fs::write(dir.join("deals.csv"), "area,sets\n").unwrap();
        assert!(cache.load(dir.join("deals.csv"), None, None).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
