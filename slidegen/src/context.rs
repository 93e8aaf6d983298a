use log::debug;

use crate::{Dataset, Error, Map, Value};

/// Per-request container of named datasets and named variables.
///
/// A context is filled by the caller, then lent immutably to the builder for
/// the duration of a slide build. Names are unique: registering a dataset or
/// variable under a name that is already taken is an error.
#[derive(Debug, Clone, Default)]
pub struct PresentationContext {
    datasets: Map<String, Dataset>,
    variables: Map<String, Value>,
}

impl PresentationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given dataset to the context under the given name. The
    /// dataset takes on that name for error reporting.
    pub fn add_dataset<N: AsRef<str>>(&mut self, name: N, mut dataset: Dataset) -> Result<(), Error> {
        let name = name.as_ref();
        if self.datasets.contains_key(name) {
            return Err(Error::DuplicateDataset(name.to_string()));
        }
        dataset.set_name(name);
        debug!(
            "Context: added dataset {} ({} rows x {} columns)",
            name,
            dataset.len(),
            dataset.columns().len()
        );
        self.datasets.insert(name.to_string(), dataset);
        Ok(())
    }

    /// Adds a scalar variable for use in text patterns.
    pub fn add_variable<N, V>(&mut self, name: N, value: V) -> Result<(), Error>
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        let name = name.as_ref();
        if self.variables.contains_key(name) {
            return Err(Error::DuplicateVariable(name.to_string()));
        }
        let value = value.into();
        debug!("Context: added variable {} = {}", name, value);
        self.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Convenience method for constructing a context.
    pub fn with_dataset<N: AsRef<str>>(mut self, name: N, dataset: Dataset) -> Result<Self, Error> {
        self.add_dataset(name, dataset)?;
        Ok(self)
    }

    /// Convenience method for constructing a context.
    pub fn with_variable<N, V>(mut self, name: N, value: V) -> Result<Self, Error>
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        self.add_variable(name, value)?;
        Ok(self)
    }

    pub fn dataset<N: AsRef<str>>(&self, name: N) -> Option<&Dataset> {
        self.datasets.get(name.as_ref())
    }

    pub fn variable<N: AsRef<str>>(&self, name: N) -> Option<&Value> {
        self.variables.get(name.as_ref())
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut ctx = PresentationContext::new()
            .with_variable("city", "Beijing")
            .unwrap()
            .with_dataset("supply", Dataset::new(["area"]))
            .unwrap();
        assert!(matches!(
            ctx.add_variable("city", "Shanghai"),
            Err(Error::DuplicateVariable(name)) if name == "city"
        ));
        assert!(matches!(
            ctx.add_dataset("supply", Dataset::new(["price"])),
            Err(Error::DuplicateDataset(name)) if name == "supply"
        ));
        assert_eq!(ctx.variable("city"), Some(&Value::from("Beijing")));
    }

    #[test]
    fn datasets_take_their_context_name() {
        let ctx = PresentationContext::new()
            .with_dataset("supply", Dataset::new(["area"]))
            .unwrap();
        assert_eq!(ctx.dataset("supply").unwrap().name(), "supply");
        assert_eq!(ctx.dataset_names().collect::<Vec<_>>(), vec!["supply"]);
    }
}
