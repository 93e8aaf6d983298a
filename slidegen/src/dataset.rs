//! Tabular datasets as handed over by the external data layer.

use serde::Serialize;

use crate::{Error, Map, Value};

/// An ordered sequence of rows sharing a fixed column schema.
///
/// One column may be designated as the category (index) column. Transforms
/// that need a category column fall back to it when none is given
/// explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    category: Option<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Constructor for an empty dataset with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Builds a dataset from a list of records.
    ///
    /// If `columns` is `None`, the column order is the order in which keys
    /// are first seen across the records. Keys missing from a record are
    /// filled with [`Value::Null`].
    pub fn from_records(
        records: Vec<Map<String, Value>>,
        columns: Option<Vec<String>>,
    ) -> Result<Self, Error> {
        let columns = columns.unwrap_or_else(|| {
            let mut seen = Vec::new();
            for record in &records {
                for key in record.keys() {
                    if !seen.contains(key) {
                        seen.push(key.clone());
                    }
                }
            }
            seen
        });
        let mut dataset = Self::new(columns);
        for mut record in records {
            let row = dataset
                .columns
                .iter()
                .map(|col| record.remove(col).unwrap_or_default())
                .collect();
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Designate the category column. Fails if no such column exists.
    pub fn with_category<C: AsRef<str>>(mut self, column: C) -> Result<Self, Error> {
        let column = column.as_ref();
        self.column_index(column)?;
        self.category = Some(column.to_string());
        Ok(self)
    }

    /// Convenience method for appending several rows at once.
    pub fn with_rows<R>(mut self, rows: R) -> Result<Self, Error>
    where
        R: IntoIterator<Item = Vec<Value>>,
    {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(self)
    }

    /// Append a row. Its arity must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), Error> {
        if row.len() != self.columns.len() {
            return Err(Error::schema(
                &self.name,
                format!(
                    "row {} has {} cells, but the dataset has {} columns",
                    self.rows.len(),
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name<N: Into<String>>(&mut self, name: N) {
        self.name = name.into();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn category_column(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column, or a schema error naming it.
    pub fn column_index(&self, column: &str) -> Result<usize, Error> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::schema(&self.name, format!("no column \"{}\"", column)))
    }

    /// The explicitly requested category column, or the designated one.
    pub fn resolve_category<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str, Error> {
        explicit
            .or_else(|| self.category_column())
            .ok_or_else(|| Error::schema(&self.name, "no category column designated"))
    }

    /// Fails with [`Error::EmptyData`] if there are no rows.
    pub(crate) fn ensure_not_empty(&self) -> Result<(), Error> {
        if self.is_empty() {
            Err(Error::EmptyData(self.name.clone()))
        } else {
            Ok(())
        }
    }

    /// Numeric value of a cell in a value column. Nulls count as zero.
    pub(crate) fn numeric_cell(&self, row: usize, col: usize) -> Result<f64, Error> {
        match &self.rows[row][col] {
            Value::Null => Ok(0.0),
            v => v.as_f64().ok_or_else(|| self.not_numeric(row, col, v)),
        }
    }

    pub(crate) fn not_numeric(&self, row: usize, col: usize, v: &Value) -> Error {
        Error::schema(
            &self.name,
            format!(
                "column \"{}\" is not numeric at row {} (found {} \"{}\")",
                self.columns[col],
                row,
                v.type_name(),
                v
            ),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn records_fill_missing_cells_with_null() {
        let ds = Dataset::from_records(
            vec![
                record(&[("area", 10.into()), ("sets", 2.into())]),
                record(&[("area", 30.into())]),
            ],
            Some(vec!["area".to_string(), "sets".to_string()]),
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[1], vec![Value::Signed(30), Value::Null]);
    }

    #[test]
    fn row_arity_is_checked() {
        let mut ds = Dataset::new(["a", "b"]);
        let err = ds.push_row(vec![1.into()]).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }), "{:?}", err);
    }

    #[test]
    fn category_must_exist() {
        let err = Dataset::new(["a"]).with_category("b").unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
        let ds = Dataset::new(["a"]).with_category("a").unwrap();
        assert_eq!(ds.resolve_category(None).unwrap(), "a");
        assert_eq!(ds.resolve_category(Some("x")).unwrap(), "x");
    }
}
