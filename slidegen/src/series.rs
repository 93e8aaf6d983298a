//! Normalized, chart- and table-ready data shapes.

use serde::Serialize;

use crate::Error;

/// Output of the data transformer: either category-labeled series (charts)
/// or a dense matrix with row and column headers (tables).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TransformedSeries {
    Series(SeriesSet),
    Matrix(Matrix),
}

impl TransformedSeries {
    pub fn as_series(&self) -> Option<&SeriesSet> {
        match self {
            Self::Series(s) => Some(s),
            Self::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Self::Matrix(m) => Some(m),
            Self::Series(_) => None,
        }
    }
}

/// A named sequence of numbers, one per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Ordered category labels paired with one or more series of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    categories: Vec<String>,
    series: Vec<Series>,
}

impl SeriesSet {
    /// Constructor. Every series must have one value per category.
    pub fn new(categories: Vec<String>, series: Vec<Series>) -> Result<Self, Error> {
        if let Some(bad) = series.iter().find(|s| s.values.len() != categories.len()) {
            return Err(Error::config(format!(
                "series \"{}\" has {} values for {} categories",
                bad.name,
                bad.values.len(),
                categories.len()
            )));
        }
        Ok(Self { categories, series })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Sum of all values in the named series.
    pub fn total(&self, name: &str) -> Option<f64> {
        self.get(name).map(|s| s.values.iter().sum())
    }
}

/// A dense 2-D matrix. Missing cells are zero, never absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    corner: String,
    rows: Vec<String>,
    columns: Vec<String>,
    cells: Vec<Vec<f64>>,
}

impl Matrix {
    /// Constructor. `cells` must be `rows.len()` rows of `columns.len()`
    /// values each.
    pub fn new(
        corner: String,
        rows: Vec<String>,
        columns: Vec<String>,
        cells: Vec<Vec<f64>>,
    ) -> Result<Self, Error> {
        let well_formed =
            cells.len() == rows.len() && cells.iter().all(|r| r.len() == columns.len());
        if !well_formed {
            return Err(Error::config(format!(
                "matrix cells do not match its {} x {} headers",
                rows.len(),
                columns.len()
            )));
        }
        Ok(Self {
            corner,
            rows,
            columns,
            cells,
        })
    }

    /// Label for the header cell above the row labels.
    pub fn corner(&self) -> &str {
        &self.corner
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(self.cells[r][c])
    }

    pub fn row_totals(&self) -> Vec<f64> {
        self.cells.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.columns.len())
            .map(|c| self.cells.iter().map(|r| r[c]).sum())
            .collect()
    }
}
