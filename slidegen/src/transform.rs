//! Data transforms reshape a raw [`Dataset`] into a [`TransformedSeries`]
//! ready for a chart or a table.
//!
//! All aggregation happens in `f64`. Counts are floats too, so every series
//! has the same element type. Bins and cross-tab cells with no contributing
//! rows are zero rather than absent.

use std::{cmp::Ordering, collections::BTreeMap, collections::HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    value::format_number, Dataset, Error, Matrix, Series, SeriesSet, TransformedSeries, Value,
};

// Upper bound on the number of bins a single binning may produce.
const MAX_BIN_COUNT: i64 = 10_000;

const DEFAULT_BIN_LABEL: &str = "{lo}-{hi}";
const DEFAULT_OVERFLOW_LABEL: &str = "≥{lo}";
const MARGIN_LABEL: &str = "total";

/// The transform applied to one data binding of a template. Stated
/// explicitly in the template definition rather than inferred from the
/// layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Bin(BinSpec),
    Pivot(PivotSpec),
    CrossTab(CrossTabSpec),
    /// Use the dataset verbatim as a table.
    Passthrough,
}

impl Transform {
    pub fn apply(&self, dataset: &Dataset) -> Result<TransformedSeries, Error> {
        debug!(
            "Applying {} transform to dataset {} ({} rows)",
            self.kind(),
            dataset.name(),
            dataset.len()
        );
        match self {
            Self::Bin(spec) => bin_with(dataset, spec),
            Self::Pivot(spec) => {
                let index = dataset.resolve_category(spec.index.as_deref())?;
                pivot(dataset, index, spec.series.as_slice())
            }
            Self::CrossTab(spec) => cross_tab_with(dataset, spec),
            Self::Passthrough => passthrough(dataset),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bin(_) => "bin",
            Self::Pivot(_) => "pivot",
            Self::CrossTab(_) => "cross_tab",
            Self::Passthrough => "passthrough",
        }
    }
}

/// Parameters for [`bin_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Numeric column to partition. Defaults to the dataset's category
    /// column.
    #[serde(default)]
    pub column: Option<String>,
    /// Width of each half-open interval.
    pub size: f64,
    /// Columns summed within each bin, one output series each.
    pub values: Vec<String>,
    /// Label template with `{lo}` and `{hi}` placeholders.
    #[serde(default)]
    pub label: Option<String>,
    /// Keep this many bins and merge the rest into one overflow bin.
    #[serde(default)]
    pub max_bins: Option<usize>,
    /// Label template for the overflow bin, with a `{lo}` placeholder.
    #[serde(default)]
    pub overflow_label: Option<String>,
}

impl BinSpec {
    pub fn new<S: AsRef<str>>(size: f64, values: &[S]) -> Self {
        Self {
            column: None,
            size,
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
            label: None,
            max_bins: None,
            overflow_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSpec {
    /// Defaults to the dataset's category column.
    #[serde(default)]
    pub index: Option<String>,
    pub series: Vec<String>,
}

/// How cross-tab cells combine their contributing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Count,
    Mean,
    Min,
    Max,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self::Sum
    }
}

/// Optional binning of one cross-tab axis before grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBin {
    pub size: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Parameters for [`cross_tab_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabSpec {
    pub row: String,
    pub column: String,
    /// Not needed for [`Aggregation::Count`].
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub agg: Aggregation,
    #[serde(default)]
    pub row_bin: Option<AxisBin>,
    #[serde(default)]
    pub column_bin: Option<AxisBin>,
    /// Append a `total` row and column holding sums of the matrix.
    #[serde(default)]
    pub margins: bool,
}

/// Partitions `category_column` into intervals `[k*bin_size, (k+1)*bin_size)`
/// and sums each of `value_columns` within each interval.
pub fn bin<S: AsRef<str>>(
    dataset: &Dataset,
    bin_size: f64,
    category_column: &str,
    value_columns: &[S],
) -> Result<TransformedSeries, Error> {
    let mut spec = BinSpec::new(bin_size, value_columns);
    spec.column = Some(category_column.to_string());
    bin_with(dataset, &spec)
}

/// Binning with the full set of options.
///
/// Bins run contiguously from the lowest to the highest observed bin, with
/// empty bins in between included as zero. Bins outside the observed range
/// are omitted.
pub fn bin_with(dataset: &Dataset, spec: &BinSpec) -> Result<TransformedSeries, Error> {
    let category = dataset.resolve_category(spec.column.as_deref())?;
    let cat_idx = dataset.column_index(category)?;
    let value_idx = spec
        .values
        .iter()
        .map(|c| dataset.column_index(c))
        .collect::<Result<Vec<usize>, Error>>()?;
    dataset.ensure_not_empty()?;
    let binning = Binning::new(spec.size, spec.label.as_deref())?;

    let mut sums: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (r, row) in dataset.rows().iter().enumerate() {
        let x = finite_number(dataset, r, cat_idx)?;
        let acc = sums
            .entry(binning.index(x))
            .or_insert_with(|| vec![0.0; value_idx.len()]);
        for (slot, &c) in acc.iter_mut().zip(&value_idx) {
            *slot += dataset.numeric_cell(r, c)?;
        }
    }
    let (first, last) = match (sums.keys().next(), sums.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(Error::EmptyData(dataset.name().to_string())),
    };
    if last - first >= MAX_BIN_COUNT {
        return Err(Error::config(format!(
            "bin size {} over dataset \"{}\" would produce more than {} bins",
            spec.size,
            dataset.name(),
            MAX_BIN_COUNT
        )));
    }

    let mut bins: Vec<i64> = (first..=last).collect();
    let mut columns: Vec<Vec<f64>> = (0..value_idx.len())
        .map(|i| {
            bins.iter()
                .map(|k| sums.get(k).map_or(0.0, |v| v[i]))
                .collect()
        })
        .collect();
    let mut categories: Vec<String> = bins.iter().map(|&k| binning.label(k)).collect();

    if let Some(max) = spec.max_bins {
        if max == 0 {
            return Err(Error::config("max_bins must be at least 1"));
        }
        if bins.len() > max {
            let lo = binning.lower(bins[max]);
            let template = spec
                .overflow_label
                .as_deref()
                .unwrap_or(DEFAULT_OVERFLOW_LABEL);
            bins.truncate(max);
            categories.truncate(max);
            categories.push(template.replace("{lo}", &format_number(lo)));
            for column in columns.iter_mut() {
                let merged: f64 = column.drain(max..).sum();
                column.push(merged);
            }
        }
    }

    let series = spec
        .values
        .iter()
        .zip(columns)
        .map(|(name, values)| Series {
            name: name.clone(),
            values,
        })
        .collect();
    Ok(TransformedSeries::Series(SeriesSet::new(categories, series)?))
}

/// One series per entry of `series_columns`; categories are the distinct
/// values of `index_column` in source order. Rows sharing an index value are
/// summed.
pub fn pivot<S: AsRef<str>>(
    dataset: &Dataset,
    index_column: &str,
    series_columns: &[S],
) -> Result<TransformedSeries, Error> {
    let index_idx = dataset.column_index(index_column)?;
    let series_idx = series_columns
        .iter()
        .map(|c| dataset.column_index(c.as_ref()))
        .collect::<Result<Vec<usize>, Error>>()?;
    dataset.ensure_not_empty()?;

    let mut categories: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); series_idx.len()];
    for (r, row) in dataset.rows().iter().enumerate() {
        let label = row[index_idx].to_string();
        let pos = match positions.get(&label) {
            Some(&pos) => pos,
            None => {
                positions.insert(label.clone(), categories.len());
                categories.push(label);
                values.iter_mut().for_each(|v| v.push(0.0));
                categories.len() - 1
            }
        };
        for (column, &c) in values.iter_mut().zip(&series_idx) {
            column[pos] += dataset.numeric_cell(r, c)?;
        }
    }

    let series = series_columns
        .iter()
        .zip(values)
        .map(|(name, values)| Series {
            name: name.as_ref().to_string(),
            values,
        })
        .collect();
    Ok(TransformedSeries::Series(SeriesSet::new(categories, series)?))
}

/// Groups rows by (`row_key`, `col_key`) and aggregates `value_column` into a
/// dense matrix.
pub fn cross_tab(
    dataset: &Dataset,
    row_key: &str,
    col_key: &str,
    value_column: Option<&str>,
    agg: Aggregation,
) -> Result<TransformedSeries, Error> {
    cross_tab_with(
        dataset,
        &CrossTabSpec {
            row: row_key.to_string(),
            column: col_key.to_string(),
            value: value_column.map(str::to_string),
            agg,
            row_bin: None,
            column_bin: None,
            margins: false,
        },
    )
}

/// Cross-tabulation with the full set of options.
///
/// Axis labels follow first-seen order unless the axis is binned (ascending
/// by lower bound) or every label is numeric or ISO date-like (ascending).
pub fn cross_tab_with(dataset: &Dataset, spec: &CrossTabSpec) -> Result<TransformedSeries, Error> {
    let row_idx = dataset.column_index(&spec.row)?;
    let col_idx = dataset.column_index(&spec.column)?;
    let value_idx = match (&spec.value, spec.agg) {
        (Some(v), _) => Some(dataset.column_index(v)?),
        (None, Aggregation::Count) => None,
        (None, agg) => {
            return Err(Error::config(format!(
                "{:?} aggregation over dataset \"{}\" requires a value column",
                agg,
                dataset.name()
            )))
        }
    };
    dataset.ensure_not_empty()?;

    let mut rows = Axis::new(axis_binning(spec.row_bin.as_ref())?);
    let mut cols = Axis::new(axis_binning(spec.column_bin.as_ref())?);
    let mut cells: HashMap<(usize, usize), Accumulator> = HashMap::new();
    for (r, row) in dataset.rows().iter().enumerate() {
        let ri = rows.position(dataset, r, row_idx)?;
        let ci = cols.position(dataset, r, col_idx)?;
        let acc = cells.entry((ri, ci)).or_default();
        match value_idx {
            None => acc.count += 1,
            Some(v) => match &row[v] {
                Value::Null => {}
                cell => {
                    let x = cell.as_f64().ok_or_else(|| dataset.not_numeric(r, v, cell))?;
                    acc.push(x);
                }
            },
        }
    }

    let row_order = rows.order();
    let col_order = cols.order();
    let mut matrix: Vec<Vec<f64>> = row_order
        .iter()
        .map(|ri| {
            col_order
                .iter()
                .map(|ci| cells.get(&(*ri, *ci)).map_or(0.0, |a| a.finish(spec.agg)))
                .collect()
        })
        .collect();
    let mut row_labels: Vec<String> = row_order.iter().map(|&i| rows.labels[i].clone()).collect();
    let mut col_labels: Vec<String> = col_order.iter().map(|&i| cols.labels[i].clone()).collect();

    if spec.margins {
        for row in matrix.iter_mut() {
            let total = row.iter().sum();
            row.push(total);
        }
        let totals = (0..=col_labels.len())
            .map(|c| matrix.iter().map(|r| r[c]).sum())
            .collect();
        matrix.push(totals);
        row_labels.push(MARGIN_LABEL.to_string());
        col_labels.push(MARGIN_LABEL.to_string());
    }

    Ok(TransformedSeries::Matrix(Matrix::new(
        spec.row.clone(),
        row_labels,
        col_labels,
        matrix,
    )?))
}

/// Uses the dataset verbatim as a table: the category column (or the first
/// column, if none is designated) gives the row labels, every other column
/// becomes a numeric matrix column.
pub fn passthrough(dataset: &Dataset) -> Result<TransformedSeries, Error> {
    let label_column = match dataset.category_column() {
        Some(c) => c,
        None => dataset
            .columns()
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::schema(dataset.name(), "dataset has no columns"))?,
    };
    let label_idx = dataset.column_index(label_column)?;
    dataset.ensure_not_empty()?;

    let value_idx: Vec<usize> = (0..dataset.columns().len())
        .filter(|&c| c != label_idx)
        .collect();
    let mut labels = Vec::with_capacity(dataset.len());
    let mut cells = Vec::with_capacity(dataset.len());
    for (r, row) in dataset.rows().iter().enumerate() {
        labels.push(row[label_idx].to_string());
        cells.push(
            value_idx
                .iter()
                .map(|&c| dataset.numeric_cell(r, c))
                .collect::<Result<Vec<f64>, Error>>()?,
        );
    }
    let columns = value_idx
        .iter()
        .map(|&c| dataset.columns()[c].clone())
        .collect();
    Ok(TransformedSeries::Matrix(Matrix::new(
        label_column.to_string(),
        labels,
        columns,
        cells,
    )?))
}

fn finite_number(dataset: &Dataset, row: usize, col: usize) -> Result<f64, Error> {
    let cell = &dataset.rows()[row][col];
    cell.as_f64()
        .filter(|x| x.is_finite())
        .ok_or_else(|| dataset.not_numeric(row, col, cell))
}

fn axis_binning(bin: Option<&AxisBin>) -> Result<Option<Binning<'_>>, Error> {
    bin.map(|b| Binning::new(b.size, b.label.as_deref()))
        .transpose()
}

/// Fixed-width half-open intervals.
struct Binning<'a> {
    size: f64,
    label: &'a str,
}

impl<'a> Binning<'a> {
    fn new(size: f64, label: Option<&'a str>) -> Result<Self, Error> {
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::config(format!(
                "bin size must be a positive number, got {}",
                size
            )));
        }
        Ok(Self {
            size,
            label: label.unwrap_or(DEFAULT_BIN_LABEL),
        })
    }

    fn index(&self, x: f64) -> i64 {
        // The epsilon keeps values sitting exactly on a boundary from
        // falling into the lower bin through division error.
        ((x / self.size) + 1e-9).floor() as i64
    }

    fn lower(&self, k: i64) -> f64 {
        ((k as f64 * self.size) * 1e9).round() / 1e9
    }

    fn label(&self, k: i64) -> String {
        self.label
            .replace("{lo}", &format_number(self.lower(k)))
            .replace("{hi}", &format_number(self.lower(k + 1)))
    }
}

/// Distinct labels of one cross-tab axis, in first-seen order.
struct Axis<'a> {
    binning: Option<Binning<'a>>,
    labels: Vec<String>,
    raw: Vec<Value>,
    bins: Vec<i64>,
    positions: HashMap<String, usize>,
}

impl<'a> Axis<'a> {
    fn new(binning: Option<Binning<'a>>) -> Self {
        Self {
            binning,
            labels: Vec::new(),
            raw: Vec::new(),
            bins: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn position(&mut self, dataset: &Dataset, row: usize, col: usize) -> Result<usize, Error> {
        let cell = &dataset.rows()[row][col];
        let (label, bin) = match &self.binning {
            Some(b) => {
                let k = b.index(finite_number(dataset, row, col)?);
                (b.label(k), k)
            }
            None => (cell.to_string(), 0),
        };
        if let Some(&pos) = self.positions.get(&label) {
            return Ok(pos);
        }
        let pos = self.labels.len();
        self.positions.insert(label.clone(), pos);
        self.labels.push(label);
        self.raw.push(cell.clone());
        self.bins.push(bin);
        Ok(pos)
    }

    /// Display order of the labels, as indices into first-seen order.
    fn order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.labels.len()).collect();
        if self.binning.is_some() {
            order.sort_by_key(|&i| self.bins[i]);
            return order;
        }
        let numeric: Option<Vec<f64>> = self.raw.iter().map(numeric_key).collect();
        if let Some(keys) = numeric {
            order.sort_by(|&a, &b| keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal));
        } else if self.raw.iter().all(|v| v.as_str().map_or(false, is_date_like)) {
            order.sort_by(|&a, &b| self.labels[a].cmp(&self.labels[b]));
        }
        order
    }
}

fn numeric_key(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
fn is_date_like(s: &str) -> bool {
    let b = s.as_bytes();
    let digits = |from: usize, to: usize| b[from..to].iter().all(u8::is_ascii_digit);
    match b.len() {
        4 => digits(0, 4),
        7 => digits(0, 4) && b[4] == b'-' && digits(5, 7),
        10 => digits(0, 4) && b[4] == b'-' && digits(5, 7) && b[7] == b'-' && digits(8, 10),
        _ => false,
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.min = Some(self.min.map_or(x, |m| m.min(x)));
        self.max = Some(self.max.map_or(x, |m| m.max(x)));
    }

    fn finish(&self, agg: Aggregation) -> f64 {
        match agg {
            Aggregation::Sum => self.sum,
            Aggregation::Count => self.count as f64,
            Aggregation::Mean if self.count > 0 => self.sum / self.count as f64,
            Aggregation::Mean => 0.0,
            Aggregation::Min => self.min.unwrap_or(0.0),
            Aggregation::Max => self.max.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dataset(columns: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        let mut ds = Dataset::new(columns.iter().copied())
            .with_rows(rows)
            .unwrap();
        ds.set_name("test");
        ds
    }

    fn series(result: &TransformedSeries) -> &SeriesSet {
        result.as_series().expect("expected series output")
    }

    fn matrix(result: &TransformedSeries) -> &Matrix {
        result.as_matrix().expect("expected matrix output")
    }

    #[test]
    fn binning_fills_gaps_inside_observed_range() {
        let ds = dataset(
            &["area", "sets"],
            vec![
                vec![0.into(), 5.into()],
                vec![20.into(), 3.into()],
                vec![35.into(), 7.into()],
                vec![61.into(), 2.into()],
            ],
        );
        let result = bin(&ds, 20.0, "area", &["sets"]).unwrap();
        let s = series(&result);
        assert_eq!(s.categories(), &["0-20", "20-40", "40-60", "60-80"]);
        assert_eq!(s.get("sets").unwrap().values, vec![5.0, 10.0, 0.0, 2.0]);
    }

    #[test]
    fn binning_conserves_totals() {
        let areas = [-13.5, 0.0, 4.2, 19.99, 20.0, 88.0, 142.7, 143.0, 55.5];
        let sets = [1, 4, 2, 8, 3, 5, 7, 6, 9];
        let ds = dataset(
            &["area", "sets", "trades"],
            areas
                .iter()
                .zip(sets.iter())
                .map(|(&a, &s)| vec![a.into(), s.into(), (s * 2).into()])
                .collect(),
        );
        for size in [1.0, 7.5, 20.0, 500.0] {
            let result = bin(&ds, size, "area", &["sets", "trades"]).unwrap();
            let s = series(&result);
            assert_eq!(s.total("sets"), Some(45.0), "bin size {}", size);
            assert_eq!(s.total("trades"), Some(90.0), "bin size {}", size);
        }
    }

    #[test]
    fn bin_labels_are_contiguous() {
        let ds = dataset(
            &["price"],
            vec![vec![0.25.into()], vec![1.7.into()], vec![(-0.5).into()]],
        );
        let spec = BinSpec {
            column: Some("price".into()),
            label: Some("[{lo}, {hi})".into()),
            ..BinSpec::new::<&str>(0.5, &[])
        };
        let result = bin_with(&ds, &spec).unwrap();
        assert_eq!(
            series(&result).categories(),
            &["[-0.5, 0)", "[0, 0.5)", "[0.5, 1)", "[1, 1.5)", "[1.5, 2)"]
        );
    }

    #[test]
    fn binning_compacts_long_tail() {
        let ds = dataset(
            &["area", "sets"],
            (0..6).map(|i| vec![(i * 20).into(), 1.into()]).collect(),
        );
        let spec = BinSpec {
            column: Some("area".into()),
            label: Some("{lo}-{hi}m²".into()),
            max_bins: Some(3),
            overflow_label: Some("≥{lo}m²".into()),
            ..BinSpec::new(20.0, &["sets"])
        };
        let result = bin_with(&ds, &spec).unwrap();
        let s = series(&result);
        assert_eq!(s.categories(), &["0-20m²", "20-40m²", "40-60m²", "≥60m²"]);
        assert_eq!(s.get("sets").unwrap().values, vec![1.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn binning_failures() {
        let ds = dataset(&["area", "sets"], vec![vec!["big".into(), 1.into()]]);
        assert!(matches!(
            bin(&ds, 20.0, "area", &["sets"]),
            Err(Error::Schema { .. })
        ));
        assert!(matches!(
            bin(&ds, 20.0, "area", &["missing"]),
            Err(Error::Schema { .. })
        ));
        assert!(matches!(
            bin(&ds, 0.0, "area", &["sets"]),
            Err(Error::Config(_))
        ));
        let empty = dataset(&["area", "sets"], vec![]);
        assert!(matches!(
            bin(&empty, 20.0, "area", &["sets"]),
            Err(Error::EmptyData(name)) if name == "test"
        ));
    }

    #[test]
    fn all_zero_series_is_valid() {
        let ds = dataset(
            &["area", "sets"],
            vec![vec![1.into(), Value::Null], vec![45.into(), 0.into()]],
        );
        let result = bin(&ds, 20.0, "area", &["sets"]).unwrap();
        assert_eq!(series(&result).get("sets").unwrap().values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn pivot_keeps_source_order_and_sums_duplicates() {
        let ds = dataset(
            &["month", "supply", "trade"],
            vec![
                vec!["2023-03".into(), 1.into(), 2.into()],
                vec!["2023-01".into(), 3.into(), 4.into()],
                vec!["2023-03".into(), 5.into(), 6.into()],
            ],
        );
        let result = pivot(&ds, "month", &["supply", "trade"]).unwrap();
        let s = series(&result);
        assert_eq!(s.categories(), &["2023-03", "2023-01"]);
        assert_eq!(s.get("supply").unwrap().values, vec![6.0, 3.0]);
        assert_eq!(s.get("trade").unwrap().values, vec![8.0, 4.0]);
    }

    #[test]
    fn cross_tab_first_seen_order_and_zero_fill() {
        let ds = dataset(
            &["district", "type", "sets"],
            vec![
                vec!["north".into(), "villa".into(), 2.into()],
                vec!["south".into(), "flat".into(), 5.into()],
                vec!["north".into(), "flat".into(), 1.into()],
                vec!["north".into(), "villa".into(), 4.into()],
            ],
        );
        let result = cross_tab(&ds, "district", "type", Some("sets"), Aggregation::Sum).unwrap();
        let m = matrix(&result);
        assert_eq!(m.rows(), &["north", "south"]);
        assert_eq!(m.columns(), &["villa", "flat"]);
        assert_eq!(m.cells(), &[vec![6.0, 1.0], vec![0.0, 5.0]]);
        assert_eq!(m.corner(), "district");
    }

    #[test]
    fn cross_tab_totals_match_direct_aggregation() {
        let rows: Vec<Vec<Value>> = (0..30)
            .map(|i| {
                vec![
                    ((i * 7) % 5).into(),
                    format!("c{}", (i * 3) % 4).into(),
                    (i as f64 * 1.5).into(),
                ]
            })
            .collect();
        let ds = dataset(&["r", "c", "v"], rows.clone());
        let result = cross_tab(&ds, "r", "c", Some("v"), Aggregation::Sum).unwrap();
        let m = matrix(&result);

        let mut by_row: BTreeMap<String, f64> = BTreeMap::new();
        let mut by_col: BTreeMap<String, f64> = BTreeMap::new();
        for row in &rows {
            let v = row[2].as_f64().unwrap();
            *by_row.entry(row[0].to_string()).or_default() += v;
            *by_col.entry(row[1].to_string()).or_default() += v;
        }
        for (label, total) in m.rows().iter().zip(m.row_totals()) {
            assert_eq!(by_row[label], total, "row {}", label);
        }
        for (label, total) in m.columns().iter().zip(m.column_totals()) {
            assert_eq!(by_col[label], total, "column {}", label);
        }
        // Numeric row labels sort ascending.
        assert_eq!(m.rows(), &["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn cross_tab_orders_dates_and_counts_rows() {
        let ds = dataset(
            &["month", "kind"],
            vec![
                vec!["2023-02".into(), "a".into()],
                vec!["2022-12".into(), "b".into()],
                vec!["2023-02".into(), "a".into()],
            ],
        );
        let result = cross_tab(&ds, "month", "kind", None, Aggregation::Count).unwrap();
        let m = matrix(&result);
        assert_eq!(m.rows(), &["2022-12", "2023-02"]);
        assert_eq!(m.get("2023-02", "a"), Some(2.0));
        assert_eq!(m.get("2022-12", "a"), Some(0.0));
        assert!(matches!(
            cross_tab(&ds, "month", "kind", None, Aggregation::Mean),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn cross_tab_with_binned_axes_and_margins() {
        let ds = dataset(
            &["area", "price"],
            vec![
                vec![95.into(), 4.2.into()],
                vec![12.into(), 1.1.into()],
                vec![55.into(), 1.9.into()],
                vec![18.into(), 4.9.into()],
            ],
        );
        let spec = CrossTabSpec {
            row: "area".into(),
            column: "price".into(),
            value: None,
            agg: Aggregation::Count,
            row_bin: Some(AxisBin {
                size: 40.0,
                label: None,
            }),
            column_bin: Some(AxisBin {
                size: 2.0,
                label: Some("{lo}-{hi}M".into()),
            }),
            margins: true,
        };
        let result = cross_tab_with(&ds, &spec).unwrap();
        let m = matrix(&result);
        assert_eq!(m.rows(), &["0-40", "40-80", "80-120", "total"]);
        assert_eq!(m.columns(), &["0-2M", "4-6M", "total"]);
        assert_eq!(m.get("0-40", "0-2M"), Some(1.0));
        assert_eq!(m.get("0-40", "4-6M"), Some(1.0));
        assert_eq!(m.get("total", "total"), Some(4.0));
    }

    #[test]
    fn passthrough_uses_category_as_row_labels() {
        let ds = dataset(
            &["metric", "2022", "2023"],
            vec![
                vec!["supply".into(), 10.into(), 12.5.into()],
                vec!["trade".into(), Value::Null, 9.into()],
            ],
        )
        .with_category("metric")
        .unwrap();
        let result = passthrough(&ds).unwrap();
        let m = matrix(&result);
        assert_eq!(m.rows(), &["supply", "trade"]);
        assert_eq!(m.columns(), &["2022", "2023"]);
        assert_eq!(m.cells(), &[vec![10.0, 12.5], vec![0.0, 9.0]]);
    }

    #[test]
    fn transforms_deserialize_from_yaml() {
        let t: Transform = serde_yaml::from_str(
            "kind: cross_tab\nrow: area\ncolumn: price\nagg: count\nrow_bin:\n  size: 20\n",
        )
        .unwrap();
        match t {
            Transform::CrossTab(spec) => {
                assert_eq!(spec.agg, Aggregation::Count);
                assert_eq!(spec.row_bin.unwrap().size, 20.0);
            }
            other => panic!("unexpected transform: {:?}", other),
        }
        let t: Transform = serde_yaml::from_str("kind: passthrough\n").unwrap();
        assert_eq!(t, Transform::Passthrough);
    }
}
