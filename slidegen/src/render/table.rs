use log::warn;

use super::{RenderStrategy, TABLE_FRAME};
use crate::{
    ElementContent, Error, SlideElement, SlideRenderConfig, TableRow, TableSpec,
    TransformedSeries,
};

/// The single-table layout. Matrix data is laid out as is; series data
/// becomes one row per series with the categories as columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableStrategy;

fn table(data: &TransformedSeries) -> (Vec<String>, Vec<TableRow>) {
    match data {
        TransformedSeries::Matrix(m) => {
            let header = std::iter::once(m.corner().to_string())
                .chain(m.columns().iter().cloned())
                .collect();
            let rows = m
                .rows()
                .iter()
                .zip(m.cells())
                .map(|(label, cells)| TableRow {
                    label: label.clone(),
                    cells: cells.clone(),
                })
                .collect();
            (header, rows)
        }
        TransformedSeries::Series(s) => {
            let header = std::iter::once(String::new())
                .chain(s.categories().iter().cloned())
                .collect();
            let rows = s
                .series()
                .iter()
                .map(|series| TableRow {
                    label: series.name.clone(),
                    cells: series.values.clone(),
                })
                .collect();
            (header, rows)
        }
    }
}

impl RenderStrategy for TableStrategy {
    fn content(&self, config: &SlideRenderConfig, page: usize) -> Result<Vec<SlideElement>, Error> {
        let (main, rest) = config.data.split_first().ok_or_else(|| {
            Error::config(format!(
                "layout {} places a table, but template \"{}\" binds no data role",
                config.layout_type, config.template_id
            ))
        })?;
        for extra in rest {
            warn!(
                "Template {}: data role \"{}\" has no place in layout {}, ignoring",
                config.template_id, extra.role, config.layout_type
            );
        }
        let (header, rows) = table(&main.data);
        Ok(vec![SlideElement {
            page,
            role: main.role.clone(),
            frame: TABLE_FRAME,
            content: ElementContent::Table(TableSpec {
                header,
                rows,
                font_name: config.style.font_name.clone(),
                font_size: config.style.table_font_size,
            }),
        }])
    }
}
