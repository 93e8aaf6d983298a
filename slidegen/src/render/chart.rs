use log::warn;

use super::{RenderStrategy, CHART_LEFT_FRAME, CHART_RIGHT_FRAME, CHART_SINGLE_FRAME};
use crate::{
    Axis, BarOptions, ChartSeries, ChartSpec, ChartType, ElementContent, Error, LineOptions, Rect,
    RoleData, SlideElement, SlideRenderConfig, StyleParams,
};

/// How many charts a layout places side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    Single,
    Double,
}

impl Columns {
    fn frames(&self) -> &'static [Rect] {
        match self {
            Self::Single => &[CHART_SINGLE_FRAME],
            Self::Double => &[CHART_LEFT_FRAME, CHART_RIGHT_FRAME],
        }
    }
}

/// Bar and line chart layouts. Data roles fill the chart frames in the
/// template's binding order.
#[derive(Debug, Clone, Copy)]
pub struct ChartStrategy {
    chart_type: ChartType,
    columns: Columns,
}

impl ChartStrategy {
    pub fn new(chart_type: ChartType, columns: Columns) -> Self {
        Self {
            chart_type,
            columns,
        }
    }

    fn chart(&self, role: &RoleData, style: &StyleParams) -> Result<ChartSpec, Error> {
        let data = role.data.as_series().ok_or_else(|| {
            Error::config(format!(
                "chart role \"{}\" needs series data, but dataset \"{}\" was shaped into a matrix",
                role.role, role.dataset
            ))
        })?;
        let series = data
            .series()
            .iter()
            .enumerate()
            .map(|(i, s)| ChartSeries {
                name: s.name.clone(),
                values: s.values.clone(),
                color: style.palette[i % style.palette.len()],
                axis: if i > 0 && style.secondary_axis {
                    Axis::Secondary
                } else {
                    Axis::Primary
                },
            })
            .collect();
        Ok(ChartSpec {
            chart_type: self.chart_type,
            categories: data.categories().to_vec(),
            series,
            font_name: style.font_name.clone(),
            font_size: style.font_size,
            show_legend: style.show_legend,
            show_data_labels: style.show_data_labels,
            show_x_axis: style.show_x_axis,
            show_y_axis: style.show_y_axis,
            value_axis_max: style.value_axis_max,
            bar: (self.chart_type == ChartType::Bar).then(|| BarOptions {
                gap_width: style.gap_width,
                overlap: style.overlap,
            }),
            line: (self.chart_type == ChartType::Line).then(|| LineOptions {
                line_width: style.line_width,
                smooth: style.smooth_lines,
                markers: style.has_markers,
            }),
        })
    }
}

impl RenderStrategy for ChartStrategy {
    fn content(&self, config: &SlideRenderConfig, page: usize) -> Result<Vec<SlideElement>, Error> {
        let frames = self.columns.frames();
        if config.data.len() < frames.len() {
            return Err(Error::config(format!(
                "layout {} places {} chart(s), but template \"{}\" binds {} data role(s)",
                config.layout_type,
                frames.len(),
                config.template_id,
                config.data.len()
            )));
        }
        for extra in &config.data[frames.len()..] {
            warn!(
                "Template {}: data role \"{}\" has no place in layout {}, ignoring",
                config.template_id, extra.role, config.layout_type
            );
        }
        frames
            .iter()
            .zip(&config.data)
            .map(|(frame, role)| {
                Ok(SlideElement {
                    page,
                    role: role.role.clone(),
                    frame: *frame,
                    content: ElementContent::Chart(self.chart(role, &config.style)?),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::super::test_support::*;
    use super::*;
    use crate::{Color, LayoutType};

    #[test]
    fn double_layout_fills_left_then_right() {
        let strategy = ChartStrategy::new(ChartType::Line, Columns::Double);
        let config = config(
            LayoutType::DoubleColumnLine,
            vec![
                ("left", series(&["x"])),
                ("right", series(&["y"])),
                ("spare", series(&["z"])),
            ],
        );
        let elements = strategy.content(&config, 1).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].role, "left");
        assert_eq!(elements[0].frame, CHART_LEFT_FRAME);
        assert_eq!(elements[1].role, "right");
        assert_eq!(elements[1].frame, CHART_RIGHT_FRAME);
        let chart = elements[0].content.as_chart().unwrap();
        assert!(chart.line.is_some());
        assert!(chart.bar.is_none());
    }

    #[test]
    fn too_few_roles_is_config_error() {
        let strategy = ChartStrategy::new(ChartType::Bar, Columns::Double);
        let config = config(LayoutType::DoubleColumnBar, vec![("left", series(&["x"]))]);
        assert!(matches!(strategy.content(&config, 1), Err(Error::Config(_))));
    }

    #[test]
    fn matrix_data_is_rejected() {
        let strategy = ChartStrategy::new(ChartType::Bar, Columns::Single);
        let config = config(LayoutType::SingleColumnBar, vec![("main", matrix())]);
        assert!(matches!(strategy.content(&config, 1), Err(Error::Config(_))));
    }

    #[test]
    fn series_map_to_colours_and_axes_in_order() {
        let strategy = ChartStrategy::new(ChartType::Bar, Columns::Single);
        let mut config = config(LayoutType::SingleColumnBar, vec![("main", series(&["a", "b", "c"]))]);
        config.style.secondary_axis = true;
        let elements = strategy.content(&config, 1).unwrap();
        let chart = elements[0].content.as_chart().unwrap();
        let colors = chart.series.iter().map(|s| s.color).collect::<Vec<_>>();
        assert_eq!(colors, vec![Color::ORANGE, Color::GREEN, Color::ORANGE]);
        let axes = chart.series.iter().map(|s| s.axis).collect::<Vec<_>>();
        assert_eq!(axes, vec![Axis::Primary, Axis::Secondary, Axis::Secondary]);
        assert_eq!(chart.bar.unwrap().gap_width, 150);

        config.style.secondary_axis = false;
        let elements = strategy.content(&config, 1).unwrap();
        let chart = elements[0].content.as_chart().unwrap();
        assert!(chart.series.iter().all(|s| s.axis == Axis::Primary));
    }
}
