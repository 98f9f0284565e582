use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::series_palette;
use crate::data::model::Table;

/// At most this many numeric columns are charted.
pub const MAX_SERIES: usize = 2;

/// One charted column: a bar height per row, `None` where the cell is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The first [`MAX_SERIES`] numeric columns of `table`, in column order.
pub fn chart_series(table: &Table) -> Vec<Series> {
    table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .take(MAX_SERIES)
        .map(|c| Series {
            name: c.name.clone(),
            values: c
                .values
                .iter()
                .map(|v| v.as_f64().filter(|y| y.is_finite()))
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Grouped bar chart, x = row position. Draws nothing without numeric columns.
pub fn bar_chart(ui: &mut Ui, id: &str, table: &Table) {
    let series = chart_series(table);
    if series.is_empty() {
        return;
    }

    let colors = series_palette(series.len());
    let group_width = 0.8;
    let bar_width = group_width / series.len() as f64;

    Plot::new(("bar_chart", id))
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (s, color)) in series.iter().zip(colors).enumerate() {
                let offset = (i as f64 + 0.5) * bar_width - group_width / 2.0;
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, v)| {
                        v.map(|y| Bar::new(row as f64 + offset, y).width(bar_width))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(color));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn num(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Float(v)).collect()
    }

    #[test]
    fn picks_first_two_numeric_columns() {
        let table = Table::new(vec![
            Column::new("label", vec![CellValue::Text("a".into()), CellValue::Text("b".into())]),
            Column::new("x", num(&[1.0, 2.0])),
            Column::new("y", vec![CellValue::Integer(3), CellValue::Null]),
            Column::new("z", num(&[5.0, 6.0])),
        ])
        .unwrap();
        let series = chart_series(&table);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "x");
        assert_eq!(series[1], Series { name: "y".into(), values: vec![Some(3.0), None] });
    }

    #[test]
    fn no_numeric_columns_means_no_series() {
        let table = Table::new(vec![Column::new("t", vec![CellValue::Text("a".into())])]).unwrap();
        assert!(chart_series(&table).is_empty());
        assert!(chart_series(&Table::default()).is_empty());
    }

    #[test]
    fn non_finite_values_become_gaps() {
        let table = Table::new(vec![Column::new("x", num(&[f64::NAN, 1.0]))]).unwrap();
        assert_eq!(chart_series(&table)[0].values, vec![None, Some(1.0)]);
    }
}
