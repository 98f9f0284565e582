use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;

/// Render the first `rows` rows of `table` as a striped grid.
pub fn preview(ui: &mut Ui, id: &str, table: &Table, rows: usize) {
    if table.n_cols() == 0 {
        ui.weak("(no columns)");
        return;
    }
    let head = table.head(rows);

    ui.push_id(("preview", id), |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(TableColumn::auto().at_least(60.0), head.n_cols())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for col in head.columns() {
                        header.col(|ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in head.rows() {
                        body.row(ROW_HEIGHT, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    }
                });
        });
    });
}
