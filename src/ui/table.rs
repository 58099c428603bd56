use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Raw rows of the loaded dataset, virtualised so large loads stay cheap.
pub fn raw_data_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };

    ui.heading("Raw data");

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(48.0))
        .columns(Column::auto().at_least(96.0), ds.columns.len())
        .min_scrolled_height(0.0)
        .max_scroll_height(320.0)
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for col in &ds.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, ds.len(), |mut row| {
                let idx = row.index();
                row.col(|ui: &mut Ui| {
                    ui.label(idx.to_string());
                });
                for col in &ds.columns {
                    row.col(|ui: &mut Ui| {
                        let text = ds.cell(idx, col).map(|v| v.to_string()).unwrap_or_default();
                        ui.label(text);
                    });
                }
            });
        });
}
