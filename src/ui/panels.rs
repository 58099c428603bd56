use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::HOURS_PER_DAY;
use crate::data::loader::DataSource;
use crate::state::{AppState, LoadStatus};

// ---------------------------------------------------------------------------
// Left side panel – interactive inputs
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    ui.strong("Hour of day");
    let mut hour = state.hour.get();
    let slider = egui::Slider::new(&mut hour, 0..=(HOURS_PER_DAY as u8 - 1)).text("hour");
    if ui.add(slider).changed() {
        state.set_hour(i64::from(hour));
    }

    ui.checkbox(&mut state.show_raw_data, "Show raw data");
    ui.separator();

    ui.strong("Rows to load");
    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            egui::DragValue::new(&mut state.nrows_input)
                .range(0..=10_000_000)
                .speed(100),
        )
        .on_hover_text("0 loads every row");
        if ui.small_button("Apply").clicked() {
            state.set_nrows(state.nrows_input);
        }
    });
    ui.separator();

    if let Some(hist) = &state.histogram {
        ui.strong("Summary");
        ui.label(format!("{} pickups", hist.total()));
        if let Some(peak) = hist.peak() {
            ui.label(format!("Busiest hour: {peak} ({} pickups)", hist.count(peak)));
        }
        ui.label(format!(
            "{} pickups at {}",
            state.visible_rows.len(),
            state.hour
        ));
        ui.separator();
    }

    ui.strong("Cache");
    let stats = state.cache_stats();
    ui.label(format!("{} dataset(s) cached", state.cached_entries()));
    ui.label(format!(
        "{} hits, {} misses, {} mutations",
        stats.hits, stats.misses, stats.mutations
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let reload = if state.current_load_cached() {
                "Reload (cached)"
            } else {
                "Reload"
            };
            if ui.button(reload).clicked() {
                state.request_load();
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                state.clear_cache();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} at {}",
                ds.len(),
                state.visible_rows.len(),
                state.hour
            ));
            ui.separator();
        }

        if let Some(msg) = state.status.message() {
            let color = match state.status {
                LoadStatus::Failed(_) => Color32::RED,
                _ => ui.visuals().text_color(),
            };
            ui.label(RichText::new(msg).color(color));
        }

        if let Some(warning) = &state.cache_warning {
            ui.label(RichText::new(warning).color(Color32::YELLOW));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open pickup data")
        .add_filter("CSV files", &["csv", "gz"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Selected {}", path.display());
        state.set_source(DataSource::Local(path));
    }
}
