use eframe::egui::{self, ScrollArea, Ui};

use crate::color::HourColors;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PickupExplorerApp {
    pub state: AppState,
    colors: HourColors,
    /// Set once the "Loading data…" frame has been shown.
    load_armed: bool,
}

impl PickupExplorerApp {
    pub fn new(config: &AppConfig) -> Self {
        let mut state = AppState::from_config(config);
        state.request_load();
        Self {
            state,
            colors: HourColors::default(),
            load_armed: false,
        }
    }

    /// Loads run one frame after being requested so the status line is
    /// painted before the (blocking) download starts.
    fn drive_load(&mut self, ctx: &egui::Context) {
        if self.load_armed {
            self.load_armed = false;
            self.state.load();
        } else if self.state.load_pending() {
            self.load_armed = true;
            ctx.request_repaint();
        }
    }
}

impl eframe::App for PickupExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_load(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: slider, checkbox, cache ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: histogram, map, raw data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(
                        self.state
                            .status
                            .message()
                            .unwrap_or_else(|| "No data loaded  (File → Open…)".into()),
                    );
                });
                return;
            }
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    plot::hour_histogram(ui, &self.state, &self.colors);
                    ui.separator();
                    plot::pickup_map(ui, &self.state, &self.colors);
                    if self.state.show_raw_data {
                        ui.separator();
                        table::raw_data_table(ui, &self.state);
                    }
                });
        });
    }
}
