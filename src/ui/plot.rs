use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

use crate::color::HourColors;
use crate::data::filter::Hour;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Histogram of pickups per hour
// ---------------------------------------------------------------------------

pub fn hour_histogram(ui: &mut Ui, state: &AppState, colors: &HourColors) {
    let Some(hist) = &state.histogram else {
        return;
    };

    ui.heading("Number of pickups by hour");

    let bars: Vec<Bar> = hist
        .counts()
        .iter()
        .enumerate()
        .map(|(h, &count)| {
            let hour = Hour::clamped(h as i64);
            // Bucket h covers [h, h + 1).
            Bar::new(h as f64 + 0.5, count as f64)
                .width(0.95)
                .fill(colors.bar_color(hour, state.hour))
                .name(hour)
        })
        .collect();

    Plot::new("hour_histogram")
        .height(220.0)
        .x_axis_label("hour")
        .y_axis_label("pickups")
        .include_x(0.0)
        .include_x(24.0)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("pickups"));
        });
}

// ---------------------------------------------------------------------------
// Pickup map
// ---------------------------------------------------------------------------

/// Scatter of longitude/latitude for the rows at the selected hour.
pub fn pickup_map(ui: &mut Ui, state: &AppState, colors: &HourColors) {
    if state.dataset.is_none() {
        return;
    }

    ui.heading(format!("Map of all pickups at {}", state.hour));

    let points = state.map_points();
    if points.is_empty() {
        ui.label("No pickups with coordinates at this hour.");
        return;
    }

    // Longitude degrees shrink with cos(latitude).
    let mean_lat = points.iter().map(|p| p[1]).sum::<f64>() / points.len() as f64;
    let aspect = mean_lat.to_radians().cos().max(0.1) as f32;

    Plot::new("pickup_map")
        .height(420.0)
        .data_aspect(aspect)
        .x_axis_label("longitude")
        .y_axis_label("latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(1.5)
                    .color(colors.color_for(state.hour))
                    .name(state.hour),
            );
        });
}
