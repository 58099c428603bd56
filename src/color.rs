use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::filter::{Hour, HOURS_PER_DAY};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    generate_palette_with(n, 0.75, 0.55)
}

fn generate_palette_with(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Hour colours
// ---------------------------------------------------------------------------

/// One colour per hour of day, with muted variants for unselected bars.
#[derive(Debug, Clone)]
pub struct HourColors {
    vivid: Vec<Color32>,
    muted: Vec<Color32>,
}

impl Default for HourColors {
    fn default() -> Self {
        Self {
            vivid: generate_palette(HOURS_PER_DAY),
            muted: generate_palette_with(HOURS_PER_DAY, 0.25, 0.45),
        }
    }
}

impl HourColors {
    /// Colour for bars and map points of `hour`.
    pub fn color_for(&self, hour: Hour) -> Color32 {
        self.vivid[usize::from(hour.get())]
    }

    /// Bar colour for `hour` when `selected` is the active hour.
    pub fn bar_color(&self, hour: Hour, selected: Hour) -> Color32 {
        if hour == selected {
            self.color_for(hour)
        } else {
            self.muted[usize::from(hour.get())]
        }
    }
}
