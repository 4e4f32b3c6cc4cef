use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Color mapping: source name → Color32
// ---------------------------------------------------------------------------

/// Maps each price source to a distinct, stable colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given sources (sorted, distinct).
    pub fn new(sources: &[String]) -> Self {
        let palette = generate_palette(sources.len());
        let mapping: BTreeMap<String, Color32> = sources
            .iter()
            .zip(palette.into_iter())
            .map(|(s, c): (&String, Color32)| (s.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given source.
    pub fn color_for(&self, source: &str) -> Color32 {
        self.mapping
            .get(source)
            .copied()
            .unwrap_or(self.default_color)
    }
}
