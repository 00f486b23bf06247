use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Series palette
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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous colour maps: normalised value → Color32
// ---------------------------------------------------------------------------

/// Number of discrete levels a colour map is sampled at.
pub const COLOR_LEVELS: usize = 64;

/// Names accepted by [`ColorMap::by_name`].
pub const COLORMAP_NAMES: &[&str] = &["viridis", "jet", "gray", "coolwarm", "hot"];

/// A named gradient that maps values in a range onto colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub name: String,
    stops: Vec<LinSrgb>,
}

impl ColorMap {
    pub fn by_name(name: &str) -> Result<Self> {
        let stops: &[(u8, u8, u8)] = match name {
            "viridis" => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            "jet" => &[
                (0, 0, 143),
                (0, 0, 255),
                (0, 255, 255),
                (255, 255, 0),
                (255, 0, 0),
                (128, 0, 0),
            ],
            "gray" => &[(0, 0, 0), (255, 255, 255)],
            "coolwarm" => &[(59, 76, 192), (221, 221, 221), (180, 4, 38)],
            "hot" => &[(10, 0, 0), (255, 0, 0), (255, 255, 0), (255, 255, 255)],
            other => {
                return Err(PlotError::InvalidOption(format!(
                    "unknown colormap '{other}' (expected one of {})",
                    COLORMAP_NAMES.join(", ")
                )))
            }
        };
        Ok(Self {
            name: name.to_string(),
            stops: stops
                .iter()
                .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
                .collect(),
        })
    }

    /// Colour at `t` in [0, 1], quantised to [`COLOR_LEVELS`] levels so
    /// drawing can batch samples by colour.
    pub fn sample(&self, t: f64) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let level = (t * (COLOR_LEVELS - 1) as f64).round() / (COLOR_LEVELS - 1) as f64;

        let segments = self.stops.len() - 1;
        let pos = level as f32 * segments as f32;
        let seg = (pos.floor() as usize).min(segments - 1);
        let mixed = self.stops[seg].mix(self.stops[seg + 1], pos - seg as f32);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Colour of `value` within `[min, max]`.
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Color32 {
        let span = max - min;
        if span.abs() < f64::EPSILON {
            return self.sample(0.5);
        }
        self.sample((value - min) / span)
    }

    /// Evenly spaced (value, colour) entries for a colour bar legend.
    pub fn legend_entries(&self, min: f64, max: f64, steps: usize) -> Vec<(f64, Color32)> {
        let steps = steps.max(2);
        (0..steps)
            .map(|i| {
                let t = i as f64 / (steps - 1) as f64;
                (min + (max - min) * t, self.sample(t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn colormap_endpoints() {
        let gray = ColorMap::by_name("gray").unwrap();
        assert_eq!(gray.sample(0.0), Color32::from_rgb(0, 0, 0));
        assert_eq!(gray.sample(1.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(gray.color_for(-5.0, 0.0, 1.0), gray.sample(0.0));
        assert_eq!(gray.color_for(3.0, 3.0, 3.0), gray.sample(0.5));
    }

    #[test]
    fn unknown_colormap_is_rejected() {
        assert!(matches!(
            ColorMap::by_name("rainbowish"),
            Err(PlotError::InvalidOption(_))
        ));
        for name in COLORMAP_NAMES {
            assert!(ColorMap::by_name(name).is_ok());
        }
    }

    #[test]
    fn legend_spans_the_range() {
        let cm = ColorMap::by_name("viridis").unwrap();
        let entries = cm.legend_entries(10.0, 20.0, 3);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, 10.0);
        assert_eq!(entries[2].0, 20.0);
    }
}
