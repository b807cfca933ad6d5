//! Surface and font cell geometry.

use serde::{Deserialize, Serialize};

/// Drawable surface size in device pixels.
///
/// Width and height are always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    /// Build a viewport from host-supplied numbers, flooring and clamping
    /// every dimension to at least one pixel.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width: at_least_one(width),
            height: at_least_one(height),
            device_pixel_ratio: if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
                device_pixel_ratio as f32
            } else {
                1.0
            },
        }
    }

    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            device_pixel_ratio: 1.0,
        }
    }
}

fn at_least_one(v: f64) -> u32 {
    if !v.is_finite() {
        return 1;
    }
    v.floor().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Monospace cell size for one font size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    pub font_px: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl FontMetrics {
    pub fn new(font_px: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            font_px,
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }

    pub fn cell_width_f64(&self) -> f64 {
        f64::from(self.cell_width)
    }

    pub fn cell_height_f64(&self) -> f64 {
        f64::from(self.cell_height)
    }
}

impl Default for FontMetrics {
    /// Cell size of the default 14 px font before a real measurement.
    fn default() -> Self {
        Self::new(14, 8, 22)
    }
}

// ===================================================================
// Tests
// ===================================================================
