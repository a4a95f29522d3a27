//! Encoded chart images handed to the presentation layer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Largest accepted chart width or height, in pixels.
pub const MAX_CHART_DIMENSION: u32 = 10_000;

/// Pixel size and density of rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            dpi: 100,
        }
    }
}

/// Colour assigned to one series label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

/// A rendered PNG plus its base64 text for inline embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub base64: String,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub legend: Vec<LegendEntry>,
}

impl ChartImage {
    pub fn from_png(
        png: Vec<u8>,
        width: u32,
        height: u32,
        dpi: u32,
        legend: Vec<LegendEntry>,
    ) -> Self {
        let base64 = STANDARD.encode(&png);
        Self {
            png,
            base64,
            width,
            height,
            dpi,
            legend,
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}
