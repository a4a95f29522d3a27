//! RGB pixel buffer with the handful of primitives the charts need.

use crate::domain::chart::Rgb;
use crate::domain::error::RenderError;

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

const INCHES_PER_METER: f64 = 39.3701;

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self, RenderError> {
        let area = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n.checked_mul(3).is_some())
            .ok_or(RenderError::InvalidDimensions { width, height })?;
        let pixels = [background.0, background.1, background.2].repeat(area);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[i] = color.0;
        self.pixels[i + 1] = color.1;
        self.pixels[i + 2] = color.2;
    }

    /// Fills pixels whose centres fall inside `[x0, x1) x [y0, y1)`.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        let (x0, x1) = (x0.min(x1).round() as i64, x0.max(x1).round() as i64);
        let (y0, y1) = (y0.min(y1).round() as i64, y0.max(y1).round() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, color);
            }
        }
    }

    pub fn hline(&mut self, x0: f64, x1: f64, y: f64, color: Rgb) {
        let y = y.round();
        self.fill_rect(x0, y, x1, y + 1.0, color);
    }

    pub fn vline(&mut self, x: f64, y0: f64, y1: f64, color: Rgb) {
        let x = x.round();
        self.fill_rect(x, y0, x + 1.0, y1, color);
    }

    /// Bresenham line stamped with a square brush of side `thickness`.
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: u32, color: Rgb) {
        let (mut x, mut y) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness as i64 / 2;

        loop {
            for oy in -half..=half {
                for ox in -half..=half {
                    self.set(x + ox, y + oy, color);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let r = radius.ceil() as i64;
        let (cx_i, cy_i) = (cx.round() as i64, cy.round() as i64);
        for oy in -r..=r {
            for ox in -r..=r {
                if ((ox * ox + oy * oy) as f64) <= radius * radius {
                    self.set(cx_i + ox, cy_i + oy, color);
                }
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, text: &str, scale: u32, color: Rgb) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        let s = scale as i64;
        for (i, c) in text.chars().enumerate() {
            let gx = x + i as i64 * (ADVANCE as i64) * s;
            for (row, bits) in font::glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = gx + col as i64 * s;
                    let py = y + row as i64 * s;
                    for oy in 0..s {
                        for ox in 0..s {
                            self.set(px + ox, py + oy, color);
                        }
                    }
                }
            }
        }
    }

    pub fn text_centered(&mut self, cx: f64, y: f64, text: &str, scale: u32, color: Rgb) {
        let w = font::text_width(text, scale) as f64;
        self.text(cx - w / 2.0, y, text, scale, color);
    }

    /// Right-aligned at `right`, vertically centred on `cy`.
    pub fn text_right(&mut self, right: f64, cy: f64, text: &str, scale: u32, color: Rgb) {
        let w = font::text_width(text, scale) as f64;
        let h = (GLYPH_HEIGHT * scale) as f64;
        self.text(right - w, cy - h / 2.0, text, scale, color);
    }

    /// Encodes as 8-bit RGB PNG with a pHYs chunk for `dpi`.
    pub fn encode_png(&self, dpi: u32) -> Result<Vec<u8>, RenderError> {
        let encode_err = |e: png::EncodingError| RenderError::Encode(e.to_string());
        let ppm = (dpi as f64 * INCHES_PER_METER).round() as u32;

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
            let mut writer = encoder.write_header().map_err(encode_err)?;
            writer.write_image_data(&self.pixels).map_err(encode_err)?;
            writer.finish().map_err(encode_err)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
impl Canvas {
    fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }
}
