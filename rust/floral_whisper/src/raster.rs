//! CPU Raster
//!
//! The pixel store behind the drawing surface: an RGBA8 image that dabs are
//! stamped into and that is encoded to PNG on export. The browser adapter
//! blits `as_rgba()` straight into `ImageData`.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::brush::BrushDab;
use crate::color::Rgba;

/// RGBA8 pixel grid, row-major, top-left origin
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Create a raster filled with opaque white
    ///
    /// Zero dimensions are raised to one pixel so the raster can always be
    /// encoded.
    pub fn new(width: u32, height: u32) -> Self {
        let mut raster = Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        };
        raster.fill(Rgba::WHITE);
        raster
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA bytes ready for `ImageData`
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Rgba) {
        for px in self.image.pixels_mut() {
            px.0 = [color.r, color.g, color.b, color.a];
        }
    }

    /// Whether every pixel equals `color`
    pub fn is_filled_with(&self, color: Rgba) -> bool {
        let expected = [color.r, color.g, color.b, color.a];
        self.image.pixels().all(|px| px.0 == expected)
    }

    /// Read one pixel; `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Rgba { r, g, b, a })
    }

    /// Stamp a round dab with a one-pixel anti-aliased edge
    ///
    /// Parts of the dab outside the raster are clipped. Dabs with a
    /// non-finite position or size are skipped.
    pub fn stamp(&mut self, dab: &BrushDab) {
        if !(dab.position[0].is_finite() && dab.position[1].is_finite() && dab.size.is_finite()) {
            return;
        }
        let radius = (dab.size * 0.5).max(0.5);
        let [cx, cy] = dab.position;

        let min_x = (cx - radius - 1.0).floor().max(0.0);
        let min_y = (cy - radius - 1.0).floor().max(0.0);
        let max_x = (cx + radius + 1.0).ceil().min(self.width() as f32);
        let max_y = (cy + radius + 1.0).ceil().min(self.height() as f32);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let src_alpha = dab.color.a as f32 / 255.0;
        for y in min_y as u32..max_y as u32 {
            for x in min_x as u32..max_x as u32 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let px = self.image.get_pixel_mut(x, y);
                px.0 = blend_over(px.0, dab.color, coverage * src_alpha);
            }
        }
    }

    /// Encode the raster as a PNG byte stream
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            self.image.as_raw(),
            self.width(),
            self.height(),
            ColorType::Rgba8,
        )?;
        Ok(bytes)
    }
}

/// Source-over blend of `color` at `alpha` onto a straight-alpha pixel
fn blend_over(dst: [u8; 4], color: Rgba, alpha: f32) -> [u8; 4] {
    let da = dst[3] as f32 / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= f32::EPSILON {
        return [0, 0, 0, 0];
    }

    let channel = |s: u8, d: u8| -> u8 {
        ((s as f32 * alpha + d as f32 * da * (1.0 - alpha)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    [
        channel(color.r, dst[0]),
        channel(color.g, dst[1]),
        channel(color.b, dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}
