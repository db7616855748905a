//! Interop with the `image` crate.
//!
//! Packed ARGB rasters convert losslessly to and from `RgbaImage`,
//! which is the convenient boundary for loading fixtures and dumping
//! render results in tests and embedding applications.

use image::RgbaImage;

use crate::error::RasterError;
use crate::geom::RectI;

use super::raster::Raster;

impl Raster {
    /// Build a packed raster from an `RgbaImage`, placing its top-left
    /// pixel at (`min_x`, `min_y`).
    pub fn from_rgba_image(img: &RgbaImage, min_x: i32, min_y: i32) -> Result<Raster, RasterError> {
        let (w, h) = img.dimensions();
        let bounds = RectI::new(min_x, min_y, w as i32, h as i32);
        let mut pixels = Vec::with_capacity(w as usize * h as usize);
        for p in img.pixels() {
            let [r, g, b, a] = p.0;
            pixels.push(
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32,
            );
        }
        Raster::from_packed_buffer(bounds, pixels)
    }

    /// Render this packed raster as an `RgbaImage`.
    ///
    /// Returns `None` for interleaved rasters, which have no canonical
    /// RGBA interpretation.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if !self.sample_model().is_packed() {
            return None;
        }
        let b = self.bounds();
        let mut img = RgbaImage::new(b.width as u32, b.height as u32);
        for y in b.y..b.max_y() {
            for x in b.x..b.max_x() {
                let argb = self.argb_at(x, y);
                img.put_pixel(
                    (x - b.x) as u32,
                    (y - b.y) as u32,
                    image::Rgba([
                        (argb >> 16) as u8,
                        (argb >> 8) as u8,
                        argb as u8,
                        (argb >> 24) as u8,
                    ]),
                );
            }
        }
        Some(img)
    }
}
