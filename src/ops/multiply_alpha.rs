//! Alpha multiplication of two sources.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::{copy_raster, Raster};

use super::pull_region;

struct MultiplyAlphaFill {
    src: Arc<TiledImage>,
    alpha_src: Arc<TiledImage>,
    premultiplied: bool,
}

impl RegionFill for MultiplyAlphaFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        if let Some(scratch) = pull_region(&self.src, region, cancel) {
            copy_raster(&scratch, dest);
        }
        // The node's bounds are the intersection of both sources, so a
        // pre-clipped region always lies inside the alpha image.
        let Some(alpha) = pull_region(&self.alpha_src, region, cancel) else {
            return;
        };

        let alpha_packed = alpha.sample_model().is_packed();

        for y in region.y..region.max_y() {
            for x in region.x..region.max_x() {
                // Coverage: the alpha band of a packed alpha image, the
                // single band of a mask.
                let a = if alpha_packed {
                    alpha.argb_at(x, y) >> 24
                } else {
                    alpha.sample(x, y, 0)
                };

                let p = dest.argb_at(x, y);
                let out_a = mul_div_255(p >> 24, a);
                let out = if self.premultiplied {
                    // Premultiplied color scales every band.
                    (out_a << 24)
                        | (mul_div_255((p >> 16) & 0xFF, a) << 16)
                        | (mul_div_255((p >> 8) & 0xFF, a) << 8)
                        | mul_div_255(p & 0xFF, a)
                } else {
                    (out_a << 24) | (p & 0x00FF_FFFF)
                };
                dest.set_argb(x, y, out);
            }
        }
    }
}

#[inline]
fn mul_div_255(v: u32, a: u32) -> u32 {
    (v * a + 127) / 255
}

/// `src` with its alpha scaled by the coverage of `alpha_src`.
///
/// The result covers the intersection of the two bounds; for a
/// premultiplied source color model the color bands scale along with
/// alpha, otherwise only the alpha band changes.
pub fn multiply_alpha(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    alpha_src: &Arc<TiledImage>,
) -> Result<Arc<TiledImage>, RasterError> {
    if !src.sample_model().is_packed() {
        return Err(RasterError::IncompatibleSampleModel {
            expected: "packed-argb".to_string(),
            actual: src.sample_model().describe(),
        });
    }

    let bounds = src.bounds().intersection(&alpha_src.bounds());
    if bounds.is_empty() {
        return Err(RasterError::EmptyBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }

    let tile_w = src.tile_width().min(bounds.width).max(1);
    let tile_h = src.tile_height().min(bounds.height).max(1);
    let mut geometry = ImageGeometry::like(src, bounds);
    geometry.sample_model = geometry.sample_model.with_size(tile_w, tile_h)?;

    let premultiplied = src.color_model().premultiplied;
    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone(), alpha_src.clone()],
        Box::new(MultiplyAlphaFill {
            src: src.clone(),
            alpha_src: alpha_src.clone(),
            premultiplied,
        }),
        StoreKind::Grid,
    )?))
}
