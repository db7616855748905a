//! Affine resampling.

use std::sync::Arc;

use kurbo::{Affine, Point, Rect};

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::Raster;

use super::pull_region;

struct AffineFill {
    src: Arc<TiledImage>,
    inverse: Affine,
}

impl RegionFill for AffineFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        // One pull covers every source pixel this region can touch: the
        // inverse image of the region, grown a pixel for rounding.
        let back = self
            .inverse
            .transform_rect_bbox(to_kurbo(region));
        let needed = RectI::new(
            back.x0.floor() as i32 - 1,
            back.y0.floor() as i32 - 1,
            (back.width().ceil() as i32) + 3,
            (back.height().ceil() as i32) + 3,
        );
        let scratch = pull_region(&self.src, needed, cancel);
        let src_bounds = self.src.bounds();

        for y in region.y..region.max_y() {
            for x in region.x..region.max_x() {
                // Sample at the pixel center, nearest neighbor.
                let p = self.inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let sx = p.x.floor() as i32;
                let sy = p.y.floor() as i32;
                let argb = match &scratch {
                    Some(s) if src_bounds.contains(sx, sy) && s.bounds().contains(sx, sy) => {
                        s.argb_at(sx, sy)
                    }
                    _ => 0,
                };
                dest.set_argb(x, y, argb);
            }
        }
    }
}

fn to_kurbo(r: RectI) -> Rect {
    Rect::new(
        r.x as f64,
        r.y as f64,
        r.max_x() as f64,
        r.max_y() as f64,
    )
}

/// `src` resampled through `transform` (nearest neighbor).
///
/// The result bounds are the axis-aligned bounding box of the
/// transformed source bounds. Pixels mapping outside the source are
/// transparent.
///
/// # Errors
///
/// Rejects transforms with a (near-)zero determinant, which cannot be
/// inverted for sampling.
pub fn affine(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    transform: Affine,
) -> Result<Arc<TiledImage>, RasterError> {
    if transform.determinant().abs() < 1e-12 {
        return Err(RasterError::NonInvertibleTransform);
    }
    if !src.sample_model().is_packed() {
        return Err(RasterError::IncompatibleSampleModel {
            expected: "packed-argb".to_string(),
            actual: src.sample_model().describe(),
        });
    }

    let fwd = transform.transform_rect_bbox(to_kurbo(src.bounds()));
    let x0 = fwd.x0.floor() as i32;
    let y0 = fwd.y0.floor() as i32;
    let bounds = RectI::new(
        x0,
        y0,
        (fwd.x1.ceil() as i32 - x0).max(1),
        (fwd.y1.ceil() as i32 - y0).max(1),
    );

    // Out-of-source pixels render transparent, so the result always
    // carries alpha.
    let mut geometry = ImageGeometry::packed(bounds, *src.color_model(), ctx.tile_size())?;
    geometry.color_model.has_alpha = true;

    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone()],
        Box::new(AffineFill {
            src: src.clone(),
            inverse: transform.inverse(),
        }),
        StoreKind::Grid,
    )?))
}
