//! Coordinate translation.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::{copy_raster_offset, Raster};

use super::pull_region;

struct TranslateFill {
    src: Arc<TiledImage>,
    dx: i32,
    dy: i32,
}

impl RegionFill for TranslateFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        let src_region = region.translated(-self.dx, -self.dy);
        if let Some(scratch) = pull_region(&self.src, src_region, cancel) {
            copy_raster_offset(&scratch, dest, self.dx, self.dy);
        }
    }
}

/// `src` shifted by (`dx`, `dy`).
///
/// The tile grid shifts along with the bounds, so a translated image's
/// tiles line up one-to-one with its source's tiles.
pub fn translate(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    dx: i32,
    dy: i32,
) -> Result<Arc<TiledImage>, RasterError> {
    let mut geometry = ImageGeometry::like(src, src.bounds().translated(dx, dy));
    geometry.tile_grid_x_off += dx;
    geometry.tile_grid_y_off += dy;
    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone()],
        Box::new(TranslateFill {
            src: src.clone(),
            dx,
            dy,
        }),
        StoreKind::Grid,
    )?))
}
