//! Constant-color leaf node.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::{ColorModel, Raster};

struct FloodFill {
    argb: u32,
}

impl RegionFill for FloodFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, _cancel: &CancelToken) {
        dest.fill_rect_argb(region, self.argb);
    }
}

/// An image of `bounds` filled with one packed ARGB color.
///
/// The cheapest possible source node; handy as the leaf of a filter
/// chain and as a deterministic fixture.
pub fn flood(
    ctx: &Arc<TileCacheContext>,
    bounds: RectI,
    argb: u32,
) -> Result<Arc<TiledImage>, RasterError> {
    let geometry = ImageGeometry::packed(bounds, ColorModel::ARGB, ctx.tile_size())?;
    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        Vec::new(),
        Box::new(FloodFill { argb }),
        StoreKind::Grid,
    )?))
}
