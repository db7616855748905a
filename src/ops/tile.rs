//! Pattern tiling.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::Raster;

struct TileFill {
    /// The source pattern, rendered once at construction. Tiling reads
    /// it thousands of times, so paying one upfront render beats pulling
    /// through the source graph per output region.
    pattern: Raster,
}

impl RegionFill for TileFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, _cancel: &CancelToken) {
        let pat = self.pattern.bounds();
        let bands = dest.bands().min(self.pattern.bands());
        for y in region.y..region.max_y() {
            let sy = pat.y + (y - pat.y).rem_euclid(pat.height);
            for x in region.x..region.max_x() {
                let sx = pat.x + (x - pat.x).rem_euclid(pat.width);
                for b in 0..bands {
                    dest.set_sample(x, y, b, self.pattern.sample(sx, sy, b));
                }
            }
        }
    }
}

/// `src` repeated over `bounds`, wrapping in both directions.
///
/// Backed by a sparse tile map: tiled fills commonly cover very large
/// (conceptually unbounded) extents where a dense grid would waste
/// memory.
pub fn tile_pattern(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    bounds: RectI,
) -> Result<Arc<TiledImage>, RasterError> {
    let pattern = src.render()?;

    let geometry = ImageGeometry {
        bounds,
        color_model: *src.color_model(),
        sample_model: src
            .sample_model()
            .with_size(src.tile_width().min(bounds.width).max(1), src.tile_height().min(bounds.height).max(1))?,
        tile_grid_x_off: bounds.x,
        tile_grid_y_off: bounds.y,
    };

    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone()],
        Box::new(TileFill { pattern }),
        StoreKind::Map,
    )?))
}
