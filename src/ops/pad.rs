//! Pad/crop to new bounds with a border policy.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::{copy_raster, Raster};

use super::pull_region;

/// What the area outside the source becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
    /// Transparent black.
    #[default]
    Zero,
    /// Nearest edge pixel, extended outward.
    Replicate,
    /// Wrapped tiling of the source. Renders as zero padding for now;
    /// TODO implement wrap-around sampling here instead of pointing
    /// callers at [`super::tile_pattern`].
    Wrap,
}

struct PadFill {
    src: Arc<TiledImage>,
    mode: PadMode,
}

impl RegionFill for PadFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        // The part covered by the source comes straight from it.
        if let Some(scratch) = pull_region(&self.src, region, cancel) {
            copy_raster(&scratch, dest);
        }

        match self.mode {
            PadMode::Zero | PadMode::Wrap => self.zero_borders(dest, region),
            PadMode::Replicate => self.replicate_borders(dest, region, cancel),
        }
    }
}

impl PadFill {
    /// Zero the part of `region` outside the source, split into four
    /// strips so each is one rectangular fill:
    ///
    /// ```text
    /// +--------------------+
    /// | 1        | 2       |
    /// |     +----+----+----|
    /// |     | source  | 4  |
    /// |-----+---------+    |
    /// | 3                  |
    /// +--------------------+
    /// ```
    fn zero_borders(&self, dest: &mut Raster, region: RectI) {
        let src_r = self.src.bounds();
        // Working rect: shrinks as each strip is painted.
        let mut ar = region;

        // Left strip.
        if ar.x < src_r.x {
            let w = (src_r.x - ar.x).min(ar.width);
            dest.zero_rect(RectI::new(ar.x, ar.y, w, ar.height));
            ar.x += w;
            ar.width -= w;
        }

        // Top strip.
        if ar.y < src_r.y {
            let h = (src_r.y - ar.y).min(ar.height);
            dest.zero_rect(RectI::new(ar.x, ar.y, ar.width, h));
            ar.y += h;
            ar.height -= h;
        }

        // Bottom strip.
        if ar.max_y() > src_r.max_y() {
            let h = (ar.max_y() - src_r.max_y()).min(ar.height);
            dest.zero_rect(RectI::new(ar.x, ar.max_y() - h, ar.width, h));
            ar.height -= h;
        }

        // Right strip.
        if ar.max_x() > src_r.max_x() {
            let w = (ar.max_x() - src_r.max_x()).min(ar.width);
            dest.zero_rect(RectI::new(ar.max_x() - w, ar.y, w, ar.height));
            ar.width -= w;
        }
    }

    /// Fill the part of `region` outside the source with the nearest
    /// source edge pixel.
    fn replicate_borders(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        let src_r = self.src.bounds();

        // The clamped projection of region onto the source: exactly the
        // rows and columns whose pixels get replicated.
        let px0 = region.x.clamp(src_r.x, src_r.max_x() - 1);
        let px1 = (region.max_x() - 1).clamp(src_r.x, src_r.max_x() - 1);
        let py0 = region.y.clamp(src_r.y, src_r.max_y() - 1);
        let py1 = (region.max_y() - 1).clamp(src_r.y, src_r.max_y() - 1);
        let projection = RectI::new(px0, py0, px1 - px0 + 1, py1 - py0 + 1);

        let Some(scratch) = pull_region(&self.src, projection, cancel) else {
            return;
        };
        let bands = dest.bands().min(scratch.bands());

        for y in region.y..region.max_y() {
            let sy = y.clamp(src_r.y, src_r.max_y() - 1);
            for x in region.x..region.max_x() {
                if src_r.contains(x, y) {
                    continue; // already copied from the source
                }
                let sx = x.clamp(src_r.x, src_r.max_x() - 1);
                for b in 0..bands {
                    dest.set_sample(x, y, b, scratch.sample(sx, sy, b));
                }
            }
        }
    }
}

/// `src` re-bounded to `bounds`, with `mode` deciding what the region
/// outside the source shows. Bounds smaller than the source devolve
/// into a crop.
pub fn pad(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    bounds: RectI,
    mode: PadMode,
) -> Result<Arc<TiledImage>, RasterError> {
    if bounds.is_empty() {
        return Err(RasterError::EmptyBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }

    // Keep the source's layout but stop tiles from dwarfing the result.
    let tile_w = src.tile_width().min(bounds.width).max(1);
    let tile_h = src.tile_height().min(bounds.height).max(1);
    let mut geometry = ImageGeometry::like(src, bounds);
    geometry.sample_model = geometry.sample_model.with_size(tile_w, tile_h)?;
    geometry.tile_grid_x_off = bounds.x;
    geometry.tile_grid_y_off = bounds.y;

    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone()],
        Box::new(PadFill {
            src: src.clone(),
            mode,
        }),
        StoreKind::Grid,
    )?))
}
