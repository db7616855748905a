//! Tile geometry and the region-copy algorithms.

use std::sync::Arc;

use tracing::trace;

use crate::cache::TileCacheContext;
use crate::cancel::{CancelToken, RenderStatus};
use crate::error::RasterError;
use crate::geom::RectI;
use crate::raster::{copy_raster, ColorModel, Raster, SampleModel};
use crate::store::{TileGenerator, TileStore};

use super::block::{TileBlock, TileOccupancy};
use super::{ImageGeometry, RegionFill, StoreKind};

/// Geometry, format, and tile storage for one tiled image.
///
/// Owns the mapping between pixel space and tile space: tiles are
/// `tile_width` × `tile_height` cells of a grid whose cell (0, 0) has
/// its top-left corner at (`tile_grid_x_off`, `tile_grid_y_off`). The
/// pixel → tile mapping is a floor division, so it is well defined for
/// negative coordinates too.
pub struct TiledCore {
    bounds: RectI,
    color_model: ColorModel,
    sample_model: SampleModel,
    tile_grid_x_off: i32,
    tile_grid_y_off: i32,
    min_tile_x: i32,
    min_tile_y: i32,
    num_tiles_x: i32,
    num_tiles_y: i32,
    store: Box<dyn TileStore>,
}

impl TiledCore {
    /// Build the core for an image with the given geometry, creating its
    /// tile store against `ctx`'s shared cache.
    pub(crate) fn new(
        ctx: &Arc<TileCacheContext>,
        geometry: ImageGeometry,
        store_kind: StoreKind,
    ) -> Result<Self, RasterError> {
        let ImageGeometry {
            bounds,
            color_model,
            sample_model,
            tile_grid_x_off,
            tile_grid_y_off,
        } = geometry;

        if bounds.is_empty() {
            return Err(RasterError::EmptyBounds {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            });
        }

        let tile_w = sample_model.width();
        let tile_h = sample_model.height();
        let min_tile_x = (bounds.x - tile_grid_x_off).div_euclid(tile_w);
        let min_tile_y = (bounds.y - tile_grid_y_off).div_euclid(tile_h);
        let max_tile_x = (bounds.max_x() - 1 - tile_grid_x_off).div_euclid(tile_w);
        let max_tile_y = (bounds.max_y() - 1 - tile_grid_y_off).div_euclid(tile_h);
        let num_tiles_x = max_tile_x - min_tile_x + 1;
        let num_tiles_y = max_tile_y - min_tile_y + 1;

        let store: Box<dyn TileStore> = match store_kind {
            StoreKind::Grid => Box::new(ctx.tile_grid(
                min_tile_x,
                min_tile_y,
                num_tiles_x as usize,
                num_tiles_y as usize,
            )),
            StoreKind::Map => Box::new(ctx.tile_map()),
        };

        Ok(Self {
            bounds,
            color_model,
            sample_model,
            tile_grid_x_off,
            tile_grid_y_off,
            min_tile_x,
            min_tile_y,
            num_tiles_x,
            num_tiles_y,
            store,
        })
    }

    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    pub fn color_model(&self) -> &ColorModel {
        &self.color_model
    }

    pub fn sample_model(&self) -> &SampleModel {
        &self.sample_model
    }

    pub fn tile_width(&self) -> i32 {
        self.sample_model.width()
    }

    pub fn tile_height(&self) -> i32 {
        self.sample_model.height()
    }

    pub fn tile_grid_x_off(&self) -> i32 {
        self.tile_grid_x_off
    }

    pub fn tile_grid_y_off(&self) -> i32 {
        self.tile_grid_y_off
    }

    pub fn min_tile_x(&self) -> i32 {
        self.min_tile_x
    }

    pub fn min_tile_y(&self) -> i32 {
        self.min_tile_y
    }

    pub fn num_tiles_x(&self) -> i32 {
        self.num_tiles_x
    }

    pub fn num_tiles_y(&self) -> i32 {
        self.num_tiles_y
    }

    /// Tile column containing pixel column `x`.
    pub fn tile_x_of(&self, x: i32) -> i32 {
        (x - self.tile_grid_x_off).div_euclid(self.tile_width())
    }

    /// Tile row containing pixel row `y`.
    pub fn tile_y_of(&self, y: i32) -> i32 {
        (y - self.tile_grid_y_off).div_euclid(self.tile_height())
    }

    /// Pixel rectangle covered by the tile at (`tx`, `ty`).
    pub fn tile_rect(&self, tx: i32, ty: i32) -> RectI {
        RectI::new(
            tx * self.tile_width() + self.tile_grid_x_off,
            ty * self.tile_height() + self.tile_grid_y_off,
            self.tile_width(),
            self.tile_height(),
        )
    }

    pub(crate) fn store(&self) -> &dyn TileStore {
        self.store.as_ref()
    }

    /// A zero-filled full-size tile raster at (`tx`, `ty`). Edge tiles
    /// extend past the image bounds; the overhang stays zero.
    pub(crate) fn make_tile(&self, tx: i32, ty: i32) -> Raster {
        Raster::with_layout_of(self.tile_rect(tx, ty), &self.sample_model)
            .expect("tile geometry was validated at construction")
    }

    /// Generate one tile through `op`: a fresh tile raster with its
    /// bounds-clipped interior filled.
    pub(crate) fn gen_tile_with(
        &self,
        op: &dyn RegionFill,
        tx: i32,
        ty: i32,
        cancel: &CancelToken,
    ) -> Raster {
        let mut tile = self.make_tile(tx, ty);
        let region = tile.bounds().intersection(&self.bounds);
        if !region.is_empty() {
            op.fill_region(&mut tile, region, cancel);
        }
        tile
    }

    /// Clip a destination rectangle to the valid tile range, returning
    /// the inclusive tile span or `None` when nothing overlaps.
    fn tile_span(&self, dest: &RectI) -> Option<(i32, i32, i32, i32)> {
        let tx0 = self.tile_x_of(dest.x).max(self.min_tile_x);
        let ty0 = self.tile_y_of(dest.y).max(self.min_tile_y);
        let tx1 = self
            .tile_x_of(dest.max_x() - 1)
            .min(self.min_tile_x + self.num_tiles_x - 1);
        let ty1 = self
            .tile_y_of(dest.max_y() - 1)
            .min(self.min_tile_y + self.num_tiles_y - 1);
        if tx1 < tx0 || ty1 < ty0 {
            return None;
        }
        Some((tx0, ty0, tx1, ty1))
    }

    /// Two-pass region copy without block splitting.
    ///
    /// First pass blits every currently cached tile into `dest`; second
    /// pass computes (and caches) the rest one tile at a time. Simpler
    /// bookkeeping than the block path, at the cost of per-tile
    /// generation overhead.
    pub(crate) fn copy_to_raster(
        &self,
        dest: &mut Raster,
        op: &dyn RegionFill,
        cancel: &CancelToken,
    ) -> RenderStatus {
        let Some((tx0, ty0, tx1, ty1)) = self.tile_span(&dest.bounds()) else {
            return RenderStatus::Complete;
        };

        let xtiles = (tx1 - tx0 + 1) as usize;
        let ytiles = (ty1 - ty0 + 1) as usize;
        let mut got = vec![false; xtiles * ytiles];

        // Pick up the tiles that are just sitting in the cache.
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                if let Some(ras) = self.store.get_tile_no_compute(tx, ty) {
                    got[(tx - tx0) as usize + (ty - ty0) as usize * xtiles] = true;
                    copy_raster(&ras, dest);
                }
            }
        }

        // Compute the ones we still need.
        let gen = FillGenerator { core: self, op };
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                if got[(tx - tx0) as usize + (ty - ty0) as usize * xtiles] {
                    continue;
                }
                if let Some(ras) = self.store.get_tile(tx, ty, &gen, cancel) {
                    copy_raster(&ras, dest);
                }
                if cancel.is_cancelled() {
                    return RenderStatus::Cancelled;
                }
            }
        }

        RenderStatus::Complete
    }

    /// Region copy that batches uncached interior tiles into large
    /// region fills.
    ///
    /// Boundary tiles, those only partially overlapping `dest`, never
    /// join a block (a partial tile would break the occupancy bitmap's
    /// rectangular assumption) and go through the caching per-tile path
    /// instead. Interior tiles produced by a block fill are copied back
    /// out of `dest` and registered in the tile store, so later requests
    /// hit the cache.
    pub(crate) fn copy_to_raster_by_blocks(
        &self,
        dest: &mut Raster,
        op: &dyn RegionFill,
        cancel: &CancelToken,
    ) -> RenderStatus {
        let bounds = self.bounds;
        let dest_r = dest.bounds();

        let Some((tx0, ty0, tx1, ty1)) = self.tile_span(&dest_r) else {
            return RenderStatus::Complete;
        };

        let tile_w = self.tile_width();
        let tile_h = self.tile_height();

        // Narrow to the tiles that lie completely inside dest. A tile
        // sticking out of dest still counts as inside when the dest edge
        // is the image edge, because the overhang has no pixels to fill.
        let mut inside_tx0 = tx0;
        let mut inside_ty0 = ty0;
        let mut inside_tx1 = tx1;
        let mut inside_ty1 = ty1;

        if tx0 * tile_w + self.tile_grid_x_off < dest_r.x && bounds.x != dest_r.x {
            inside_tx0 += 1;
        }
        if ty0 * tile_h + self.tile_grid_y_off < dest_r.y && bounds.y != dest_r.y {
            inside_ty0 += 1;
        }
        if (tx1 + 1) * tile_w + self.tile_grid_x_off - 1 >= dest_r.max_x()
            && bounds.max_x() != dest_r.max_x()
        {
            inside_tx1 -= 1;
        }
        if (ty1 + 1) * tile_h + self.tile_grid_y_off - 1 >= dest_r.max_y()
            && bounds.max_y() != dest_r.max_y()
        {
            inside_ty1 -= 1;
        }

        let xtiles = inside_tx1 - inside_tx0 + 1;
        let ytiles = inside_ty1 - inside_ty0 + 1;
        let mut occupancy = (xtiles > 0 && ytiles > 0).then(|| {
            TileOccupancy::new(inside_tx0, inside_ty0, xtiles as usize, ytiles as usize)
        });

        let in_inside = |tx: i32, ty: i32| {
            tx >= inside_tx0 && tx <= inside_tx1 && ty >= inside_ty0 && ty <= inside_ty1
        };

        // Collect everything already in cache, recording interior hits
        // in the occupancy bitmap and boundary hits in visit order.
        let mut boundary_found = Vec::new();
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                let ras = self.store.get_tile_no_compute(tx, ty);
                let found = ras.is_some();
                match occupancy.as_mut() {
                    Some(occ) if in_inside(tx, ty) => occ.set(tx, ty, found),
                    _ => boundary_found.push(found),
                }
                if let Some(ras) = ras {
                    copy_raster(&ras, dest);
                }
            }
        }

        // Generate the interior misses in the largest possible chunks.
        if let Some(occ) = occupancy.take() {
            if let Some(blocks) = TileBlock::spanning(Arc::new(occ)).best_split() {
                trace!(
                    blocks = blocks.len(),
                    work = TileBlock::total_work(&blocks),
                    "generating uncached interior blocks"
                );
                for block in &blocks {
                    let rect = RectI::new(
                        block.tile_x() * tile_w + self.tile_grid_x_off,
                        block.tile_y() * tile_h + self.tile_grid_y_off,
                        block.width() as i32 * tile_w,
                        block.height() as i32 * tile_h,
                    )
                    .intersection(&bounds);
                    op.fill_region(dest, rect, cancel);

                    if cancel.is_cancelled() {
                        return RenderStatus::Cancelled;
                    }
                }
            }
        }

        // Register freshly generated interior tiles, and compute the
        // boundary tiles that were not in cache.
        let gen = FillGenerator { core: self, op };
        let mut idx = 0;
        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                if xtiles > 0 && ytiles > 0 && in_inside(tx, ty) {
                    if self.store.get_tile_no_compute(tx, ty).is_some() {
                        continue;
                    }

                    // dest is full in the interior now; carve the tile
                    // out of it so the cache benefits next time.
                    let mut tile = self.make_tile(tx, ty);
                    copy_raster(dest, &mut tile);
                    self.store.set_tile(tx, ty, Arc::new(tile));
                } else {
                    if boundary_found[idx] {
                        idx += 1;
                        continue;
                    }
                    idx += 1;

                    if let Some(ras) = self.store.get_tile(tx, ty, &gen, cancel) {
                        copy_raster(&ras, dest);
                    }
                    if cancel.is_cancelled() {
                        return RenderStatus::Cancelled;
                    }
                }
            }
        }

        RenderStatus::Complete
    }
}

/// Adapter presenting an operator as the store-facing tile generator.
struct FillGenerator<'a> {
    core: &'a TiledCore,
    op: &'a dyn RegionFill,
}

impl TileGenerator for FillGenerator<'_> {
    fn gen_tile(&self, tile_x: i32, tile_y: i32, cancel: &CancelToken) -> Raster {
        self.core.gen_tile_with(self.op, tile_x, tile_y, cancel)
    }
}
