//! Per-image tile stores.
//!
//! A [`TileStore`] owns the mapping from tile coordinates to cache
//! members for one tiled image. Two implementations cover the two tile
//! extent shapes:
//!
//! - [`TileGrid`]: a dense 2D array sized to the image's tile extent;
//!   O(1) lookup, right when the extent is bounded and mostly populated.
//! - [`TileMap`]: a sparse hash map keyed by coordinate pair, for
//!   unbounded or very large extents where a dense array would waste
//!   memory.
//!
//! Both register every resident tile with the shared LRU cache, so one
//! global budget governs all stores vended by a
//! [`TileCacheContext`].
//!
//! # The generation seam
//!
//! Stores never know how pixels are made. On a genuine miss,
//! [`TileStore::get_tile`] calls the [`TileGenerator`] passed by the
//! owning image, the sole extension point the cache layer consumes.
//! Passing the generator per call (instead of storing a back-reference
//! to the image) keeps the store ↔ image relationship acyclic.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::raster::Raster;

mod grid;
mod map;

pub use grid::TileGrid;
pub use map::TileMap;

/// Produces one tile's pixel data for given tile-grid coordinates.
///
/// Implementations must return a fully valid raster, correctly sized and
/// positioned for the tile coordinate, and must be safe to call
/// redundantly: generation is a pure function of upstream state, so two
/// racing callers may both generate the same tile (last write wins).
pub trait TileGenerator: Send + Sync {
    /// Produce the tile at (`tile_x`, `tile_y`).
    ///
    /// If `cancel` fires mid-generation the returned raster may be
    /// incomplete; the store will not cache it.
    fn gen_tile(&self, tile_x: i32, tile_y: i32, cancel: &CancelToken) -> Raster;
}

/// Coordinate-indexed tile storage bound to the shared LRU cache.
pub trait TileStore: Send + Sync {
    /// Bind `raster` at (`tile_x`, `tile_y`) and mark it most recently
    /// used. Out-of-range coordinates are silently ignored.
    fn set_tile(&self, tile_x: i32, tile_y: i32, raster: Arc<Raster>);

    /// Fetch the tile, generating it through `gen` on a genuine miss.
    ///
    /// A tile generated after `cancel` fired is returned to the caller
    /// but not cached. Returns `None` only for out-of-range coordinates.
    fn get_tile(
        &self,
        tile_x: i32,
        tile_y: i32,
        gen: &dyn TileGenerator,
        cancel: &CancelToken,
    ) -> Option<Arc<Raster>>;

    /// Cache peek: the resident tile, or `None`. Never triggers
    /// generation and never promotes recency.
    fn get_tile_no_compute(&self, tile_x: i32, tile_y: i32) -> Option<Arc<Raster>>;
}

impl TileCacheContext {
    /// Vend a dense grid store covering the given tile-coordinate range,
    /// bound to this context's shared cache.
    pub fn tile_grid(
        &self,
        min_tile_x: i32,
        min_tile_y: i32,
        tiles_x: usize,
        tiles_y: usize,
    ) -> TileGrid {
        TileGrid::new(self.cache().clone(), min_tile_x, min_tile_y, tiles_x, tiles_y)
    }

    /// Vend a sparse map store bound to this context's shared cache.
    pub fn tile_map(&self) -> TileMap {
        TileMap::new(self.cache().clone())
    }
}
