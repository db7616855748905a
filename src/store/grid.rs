//! Dense tile store for bounded tile extents.

use std::sync::{Arc, Mutex};

use crate::cache::{LruCache, TileLruMember};
use crate::cancel::CancelToken;
use crate::raster::Raster;

use super::{TileGenerator, TileStore};

/// Dense 2D store indexed by tile coordinate.
///
/// Rows of members are allocated lazily on first touch, so a large image
/// that is only ever partially rendered pays for the rows it uses.
/// Requests outside the declared extent return `None` without error.
pub struct TileGrid {
    cache: Arc<LruCache>,
    min_tile_x: i32,
    min_tile_y: i32,
    tiles_x: usize,
    tiles_y: usize,
    rows: Mutex<Vec<Option<Vec<Option<Arc<TileLruMember>>>>>>,
}

impl TileGrid {
    /// Create a grid for the tile range starting at
    /// (`min_tile_x`, `min_tile_y`) spanning `tiles_x` × `tiles_y`.
    pub fn new(
        cache: Arc<LruCache>,
        min_tile_x: i32,
        min_tile_y: i32,
        tiles_x: usize,
        tiles_y: usize,
    ) -> Self {
        Self {
            cache,
            min_tile_x,
            min_tile_y,
            tiles_x,
            tiles_y,
            rows: Mutex::new(vec![None; tiles_y]),
        }
    }

    /// Grid indices for a tile coordinate, or `None` if out of range.
    fn index_of(&self, tile_x: i32, tile_y: i32) -> Option<(usize, usize)> {
        let gx = i64::from(tile_x) - i64::from(self.min_tile_x);
        let gy = i64::from(tile_y) - i64::from(self.min_tile_y);
        if gx < 0 || gy < 0 || gx >= self.tiles_x as i64 || gy >= self.tiles_y as i64 {
            return None;
        }
        Some((gx as usize, gy as usize))
    }

    /// The member at (tile_x, tile_y), creating it if asked.
    ///
    /// The rows lock covers only the member lookup, never generation, so
    /// concurrent pulls of different tiles proceed in parallel.
    fn member_at(&self, tile_x: i32, tile_y: i32, create: bool) -> Option<Arc<TileLruMember>> {
        let (gx, gy) = self.index_of(tile_x, tile_y)?;
        let mut rows = self.rows.lock().unwrap();
        let row = match &mut rows[gy] {
            Some(row) => row,
            slot @ None => {
                if !create {
                    return None;
                }
                slot.insert(vec![None; self.tiles_x])
            }
        };
        match &mut row[gx] {
            Some(member) => Some(member.clone()),
            slot @ None => {
                if !create {
                    return None;
                }
                let member = TileLruMember::new();
                *slot = Some(member.clone());
                Some(member)
            }
        }
    }
}

impl TileStore for TileGrid {
    fn set_tile(&self, tile_x: i32, tile_y: i32, raster: Arc<Raster>) {
        let Some(member) = self.member_at(tile_x, tile_y, true) else {
            return;
        };
        member.set_raster(raster);
        self.cache.add(member);
    }

    fn get_tile(
        &self,
        tile_x: i32,
        tile_y: i32,
        gen: &dyn TileGenerator,
        cancel: &CancelToken,
    ) -> Option<Arc<Raster>> {
        let member = self.member_at(tile_x, tile_y, true)?;

        if let Some(raster) = member.retrieve_raster() {
            self.cache.touch(member.as_ref());
            return Some(raster);
        }

        let raster = Arc::new(gen.gen_tile(tile_x, tile_y, cancel));
        if cancel.is_cancelled() {
            // A possibly-incomplete tile goes to the caller but never
            // into the cache.
            return Some(raster);
        }
        member.set_raster(raster.clone());
        self.cache.add(member);
        Some(raster)
    }

    fn get_tile_no_compute(&self, tile_x: i32, tile_y: i32) -> Option<Arc<Raster>> {
        self.member_at(tile_x, tile_y, false)?.retrieve_raster()
    }
}
