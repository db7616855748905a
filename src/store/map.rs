//! Sparse tile store for unbounded tile extents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{LruCache, TileLruMember};
use crate::cancel::CancelToken;
use crate::raster::Raster;

use super::{TileGenerator, TileStore};

/// Sparse store keyed by tile coordinate pair.
///
/// Same contract as [`super::TileGrid`], minus the bounds check: any
/// (x, y) is a valid key, which suits images whose tile extent is
/// unbounded or far too large for a dense array.
pub struct TileMap {
    cache: Arc<LruCache>,
    members: Mutex<HashMap<(i32, i32), Arc<TileLruMember>>>,
}

impl TileMap {
    /// Create an empty map bound to the given shared cache.
    pub fn new(cache: Arc<LruCache>) -> Self {
        Self {
            cache,
            members: Mutex::new(HashMap::new()),
        }
    }

    fn member_or_insert(&self, tile_x: i32, tile_y: i32) -> Arc<TileLruMember> {
        self.members
            .lock()
            .unwrap()
            .entry((tile_x, tile_y))
            .or_insert_with(TileLruMember::new)
            .clone()
    }

    fn member_peek(&self, tile_x: i32, tile_y: i32) -> Option<Arc<TileLruMember>> {
        self.members.lock().unwrap().get(&(tile_x, tile_y)).cloned()
    }
}

impl TileStore for TileMap {
    fn set_tile(&self, tile_x: i32, tile_y: i32, raster: Arc<Raster>) {
        let member = self.member_or_insert(tile_x, tile_y);
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
        let member = self.member_or_insert(tile_x, tile_y);

        if let Some(raster) = member.retrieve_raster() {
            self.cache.touch(member.as_ref());
            return Some(raster);
        }

        let raster = Arc::new(gen.gen_tile(tile_x, tile_y, cancel));
        if cancel.is_cancelled() {
            return Some(raster);
        }
        member.set_raster(raster.clone());
        self.cache.add(member);
        Some(raster)
    }

    fn get_tile_no_compute(&self, tile_x: i32, tile_y: i32) -> Option<Arc<Raster>> {
        self.member_peek(tile_x, tile_y)?.retrieve_raster()
    }
}
