//! The cache participant wrapping one tile's raster.

use std::sync::{Arc, Mutex, Weak};

use crate::raster::Raster;

use super::lru::{LruParticipant, LruSlot};

/// Two-tier reference to one tile's pixel data.
struct TileRef {
    /// Guaranteed-resident tier; present while the member holds a cache
    /// slot (and again after a successful weak recovery).
    strong: Option<Arc<Raster>>,
    /// Best-effort tier; survives eviction and resolves for as long as
    /// any other owner keeps the raster alive.
    weak: Weak<Raster>,
}

/// Cache participant for a single tile.
///
/// While strongly referenced, the raster is retrievable in O(1). When
/// the cache evicts this member ([`LruParticipant::lru_remove`]), only
/// the weak tier survives: the pixel memory becomes reclaimable, but if
/// some consumer still holds the raster, the next
/// [`TileLruMember::retrieve_raster`] recovers it (promoting it back
/// to the strong tier) without recomputation. A failed recovery is not
/// an error; it simply means "must regenerate".
pub struct TileLruMember {
    slot: LruSlot,
    tile: Mutex<TileRef>,
}

impl TileLruMember {
    /// A member holding no tile.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: LruSlot::new(),
            tile: Mutex::new(TileRef {
                strong: None,
                weak: Weak::new(),
            }),
        })
    }

    /// Replace both tiers with a new raster.
    pub fn set_raster(&self, raster: Arc<Raster>) {
        let mut t = self.tile.lock().unwrap();
        t.weak = Arc::downgrade(&raster);
        t.strong = Some(raster);
    }

    /// Retrieve the tile raster if it is still reachable.
    ///
    /// Resolves the strong tier first; otherwise attempts the weak tier,
    /// promoting a successful upgrade back to strong. Returns `None` if
    /// the data has been reclaimed.
    pub fn retrieve_raster(&self) -> Option<Arc<Raster>> {
        let mut t = self.tile.lock().unwrap();
        if let Some(r) = &t.strong {
            return Some(r.clone());
        }
        match t.weak.upgrade() {
            Some(r) => {
                t.strong = Some(r.clone());
                Some(r)
            }
            None => None,
        }
    }

    /// True if a retrieve would currently succeed.
    pub fn has_raster(&self) -> bool {
        let t = self.tile.lock().unwrap();
        t.strong.is_some() || t.weak.upgrade().is_some()
    }
}

impl LruParticipant for TileLruMember {
    fn lru_slot(&self) -> &LruSlot {
        &self.slot
    }

    /// Eviction drops the strong tier only; the weak tier keeps the
    /// ghost recovery path open.
    fn lru_remove(&self) {
        self.tile.lock().unwrap().strong = None;
    }
}
