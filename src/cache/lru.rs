//! Fixed-capacity least-recently-used cache of tile slots.
//!
//! The cache holds opaque participants ([`LruParticipant`]) rather than
//! tile data directly, so eviction policy stays decoupled from what a
//! slot actually retains. Slots live in an arena: a flat `Vec` of nodes
//! linked by indices, split into a recency-ordered "used" list and a
//! "free" list. A participant keeps its own slot index in an [`LruSlot`]
//! handle, which is what makes `add`/`touch`/`remove` O(1) without any
//! pointer-linked intrusive nodes.
//!
//! # Eviction
//!
//! When `add` finds no free slot it silently rebinds the
//! least-recently-used slot, invoking the outgoing participant's
//! [`LruParticipant::lru_remove`] release hook. The hook is the only
//! eviction signal; for tile members it downgrades the tile raster from
//! its strong tier to its weak tier rather than discarding it outright.
//!
//! # Thread Safety
//!
//! All list mutations are serialized by one mutex per cache, so the list
//! structure is never corrupted by concurrent callers. The surrounding
//! generate-then-cache sequence in the tile stores is deliberately not
//! atomic; see the crate-level concurrency notes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

/// Sentinel index for "no node".
const NIL: usize = usize::MAX;

// =============================================================================
// Participant Interface
// =============================================================================

/// A participant's handle to the cache slot it currently occupies.
///
/// The handle is written only under the owning cache's lock; reads from
/// other paths just observe whether the participant is linked.
#[derive(Debug)]
pub struct LruSlot(AtomicUsize);

impl LruSlot {
    /// A fresh, unlinked handle.
    pub fn new() -> Self {
        Self(AtomicUsize::new(NIL))
    }

    fn get(&self) -> Option<usize> {
        match self.0.load(Ordering::Acquire) {
            NIL => None,
            i => Some(i),
        }
    }

    fn set(&self, index: usize) {
        self.0.store(index, Ordering::Release);
    }

    fn clear(&self) {
        self.0.store(NIL, Ordering::Release);
    }

    /// True while the participant occupies a cache slot.
    pub fn is_linked(&self) -> bool {
        self.get().is_some()
    }
}

impl Default for LruSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// An object eligible to occupy one slot of an [`LruCache`].
pub trait LruParticipant: Send + Sync {
    /// The slot handle the cache links through.
    fn lru_slot(&self) -> &LruSlot;

    /// Release hook: invoked (under the cache lock) when this
    /// participant's slot is evicted, flushed, or shrunk away. The
    /// participant should drop whatever the slot was retaining for it.
    fn lru_remove(&self);
}

// =============================================================================
// Cache Statistics
// =============================================================================

/// A snapshot of cache occupancy, as returned by [`LruCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of slots currently bound to a participant.
    pub resident: usize,
    /// Total slot capacity.
    pub capacity: usize,
    /// Participants evicted through the release hook since creation.
    pub evictions: u64,
}

// =============================================================================
// LRU Cache
// =============================================================================

/// Arena node. `prev`/`next` link the used list (doubly) or the free
/// list (singly, through `next`).
struct Node {
    prev: usize,
    next: usize,
    member: Option<Arc<dyn LruParticipant>>,
}

struct LruState {
    nodes: Vec<Node>,
    free_head: usize,
    /// Most recently used end.
    used_head: usize,
    /// Least recently used end.
    used_tail: usize,
    used_len: usize,
}

/// Fixed-capacity LRU cache over [`LruParticipant`]s.
///
/// Every operation is a total function over the cache state: nothing
/// here fails, and operations on absent participants are no-ops.
pub struct LruCache {
    state: Mutex<LruState>,
    evictions: AtomicU64,
}

impl LruCache {
    /// Create a cache with `capacity` slots, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LruState::with_capacity(capacity)),
            evictions: AtomicU64::new(0),
        }
    }

    /// Insert or refresh a participant.
    ///
    /// Already-cached participants move to the most-recently-used
    /// position. Otherwise a free slot is bound, or the least recently
    /// used slot is evicted (release hook fires) and rebound. On a
    /// zero-capacity cache this is a no-op.
    pub fn add(&self, participant: Arc<dyn LruParticipant>) {
        let mut s = self.state.lock().unwrap();

        if let Some(i) = participant.lru_slot().get() {
            s.unlink_used(i);
            s.push_mru(i);
            return;
        }

        let slot = match s.pop_free() {
            Some(i) => i,
            None => match s.pop_lru() {
                Some(i) => {
                    if let Some(old) = s.nodes[i].member.take() {
                        old.lru_slot().clear();
                        old.lru_remove();
                        let n = self.evictions.fetch_add(1, Ordering::Relaxed) + 1;
                        trace!(evictions = n, "evicted least-recently-used tile slot");
                    }
                    i
                }
                None => return,
            },
        };

        participant.lru_slot().set(slot);
        s.nodes[slot].member = Some(participant);
        s.push_mru(slot);
    }

    /// Promote a cached participant to most-recently-used. No-op if the
    /// participant is not cached.
    pub fn touch(&self, participant: &dyn LruParticipant) {
        let mut s = self.state.lock().unwrap();
        if let Some(i) = participant.lru_slot().get() {
            s.unlink_used(i);
            s.push_mru(i);
        }
    }

    /// Unbind a participant, returning its slot to the free list.
    ///
    /// The release hook does not fire: removal is an explicit caller
    /// decision, not an eviction. No-op if the participant is absent.
    pub fn remove(&self, participant: &dyn LruParticipant) {
        let mut s = self.state.lock().unwrap();
        if let Some(i) = participant.lru_slot().get() {
            s.nodes[i].member = None;
            participant.lru_slot().clear();
            s.unlink_used(i);
            s.push_free(i);
        }
    }

    /// Evict every resident participant through the release hook.
    pub fn flush(&self) {
        let mut s = self.state.lock().unwrap();
        while let Some(i) = s.pop_lru() {
            if let Some(old) = s.nodes[i].member.take() {
                old.lru_slot().clear();
                old.lru_remove();
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
            s.push_free(i);
        }
    }

    /// Resize the cache to `capacity` slots.
    ///
    /// Growing adds free slots. Shrinking evicts from the
    /// least-recently-used end (release hooks fire) until the surviving
    /// participants fit, preserving their relative recency.
    ///
    /// The arena is rebuilt rather than spliced; resizing is rare and
    /// O(capacity) keeps the index bookkeeping trivial.
    pub fn set_size(&self, capacity: usize) {
        let mut s = self.state.lock().unwrap();

        // Surviving members, most recent first.
        let mut members = Vec::with_capacity(s.used_len);
        let mut i = s.used_head;
        while i != NIL {
            if let Some(m) = &s.nodes[i].member {
                members.push(m.clone());
            }
            i = s.nodes[i].next;
        }

        let keep = members.len().min(capacity);
        for evicted in members.split_off(keep) {
            evicted.lru_slot().clear();
            evicted.lru_remove();
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        *s = LruState::with_capacity(capacity);
        // Re-link survivors least-recent-first so recency order is kept.
        for m in members.into_iter().rev() {
            let slot = s.pop_free().expect("rebuilt arena has room for survivors");
            m.lru_slot().set(slot);
            s.nodes[slot].member = Some(m);
            s.push_mru(slot);
        }

        trace!(capacity, "tile cache resized");
    }

    /// Number of slots currently bound to a participant.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().used_len
    }

    /// True if no participant is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slot capacity.
    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    /// Occupancy and eviction counters.
    pub fn stats(&self) -> CacheStats {
        let s = self.state.lock().unwrap();
        CacheStats {
            resident: s.used_len,
            capacity: s.nodes.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl LruState {
    fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity);
        for i in 0..capacity {
            nodes.push(Node {
                prev: NIL,
                next: if i + 1 < capacity { i + 1 } else { NIL },
                member: None,
            });
        }
        Self {
            nodes,
            free_head: if capacity > 0 { 0 } else { NIL },
            used_head: NIL,
            used_tail: NIL,
            used_len: 0,
        }
    }

    fn pop_free(&mut self) -> Option<usize> {
        if self.free_head == NIL {
            return None;
        }
        let i = self.free_head;
        self.free_head = self.nodes[i].next;
        self.nodes[i].next = NIL;
        Some(i)
    }

    fn push_free(&mut self, i: usize) {
        self.nodes[i].prev = NIL;
        self.nodes[i].next = self.free_head;
        self.free_head = i;
    }

    fn push_mru(&mut self, i: usize) {
        self.nodes[i].prev = NIL;
        self.nodes[i].next = self.used_head;
        if self.used_head != NIL {
            self.nodes[self.used_head].prev = i;
        }
        self.used_head = i;
        if self.used_tail == NIL {
            self.used_tail = i;
        }
        self.used_len += 1;
    }

    fn unlink_used(&mut self, i: usize) {
        let (prev, next) = (self.nodes[i].prev, self.nodes[i].next);
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.used_head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.used_tail = prev;
        }
        self.nodes[i].prev = NIL;
        self.nodes[i].next = NIL;
        self.used_len -= 1;
    }

    fn pop_lru(&mut self) -> Option<usize> {
        if self.used_tail == NIL {
            return None;
        }
        let i = self.used_tail;
        self.unlink_used(i);
        Some(i)
    }
}

// =============================================================================
// Tests
// =============================================================================
