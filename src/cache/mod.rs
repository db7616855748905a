//! The shared LRU tile cache.
//!
//! Caching is what turns the demand-driven image graph from "recompute
//! the world on every paint" into incremental work. The design has three
//! layers:
//!
//! - [`LruCache`]: a generic fixed-capacity recency cache of opaque
//!   participants, arena-backed so every list operation is O(1).
//! - [`TileLruMember`]: the participant for one tile, holding its raster
//!   behind a strong tier plus a weak recovery tier. Eviction degrades a
//!   tile instead of destroying it: until the last outside reference
//!   drops, the pixels remain recoverable without recomputation.
//! - [`TileCacheContext`]: the explicitly shared handle owning one cache
//!   instance, threaded through image construction so many images share
//!   one slot budget.
//!
//! # Example
//!
//! ```
//! use rastergraph::cache::{TileCacheContext, TileLruMember};
//! use rastergraph::geom::RectI;
//! use rastergraph::raster::Raster;
//! use std::sync::Arc;
//!
//! let ctx = TileCacheContext::new();
//!
//! let member = TileLruMember::new();
//! member.set_raster(Arc::new(Raster::packed(RectI::new(0, 0, 16, 16)).unwrap()));
//! ctx.cache().add(member.clone());
//!
//! assert!(member.retrieve_raster().is_some());
//! assert_eq!(ctx.stats().resident, 1);
//! ```

mod context;
mod lru;
mod member;

pub use context::TileCacheContext;
pub use lru::{CacheStats, LruCache, LruParticipant, LruSlot};
pub use member::TileLruMember;
