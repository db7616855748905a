//! # rastergraph
//!
//! A tiled raster image graph for vector-graphics filter pipelines.
//!
//! This library evaluates a directed acyclic graph of image-processing
//! operators over raster tiles. Pixels are produced on demand: a
//! consumer asks the graph's root for a region, and tiles are computed,
//! cached, and recombined lazily, so large images render incrementally
//! and memory stays bounded by a shared tile budget.
//!
//! ## Features
//!
//! - **Demand-driven evaluation**: operators pull regions from their
//!   sources through one uniform protocol; nothing renders until asked.
//! - **Shared LRU tile cache**: one slot budget across every image in a
//!   cache context, with strict global recency eviction.
//! - **Weak-tier recovery**: evicted tiles degrade instead of dying:
//!   while any consumer still holds a tile, the cache recovers it
//!   without recomputation.
//! - **Block-batched region copies**: uncached spans are partitioned
//!   into few large rectangles per fill call, not one call per tile.
//! - **Explicit cancellation**: region copies take a token and report
//!   whether the destination is complete.
//!
//! ## Architecture
//!
//! The library is organized into several modules, leaf first:
//!
//! - [`geom`] - integer pixel-space rectangles
//! - [`mod@error`] - construction/configuration error taxonomy
//! - [`config`] - serde-backed cache configuration
//! - [`raster`] - pixel buffers, sample layouts, and copy paths
//! - [`cache`] - the arena LRU cache, tile members, and the shared
//!   cache context
//! - [`store`] - per-image tile stores (dense grid / sparse map)
//! - [`image`] - the tiled image node and its region-copy algorithms
//! - [`ops`] - operator constructors (flood, pad, affine, ...)
//!
//! ## Example
//!
//! ```
//! use rastergraph::cache::TileCacheContext;
//! use rastergraph::geom::RectI;
//! use rastergraph::ops::{color_matrix, flood, pad, PadMode};
//!
//! // One cache context: every image below shares its tile budget.
//! let ctx = TileCacheContext::new();
//!
//! // flood -> pad -> color_matrix, pulled lazily from the root.
//! let fill = flood(&ctx, RectI::new(0, 0, 256, 256), 0xFF33_6699).unwrap();
//! let padded = pad(&ctx, &fill, RectI::new(-32, -32, 320, 320), PadMode::Zero).unwrap();
//! let swap: [f32; 20] = [
//!     0.0, 0.0, 1.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0, 0.0, 0.0,
//!     0.0, 0.0, 0.0, 1.0, 0.0,
//! ];
//! let root = color_matrix(&ctx, &padded, &swap).unwrap();
//!
//! let result = root.render().unwrap();
//! assert_eq!(result.argb_at(0, 0), 0xFF99_6633);
//! assert_eq!(result.argb_at(-32, -32), 0);
//! ```

pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod geom;
pub mod image;
pub mod ops;
pub mod raster;
pub mod store;

// Re-export commonly used types
pub use cache::{CacheStats, LruCache, LruParticipant, LruSlot, TileCacheContext, TileLruMember};
pub use cancel::{CancelToken, RenderStatus};
pub use config::{CacheConfig, DEFAULT_TILE_CACHE_CAPACITY, DEFAULT_TILE_SIZE};
pub use error::{ConfigError, RasterError};
pub use geom::RectI;
pub use image::{ImageGeometry, RegionFill, StoreKind, TileBlock, TileOccupancy, TiledImage};
pub use ops::{affine, color_matrix, flood, multiply_alpha, pad, tile_pattern, translate, PadMode};
pub use raster::{copy_raster, copy_raster_offset, ColorModel, Raster, SampleModel};
pub use store::{TileGenerator, TileGrid, TileMap, TileStore};
