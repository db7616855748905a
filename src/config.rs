//! Configuration for the shared tile cache.
//!
//! The crate has exactly one externally tunable knob family: the shared
//! tile budget and the default tile geometry. [`CacheConfig`] carries
//! both, with serde support so embedding applications can load it from
//! whatever configuration source they already use.
//!
//! # Example
//!
//! ```
//! use rastergraph::config::CacheConfig;
//!
//! let config = CacheConfig::default();
//! assert_eq!(config.capacity, 50);
//! assert_eq!(config.tile_size, 128);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Default shared cache capacity, in tile slots.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 50;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: i32 = 128;

/// Smallest accepted tile edge length.
pub const MIN_TILE_SIZE: i32 = 16;

/// Largest accepted tile edge length.
pub const MAX_TILE_SIZE: i32 = 4096;

// =============================================================================
// Cache Configuration
// =============================================================================

/// Tunable parameters for a [`crate::cache::TileCacheContext`].
///
/// The capacity is a process-wide budget in tile-slot units: every tile
/// store vended by one context competes for the same slots, and eviction
/// order is global recency across all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of tiles resident in the shared cache.
    pub capacity: usize,

    /// Edge length of tiles created by images that do not specify
    /// their own tile geometry.
    pub tile_size: i32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TILE_CACHE_CAPACITY,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl CacheConfig {
    /// Create a configuration with the given capacity and the default
    /// tile size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity is zero or the tile size falls
    /// outside the supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if self.tile_size < MIN_TILE_SIZE || self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::TileSizeOutOfRange {
                actual: self.tile_size,
                min: MIN_TILE_SIZE,
                max: MAX_TILE_SIZE,
            });
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
