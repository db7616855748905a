//! The shared tile-cache handle.

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::ConfigError;

use super::lru::{CacheStats, LruCache};

/// Owner of the one [`LruCache`] a family of tiled images shares.
///
/// Every image constructed against the same context competes for the
/// same slot budget: any image may, by pulling tiles, evict another
/// image's tiles once global capacity is exceeded. Eviction order is
/// strictly global recency; no per-image quota is enforced.
///
/// The context is passed explicitly (`Arc<TileCacheContext>`) into image
/// constructors rather than living in process-global state, so tests and
/// embedders can run isolated cache universes side by side.
///
/// # Example
///
/// ```
/// use rastergraph::cache::TileCacheContext;
///
/// let ctx = TileCacheContext::new();
/// assert_eq!(ctx.stats().capacity, 50);
///
/// // The shared budget is the one runtime-tunable parameter.
/// ctx.set_size(200);
/// assert_eq!(ctx.stats().capacity, 200);
/// ```
pub struct TileCacheContext {
    cache: Arc<LruCache>,
    tile_size: i32,
}

impl TileCacheContext {
    /// A context with the default configuration (50 tile slots,
    /// 128-pixel tiles).
    pub fn new() -> Arc<Self> {
        Self::from_config(&CacheConfig::default()).expect("default config is valid")
    }

    /// A context with a specific slot budget and default tile size.
    pub fn with_capacity(capacity: usize) -> Result<Arc<Self>, ConfigError> {
        Self::from_config(&CacheConfig::with_capacity(capacity))
    }

    /// Build a context from a validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        Ok(Arc::new(Self {
            cache: Arc::new(LruCache::new(config.capacity)),
            tile_size: config.tile_size,
        }))
    }

    /// The shared cache instance tile stores register with.
    pub fn cache(&self) -> &Arc<LruCache> {
        &self.cache
    }

    /// Default tile edge length for images built against this context.
    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Resize the shared slot budget. Shrinking evicts from the
    /// least-recently-used end across all participating images.
    pub fn set_size(&self, capacity: usize) {
        self.cache.set_size(capacity);
    }

    /// Evict every resident tile across all participating images.
    pub fn flush(&self) {
        self.cache.flush();
    }

    /// Occupancy and eviction counters for the shared cache.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let ctx = TileCacheContext::new();
        let stats = ctx.stats();
        assert_eq!(stats.capacity, 50);
        assert_eq!(stats.resident, 0);
        assert_eq!(ctx.tile_size(), 128);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(TileCacheContext::with_capacity(0).is_err());
    }

    #[test]
    fn test_resize_propagates() {
        let ctx = TileCacheContext::with_capacity(10).unwrap();
        ctx.set_size(3);
        assert_eq!(ctx.stats().capacity, 3);
    }
}
