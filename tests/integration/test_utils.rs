//! Shared fixtures for the integration tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rastergraph::cache::TileCacheContext;
use rastergraph::cancel::CancelToken;
use rastergraph::geom::RectI;
use rastergraph::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use rastergraph::raster::{ColorModel, Raster};

/// Initialize test logging once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// The sentinel pixel value for the tile containing (x, y) on a grid
/// anchored at the origin with square tiles of `tile_size`.
pub fn stamp_value(x: i32, y: i32, tile_size: i32) -> u32 {
    let tx = x.div_euclid(tile_size) as u32;
    let ty = y.div_euclid(tile_size) as u32;
    0xFF00_0000 | ((tx & 0xFFF) << 12) | (ty & 0xFFF)
}

/// Operator stamping every pixel with its tile coordinate and counting
/// the total area it was asked to fill.
struct CountingStamp {
    tile_size: i32,
    filled_area: Arc<AtomicI64>,
}

impl RegionFill for CountingStamp {
    fn fill_region(&self, dest: &mut Raster, region: RectI, _cancel: &CancelToken) {
        self.filled_area.fetch_add(region.area(), Ordering::SeqCst);
        for y in region.y..region.max_y() {
            for x in region.x..region.max_x() {
                dest.set_argb(x, y, stamp_value(x, y, self.tile_size));
            }
        }
    }
}

/// A deterministic image whose generation work is observable.
pub struct StampImage {
    pub image: TiledImage,
    filled_area: Arc<AtomicI64>,
}

impl StampImage {
    /// Build a stamp image over `bounds` (anchored tile grid, square
    /// tiles of `tile_size`) against the given cache context.
    pub fn new(ctx: &Arc<TileCacheContext>, bounds: RectI, tile_size: i32) -> Self {
        let filled_area = Arc::new(AtomicI64::new(0));
        let geometry = ImageGeometry::packed(bounds, ColorModel::ARGB, tile_size).unwrap();
        let op = CountingStamp {
            tile_size,
            filled_area: filled_area.clone(),
        };
        let image =
            TiledImage::new(ctx, geometry, Vec::new(), Box::new(op), StoreKind::Grid).unwrap();
        Self { image, filled_area }
    }

    /// Total pixel area the operator has filled so far.
    pub fn filled_area(&self) -> i64 {
        self.filled_area.load(Ordering::SeqCst)
    }

    /// Assert that every pixel of `raster` matches the stamp pattern.
    pub fn assert_matches(&self, raster: &Raster, tile_size: i32) {
        let b = raster.bounds();
        for y in b.y..b.max_y() {
            for x in b.x..b.max_x() {
                assert_eq!(
                    raster.argb_at(x, y),
                    stamp_value(x, y, tile_size),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }
}
