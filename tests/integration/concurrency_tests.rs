//! Concurrent pull and cancellation integration tests.
//!
//! Tests verify:
//! - Parallel threads pulling overlapping regions agree pixel for pixel
//! - Racing pulls of the same cold tile stay correct (duplicate
//!   generation is tolerated waste, not corruption)
//! - A cancelled copy reports Cancelled and commits nothing invalid

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

use rastergraph::cache::TileCacheContext;
use rastergraph::cancel::{CancelToken, RenderStatus};
use rastergraph::geom::RectI;
use rastergraph::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use rastergraph::raster::{ColorModel, Raster};

use super::test_utils::{init_tracing, stamp_value, StampImage};

#[test]
fn test_parallel_pulls_agree() {
    init_tracing();

    let tile = 32;
    let ctx = TileCacheContext::with_capacity(200).unwrap();
    let stamp = Arc::new(StampImage::new(&ctx, RectI::new(0, 0, 256, 256), tile));

    let windows = [
        RectI::new(0, 0, 256, 256),
        RectI::new(10, 10, 200, 200),
        RectI::new(100, 0, 156, 256),
        RectI::new(0, 100, 256, 156),
    ];

    let handles: Vec<_> = windows
        .into_iter()
        .map(|window| {
            let stamp = stamp.clone();
            thread::spawn(move || {
                let mut dest = Raster::packed(window).unwrap();
                assert!(stamp.image.copy_data(&mut dest).is_complete());
                dest
            })
        })
        .collect();

    for handle in handles {
        let dest = handle.join().unwrap();
        let b = dest.bounds();
        for y in b.y..b.max_y() {
            for x in b.x..b.max_x() {
                assert_eq!(dest.argb_at(x, y), stamp_value(x, y, tile));
            }
        }
    }
}

#[test]
fn test_racing_cold_tile_pulls_stay_correct() {
    let tile = 64;
    let ctx = TileCacheContext::with_capacity(50).unwrap();
    let stamp = Arc::new(StampImage::new(&ctx, RectI::new(0, 0, 128, 128), tile));

    // All threads hammer the same cold tile at once. Some generation
    // may be duplicated (last write wins); the content never differs.
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let stamp = stamp.clone();
            thread::spawn(move || stamp.image.get_tile(1, 1).unwrap())
        })
        .collect();

    for handle in handles {
        let raster = handle.join().unwrap();
        assert_eq!(raster.bounds(), RectI::new(64, 64, 64, 64));
        assert_eq!(raster.argb_at(64, 64), stamp_value(64, 64, tile));
        assert_eq!(raster.argb_at(127, 127), stamp_value(127, 127, tile));
    }

    // Exactly one tile is resident afterwards.
    assert_eq!(ctx.stats().resident, 1);
}

/// Operator that cancels the running copy's token partway through: the
/// first region fills, then the token fires.
struct SelfCancellingFill {
    fills: AtomicI64,
}

impl RegionFill for SelfCancellingFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        self.fills.fetch_add(1, Ordering::SeqCst);
        dest.fill_rect_argb(region, 0xFFFF_FFFF);
        cancel.cancel();
    }
}

#[test]
fn test_cancellation_mid_copy_commits_nothing() {
    let ctx = TileCacheContext::new();
    let geometry =
        ImageGeometry::packed(RectI::new(0, 0, 256, 256), ColorModel::ARGB, 32).unwrap();
    let image = TiledImage::new(
        &ctx,
        geometry,
        Vec::new(),
        Box::new(SelfCancellingFill {
            fills: AtomicI64::new(0),
        }),
        StoreKind::Grid,
    )
    .unwrap();

    let cancel = CancelToken::new();
    let mut dest = Raster::packed(RectI::new(0, 0, 256, 256)).unwrap();
    let status = image.copy_data_cancellable(&mut dest, &cancel);

    assert_eq!(status, RenderStatus::Cancelled);
    // The copy stopped before registering anything: the cache holds no
    // tile that a later complete render could wrongly trust.
    assert_eq!(ctx.stats().resident, 0);
    for ty in 0..8 {
        for tx in 0..8 {
            assert!(image.get_tile_no_compute(tx, ty).is_none());
        }
    }
}

#[test]
fn test_cancelled_get_tile_not_cached_but_returned() {
    let ctx = TileCacheContext::new();
    let stamp = StampImage::new(&ctx, RectI::new(0, 0, 64, 64), 32);

    let cancel = CancelToken::new();
    cancel.cancel();
    let raster = stamp.image.get_tile_cancellable(0, 0, &cancel);
    assert!(raster.is_some());
    assert_eq!(ctx.stats().resident, 0);
}
