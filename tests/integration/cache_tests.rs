//! Cache effectiveness integration tests.
//!
//! Tests verify:
//! - A region request spanning more tiles than the cache budget evicts
//!   exactly the overflow and regenerates exactly the evicted tiles on
//!   the next identical request
//! - The two copy paths produce identical pixels from hot and cold
//!   caches
//! - Resizing the shared budget propagates across images

use rastergraph::cache::TileCacheContext;
use rastergraph::geom::RectI;
use rastergraph::raster::Raster;

use super::test_utils::{init_tracing, StampImage};

// =============================================================================
// Eviction Accounting
// =============================================================================

/// A 10x10-tile image (64-pixel tiles) over a 50-slot cache. A 500x500
/// request touches 8x8 = 64 tiles, which must force 14 evictions; the
/// identical follow-up request regenerates exactly the evicted tiles.
#[test]
fn test_oversubscribed_request_evicts_and_regenerates_exactly() {
    init_tracing();

    let tile = 64;
    let ctx = TileCacheContext::with_capacity(50).unwrap();
    let stamp = StampImage::new(&ctx, RectI::new(0, 0, 640, 640), tile);

    let request = RectI::new(0, 0, 500, 500);

    // First pass: all 64 overlapping tiles generate.
    let mut dest = Raster::packed(request).unwrap();
    assert!(stamp.image.copy_data(&mut dest).is_complete());
    stamp.assert_matches(&dest, tile);

    let tile_area = i64::from(tile) * i64::from(tile);
    assert_eq!(stamp.filled_area(), 64 * tile_area);

    let stats = ctx.stats();
    assert_eq!(stats.resident, 50);
    assert_eq!(stats.evictions, 14, "64 tiles into 50 slots evicts 14");

    // Second pass: only the 14 evicted tiles regenerate; the other 50
    // come from cache.
    let mut dest2 = Raster::packed(request).unwrap();
    assert!(stamp.image.copy_data(&mut dest2).is_complete());
    stamp.assert_matches(&dest2, tile);

    assert_eq!(
        stamp.filled_area(),
        (64 + 14) * tile_area,
        "second pass regenerates exactly the evicted tiles"
    );
}

/// With a budget larger than the working set, the second request does
/// no generation work at all.
#[test]
fn test_fitting_working_set_serves_entirely_from_cache() {
    let tile = 32;
    let ctx = TileCacheContext::with_capacity(100).unwrap();
    let stamp = StampImage::new(&ctx, RectI::new(0, 0, 256, 256), tile);

    let mut dest = Raster::packed(RectI::new(0, 0, 256, 256)).unwrap();
    assert!(stamp.image.copy_data(&mut dest).is_complete());
    let after_first = stamp.filled_area();

    let mut dest2 = Raster::packed(RectI::new(0, 0, 256, 256)).unwrap();
    assert!(stamp.image.copy_data(&mut dest2).is_complete());

    assert_eq!(stamp.filled_area(), after_first);
    assert_eq!(ctx.stats().evictions, 0);
    stamp.assert_matches(&dest2, tile);
}

// =============================================================================
// Copy-Path Equivalence
// =============================================================================

/// Block-batched and per-tile copies agree pixel for pixel, from both
/// cold and warm caches, on a destination that clips tiles on every
/// edge.
#[test]
fn test_copy_paths_pixel_identical() {
    let tile = 32;
    let request = RectI::new(23, 41, 210, 150);

    let ctx_blocks = TileCacheContext::new();
    let blocks = StampImage::new(&ctx_blocks, RectI::new(0, 0, 320, 320), tile);
    let mut by_blocks = Raster::packed(request).unwrap();
    assert!(blocks.image.copy_data(&mut by_blocks).is_complete());

    let ctx_simple = TileCacheContext::new();
    let simple = StampImage::new(&ctx_simple, RectI::new(0, 0, 320, 320), tile);
    let mut per_tile = Raster::packed(request).unwrap();
    assert!(simple.image.copy_data_simple(&mut per_tile).is_complete());

    for y in request.y..request.max_y() {
        for x in request.x..request.max_x() {
            assert_eq!(by_blocks.argb_at(x, y), per_tile.argb_at(x, y));
        }
    }
    blocks.assert_matches(&by_blocks, tile);

    // Warm repeat of the block path still matches.
    let mut warm = Raster::packed(request).unwrap();
    assert!(blocks.image.copy_data(&mut warm).is_complete());
    blocks.assert_matches(&warm, tile);
}

/// A destination reaching outside the image bounds only fills the
/// overlapping part and completes cleanly.
#[test]
fn test_request_overhanging_bounds() {
    let tile = 32;
    let ctx = TileCacheContext::new();
    let stamp = StampImage::new(&ctx, RectI::new(0, 0, 100, 100), tile);

    let request = RectI::new(-50, 60, 200, 100);
    let mut dest = Raster::packed(request).unwrap();
    assert!(stamp.image.copy_data(&mut dest).is_complete());

    // Inside the image: stamped.
    for y in 60..100 {
        for x in 0..100 {
            assert_eq!(
                dest.argb_at(x, y),
                super::test_utils::stamp_value(x, y, tile)
            );
        }
    }
    // Outside: untouched zero.
    assert_eq!(dest.argb_at(-1, 70), 0);
    assert_eq!(dest.argb_at(149, 70), 0);
    assert_eq!(dest.argb_at(50, 120), 0);
}

// =============================================================================
// Shared Budget
// =============================================================================

/// Two images on one context compete for the same slots; shrinking the
/// budget evicts across both.
#[test]
fn test_budget_shared_across_images() {
    let tile = 32;
    let ctx = TileCacheContext::with_capacity(32).unwrap();
    let a = StampImage::new(&ctx, RectI::new(0, 0, 128, 128), tile); // 16 tiles
    let b = StampImage::new(&ctx, RectI::new(0, 0, 128, 128), tile); // 16 tiles

    let mut dest = Raster::packed(RectI::new(0, 0, 128, 128)).unwrap();
    assert!(a.image.copy_data(&mut dest).is_complete());
    assert!(b.image.copy_data(&mut dest).is_complete());
    assert_eq!(ctx.stats().resident, 32);
    assert_eq!(ctx.stats().evictions, 0);

    // Shrink: both images lose tiles, oldest first.
    ctx.set_size(8);
    let stats = ctx.stats();
    assert_eq!(stats.capacity, 8);
    assert_eq!(stats.resident, 8);
    assert_eq!(stats.evictions, 24);

    // Image a's tiles were older, so the survivors are all b's.
    let survivors_a = (0..4)
        .flat_map(|ty| (0..4).map(move |tx| (tx, ty)))
        .filter(|&(tx, ty)| a.image.get_tile_no_compute(tx, ty).is_some())
        .count();
    assert_eq!(survivors_a, 0);
}
