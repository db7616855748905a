//! Operator graph integration tests.
//!
//! Compose several operators and verify end-to-end pixels against
//! direct computation, exercising the pull protocol across graph edges.

use kurbo::Affine;

use rastergraph::cache::TileCacheContext;
use rastergraph::geom::RectI;
use rastergraph::ops::{
    affine, color_matrix, flood, multiply_alpha, pad, tile_pattern, translate, PadMode,
};
use rastergraph::raster::Raster;

use super::test_utils::init_tracing;

#[test]
fn test_flood_pad_translate_chain() {
    init_tracing();
    let ctx = TileCacheContext::new();

    let fill = flood(&ctx, RectI::new(0, 0, 40, 40), 0xFF11_2233).unwrap();
    let padded = pad(&ctx, &fill, RectI::new(-10, -10, 60, 60), PadMode::Zero).unwrap();
    let moved = translate(&ctx, &padded, 100, 100).unwrap();

    assert_eq!(moved.bounds(), RectI::new(90, 90, 60, 60));
    let out = moved.render().unwrap();

    for y in 90..150 {
        for x in 90..150 {
            let expected = if (100..140).contains(&x) && (100..140).contains(&y) {
                0xFF11_2233
            } else {
                0
            };
            assert_eq!(out.argb_at(x, y), expected, "at ({x},{y})");
        }
    }
}

#[test]
fn test_masked_color_matrix_graph() {
    let ctx = TileCacheContext::new();

    // A solid color, channel-swapped, masked to half opacity.
    let fill = flood(&ctx, RectI::new(0, 0, 64, 64), 0xFFAA_4400).unwrap();
    let swap: [f32; 20] = [
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ];
    let swapped = color_matrix(&ctx, &fill, &swap).unwrap();
    let mask = flood(&ctx, RectI::new(0, 0, 64, 64), 0x8000_0000).unwrap();
    let root = multiply_alpha(&ctx, &swapped, &mask).unwrap();

    let out = root.render().unwrap();
    // 0xFFAA4400 swapped -> 0xFF0044AA; alpha 0xFF * 0x80/255 -> 0x80.
    assert_eq!(out.argb_at(0, 0), 0x8000_44AA);
    assert_eq!(out.argb_at(63, 63), 0x8000_44AA);
}

#[test]
fn test_tiled_pattern_through_affine() {
    let ctx = TileCacheContext::new();

    // A 2x2 pattern tiled over a 16x16 area, then doubled.
    let dot = flood(&ctx, RectI::new(0, 0, 1, 1), 0xFFFF_FFFF).unwrap();
    let cell = pad(&ctx, &dot, RectI::new(0, 0, 2, 2), PadMode::Zero).unwrap();
    let tiled = tile_pattern(&ctx, &cell, RectI::new(0, 0, 16, 16)).unwrap();
    let doubled = affine(&ctx, &tiled, Affine::scale(2.0)).unwrap();

    assert_eq!(doubled.bounds(), RectI::new(0, 0, 32, 32));
    let out = doubled.render().unwrap();

    for y in 0..32 {
        for x in 0..32 {
            // Source pixel (x/2, y/2); lit where both are even.
            let expected = if (x / 2) % 2 == 0 && (y / 2) % 2 == 0 {
                0xFFFF_FFFF
            } else {
                0
            };
            assert_eq!(out.argb_at(x, y), expected, "at ({x},{y})");
        }
    }
}

#[test]
fn test_block_and_simple_paths_agree_on_composed_graph() {
    let ctx = TileCacheContext::new();
    let fill = flood(&ctx, RectI::new(0, 0, 96, 96), 0xFF66_3311).unwrap();
    let padded = pad(&ctx, &fill, RectI::new(-16, -16, 128, 128), PadMode::Replicate).unwrap();

    let request = RectI::new(-16, -16, 128, 128);
    let mut by_blocks = Raster::packed(request).unwrap();
    assert!(padded.copy_data(&mut by_blocks).is_complete());

    // A separate identical graph keeps the second run cold.
    let ctx2 = TileCacheContext::new();
    let fill2 = flood(&ctx2, RectI::new(0, 0, 96, 96), 0xFF66_3311).unwrap();
    let padded2 = pad(&ctx2, &fill2, RectI::new(-16, -16, 128, 128), PadMode::Replicate).unwrap();
    let mut simple = Raster::packed(request).unwrap();
    assert!(padded2.copy_data_simple(&mut simple).is_complete());

    for y in request.y..request.max_y() {
        for x in request.x..request.max_x() {
            assert_eq!(by_blocks.argb_at(x, y), simple.argb_at(x, y), "at ({x},{y})");
        }
    }
    // Replicate padding of a uniform fill is uniform everywhere.
    assert_eq!(by_blocks.argb_at(-16, -16), 0xFF66_3311);
}

#[test]
fn test_partial_region_pull_through_graph() {
    let ctx = TileCacheContext::new();
    let fill = flood(&ctx, RectI::new(0, 0, 200, 200), 0xFF00_AA00).unwrap();
    let padded = pad(&ctx, &fill, RectI::new(-20, -20, 240, 240), PadMode::Zero).unwrap();

    // Pull a small window straddling the pad boundary.
    let window = RectI::new(-20, -5, 60, 30);
    let mut dest = Raster::packed(window).unwrap();
    assert!(padded.copy_data(&mut dest).is_complete());

    for y in window.y..window.max_y() {
        for x in window.x..window.max_x() {
            let expected = if x >= 0 && y >= 0 { 0xFF00_AA00 } else { 0 };
            assert_eq!(dest.argb_at(x, y), expected, "at ({x},{y})");
        }
    }
}
