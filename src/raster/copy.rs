//! Inter-raster region copies.
//!
//! Two paths, selected by layout: a packed-int fast path that moves whole
//! row slices, and a generic per-pixel fallback for interleaved data.
//! Both copy only the intersection of the two rasters' bounds, so callers
//! never pre-clip.

use crate::geom::RectI;

use super::raster::Raster;

/// Copy the overlapping region of `src` into `dst`.
///
/// Pixels of `dst` outside the overlap are untouched. The two rasters
/// must share a pixel layout; mixing layouts is a caller bug (the
/// pipeline fixes a single layout per image graph edge) and panics in
/// debug builds.
pub fn copy_raster(src: &Raster, dst: &mut Raster) {
    copy_raster_offset(src, dst, 0, 0);
}

/// Copy `src`, shifted by (dx, dy), into `dst`.
///
/// A pixel at (x, y) in `src` lands at (x + dx, y + dy) in `dst`.
pub fn copy_raster_offset(src: &Raster, dst: &mut Raster, dx: i32, dy: i32) {
    debug_assert!(
        src.sample_model().layout_matches(dst.sample_model()),
        "copy between incompatible layouts: {} vs {}",
        src.sample_model().describe(),
        dst.sample_model().describe()
    );

    let overlap = src
        .bounds()
        .translated(dx, dy)
        .intersection(&dst.bounds());
    if overlap.is_empty() {
        return;
    }

    if src.sample_model().is_packed() && dst.sample_model().is_packed() {
        copy_packed(src, dst, &overlap, dx, dy);
    } else {
        copy_fallback(src, dst, &overlap, dx, dy);
    }
}

/// Row-slice copy for packed ARGB rasters.
fn copy_packed(src: &Raster, dst: &mut Raster, overlap: &RectI, dx: i32, dy: i32) {
    for y in overlap.y..overlap.max_y() {
        let row = src.packed_row(y - dy, overlap.x - dx, overlap.max_x() - dx);
        dst.packed_row_mut(y, overlap.x, overlap.max_x())
            .copy_from_slice(row);
    }
}

/// Per-pixel copy for layouts without a fast path.
fn copy_fallback(src: &Raster, dst: &mut Raster, overlap: &RectI, dx: i32, dy: i32) {
    let bands = src.bands().min(dst.bands());
    for y in overlap.y..overlap.max_y() {
        for x in overlap.x..overlap.max_x() {
            for b in 0..bands {
                dst.set_sample(x, y, b, src.sample(x - dx, y - dy, b));
            }
        }
    }
}
