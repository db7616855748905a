//! Linear color recombination.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::CancelToken;
use crate::error::RasterError;
use crate::geom::RectI;
use crate::image::{ImageGeometry, RegionFill, StoreKind, TiledImage};
use crate::raster::{copy_raster, Raster};

use super::pull_region;

struct ColorMatrixFill {
    src: Arc<TiledImage>,
    /// Rows produce (r, g, b, a); columns read (r, g, b, a, 1), with
    /// the constant column scaled by 255.
    matrix: [[f32; 5]; 4],
}

impl RegionFill for ColorMatrixFill {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken) {
        let Some(scratch) = pull_region(&self.src, region, cancel) else {
            return;
        };
        copy_raster(&scratch, dest);

        let m = &self.matrix;
        for y in region.y..region.max_y() {
            for x in region.x..region.max_x() {
                let p = dest.argb_at(x, y);
                let input = [
                    ((p >> 16) & 0xFF) as f32,
                    ((p >> 8) & 0xFF) as f32,
                    (p & 0xFF) as f32,
                    (p >> 24) as f32,
                ];

                let mut out = [0u32; 4];
                for (i, row) in m.iter().enumerate() {
                    let v = row[0] * input[0]
                        + row[1] * input[1]
                        + row[2] * input[2]
                        + row[3] * input[3]
                        + row[4] * 255.0;
                    out[i] = v.clamp(0.0, 255.0) as u32;
                }

                dest.set_argb(x, y, (out[3] << 24) | (out[0] << 16) | (out[1] << 8) | out[2]);
            }
        }
    }
}

/// `src` with each pixel's (r, g, b, a) recombined through a 4×5 matrix.
///
/// `coefficients` is row-major: four rows of five, the last column
/// being a constant offset in [0, 1] units (scaled by 255 at apply
/// time). Results clamp to the band range.
///
/// # Errors
///
/// Rejects a coefficient slice that is not exactly 20 long.
pub fn color_matrix(
    ctx: &Arc<TileCacheContext>,
    src: &Arc<TiledImage>,
    coefficients: &[f32],
) -> Result<Arc<TiledImage>, RasterError> {
    if coefficients.len() != 20 {
        return Err(RasterError::InvalidMatrixShape {
            actual: coefficients.len(),
        });
    }
    if !src.sample_model().is_packed() {
        return Err(RasterError::IncompatibleSampleModel {
            expected: "packed-argb".to_string(),
            actual: src.sample_model().describe(),
        });
    }
    let mut matrix = [[0f32; 5]; 4];
    for (i, row) in matrix.iter_mut().enumerate() {
        row.copy_from_slice(&coefficients[i * 5..i * 5 + 5]);
    }

    let geometry = ImageGeometry::like(src, src.bounds());
    Ok(Arc::new(TiledImage::new(
        ctx,
        geometry,
        vec![src.clone()],
        Box::new(ColorMatrixFill {
            src: src.clone(),
            matrix,
        }),
        StoreKind::Grid,
    )?))
}

/// The identity coefficient set: output equals input.
pub const IDENTITY_MATRIX: [f32; 20] = [
    1.0, 0.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
