//! Filter operators: the nodes you actually compose.
//!
//! Each constructor here validates its parameters, derives the result
//! geometry, and returns an `Arc<TiledImage>` ready to be used as a
//! source for further operators. The operators implement
//! [`RegionFill`] and pull from their sources through the ordinary
//! region-copy protocol, so every edge of the graph benefits from tile
//! caching.
//!
//! - [`flood`] - constant-color leaf
//! - [`translate`] - coordinate shift
//! - [`pad`] - grow/crop bounds with a [`PadMode`] border policy
//! - [`tile_pattern`] - repeat a source pattern over larger bounds
//! - [`multiply_alpha`] - scale one image's alpha by another's
//! - [`color_matrix`] - 4×5 linear recombination of RGBA
//! - [`affine`] - nearest-neighbor affine resampling

use crate::cancel::CancelToken;
use crate::geom::RectI;
use crate::image::{RegionFill, TiledImage};
use crate::raster::Raster;

mod affine;
mod color_matrix;
mod flood;
mod multiply_alpha;
mod pad;
mod tile;
mod translate;

pub use affine::affine;
pub use color_matrix::color_matrix;
pub use flood::flood;
pub use multiply_alpha::multiply_alpha;
pub use pad::{pad, PadMode};
pub use tile::tile_pattern;
pub use translate::translate;

/// Pull `region ∩ src.bounds()` from a source image into a scratch
/// raster with the source's layout. `None` when nothing overlaps.
pub(crate) fn pull_region(
    src: &TiledImage,
    region: RectI,
    cancel: &CancelToken,
) -> Option<Raster> {
    let clipped = region.intersection(&src.bounds());
    if clipped.is_empty() {
        return None;
    }
    let mut scratch = Raster::with_layout_of(clipped, src.sample_model()).ok()?;
    let _ = src.copy_data_cancellable(&mut scratch, cancel);
    Some(scratch)
}
