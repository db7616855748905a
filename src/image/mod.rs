//! Tiled image nodes: the vertices of the rendering graph.
//!
//! A [`TiledImage`] is one operator in a demand-driven image graph: it
//! declares bounds, a pixel format, and a tile grid, and produces pixels
//! lazily, tile by tile, caching what it produces in a store bound to
//! the shared LRU cache. Operators compose by holding `Arc<TiledImage>`
//! sources and pulling regions from them while filling their own; the
//! same protocol top to bottom, so a whole filter DAG evaluates through
//! one mechanism.
//!
//! # Extension point
//!
//! The only thing an operator implements is [`RegionFill`]: given a
//! destination raster and a region already clipped to the image bounds,
//! produce those pixels. Everything else (tile grids, caching, the
//! block-batched region copies) is provided here.
//!
//! # Pulling pixels
//!
//! - [`TiledImage::get_tile`] returns one cached-or-computed tile.
//! - [`TiledImage::copy_data`] fills an arbitrary destination raster,
//!   batching uncached interior tiles into large fills (see
//!   [`block::TileBlock`]).
//! - [`TiledImage::copy_data_simple`] is the two-pass per-tile variant
//!   for callers that do not want block-splitting.
//!
//! The `*_cancellable` variants take a [`CancelToken`] and give up
//! between blocks/tiles, returning [`RenderStatus::Cancelled`] with the
//! destination partially filled and nothing invalid cached.

use std::sync::Arc;

use crate::cache::TileCacheContext;
use crate::cancel::{CancelToken, RenderStatus};
use crate::error::RasterError;
use crate::geom::RectI;
use crate::raster::{ColorModel, Raster, SampleModel};
use crate::store::TileGenerator;

mod block;
mod tiled;

pub use block::{TileBlock, TileOccupancy};
pub use tiled::TiledCore;

/// Fills a region of a destination raster with this operator's pixels.
///
/// `region` is pre-clipped to the image bounds and lies within `dest`.
/// Implementations pull whatever they need from their sources through
/// the ordinary copy protocol; they must be pure with respect to
/// upstream state, because racing callers may fill the same region
/// twice.
pub trait RegionFill: Send + Sync {
    fn fill_region(&self, dest: &mut Raster, region: RectI, cancel: &CancelToken);
}

/// Which tile store shape an image uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Dense grid sized to the image's tile extent.
    #[default]
    Grid,
    /// Sparse map for unbounded or huge extents.
    Map,
}

/// Construction-time geometry and format of a tiled image.
#[derive(Debug, Clone)]
pub struct ImageGeometry {
    pub bounds: RectI,
    pub color_model: ColorModel,
    /// Pixel layout; its declared dimensions are the tile dimensions.
    pub sample_model: SampleModel,
    /// Pixel x of tile column 0's left edge.
    pub tile_grid_x_off: i32,
    /// Pixel y of tile row 0's top edge.
    pub tile_grid_y_off: i32,
}

impl ImageGeometry {
    /// Packed ARGB geometry for `bounds` with square tiles of
    /// `tile_size`, clamped so a tile never exceeds the bounds. The
    /// tile grid is anchored at the bounds origin.
    pub fn packed(
        bounds: RectI,
        color_model: ColorModel,
        tile_size: i32,
    ) -> Result<Self, RasterError> {
        if bounds.is_empty() {
            return Err(RasterError::EmptyBounds {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            });
        }
        let tw = tile_size.min(bounds.width).max(1);
        let th = tile_size.min(bounds.height).max(1);
        Ok(Self {
            bounds,
            color_model,
            sample_model: SampleModel::packed_argb(tw, th)?,
            tile_grid_x_off: bounds.x,
            tile_grid_y_off: bounds.y,
        })
    }

    /// Geometry inheriting `src`'s pixel format and tile grid, with new
    /// bounds. This is what single-source operators that keep their
    /// source's format use.
    pub fn like(src: &TiledImage, bounds: RectI) -> Self {
        Self {
            bounds,
            color_model: *src.color_model(),
            sample_model: src.sample_model().clone(),
            tile_grid_x_off: src.tile_grid_x_off(),
            tile_grid_y_off: src.tile_grid_y_off(),
        }
    }
}

/// A node of the tiled image graph.
///
/// Holds the tile machinery ([`TiledCore`]) plus the operator that
/// produces pixels, and the upstream images the operator reads from.
/// The node itself retains no pixel data beyond what the shared cache
/// holds for it.
pub struct TiledImage {
    core: TiledCore,
    op: Box<dyn RegionFill>,
    sources: Vec<Arc<TiledImage>>,
}

impl TiledImage {
    /// Assemble a node from geometry, sources, and an operator.
    ///
    /// # Errors
    ///
    /// Fails fast on empty bounds or a sample model whose layout cannot
    /// back a tile store.
    pub fn new(
        ctx: &Arc<TileCacheContext>,
        geometry: ImageGeometry,
        sources: Vec<Arc<TiledImage>>,
        op: Box<dyn RegionFill>,
        store_kind: StoreKind,
    ) -> Result<Self, RasterError> {
        Ok(Self {
            core: TiledCore::new(ctx, geometry, store_kind)?,
            op,
            sources,
        })
    }

    pub fn bounds(&self) -> RectI {
        self.core.bounds()
    }

    pub fn color_model(&self) -> &ColorModel {
        self.core.color_model()
    }

    pub fn sample_model(&self) -> &SampleModel {
        self.core.sample_model()
    }

    pub fn tile_width(&self) -> i32 {
        self.core.tile_width()
    }

    pub fn tile_height(&self) -> i32 {
        self.core.tile_height()
    }

    pub fn tile_grid_x_off(&self) -> i32 {
        self.core.tile_grid_x_off()
    }

    pub fn tile_grid_y_off(&self) -> i32 {
        self.core.tile_grid_y_off()
    }

    pub fn min_tile_x(&self) -> i32 {
        self.core.min_tile_x()
    }

    pub fn min_tile_y(&self) -> i32 {
        self.core.min_tile_y()
    }

    pub fn num_tiles_x(&self) -> i32 {
        self.core.num_tiles_x()
    }

    pub fn num_tiles_y(&self) -> i32 {
        self.core.num_tiles_y()
    }

    /// Tile column containing pixel column `x`.
    pub fn tile_x_of(&self, x: i32) -> i32 {
        self.core.tile_x_of(x)
    }

    /// Tile row containing pixel row `y`.
    pub fn tile_y_of(&self, y: i32) -> i32 {
        self.core.tile_y_of(y)
    }

    /// Pixel rectangle covered by tile (`tx`, `ty`).
    pub fn tile_rect(&self, tx: i32, ty: i32) -> RectI {
        self.core.tile_rect(tx, ty)
    }

    /// Upstream images this node reads from.
    pub fn sources(&self) -> &[Arc<TiledImage>] {
        &self.sources
    }

    /// The tile at (`tx`, `ty`), from cache or computed on demand.
    /// `None` only for coordinates outside the tile range.
    pub fn get_tile(&self, tx: i32, ty: i32) -> Option<Arc<Raster>> {
        self.get_tile_cancellable(tx, ty, &CancelToken::new())
    }

    /// [`TiledImage::get_tile`] with an explicit cancel token; a tile
    /// generated after the token fired is returned but not cached.
    pub fn get_tile_cancellable(
        &self,
        tx: i32,
        ty: i32,
        cancel: &CancelToken,
    ) -> Option<Arc<Raster>> {
        self.core.store().get_tile(tx, ty, self, cancel)
    }

    /// Cache peek at (`tx`, `ty`): never computes.
    pub fn get_tile_no_compute(&self, tx: i32, ty: i32) -> Option<Arc<Raster>> {
        self.core.store().get_tile_no_compute(tx, ty)
    }

    /// Fill `dest` with this image's pixels, batching uncached interior
    /// tiles into large region fills.
    pub fn copy_data(&self, dest: &mut Raster) -> RenderStatus {
        self.copy_data_cancellable(dest, &CancelToken::new())
    }

    /// [`TiledImage::copy_data`] with an explicit cancel token.
    pub fn copy_data_cancellable(&self, dest: &mut Raster, cancel: &CancelToken) -> RenderStatus {
        self.core
            .copy_to_raster_by_blocks(dest, self.op.as_ref(), cancel)
    }

    /// Fill `dest` one tile at a time, without block batching.
    pub fn copy_data_simple(&self, dest: &mut Raster) -> RenderStatus {
        self.copy_data_simple_cancellable(dest, &CancelToken::new())
    }

    /// [`TiledImage::copy_data_simple`] with an explicit cancel token.
    pub fn copy_data_simple_cancellable(
        &self,
        dest: &mut Raster,
        cancel: &CancelToken,
    ) -> RenderStatus {
        self.core.copy_to_raster(dest, self.op.as_ref(), cancel)
    }

    /// Render the whole image into a fresh raster.
    pub fn render(&self) -> Result<Raster, RasterError> {
        let mut dest = Raster::with_layout_of(self.bounds(), self.sample_model())?;
        let _ = self.copy_data(&mut dest);
        Ok(dest)
    }
}

impl TileGenerator for TiledImage {
    fn gen_tile(&self, tile_x: i32, tile_y: i32, cancel: &CancelToken) -> Raster {
        self.core.gen_tile_with(self.op.as_ref(), tile_x, tile_y, cancel)
    }
}
