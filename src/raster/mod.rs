//! Raster buffers and their sample layouts.
//!
//! A [`Raster`] is a rectangular buffer of pixel samples with an explicit
//! origin in its image's coordinate space. Two layouts are supported,
//! mirroring the two copy paths the tile pipeline distinguishes:
//!
//! - [`SampleModel::PackedArgb`] - one `u32` ARGB word per pixel, the
//!   common case for composited graphics; region copies take a fast
//!   row-slice path.
//! - [`SampleModel::Interleaved`] - 1-4 `u8` samples per pixel, for
//!   single-band masks and component data; region copies take the
//!   generic per-pixel path.
//!
//! # Components
//!
//! - [`SampleModel`] / [`ColorModel`]: per-image pixel format declarations
//! - [`Raster`]: the buffer itself, with pixel accessors and rect fills
//! - [`copy_raster`] / [`copy_raster_offset`]: inter-raster blits
//! - [`Raster::from_rgba_image`] / [`Raster::to_rgba_image`]: interop
//!   with the `image` crate

mod convert;
mod copy;
mod layout;
#[allow(clippy::module_inception)]
mod raster;

pub use copy::{copy_raster, copy_raster_offset};
pub use layout::{ColorModel, SampleModel};
pub use raster::Raster;
