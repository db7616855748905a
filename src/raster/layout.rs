//! Sample and color model declarations.

use crate::error::RasterError;

/// Describes how pixel samples are laid out in memory.
///
/// The `width`/`height` carried here are the dimensions the layout was
/// declared for: on an image node they are the tile dimensions, on a
/// raster they are the raster's own dimensions. Layout compatibility
/// ([`SampleModel::layout_matches`]) deliberately ignores dimensions:
/// a destination raster and the tiles copied into it share a pixel
/// format, not a size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleModel {
    /// One packed `u32` ARGB word per pixel (alpha in the top byte).
    PackedArgb { width: i32, height: i32 },

    /// Band-interleaved `u8` samples, `bands` samples per pixel.
    Interleaved {
        width: i32,
        height: i32,
        bands: usize,
    },
}

impl SampleModel {
    /// A packed ARGB layout for the given dimensions.
    pub fn packed_argb(width: i32, height: i32) -> Result<Self, RasterError> {
        check_dims(width, height)?;
        Ok(Self::PackedArgb { width, height })
    }

    /// An interleaved layout with `bands` samples per pixel.
    pub fn interleaved(width: i32, height: i32, bands: usize) -> Result<Self, RasterError> {
        check_dims(width, height)?;
        if bands == 0 || bands > 4 {
            return Err(RasterError::UnsupportedBandCount { bands });
        }
        Ok(Self::Interleaved {
            width,
            height,
            bands,
        })
    }

    /// Declared width in pixels.
    pub fn width(&self) -> i32 {
        match self {
            Self::PackedArgb { width, .. } | Self::Interleaved { width, .. } => *width,
        }
    }

    /// Declared height in pixels.
    pub fn height(&self) -> i32 {
        match self {
            Self::PackedArgb { height, .. } | Self::Interleaved { height, .. } => *height,
        }
    }

    /// Number of bands a pixel decomposes into (4 for packed ARGB).
    pub fn bands(&self) -> usize {
        match self {
            Self::PackedArgb { .. } => 4,
            Self::Interleaved { bands, .. } => *bands,
        }
    }

    /// True for the packed-int layout, which enables the fast copy path.
    pub fn is_packed(&self) -> bool {
        matches!(self, Self::PackedArgb { .. })
    }

    /// True if two layouts describe the same pixel format (dimensions
    /// are not compared).
    pub fn layout_matches(&self, other: &SampleModel) -> bool {
        match (self, other) {
            (Self::PackedArgb { .. }, Self::PackedArgb { .. }) => true,
            (Self::Interleaved { bands: a, .. }, Self::Interleaved { bands: b, .. }) => a == b,
            _ => false,
        }
    }

    /// The same layout re-declared for different dimensions.
    pub fn with_size(&self, width: i32, height: i32) -> Result<SampleModel, RasterError> {
        match self {
            Self::PackedArgb { .. } => SampleModel::packed_argb(width, height),
            Self::Interleaved { bands, .. } => SampleModel::interleaved(width, height, *bands),
        }
    }

    /// Short human-readable layout description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::PackedArgb { .. } => "packed-argb".to_string(),
            Self::Interleaved { bands, .. } => format!("interleaved/{}", bands),
        }
    }
}

fn check_dims(width: i32, height: i32) -> Result<(), RasterError> {
    if width <= 0 || height <= 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Describes how sample values are to be interpreted as colors.
///
/// Only the two properties the pipeline acts on are carried: whether an
/// alpha band exists, and whether color bands are premultiplied by it
/// (which decides how alpha multiplication scales pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorModel {
    pub has_alpha: bool,
    pub premultiplied: bool,
}

impl ColorModel {
    /// Straight (non-premultiplied) ARGB.
    pub const ARGB: ColorModel = ColorModel {
        has_alpha: true,
        premultiplied: false,
    };

    /// Premultiplied ARGB.
    pub const ARGB_PRE: ColorModel = ColorModel {
        has_alpha: true,
        premultiplied: true,
    };

    /// Opaque color, no alpha band.
    pub const OPAQUE: ColorModel = ColorModel {
        has_alpha: false,
        premultiplied: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(SampleModel::packed_argb(0, 10).is_err());
        assert!(SampleModel::packed_argb(10, -1).is_err());
        assert!(SampleModel::interleaved(-4, 4, 1).is_err());
    }

    #[test]
    fn test_rejects_bad_band_count() {
        assert!(matches!(
            SampleModel::interleaved(8, 8, 0),
            Err(RasterError::UnsupportedBandCount { bands: 0 })
        ));
        assert!(SampleModel::interleaved(8, 8, 5).is_err());
        assert!(SampleModel::interleaved(8, 8, 4).is_ok());
    }

    #[test]
    fn test_layout_matches_ignores_dims() {
        let a = SampleModel::packed_argb(16, 16).unwrap();
        let b = SampleModel::packed_argb(500, 300).unwrap();
        assert!(a.layout_matches(&b));

        let c = SampleModel::interleaved(16, 16, 2).unwrap();
        let d = SampleModel::interleaved(8, 8, 2).unwrap();
        let e = SampleModel::interleaved(8, 8, 3).unwrap();
        assert!(c.layout_matches(&d));
        assert!(!c.layout_matches(&e));
        assert!(!a.layout_matches(&c));
    }

    #[test]
    fn test_with_size_keeps_layout() {
        let m = SampleModel::interleaved(16, 16, 3).unwrap();
        let resized = m.with_size(100, 50).unwrap();
        assert_eq!(resized.width(), 100);
        assert_eq!(resized.bands(), 3);
        assert!(m.layout_matches(&resized));
    }
}
