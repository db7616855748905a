use thiserror::Error;

/// Errors raised while constructing rasters, images, or operator nodes.
///
/// These are fail-fast conditions: a graph that constructs successfully
/// never produces them at render time.
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    /// Raster or image dimensions are zero or negative.
    #[error("invalid dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions { width: i32, height: i32 },

    /// Image bounds describe an empty region.
    #[error("empty bounds: [{x}, {y}, {width}, {height}]")]
    EmptyBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    /// Sample layouts of two rasters (or a raster and its owning image)
    /// do not agree.
    #[error("incompatible sample models: expected {expected}, got {actual}")]
    IncompatibleSampleModel { expected: String, actual: String },

    /// Band count outside the supported 1-4 range.
    #[error("unsupported band count: {bands} (1-4 bands supported)")]
    UnsupportedBandCount { bands: usize },

    /// Backing sample buffer does not match the declared layout.
    #[error("sample buffer length mismatch: expected {expected} samples, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    /// A color matrix with the wrong shape was supplied.
    #[error("color matrix must have 20 coefficients (4 rows x 5 columns), got {actual}")]
    InvalidMatrixShape { actual: usize },

    /// The affine transform cannot be inverted (zero determinant).
    #[error("affine transform is not invertible (determinant ~ 0)")]
    NonInvertibleTransform,
}

/// Errors raised by [`crate::config::CacheConfig::validate`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Cache capacity of zero would cache nothing.
    #[error("cache capacity must be greater than 0")]
    ZeroCapacity,

    /// Tile dimension outside the supported range.
    #[error("tile size must be between {min} and {max}, got {actual}")]
    TileSizeOutOfRange { actual: i32, min: i32, max: i32 },
}
