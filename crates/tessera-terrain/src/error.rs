//! Height-field error types.

/// Errors raised while building, validating, loading or saving a height field.
#[derive(Debug, thiserror::Error)]
pub enum HeightFieldError {
    /// Width and depth differ; only square terrains are supported.
    #[error("height field must be square, got {width}x{depth}")]
    NotSquare { width: usize, depth: usize },

    /// Fewer than two samples per side cannot form a single quad.
    #[error("height field size {size} is too small (minimum 2)")]
    TooSmall { size: usize },

    /// `(size - 1)` is not a multiple of `(patch_size - 1)`.
    #[error(
        "height field size {size} does not tile into patches of {patch_size}: \
         (size - 1) must be a multiple of (patch_size - 1)"
    )]
    IncompatiblePatchSize { size: usize, patch_size: usize },

    /// A sample buffer does not hold `size * size` values.
    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    /// A loaded height map does not match the configured terrain size.
    #[error("height map is {actual}x{actual}, terrain expects {expected}x{expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A raw height file length is not a multiple of 4 bytes.
    #[error("raw height file length {len} is not a whole number of f32 samples")]
    NotWholeSamples { len: usize },

    /// A raw height file's sample count has no integer square root.
    #[error("raw height file holds {samples} samples, which is not a perfect square")]
    NotPerfectSquare { samples: usize },

    /// Reading or writing a height file failed.
    #[error("height map io error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding a height-map image failed.
    #[error("height map image error: {0}")]
    Image(#[from] image::ImageError),
}
