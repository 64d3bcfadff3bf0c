//! LOD configuration errors.

/// Errors raised while validating patch geometry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LodError {
    /// The patch size cannot be subdivided into power-of-two LOD strides.
    #[error("invalid patch size {patch_size}: {reason}")]
    InvalidPatchSize {
        patch_size: usize,
        reason: &'static str,
    },

    /// The terrain does not hold at least one patch in each direction.
    #[error("terrain needs at least one patch per side, got {num_patches_x}x{num_patches_z}")]
    NoPatches {
        num_patches_x: usize,
        num_patches_z: usize,
    },
}
