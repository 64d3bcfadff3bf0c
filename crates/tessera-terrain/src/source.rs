//! Terrain-generation strategies.

use std::path::PathBuf;

use crate::{
    FbmParams, FbmSampler, HeightField, HeightFieldError, MidpointParams, load_png,
    midpoint_displacement,
};

/// Where a terrain's initial heights come from.
///
/// Every variant produces a plain [`HeightField`]; the mesh and LOD engine
/// never know which strategy built it.
#[derive(Clone, Debug, PartialEq)]
pub enum HeightSource {
    /// Constant height everywhere.
    Flat { height: f32 },
    /// Diamond-square fractal.
    MidpointDisplacement(MidpointParams),
    /// Multi-octave simplex noise.
    Fbm(FbmParams),
    /// 8-bit grayscale image mapped onto `[min_height, max_height]`.
    Heightmap {
        path: PathBuf,
        min_height: f32,
        max_height: f32,
    },
}

impl Default for HeightSource {
    fn default() -> Self {
        Self::MidpointDisplacement(MidpointParams::default())
    }
}

impl HeightSource {
    /// Build a `size`×`size` height field.
    ///
    /// A height-map image whose side length differs from `size` is rejected
    /// with [`HeightFieldError::SizeMismatch`].
    pub fn generate(&self, size: usize) -> Result<HeightField, HeightFieldError> {
        match self {
            Self::Flat { height } => HeightField::flat(size, *height),
            Self::MidpointDisplacement(params) => midpoint_displacement(size, params),
            Self::Fbm(params) => FbmSampler::new(params.clone()).generate(size),
            Self::Heightmap {
                path,
                min_height,
                max_height,
            } => {
                let field = load_png(path, *min_height, *max_height)?;
                if field.size() != size {
                    return Err(HeightFieldError::SizeMismatch {
                        expected: size,
                        actual: field.size(),
                    });
                }
                Ok(field)
            }
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flat { .. } => "flat",
            Self::MidpointDisplacement(_) => "midpoint",
            Self::Fbm(_) => "fbm",
            Self::Heightmap { .. } => "heightmap",
        }
    }
}
