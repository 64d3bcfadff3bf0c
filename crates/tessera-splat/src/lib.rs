//! Texture splatting: per-patch texel grids of up to four texture-set
//! indices with blend weights, painted by brushes independently of mesh
//! resolution, plus the JSON texture-set description they index into.

mod error;
mod splat_store;
mod texture_set;

pub use error::TextureSetError;
pub use splat_store::{
    SPLAT_CHANNELS, SplatMode, SplatPaintStore, SplatPatchData, SplatStroke, WEIGHT_EPSILON,
};
pub use texture_set::{MAX_TEXTURES, TextureEntry, TextureSet};
