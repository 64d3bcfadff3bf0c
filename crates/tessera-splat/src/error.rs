use std::path::PathBuf;

use thiserror::Error;

/// Failures loading or saving a [`TextureSet`](crate::TextureSet).
#[derive(Debug, Error)]
pub enum TextureSetError {
    #[error("failed to read texture set {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid texture set JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("texture set lists {count} textures, at most {max} are addressable")]
    TooManyTextures { count: usize, max: usize },
}
