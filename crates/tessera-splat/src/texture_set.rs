//! JSON description of the textures a terrain blends between.
//!
//! ```json
//! { "textures": [
//!     { "filename": "grass.png", "uv_scale": [8, 8], "uv_offset": [0, 0],
//!       "height_range": [0, 40], "is_splat": true }
//! ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TextureSetError;

/// Splat channels store texture indices as `u8`.
pub const MAX_TEXTURES: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureEntry {
    pub filename: String,
    pub uv_scale: [f32; 2],
    pub uv_offset: [f32; 2],
    /// Heights `[min, max]` at which the texture is applied when seeding.
    pub height_range: [f32; 2],
    /// Whether the texture takes part in splat blending.
    pub is_splat: bool,
}

impl Default for TextureEntry {
    fn default() -> Self {
        Self {
            filename: String::new(),
            uv_scale: [1.0, 1.0],
            uv_offset: [0.0, 0.0],
            height_range: [f32::MIN, f32::MAX],
            is_splat: true,
        }
    }
}

impl TextureEntry {
    pub fn covers_height(&self, height: f32) -> bool {
        let [lo, hi] = self.height_range;
        height >= lo && height <= hi
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSet {
    pub textures: Vec<TextureEntry>,
}

impl TextureSet {
    pub fn new(textures: Vec<TextureEntry>) -> Result<Self, TextureSetError> {
        let set = Self { textures };
        set.validate()?;
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self, TextureSetError> {
        let text = std::fs::read_to_string(path).map_err(|source| TextureSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), textures = set.len(), "texture set loaded");
        Ok(set)
    }

    pub fn save(&self, path: &Path) -> Result<(), TextureSetError> {
        let io_err = |source| TextureSetError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json()?).map_err(io_err)
    }

    pub fn from_json(text: &str) -> Result<Self, TextureSetError> {
        let set: Self = serde_json::from_str(text)?;
        set.validate()?;
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String, TextureSetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), TextureSetError> {
        if self.textures.len() > MAX_TEXTURES {
            return Err(TextureSetError::TooManyTextures {
                count: self.textures.len(),
                max: MAX_TEXTURES,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Splat textures whose height range contains `height`, with their set index.
    pub fn active_for_height(&self, height: f32) -> impl Iterator<Item = (u8, &TextureEntry)> {
        self.textures
            .iter()
            .enumerate()
            .filter(move |(_, entry)| entry.is_splat && entry.covers_height(height))
            .map(|(index, entry)| (index as u8, entry))
    }
}
