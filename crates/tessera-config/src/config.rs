//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level terrain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub terrain: TerrainConfig,
    pub lod: LodConfig,
    pub culling: CullingConfig,
    pub brush: BrushConfig,
    pub splat: SplatConfig,
    pub debug: DebugConfig,
}

/// Grid geometry and where the initial heights come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Vertices per side. `size - 1` must be a multiple of `patch_size - 1`.
    pub size: usize,
    /// Vertices per patch side: odd, at least 3, `patch_size - 1` a power of two.
    pub patch_size: usize,
    /// World units between neighboring vertices.
    pub world_scale: f32,
    pub source: HeightSourceConfig,
    /// Optional JSON texture set used to seed splat weights by height.
    pub texture_set: Option<PathBuf>,
}

/// Terrain generation strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HeightSourceConfig {
    Flat {
        height: f32,
    },
    Midpoint {
        seed: u64,
        roughness: f32,
        min_height: f32,
        max_height: f32,
    },
    Fbm {
        seed: u32,
        octaves: u32,
        lacunarity: f64,
        persistence: f64,
        base_frequency: f64,
        amplitude: f64,
    },
    Heightmap {
        path: PathBuf,
        min_height: f32,
        max_height: f32,
    },
}

/// Distance-based LOD selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Camera far-plane distance the LOD regions are spread over.
    pub far_plane: f32,
    /// Share of the far plane covered by LOD regions, kept within 0.5..=0.7.
    pub control_factor: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CullTestKind {
    /// Any of the eight patch box corners inside the frustum.
    CornerPoints,
    /// Conservative positive-vertex box test.
    BoundingBox,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DepthConvention {
    ZeroToOne,
    NegOneToOne,
    Reversed,
}

/// Per-patch frustum culling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CullingConfig {
    pub enabled: bool,
    pub test: CullTestKind,
    pub depth_range: DepthConvention,
    /// Ignore the top and bottom frustum planes.
    pub skip_top_bottom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrushConfig {
    /// Default radius in world units.
    pub radius: f32,
    /// Default strength.
    pub strength: f32,
    /// Relative positional jitter applied by raise/lower.
    pub raise_jitter: f32,
    /// Texture index painted when none is selected.
    pub paint_texture: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplatConfig {
    /// Texels per patch side.
    pub resolution: usize,
    /// Texture index of the blank state.
    pub base_texture: u8,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log per-frame patch statistics.
    pub log_frame_stats: bool,
    /// Frames between statistics lines.
    pub stats_interval: u32,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 257,
            patch_size: 33,
            world_scale: 4.0,
            source: HeightSourceConfig::default(),
            texture_set: None,
        }
    }
}

impl Default for HeightSourceConfig {
    fn default() -> Self {
        Self::Midpoint {
            seed: 0,
            roughness: 1.0,
            min_height: 0.0,
            max_height: 256.0,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            far_plane: 2000.0,
            control_factor: 0.6,
        }
    }
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            test: CullTestKind::CornerPoints,
            depth_range: DepthConvention::ZeroToOne,
            skip_top_bottom: false,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 16.0,
            strength: 1.0,
            raise_jitter: 0.05,
            paint_texture: 1,
        }
    }
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            resolution: 128,
            base_texture: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_frame_stats: false,
            stats_interval: 60,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: config_dir.join(CONFIG_FILE),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(write_error)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values that parse but cannot drive a terrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |section, field, reason| {
            Err(ConfigError::Invalid {
                section,
                field,
                reason,
            })
        };
        if !(self.terrain.world_scale > 0.0) {
            return invalid("terrain", "world_scale", "must be positive");
        }
        if !(self.lod.far_plane > 0.0) {
            return invalid("lod", "far_plane", "must be positive");
        }
        if !(self.lod.control_factor > 0.0 && self.lod.control_factor <= 1.0) {
            return invalid("lod", "control_factor", "must be in (0, 1]");
        }
        if !(self.brush.radius > 0.0) {
            return invalid("brush", "radius", "must be positive");
        }
        if self.splat.resolution == 0 {
            return invalid("splat", "resolution", "must be at least 1");
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Default directory: `<platform config dir>/tessera`, or the working
    /// directory when the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("tessera"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        let ron_str = ron::ser::to_string_pretty(&Config::default(), pretty).unwrap();
        assert!(ron_str.contains("patch_size: 33"));
        assert!(ron_str.contains("control_factor: 0.6"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.terrain.source = HeightSourceConfig::Fbm {
            seed: 9,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.02,
            amplitude: 30.0,
        };
        config.terrain.texture_set = Some(PathBuf::from("textures/terrain.json"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(terrain: (size: 129), lod: ())").unwrap();
        assert_eq!(config.terrain.size, 129);
        assert_eq!(config.terrain.patch_size, 33, "missing field keeps its default");
        assert_eq!(config.culling, CullingConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_enum_settings_parse() {
        let config: Config = ron::from_str(
            "(culling: (test: BoundingBox, depth_range: Reversed, skip_top_bottom: true))",
        )
        .unwrap();
        assert_eq!(config.culling.test, CullTestKind::BoundingBox);
        assert_eq!(config.culling.depth_range, DepthConvention::Reversed);
        assert!(config.culling.skip_top_bottom);
        assert!(config.culling.enabled);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.size = 513;
        config.lod.far_plane = 5000.0;
        config.splat.resolution = 64;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.brush.radius = 4.0;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.brush.radius), Some(4.0));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_out_of_range_value_names_its_section() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(lod: (control_factor: 1.5))").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                section: "lod",
                field: "control_factor",
                ..
            }
        ));
        assert_eq!(err.to_string(), "`lod.control_factor` must be in (0, 1]");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        let mut config = Config::default();
        config.splat.resolution = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
