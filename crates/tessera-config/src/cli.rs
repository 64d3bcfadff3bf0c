//! Command-line argument parsing for the terrain demo.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, HeightSourceConfig};

/// Tessera terrain command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Tessera LOD terrain")]
pub struct CliArgs {
    /// Vertices per terrain side.
    #[arg(long)]
    pub size: Option<usize>,

    /// Vertices per patch side.
    #[arg(long)]
    pub patch_size: Option<usize>,

    /// World units between vertices.
    #[arg(long)]
    pub world_scale: Option<f32>,

    /// Seed for procedural height sources.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Load initial heights from this image instead of generating them.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Camera far plane used for LOD regions.
    #[arg(long)]
    pub far_plane: Option<f32>,

    /// Enable or disable frustum culling.
    #[arg(long)]
    pub culling: Option<bool>,

    /// Splat texels per patch side.
    #[arg(long)]
    pub splat_resolution: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames the headless demo runs.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Write the edited heightmap here when the demo finishes.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Brushes the demo strokes with, in order: raise, lower, flatten,
    /// smooth, noise, paint or erase.
    #[arg(long, value_delimiter = ',', default_values = ["raise", "flatten", "paint"])]
    pub strokes: Vec<String>,

    /// Upload edits to GPU buffers on a headless device.
    #[arg(long)]
    pub gpu: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.size {
            self.terrain.size = size;
        }
        if let Some(patch_size) = args.patch_size {
            self.terrain.patch_size = patch_size;
        }
        if let Some(scale) = args.world_scale {
            self.terrain.world_scale = scale;
        }
        if let Some(new_seed) = args.seed {
            match &mut self.terrain.source {
                HeightSourceConfig::Midpoint { seed, .. } => *seed = new_seed,
                HeightSourceConfig::Fbm { seed, .. } => *seed = new_seed as u32,
                HeightSourceConfig::Flat { .. } | HeightSourceConfig::Heightmap { .. } => {}
            }
        }
        if let Some(ref path) = args.heightmap {
            let (min_height, max_height) = match self.terrain.source {
                HeightSourceConfig::Midpoint {
                    min_height,
                    max_height,
                    ..
                }
                | HeightSourceConfig::Heightmap {
                    min_height,
                    max_height,
                    ..
                } => (min_height, max_height),
                _ => (0.0, 256.0),
            };
            self.terrain.source = HeightSourceConfig::Heightmap {
                path: path.clone(),
                min_height,
                max_height,
            };
        }
        if let Some(far) = args.far_plane {
            self.lod.far_plane = far;
        }
        if let Some(enabled) = args.culling {
            self.culling.enabled = enabled;
        }
        if let Some(resolution) = args.splat_resolution {
            self.splat.resolution = resolution;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            size: Some(129),
            far_plane: Some(800.0),
            culling: Some(false),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.size, 129);
        assert_eq!(config.lod.far_plane, 800.0);
        assert!(!config.culling.enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.patch_size, 33);
        assert_eq!(config.lod.control_factor, 0.6);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_seed_reaches_procedural_source() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs {
            seed: Some(42),
            ..CliArgs::default()
        });
        assert!(matches!(
            config.terrain.source,
            HeightSourceConfig::Midpoint { seed: 42, .. }
        ));
    }

    #[test]
    fn test_heightmap_replaces_source_keeping_range() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs {
            heightmap: Some(PathBuf::from("hills.png")),
            ..CliArgs::default()
        });
        assert_eq!(
            config.terrain.source,
            HeightSourceConfig::Heightmap {
                path: PathBuf::from("hills.png"),
                min_height: 0.0,
                max_height: 256.0,
            }
        );
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = CliArgs::parse_from(["tessera", "--patch-size", "17", "--frames", "3"]);
        assert_eq!(args.patch_size, Some(17));
        assert_eq!(args.frames, 3);
        assert!(args.export.is_none());
        assert_eq!(args.strokes, ["raise", "flatten", "paint"]);
        assert!(!args.gpu);
    }

    #[test]
    fn test_parse_stroke_list() {
        let args = CliArgs::parse_from(["tessera", "--strokes", "smooth,erase", "--gpu"]);
        assert_eq!(args.strokes, ["smooth", "erase"]);
        assert!(args.gpu);
    }
}
