//! Mapping from persisted configuration to engine types.

use tessera_brush::BrushSettings;
use tessera_config::{Config, CullTestKind, CullingConfig, DepthConvention, HeightSourceConfig};
use tessera_render::{CullSettings, CullTest, DepthRange};
use tessera_terrain::{FbmParams, HeightSource, MidpointParams};

use crate::TerrainDesc;

impl TerrainDesc {
    pub fn from_config(config: &Config) -> Self {
        Self {
            size: config.terrain.size,
            patch_size: config.terrain.patch_size,
            world_scale: config.terrain.world_scale,
            far_plane: config.lod.far_plane,
            control_factor: config.lod.control_factor,
            splat_resolution: config.splat.resolution,
            base_texture: config.splat.base_texture,
            brush: BrushSettings {
                raise_jitter: config.brush.raise_jitter,
            },
        }
    }
}

pub fn height_source(source: &HeightSourceConfig) -> HeightSource {
    match source {
        HeightSourceConfig::Flat { height } => HeightSource::Flat { height: *height },
        HeightSourceConfig::Midpoint {
            seed,
            roughness,
            min_height,
            max_height,
        } => HeightSource::MidpointDisplacement(MidpointParams {
            seed: *seed,
            roughness: *roughness,
            min_height: *min_height,
            max_height: *max_height,
        }),
        HeightSourceConfig::Fbm {
            seed,
            octaves,
            lacunarity,
            persistence,
            base_frequency,
            amplitude,
        } => HeightSource::Fbm(FbmParams {
            seed: *seed,
            octaves: *octaves,
            lacunarity: *lacunarity,
            persistence: *persistence,
            base_frequency: *base_frequency,
            amplitude: *amplitude,
        }),
        HeightSourceConfig::Heightmap {
            path,
            min_height,
            max_height,
        } => HeightSource::Heightmap {
            path: path.clone(),
            min_height: *min_height,
            max_height: *max_height,
        },
    }
}

pub fn cull_settings(culling: &CullingConfig) -> CullSettings {
    CullSettings {
        enabled: culling.enabled,
        test: match culling.test {
            CullTestKind::CornerPoints => CullTest::CornerPoints,
            CullTestKind::BoundingBox => CullTest::BoundingBox,
        },
        depth_range: match culling.depth_range {
            DepthConvention::ZeroToOne => DepthRange::ZeroToOne,
            DepthConvention::NegOneToOne => DepthRange::NegOneToOne,
            DepthConvention::Reversed => DepthRange::Reversed,
        },
        skip_top_bottom: culling.skip_top_bottom,
    }
}
