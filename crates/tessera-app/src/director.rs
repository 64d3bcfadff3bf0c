//! Frame driver: renders the terrain for a camera and turns pointer input
//! into brush strokes.

use glam::Vec2;
use tessera_brush::{BrushKind, BrushParams};
use tessera_config::Config;
use tessera_render::{
    BufferError, CameraView, CullSettings, PatchDrawSink, PendingUploads, TerrainGpuBuffers,
};
use tracing::{debug, info, warn};

use crate::settings::{cull_settings, height_source};
use crate::{FrameStats, Terrain, TerrainDesc, TerrainError};

/// Pointer events over the terrain, already projected to world XZ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BrushInput {
    /// Button pressed: starts a stroke and applies the brush once.
    Press { x: f32, z: f32 },
    /// Pointer moved; applies the brush only while a stroke is active.
    Drag { x: f32, z: f32 },
    /// Button released: ends the stroke.
    Release,
}

/// The brush the user has selected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSelection {
    pub kind: BrushKind,
    pub radius: f32,
    pub strength: f32,
    pub texture_index: u8,
}

impl Default for BrushSelection {
    fn default() -> Self {
        Self {
            kind: BrushKind::Raise,
            radius: 16.0,
            strength: 1.0,
            texture_index: 1,
        }
    }
}

pub struct TerrainDirector {
    terrain: Terrain,
    cull: CullSettings,
    brush: BrushSelection,
    frame: u64,
    stats_interval: Option<u32>,
    depth_mismatch_warned: bool,
}

impl TerrainDirector {
    pub fn new(terrain: Terrain, cull: CullSettings) -> Self {
        Self {
            terrain,
            cull,
            brush: BrushSelection::default(),
            frame: 0,
            stats_interval: None,
            depth_mismatch_warned: false,
        }
    }

    /// Build the terrain described by `config`, seeding splat weights from its
    /// texture set when one is configured. A texture set that fails to load
    /// leaves the base texture everywhere.
    pub fn from_config(config: &Config) -> Result<Self, TerrainError> {
        let mut terrain = Terrain::new(
            TerrainDesc::from_config(config),
            &height_source(&config.terrain.source),
        )?;
        if let Some(path) = &config.terrain.texture_set
            && terrain.load_texture_set(path).is_err()
        {
            warn!("continuing with the base splat texture");
        }

        let mut director = Self::new(terrain, CullSettings::default());
        director.apply_config(config);
        Ok(director)
    }

    /// Apply the settings that can change while running: culling, brush
    /// defaults and frame-stats logging. The selected brush kind is kept.
    /// Terrain shape and height source only take effect on the next start.
    pub fn apply_config(&mut self, config: &Config) {
        self.set_cull_settings(cull_settings(&config.culling));
        self.select_brush(BrushSelection {
            radius: config.brush.radius,
            strength: config.brush.strength,
            texture_index: config.brush.paint_texture,
            ..self.brush
        });
        self.stats_interval = config
            .debug
            .log_frame_stats
            .then_some(config.debug.stats_interval.max(1));
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    pub fn cull_settings(&self) -> &CullSettings {
        &self.cull
    }

    pub fn set_cull_settings(&mut self, cull: CullSettings) {
        if cull.depth_range != self.cull.depth_range {
            self.depth_mismatch_warned = false;
        }
        self.cull = cull;
    }

    pub fn brush(&self) -> &BrushSelection {
        &self.brush
    }

    /// Switching brushes mid-stroke ends the current stroke.
    pub fn select_brush(&mut self, brush: BrushSelection) {
        if brush.kind != self.brush.kind {
            self.terrain.end_stroke();
        }
        self.brush = brush;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Render one frame into `sink`.
    ///
    /// Frustum planes are extracted with the camera's depth convention; a
    /// configured convention that disagrees is reported once and ignored.
    pub fn frame(
        &mut self,
        camera: &impl CameraView,
        sink: &mut impl PatchDrawSink,
    ) -> FrameStats {
        let depth_range = camera.depth_range();
        if depth_range != self.cull.depth_range && !self.depth_mismatch_warned {
            warn!(
                configured = ?self.cull.depth_range,
                camera = ?depth_range,
                "depth convention differs from the camera, culling with the camera's"
            );
            self.depth_mismatch_warned = true;
        }
        let cull = CullSettings {
            depth_range,
            ..self.cull
        };
        let stats = self.terrain.render(
            camera.position(),
            &camera.view_projection(),
            &cull,
            sink,
        );
        self.frame += 1;
        if let Some(interval) = self.stats_interval
            && self.frame % u64::from(interval) == 0
        {
            debug!(frame = self.frame, "{stats}");
        }
        stats
    }

    /// Feed one pointer event. Returns `true` when terrain data changed.
    pub fn handle_brush_input(&mut self, input: BrushInput) -> bool {
        match input {
            BrushInput::Press { x, z } => {
                self.terrain.begin_stroke(x, z);
                self.apply_brush(x, z)
            }
            BrushInput::Drag { x, z } => {
                if !self.terrain.brush().is_painting() {
                    return false;
                }
                self.apply_brush(x, z)
            }
            BrushInput::Release => {
                self.terrain.end_stroke();
                false
            }
        }
    }

    pub fn take_pending_uploads(&mut self) -> PendingUploads {
        self.terrain.take_pending_uploads()
    }

    /// Create GPU buffers holding the current terrain. Edits made before this
    /// call are already included, so pending uploads are dropped.
    pub fn create_gpu_buffers(
        &mut self,
        device: &wgpu::Device,
    ) -> Result<TerrainGpuBuffers, BufferError> {
        let buffers =
            TerrainGpuBuffers::create(device, self.terrain.mesh(), self.terrain.splat())?;
        let skipped = self.terrain.take_pending_uploads();
        info!(
            vertices = skipped.vertex_count(),
            splat_patches = skipped.splat_patches.len(),
            "terrain buffers created"
        );
        Ok(buffers)
    }

    /// Write pending edits to `buffers`, returning what was written.
    pub fn upload(&mut self, queue: &wgpu::Queue, buffers: &TerrainGpuBuffers) -> PendingUploads {
        let uploads = self.terrain.take_pending_uploads();
        buffers.flush(queue, self.terrain.mesh(), self.terrain.splat(), &uploads);
        uploads
    }

    /// Bind the terrain buffers and draw the visible patches into `pass`.
    /// The terrain pipeline and its bind groups must already be set.
    pub fn frame_on_gpu(
        &mut self,
        camera: &impl CameraView,
        buffers: &TerrainGpuBuffers,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> FrameStats {
        buffers.bind(pass);
        self.frame(camera, pass)
    }

    fn apply_brush(&mut self, x: f32, z: f32) -> bool {
        let brush = self.brush;
        if brush.kind.edits_height() {
            self.terrain
                .apply_height_brush(brush.kind, x, z, brush.radius, brush.strength)
                .is_some()
        } else {
            let params = BrushParams::new(brush.kind, Vec2::new(x, z), brush.radius, brush.strength)
                .with_texture(brush.texture_index);
            self.terrain.apply_paint_brush(&params) > 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tessera_config::{CullTestKind, DepthConvention};
    use tessera_render::{Camera, CullTest, DepthRange, HeadlessGpu, PatchDrawCall};

    fn director() -> TerrainDirector {
        let mut config = Config::default();
        config.terrain.size = 65;
        config.terrain.patch_size = 17;
        config.terrain.world_scale = 1.0;
        config.splat.resolution = 8;
        TerrainDirector::from_config(&config).unwrap()
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let mut director = director();
        let before = director.terrain().height_field().clone();
        assert!(!director.handle_brush_input(BrushInput::Drag { x: 32.0, z: 32.0 }));
        assert_eq!(director.terrain().height_field(), &before);
    }

    #[test]
    fn test_press_drag_release_cycle() {
        let mut director = director();
        assert!(director.handle_brush_input(BrushInput::Press { x: 32.0, z: 32.0 }));
        assert!(director.terrain().brush().is_painting());
        assert!(director.handle_brush_input(BrushInput::Drag { x: 34.0, z: 32.0 }));
        assert!(!director.handle_brush_input(BrushInput::Release));
        assert!(!director.terrain().brush().is_painting());
        assert!(!director.take_pending_uploads().vertex_ranges.is_empty());
    }

    #[test]
    fn test_paint_selection_dirties_splat() {
        let mut director = director();
        director.take_pending_uploads();
        director.select_brush(BrushSelection {
            kind: BrushKind::Paint,
            radius: 6.0,
            strength: 1.0,
            texture_index: 3,
        });
        assert!(director.handle_brush_input(BrushInput::Press { x: 8.0, z: 8.0 }));
        director.handle_brush_input(BrushInput::Release);
        let uploads = director.take_pending_uploads();
        assert_eq!(uploads.splat_patches, vec![0]);
        assert!(uploads.vertex_ranges.is_empty());
    }

    #[test]
    fn test_frame_draws_patches_in_view() {
        let mut director = director();
        let camera = Camera::looking_at(Vec3::new(32.0, 300.0, 120.0), Vec3::new(32.0, 0.0, 32.0));
        let mut calls: Vec<PatchDrawCall> = Vec::new();
        let stats = director.frame(&camera, &mut calls);
        assert_eq!(stats.visible, calls.len());
        assert_eq!(stats.total(), 16);
        assert!(stats.visible > 0);
        assert_eq!(director.frame_count(), 1);
    }

    #[test]
    fn test_culling_follows_camera_depth_convention() {
        let camera = Camera::looking_at(Vec3::new(32.0, 300.0, 120.0), Vec3::new(32.0, 0.0, 32.0));
        let mut matching = director();
        let mut calls: Vec<PatchDrawCall> = Vec::new();
        let expected = matching.frame(&camera, &mut calls);

        let mut mismatched = director();
        mismatched.set_cull_settings(CullSettings {
            depth_range: DepthRange::Reversed,
            ..*mismatched.cull_settings()
        });
        let mut mismatched_calls: Vec<PatchDrawCall> = Vec::new();
        let stats = mismatched.frame(&camera, &mut mismatched_calls);
        assert_eq!(stats, expected);
        assert_eq!(mismatched_calls, calls);
        assert!(stats.visible > 0);
    }

    #[test]
    fn test_apply_config_updates_runtime_settings_only() {
        let mut director = director();
        director.select_brush(BrushSelection {
            kind: BrushKind::Smooth,
            ..*director.brush()
        });
        let mut config = Config::default();
        config.culling.test = CullTestKind::BoundingBox;
        config.culling.depth_range = DepthConvention::Reversed;
        config.brush.radius = 3.0;
        config.brush.paint_texture = 5;
        config.terrain.size = 129;
        director.apply_config(&config);

        assert_eq!(director.cull_settings().test, CullTest::BoundingBox);
        assert_eq!(director.cull_settings().depth_range, DepthRange::Reversed);
        assert_eq!(director.brush().kind, BrushKind::Smooth, "selected kind kept");
        assert_eq!(director.brush().radius, 3.0);
        assert_eq!(director.brush().texture_index, 5);
        assert_eq!(director.terrain().size(), 65, "terrain shape needs a restart");
    }

    #[test]
    fn test_gpu_buffers_receive_edits() {
        let Ok(gpu) = pollster::block_on(HeadlessGpu::new(true)) else {
            // No adapter (headless CI without GPU).
            return;
        };
        let mut director = director();
        let buffers = director.create_gpu_buffers(&gpu.device).unwrap();
        assert!(director.take_pending_uploads().is_empty(), "creation uploads everything");

        director.handle_brush_input(BrushInput::Press { x: 32.0, z: 32.0 });
        director.handle_brush_input(BrushInput::Release);
        let uploads = director.upload(&gpu.queue, &buffers);
        assert!(!uploads.vertex_ranges.is_empty());
        assert!(director.take_pending_uploads().is_empty());
        gpu.queue.submit([]);
    }
}
