//! The terrain object: owns the height field, mesh, LOD state, splat store
//! and brush engine, and keeps them consistent across edits.

use std::path::Path;

use glam::{Mat4, Vec2, Vec3};
use tessera_brush::{BrushEngine, BrushKind, BrushParams, BrushSettings};
use tessera_lod::{
    DEFAULT_CONTROL_FACTOR, LodError, LodRegionTable, PatchLayout, PatchLodMap,
    max_lod_for_patch_size,
};
use tessera_mesh::{MeshError, TerrainMesh};
use tessera_render::{CullSettings, FrustumCuller, PatchDrawCall, PatchDrawSink, PendingUploads};
use tessera_splat::{SplatPaintStore, TextureSet, TextureSetError};
use tessera_terrain::{
    GridRect, HeightField, HeightFieldError, HeightSource, load_png, load_raw_f32, save_png,
    save_raw_f32,
};
use tracing::{debug, info, warn};

use crate::FrameStats;

#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error(transparent)]
    Lod(#[from] LodError),
    #[error(transparent)]
    HeightField(#[from] HeightFieldError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    TextureSet(#[from] TextureSetError),
    #[error("world scale must be positive and finite, got {0}")]
    InvalidWorldScale(f32),
}

/// Construction parameters for a [`Terrain`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainDesc {
    /// Vertices per side; `size - 1` must be a multiple of `patch_size - 1`.
    pub size: usize,
    pub patch_size: usize,
    pub world_scale: f32,
    pub far_plane: f32,
    pub control_factor: f32,
    /// Splat texels per patch side.
    pub splat_resolution: usize,
    pub base_texture: u8,
    pub brush: BrushSettings,
}

impl Default for TerrainDesc {
    fn default() -> Self {
        Self {
            size: 257,
            patch_size: 33,
            world_scale: 1.0,
            far_plane: 2000.0,
            control_factor: DEFAULT_CONTROL_FACTOR,
            splat_resolution: 128,
            base_texture: 0,
            brush: BrushSettings::default(),
        }
    }
}

pub struct Terrain {
    field: HeightField,
    mesh: TerrainMesh,
    regions: LodRegionTable,
    lod_map: PatchLodMap,
    splat: SplatPaintStore,
    brush: BrushEngine,
    pending: PendingUploads,
}

impl Terrain {
    /// Generate heights from `source` and build everything derived from them.
    ///
    /// The patch size is validated before any heights are generated.
    pub fn new(desc: TerrainDesc, source: &HeightSource) -> Result<Self, TerrainError> {
        max_lod_for_patch_size(desc.patch_size)?;
        if !(desc.world_scale.is_finite() && desc.world_scale > 0.0) {
            return Err(TerrainError::InvalidWorldScale(desc.world_scale));
        }

        let field = source.generate(desc.size)?;
        let per_side = field.patches_per_side(desc.patch_size)?;
        let layout = PatchLayout::new(desc.patch_size, per_side, per_side, desc.world_scale)?;
        let regions = LodRegionTable::for_layout(&layout, desc.far_plane, desc.control_factor);
        let mesh = TerrainMesh::build(&field, layout)?;

        info!(
            source = source.kind(),
            size = field.size(),
            patches = layout.patch_count(),
            max_lod = layout.max_lod(),
            "terrain created"
        );

        Ok(Self {
            lod_map: PatchLodMap::new(layout),
            splat: SplatPaintStore::new(layout, desc.splat_resolution, desc.base_texture),
            brush: BrushEngine::new(desc.brush),
            pending: PendingUploads::default(),
            field,
            mesh,
            regions,
        })
    }

    pub fn max_lod(&self) -> u32 {
        self.regions.max_lod()
    }

    pub fn layout(&self) -> &PatchLayout {
        self.mesh.layout()
    }

    pub fn size(&self) -> usize {
        self.field.size()
    }

    pub fn world_scale(&self) -> f32 {
        self.layout().world_scale()
    }

    /// World-space side length of the whole terrain.
    pub fn world_extent(&self) -> f32 {
        (self.size() - 1) as f32 * self.world_scale()
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn region_table(&self) -> &LodRegionTable {
        &self.regions
    }

    pub fn lod_map(&self) -> &PatchLodMap {
        &self.lod_map
    }

    pub fn splat(&self) -> &SplatPaintStore {
        &self.splat
    }

    pub fn brush(&self) -> &BrushEngine {
        &self.brush
    }

    /// Recompute every patch's LOD and neighbor deltas for `camera_position`.
    pub fn update(&mut self, camera_position: Vec3) {
        self.lod_map
            .update(camera_position, &self.regions, &self.field);
    }

    /// Update LODs, cull, and hand every visible patch to `sink`.
    pub fn render(
        &mut self,
        camera_position: Vec3,
        view_projection: &Mat4,
        cull: &CullSettings,
        sink: &mut impl PatchDrawSink,
    ) -> FrameStats {
        self.update(camera_position);

        let culler = FrustumCuller::new(view_projection, cull);
        let mut stats = FrameStats::new(self.max_lod());
        let layout = *self.layout();
        for (patch_x, patch_z) in layout.patches() {
            if !culler.is_visible(&self.mesh.patch_bounds(patch_x, patch_z)) {
                stats.culled += 1;
                continue;
            }
            let lod = self.lod_map.get(patch_x, patch_z);
            let call = PatchDrawCall {
                patch_x,
                patch_z,
                lod,
                base_vertex: self.mesh.base_vertex(patch_x, patch_z),
                range: self.mesh.index_range(&lod),
            };
            sink.draw_patch(&call);
            stats.record(&call);
        }
        stats
    }

    /// Start a stroke at a world position; flatten targets the height there.
    pub fn begin_stroke(&mut self, world_x: f32, world_z: f32) {
        let scale = self.world_scale();
        self.brush
            .begin_stroke(&self.field, Vec2::new(world_x, world_z), scale);
    }

    pub fn end_stroke(&mut self) {
        self.brush.end_stroke();
    }

    /// Apply a sculpting brush and propagate it to the mesh. Outside a
    /// [`begin_stroke`](Self::begin_stroke) / [`end_stroke`](Self::end_stroke)
    /// pair the call is a stroke of its own.
    ///
    /// Returns the grid rectangle that was edited, `None` when nothing changed.
    pub fn apply_height_brush(
        &mut self,
        kind: BrushKind,
        world_x: f32,
        world_z: f32,
        radius: f32,
        strength: f32,
    ) -> Option<GridRect> {
        if !kind.edits_height() {
            debug!(kind = kind.name(), "not a sculpting brush, ignored");
            return None;
        }
        let params = BrushParams::new(kind, Vec2::new(world_x, world_z), radius, strength);
        let scale = self.world_scale();
        let rect = self.brush.apply_height(&mut self.field, &params, scale)?;
        let touched = self.mesh.apply_height_edit(&self.field, &rect);
        self.pending
            .push_vertex_range(self.mesh.vertex_range(&touched));
        Some(rect)
    }

    /// Apply a paint or erase brush. Returns the number of texels changed.
    pub fn apply_paint_brush(&mut self, params: &BrushParams) -> usize {
        self.brush.apply_paint(&mut self.splat, params)
    }

    /// Reset every splat texel to the base texture.
    pub fn reset_splat(&mut self) {
        self.splat.reset_all_to_base_texture();
    }

    /// Seed splat weights from texture height ranges.
    pub fn seed_splat(&mut self, textures: &TextureSet) {
        self.splat.seed_from_heights(textures, &self.field);
    }

    /// Load a texture set and seed the splat store from it. On failure the
    /// splat store is left as it was.
    pub fn load_texture_set(&mut self, path: &Path) -> Result<TextureSet, TerrainError> {
        let textures = TextureSet::load(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "texture set not loaded");
        })?;
        self.seed_splat(&textures);
        info!(path = %path.display(), textures = textures.len(), "texture set loaded");
        Ok(textures)
    }

    /// Height at a grid vertex, clamped to the grid.
    pub fn height(&self, grid_x: usize, grid_z: usize) -> f32 {
        let last = self.size() - 1;
        self.field.get(grid_x.min(last), grid_z.min(last))
    }

    /// Bilinear height at a world position, clamped at the edges.
    pub fn height_interpolated(&self, world_x: f32, world_z: f32) -> f32 {
        let scale = self.world_scale();
        self.field.sample_bilinear(world_x / scale, world_z / scale)
    }

    /// Drain edits not yet written to GPU buffers.
    pub fn take_pending_uploads(&mut self) -> PendingUploads {
        let mut uploads = std::mem::take(&mut self.pending);
        uploads.push_splat_patches(self.splat.take_dirty());
        uploads
    }

    /// Replace heights from an 8-bit grayscale PNG mapped onto
    /// `[min_height, max_height]`.
    ///
    /// The image must match the terrain size. On any error the terrain is
    /// unchanged.
    pub fn load_heightmap(
        &mut self,
        path: &Path,
        min_height: f32,
        max_height: f32,
    ) -> Result<(), TerrainError> {
        let loaded = load_png(path, min_height, max_height);
        self.replace_heights(path, loaded)
    }

    /// Replace heights from a raw little-endian `f32` dump.
    pub fn load_raw_heights(&mut self, path: &Path) -> Result<(), TerrainError> {
        let loaded = load_raw_f32(path);
        self.replace_heights(path, loaded)
    }

    /// Write heights as an 8-bit grayscale PNG. Returns the `(min, max)`
    /// heights the gray levels span.
    pub fn save_heightmap(&self, path: &Path) -> Result<(f32, f32), TerrainError> {
        let range = save_png(&self.field, path)?;
        info!(path = %path.display(), min = range.0, max = range.1, "heightmap saved");
        Ok(range)
    }

    pub fn save_raw_heights(&self, path: &Path) -> Result<(), TerrainError> {
        save_raw_f32(&self.field, path)?;
        Ok(())
    }

    fn replace_heights(
        &mut self,
        path: &Path,
        loaded: Result<HeightField, HeightFieldError>,
    ) -> Result<(), TerrainError> {
        let field = loaded.and_then(|field| {
            if field.size() != self.size() {
                return Err(HeightFieldError::SizeMismatch {
                    expected: self.size(),
                    actual: field.size(),
                });
            }
            Ok(field)
        });
        let field = match field {
            Ok(field) => field,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "heights not loaded, terrain unchanged");
                return Err(e.into());
            }
        };

        self.field = field;
        let touched = self
            .mesh
            .apply_height_edit(&self.field, &GridRect::full(self.size()));
        self.pending
            .push_vertex_range(self.mesh.vertex_range(&touched));
        info!(path = %path.display(), "heights loaded");
        Ok(())
    }
}
