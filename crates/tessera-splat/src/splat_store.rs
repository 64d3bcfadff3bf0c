//! Per-patch splat texel grids and the paint/erase stroke logic.

use std::collections::BTreeSet;

use glam::Vec2;
use tessera_lod::PatchLayout;
use tessera_terrain::HeightField;

use crate::TextureSet;

/// Texture/weight pairs per texel.
pub const SPLAT_CHANNELS: usize = 4;

/// Weights below this count as empty.
pub const WEIGHT_EPSILON: f32 = 1e-6;

/// Whether a stroke adds or removes its texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplatMode {
    Paint,
    Erase,
}

/// One paint application in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatStroke {
    /// World-space XZ center.
    pub center: Vec2,
    pub radius: f32,
    /// Scales the per-texel influence, clamped to `[0, 1]` after falloff.
    pub strength: f32,
    pub texture_index: u8,
    pub mode: SplatMode,
}

/// `resolution`×`resolution` texels for one patch.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatPatchData {
    resolution: usize,
    indices: Vec<[u8; SPLAT_CHANNELS]>,
    weights: Vec<[f32; SPLAT_CHANNELS]>,
}

impl SplatPatchData {
    fn new(resolution: usize, base_index: u8) -> Self {
        let texels = resolution * resolution;
        Self {
            resolution,
            indices: vec![base_indices(base_index); texels],
            weights: vec![BASE_WEIGHTS; texels],
        }
    }

    fn reset(&mut self, base_index: u8) {
        self.indices.fill(base_indices(base_index));
        self.weights.fill(BASE_WEIGHTS);
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Texture indices and weights of texel `(u, v)`.
    pub fn texel(&self, u: usize, v: usize) -> ([u8; SPLAT_CHANNELS], [f32; SPLAT_CHANNELS]) {
        let i = v * self.resolution + u;
        (self.indices[i], self.weights[i])
    }

    pub fn indices(&self) -> &[[u8; SPLAT_CHANNELS]] {
        &self.indices
    }

    pub fn weights(&self) -> &[[f32; SPLAT_CHANNELS]] {
        &self.weights
    }

    /// Index grid as raw bytes, 4 per texel.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Weight grid as raw bytes, 16 per texel.
    pub fn weight_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.weights)
    }
}

const BASE_WEIGHTS: [f32; SPLAT_CHANNELS] = [1.0, 0.0, 0.0, 0.0];

fn base_indices(base_index: u8) -> [u8; SPLAT_CHANNELS] {
    [base_index, 0, 0, 0]
}

/// Splat data for every patch plus the set of patches changed since the
/// last GPU upload.
#[derive(Clone, Debug)]
pub struct SplatPaintStore {
    layout: PatchLayout,
    resolution: usize,
    base_index: u8,
    patches: Vec<SplatPatchData>,
    dirty: BTreeSet<usize>,
}

impl SplatPaintStore {
    /// Every texel starts in the base state; every patch starts dirty so the
    /// first upload fills GPU storage.
    pub fn new(layout: PatchLayout, resolution: usize, base_index: u8) -> Self {
        let resolution = resolution.max(1);
        let patches = (0..layout.patch_count())
            .map(|_| SplatPatchData::new(resolution, base_index))
            .collect();
        Self {
            dirty: (0..layout.patch_count()).collect(),
            layout,
            resolution,
            base_index,
            patches,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn base_index(&self) -> u8 {
        self.base_index
    }

    /// World-space side length of one texel.
    pub fn texel_size(&self) -> f32 {
        self.layout.patch_world_extent() / self.resolution as f32
    }

    pub fn patch(&self, patch_x: usize, patch_z: usize) -> &SplatPatchData {
        &self.patches[self.layout.patch_index(patch_x, patch_z)]
    }

    /// Patch by row-major index.
    pub fn patch_at(&self, index: usize) -> &SplatPatchData {
        &self.patches[index]
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Bytes one patch occupies in GPU storage: the index grid followed by the
    /// weight grid.
    pub fn patch_byte_len(&self) -> usize {
        self.resolution * self.resolution * (SPLAT_CHANNELS + SPLAT_CHANNELS * 4)
    }

    /// Byte offset of a patch's index grid in GPU storage.
    pub fn patch_byte_offset(&self, index: usize) -> usize {
        index * self.patch_byte_len()
    }

    /// Byte offset of a patch's weight grid in GPU storage.
    pub fn patch_weight_offset(&self, index: usize) -> usize {
        self.patch_byte_offset(index) + self.resolution * self.resolution * SPLAT_CHANNELS
    }

    /// Put every texel back to `(base, 0, 0, 0)` with weights `(1, 0, 0, 0)`.
    pub fn reset_all_to_base_texture(&mut self) {
        for patch in &mut self.patches {
            patch.reset(self.base_index);
        }
        self.mark_all_dirty();
        tracing::debug!(base_index = self.base_index, "splat store reset to base texture");
    }

    /// Assign textures by height: each texel blends, with equal weights, up to
    /// four splat textures whose height range contains the terrain height
    /// under its center. Texels matching none keep the base state.
    pub fn seed_from_heights(&mut self, textures: &TextureSet, field: &HeightField) {
        let texel = self.texel_size();
        let scale = self.layout.world_scale();
        for (px, pz) in self.layout.patches() {
            let origin = self.layout.patch_world_origin(px, pz);
            let index = self.layout.patch_index(px, pz);
            let patch = &mut self.patches[index];
            for v in 0..self.resolution {
                for u in 0..self.resolution {
                    let world = origin + (Vec2::new(u as f32, v as f32) + 0.5) * texel;
                    let height = field.sample_bilinear(world.x / scale, world.y / scale);

                    let mut indices = [0u8; SPLAT_CHANNELS];
                    let mut count = 0;
                    for (texture, _) in textures.active_for_height(height).take(SPLAT_CHANNELS) {
                        indices[count] = texture;
                        count += 1;
                    }

                    let i = v * self.resolution + u;
                    if count == 0 {
                        patch.indices[i] = base_indices(self.base_index);
                        patch.weights[i] = BASE_WEIGHTS;
                    } else {
                        let share = 1.0 / count as f32;
                        patch.indices[i] = indices;
                        patch.weights[i] =
                            std::array::from_fn(|c| if c < count { share } else { 0.0 });
                    }
                }
            }
        }
        self.mark_all_dirty();
        tracing::debug!(textures = textures.len(), "splat store seeded from heights");
    }

    /// Apply one stroke to every patch the brush circle overlaps.
    ///
    /// Returns the number of texels changed.
    pub fn paint_stroke(&mut self, stroke: &SplatStroke) -> usize {
        if stroke.radius <= 0.0 || !stroke.radius.is_finite() {
            return 0;
        }

        let texel = self.texel_size();
        let extent = self.layout.patch_world_extent();
        let brush_min = stroke.center - stroke.radius;
        let brush_max = stroke.center + stroke.radius;
        let last = self.resolution as i64 - 1;
        let mut changed = 0;

        for (px, pz) in self.layout.patches() {
            let origin = self.layout.patch_world_origin(px, pz);
            if brush_max.x < origin.x
                || brush_max.y < origin.y
                || brush_min.x > origin.x + extent
                || brush_min.y > origin.y + extent
            {
                continue;
            }

            // Texel space: texel (u, v) has its center at (u + 0.5, v + 0.5).
            let lo = (brush_min - origin) / texel - 0.5;
            let hi = (brush_max - origin) / texel - 0.5;
            let u0 = (lo.x.floor() as i64).clamp(0, last) as usize;
            let v0 = (lo.y.floor() as i64).clamp(0, last) as usize;
            let u1 = (hi.x.ceil() as i64).clamp(0, last) as usize;
            let v1 = (hi.y.ceil() as i64).clamp(0, last) as usize;

            let index = self.layout.patch_index(px, pz);
            let patch = &mut self.patches[index];
            let mut touched = 0;
            for v in v0..=v1 {
                for u in u0..=u1 {
                    let world = origin + (Vec2::new(u as f32, v as f32) + 0.5) * texel;
                    let distance = world.distance(stroke.center);
                    if distance >= stroke.radius {
                        continue;
                    }
                    let influence = (stroke.strength * smoothstep_falloff(distance, stroke.radius))
                        .clamp(0.0, 1.0);
                    let i = v * self.resolution + u;
                    if apply_texel(
                        &mut patch.indices[i],
                        &mut patch.weights[i],
                        stroke,
                        influence,
                        self.base_index,
                    ) {
                        touched += 1;
                    }
                }
            }

            if touched > 0 {
                self.dirty.insert(index);
                changed += touched;
            }
        }

        tracing::debug!(
            center = ?stroke.center,
            radius = stroke.radius,
            texture = stroke.texture_index,
            mode = ?stroke.mode,
            changed,
            "splat stroke applied"
        );
        changed
    }

    /// Drain the patches changed since the last call, in ascending index order.
    pub fn take_dirty(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    fn mark_all_dirty(&mut self) {
        self.dirty.extend(0..self.patches.len());
    }
}

/// 1 at the center, 0 at the radius, smooth at both ends.
fn smoothstep_falloff(distance: f32, radius: f32) -> f32 {
    let t = (1.0 - distance / radius).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Update one texel. Returns whether it was modified.
fn apply_texel(
    indices: &mut [u8; SPLAT_CHANNELS],
    weights: &mut [f32; SPLAT_CHANNELS],
    stroke: &SplatStroke,
    influence: f32,
    base_index: u8,
) -> bool {
    if influence <= 0.0 {
        return false;
    }

    if weights.iter().all(|w| w.abs() < WEIGHT_EPSILON) {
        indices[0] = stroke.texture_index;
    }

    let existing = indices.iter().position(|&i| i == stroke.texture_index);
    let channel = match (existing, stroke.mode) {
        (Some(channel), _) => channel,
        (None, SplatMode::Erase) => return false,
        (None, SplatMode::Paint) => {
            let weakest = lowest_weight_channel(weights);
            indices[weakest] = stroke.texture_index;
            weights[weakest] = 0.0;
            weakest
        }
    };

    match stroke.mode {
        SplatMode::Paint => {
            for (c, w) in weights.iter_mut().enumerate() {
                if c == channel {
                    *w += (1.0 - *w) * influence;
                } else {
                    *w -= *w * influence;
                }
            }
        }
        SplatMode::Erase => weights[channel] -= weights[channel] * influence,
    }

    let sum: f32 = weights.iter().sum();
    if sum < WEIGHT_EPSILON {
        *indices = base_indices(base_index);
        *weights = BASE_WEIGHTS;
    } else {
        for w in weights.iter_mut() {
            *w /= sum;
        }
    }
    true
}

fn lowest_weight_channel(weights: &[f32; SPLAT_CHANNELS]) -> usize {
    let mut lowest = 0;
    for c in 1..SPLAT_CHANNELS {
        if weights[c] < weights[lowest] {
            lowest = c;
        }
    }
    lowest
}
