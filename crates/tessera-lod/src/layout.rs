//! Patch geometry: how a square vertex grid is carved into LOD patches.

use glam::Vec2;
use tessera_terrain::GridRect;

use crate::LodError;

/// Highest LOD a patch of `patch_size` vertices per side supports.
///
/// LOD `L` samples every `2^L`-th vertex and builds triangle fans two strides
/// wide, so `2^(L+1)` must still fit inside `patch_size - 1` segments:
/// `max_lod = log2(patch_size - 1) - 1`.
pub fn max_lod_for_patch_size(patch_size: usize) -> Result<u32, LodError> {
    let invalid = |reason| LodError::InvalidPatchSize { patch_size, reason };
    if patch_size < 3 {
        return Err(invalid("must be at least 3"));
    }
    if patch_size % 2 == 0 {
        return Err(invalid("must be odd"));
    }
    let segments = patch_size - 1;
    if !segments.is_power_of_two() {
        return Err(invalid("patch_size - 1 must be a power of two"));
    }
    Ok(segments.trailing_zeros() - 1)
}

/// Validated patch grid geometry shared by the LOD, mesh, culling and splat code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchLayout {
    patch_size: usize,
    num_patches_x: usize,
    num_patches_z: usize,
    world_scale: f32,
    max_lod: u32,
}

impl PatchLayout {
    /// Validate the patch size and record the grid dimensions.
    pub fn new(
        patch_size: usize,
        num_patches_x: usize,
        num_patches_z: usize,
        world_scale: f32,
    ) -> Result<Self, LodError> {
        let max_lod = max_lod_for_patch_size(patch_size)?;
        if num_patches_x == 0 || num_patches_z == 0 {
            return Err(LodError::NoPatches {
                num_patches_x,
                num_patches_z,
            });
        }
        Ok(Self {
            patch_size,
            num_patches_x,
            num_patches_z,
            world_scale,
            max_lod,
        })
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn num_patches_x(&self) -> usize {
        self.num_patches_x
    }

    pub fn num_patches_z(&self) -> usize {
        self.num_patches_z
    }

    pub fn patch_count(&self) -> usize {
        self.num_patches_x * self.num_patches_z
    }

    pub fn world_scale(&self) -> f32 {
        self.world_scale
    }

    pub fn max_lod(&self) -> u32 {
        self.max_lod
    }

    /// Vertices per row of the full terrain grid.
    pub fn vertices_x(&self) -> usize {
        self.num_patches_x * (self.patch_size - 1) + 1
    }

    /// Vertices per column of the full terrain grid.
    pub fn vertices_z(&self) -> usize {
        self.num_patches_z * (self.patch_size - 1) + 1
    }

    /// Row-major patch index (`patch_z * num_patches_x + patch_x`).
    #[inline]
    pub fn patch_index(&self, patch_x: usize, patch_z: usize) -> usize {
        debug_assert!(patch_x < self.num_patches_x && patch_z < self.num_patches_z);
        patch_z * self.num_patches_x + patch_x
    }

    /// Grid coordinate of a patch's first vertex.
    #[inline]
    pub fn patch_origin(&self, patch_x: usize, patch_z: usize) -> (usize, usize) {
        (
            patch_x * (self.patch_size - 1),
            patch_z * (self.patch_size - 1),
        )
    }

    /// Grid coordinate of a patch's middle vertex.
    pub fn patch_center(&self, patch_x: usize, patch_z: usize) -> (usize, usize) {
        let (x, z) = self.patch_origin(patch_x, patch_z);
        let half = (self.patch_size - 1) / 2;
        (x + half, z + half)
    }

    /// Vertex cells covered by a patch, including the edges it shares with neighbors.
    pub fn patch_rect(&self, patch_x: usize, patch_z: usize) -> GridRect {
        let (x, z) = self.patch_origin(patch_x, patch_z);
        GridRect::new(x, z, x + self.patch_size - 1, z + self.patch_size - 1)
    }

    /// Offset of a patch's first vertex inside the row-major vertex buffer.
    pub fn base_vertex(&self, patch_x: usize, patch_z: usize) -> usize {
        let (x, z) = self.patch_origin(patch_x, patch_z);
        z * self.vertices_x() + x
    }

    /// World-space XZ position of a patch's first vertex.
    pub fn patch_world_origin(&self, patch_x: usize, patch_z: usize) -> Vec2 {
        let (x, z) = self.patch_origin(patch_x, patch_z);
        Vec2::new(x as f32, z as f32) * self.world_scale
    }

    /// World-space side length of one patch.
    pub fn patch_world_extent(&self) -> f32 {
        (self.patch_size - 1) as f32 * self.world_scale
    }

    /// Iterate `(patch_x, patch_z)` in row-major order.
    pub fn patches(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_patches_z).flat_map(move |z| (0..self.num_patches_x).map(move |x| (x, z)))
    }

    /// Patches whose vertex rectangle shares at least one vertex with `rect`.
    pub fn patches_touching(&self, rect: &GridRect) -> impl Iterator<Item = (usize, usize)> + '_ {
        let rect = *rect;
        self.patches()
            .filter(move |&(px, pz)| self.patch_rect(px, pz).intersects(&rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_patch_sizes_give_log2_minus_one() {
        let cases = [(3, 0), (5, 1), (9, 2), (17, 3), (33, 4), (65, 5), (129, 6)];
        for (patch_size, expected) in cases {
            assert_eq!(
                max_lod_for_patch_size(patch_size),
                Ok(expected),
                "patch_size {patch_size}"
            );
        }
    }

    #[test]
    fn test_invalid_patch_sizes_rejected() {
        for patch_size in [0, 1, 2, 4, 6, 7, 11, 32, 34, 63] {
            assert!(
                max_lod_for_patch_size(patch_size).is_err(),
                "patch_size {patch_size} should be rejected"
            );
        }
    }

    #[test]
    fn test_layout_requires_patches() {
        assert!(matches!(
            PatchLayout::new(33, 0, 2, 1.0),
            Err(LodError::NoPatches { .. })
        ));
    }

    #[test]
    fn test_patch_addressing() {
        let layout = PatchLayout::new(17, 3, 2, 0.5).unwrap();
        assert_eq!(layout.vertices_x(), 49);
        assert_eq!(layout.patch_index(2, 1), 5);
        assert_eq!(layout.patch_origin(2, 1), (32, 16));
        assert_eq!(layout.patch_center(2, 1), (40, 24));
        assert_eq!(layout.base_vertex(2, 1), 16 * 49 + 32);
        assert_eq!(layout.patch_world_origin(2, 1), Vec2::new(16.0, 8.0));
        assert_eq!(layout.patch_world_extent(), 8.0);
    }

    #[test]
    fn test_neighbouring_patches_share_edges() {
        let layout = PatchLayout::new(5, 2, 2, 1.0).unwrap();
        let a = layout.patch_rect(0, 0);
        let b = layout.patch_rect(1, 0);
        assert_eq!(a.x1, b.x0);
        let touching: Vec<_> = layout
            .patches_touching(&GridRect::new(4, 0, 4, 0))
            .collect();
        assert_eq!(touching, vec![(0, 0), (1, 0)]);
    }
}
