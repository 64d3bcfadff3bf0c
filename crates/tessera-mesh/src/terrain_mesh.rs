//! The full terrain vertex grid plus the shared stitched index table.

use std::ops::Range;

use glam::Vec3;
use tessera_lod::{PatchLayout, PatchLodEntry};
use tessera_terrain::{GridRect, HeightField};

use crate::{IndexRange, MeshError, StitchedIndexTable, TerrainVertex};

/// World-space axis-aligned bounds of one patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl PatchBounds {
    /// The eight box corners, bottom four first.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}

/// Vertices for every grid sample, one shared index table, and per-patch
/// height extents.
///
/// The vertex buffer is row-major over the whole terrain (`z * size + x`), so
/// a patch is drawn with its [`base_vertex`](Self::base_vertex) and the
/// index range for its current LOD entry.
pub struct TerrainMesh {
    layout: PatchLayout,
    vertices: Vec<TerrainVertex>,
    table: StitchedIndexTable,
    /// `(min, max)` height of every vertex in each patch, row-major by patch.
    height_bounds: Vec<(f32, f32)>,
}

impl TerrainMesh {
    /// Build vertices from `field`, the index table, and initial normals.
    pub fn build(field: &HeightField, layout: PatchLayout) -> Result<Self, MeshError> {
        let size = layout.vertices_x();
        if field.size() != size || layout.vertices_z() != size {
            return Err(MeshError::FieldSizeMismatch {
                expected: size,
                actual: field.size(),
            });
        }
        if size * size > u32::MAX as usize {
            return Err(MeshError::TooManyVertices {
                vertices: size * size,
            });
        }

        let scale = layout.world_scale();
        let vertices = (0..size * size)
            .map(|i| {
                let (x, z) = (i % size, i / size);
                TerrainVertex::at_grid(x, z, field.get(x, z), size, scale)
            })
            .collect();

        let mut mesh = Self {
            table: StitchedIndexTable::build(&layout),
            height_bounds: vec![(0.0, 0.0); layout.patch_count()],
            layout,
            vertices,
        };
        mesh.recompute_normals(&GridRect::full(size));
        mesh.refresh_bounds(&GridRect::full(size));

        tracing::info!(
            size,
            patch_size = layout.patch_size(),
            patches = layout.patch_count(),
            max_lod = layout.max_lod(),
            indices = mesh.table.indices().len(),
            "terrain mesh built"
        );
        Ok(mesh)
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    /// Vertices per side.
    pub fn size(&self) -> usize {
        self.layout.vertices_x()
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn vertex(&self, x: usize, z: usize) -> &TerrainVertex {
        &self.vertices[z * self.size() + x]
    }

    pub fn index_table(&self) -> &StitchedIndexTable {
        &self.table
    }

    pub fn indices(&self) -> &[u32] {
        self.table.indices()
    }

    pub fn base_vertex(&self, patch_x: usize, patch_z: usize) -> u32 {
        self.layout.base_vertex(patch_x, patch_z) as u32
    }

    /// Index range for a patch's LOD entry.
    pub fn index_range(&self, entry: &PatchLodEntry) -> IndexRange {
        self.table.range_for(entry)
    }

    /// Cached `(min, max)` height of a patch.
    pub fn patch_height_range(&self, patch_x: usize, patch_z: usize) -> (f32, f32) {
        self.height_bounds[self.layout.patch_index(patch_x, patch_z)]
    }

    /// World-space box around a patch.
    ///
    /// The vertical extent covers every vertex of the patch, which always
    /// includes its four corners.
    pub fn patch_bounds(&self, patch_x: usize, patch_z: usize) -> PatchBounds {
        let origin = self.layout.patch_world_origin(patch_x, patch_z);
        let extent = self.layout.patch_world_extent();
        let (lo, hi) = self.patch_height_range(patch_x, patch_z);
        PatchBounds {
            min: Vec3::new(origin.x, lo, origin.y),
            max: Vec3::new(origin.x + extent, hi, origin.y + extent),
        }
    }

    /// Pull edited heights into the vertex grid and repair everything derived
    /// from them.
    ///
    /// Returns the region whose vertices changed (`rect` plus a one-vertex
    /// ring for the normals).
    pub fn apply_height_edit(&mut self, field: &HeightField, rect: &GridRect) -> GridRect {
        let size = self.size();
        for (x, z) in rect.cells() {
            self.vertices[z * size + x].position[1] = field.get(x, z);
        }
        let touched = rect.expanded(1, size);
        self.recompute_normals(&touched);
        self.refresh_bounds(rect);
        touched
    }

    /// Contiguous vertex-buffer slice covering `rect`.
    pub fn vertex_range(&self, rect: &GridRect) -> Range<usize> {
        let size = self.size();
        rect.z0 * size + rect.x0..rect.z1 * size + rect.x1 + 1
    }

    /// Recompute normals of the vertices inside `rect`.
    ///
    /// Face normals of the LOD 0 uniform fans around each vertex are summed
    /// unnormalized, so larger triangles weigh more, then normalized.
    pub fn recompute_normals(&mut self, rect: &GridRect) {
        let size = self.size();
        for (x, z) in rect.cells() {
            self.vertices[z * size + x].normal = [0.0; 3];
        }

        let fine = self.table.range_for(&PatchLodEntry::uniform(0));
        let fine = &self.table.indices()[fine.start as usize..fine.end() as usize];
        let patches: Vec<(usize, usize)> = self.layout.patches_touching(rect).collect();

        for (px, pz) in patches {
            let base = self.layout.base_vertex(px, pz);
            for tri in fine.chunks_exact(3) {
                let ids = [
                    base + tri[0] as usize,
                    base + tri[1] as usize,
                    base + tri[2] as usize,
                ];
                if !ids.iter().any(|&i| rect.contains(i % size, i / size)) {
                    continue;
                }
                let [a, b, c] = ids.map(|i| Vec3::from(self.vertices[i].position));
                let face = (b - a).cross(c - a);
                for i in ids {
                    if rect.contains(i % size, i / size) {
                        let n = &mut self.vertices[i].normal;
                        n[0] += face.x;
                        n[1] += face.y;
                        n[2] += face.z;
                    }
                }
            }
        }

        for (x, z) in rect.cells() {
            let n = Vec3::from(self.vertices[z * size + x].normal);
            self.vertices[z * size + x].normal = n.try_normalize().unwrap_or(Vec3::Y).to_array();
        }
    }

    /// Recompute cached height extents of every patch touching `rect`.
    pub fn refresh_bounds(&mut self, rect: &GridRect) {
        let patches: Vec<(usize, usize)> = self.layout.patches_touching(rect).collect();
        for (px, pz) in patches {
            let (mut lo, mut hi) = (f32::INFINITY, f32::NEG_INFINITY);
            for (x, z) in self.layout.patch_rect(px, pz).cells() {
                let h = self.vertex(x, z).height();
                lo = lo.min(h);
                hi = hi.max(h);
            }
            let index = self.layout.patch_index(px, pz);
            self.height_bounds[index] = (lo, hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_mesh(patch_size: usize, patches: usize) -> (HeightField, TerrainMesh) {
        let layout = PatchLayout::new(patch_size, patches, patches, 2.0).unwrap();
        let field = HeightField::flat(layout.vertices_x(), 5.0).unwrap();
        let mesh = TerrainMesh::build(&field, layout).unwrap();
        (field, mesh)
    }

    fn normal_close(v: &TerrainVertex, expected: Vec3) -> bool {
        Vec3::from(v.normal).distance(expected) < 1e-4
    }

    #[test]
    fn test_rejects_mismatched_field() {
        let layout = PatchLayout::new(9, 2, 2, 1.0).unwrap();
        let field = HeightField::flat(9, 0.0).unwrap();
        assert_eq!(
            TerrainMesh::build(&field, layout).err(),
            Some(MeshError::FieldSizeMismatch {
                expected: 17,
                actual: 9
            })
        );
    }

    #[test]
    fn test_vertex_positions_follow_grid() {
        let (_, mesh) = flat_mesh(9, 2);
        assert_eq!(mesh.vertices().len(), 17 * 17);
        assert_eq!(mesh.vertex(3, 4).position, [6.0, 5.0, 8.0]);
        assert_eq!(mesh.vertex(16, 16).tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn test_flat_ground_normals_point_up() {
        let (_, mesh) = flat_mesh(9, 2);
        for v in mesh.vertices() {
            assert!(normal_close(v, Vec3::Y), "normal {:?}", v.normal);
        }
    }

    #[test]
    fn test_slope_normals_tilt_away_from_rise() {
        let layout = PatchLayout::new(9, 1, 1, 1.0).unwrap();
        let heights = (0..81).map(|i| (i % 9) as f32).collect();
        let field = HeightField::from_heights(9, heights).unwrap();
        let mesh = TerrainMesh::build(&field, layout).unwrap();
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!(
            normal_close(mesh.vertex(4, 4), expected),
            "interior normal {:?}",
            mesh.vertex(4, 4).normal
        );
    }

    #[test]
    fn test_base_vertex_addresses_patch_origin() {
        let (_, mesh) = flat_mesh(9, 3);
        let base = mesh.base_vertex(2, 1) as usize;
        assert_eq!(base, 8 * 25 + 16);
        let range = mesh.index_range(&PatchLodEntry::uniform(0));
        for &i in &mesh.indices()[range.start as usize..range.end() as usize] {
            assert!(base + (i as usize) < mesh.vertices().len());
        }
    }

    #[test]
    fn test_height_edit_updates_vertices_normals_and_bounds() {
        let (mut field, mut mesh) = flat_mesh(9, 2);
        field.set(8, 8, 20.0);
        let rect = GridRect::new(8, 8, 8, 8);
        let touched = mesh.apply_height_edit(&field, &rect);

        assert_eq!(touched, GridRect::new(7, 7, 9, 9));
        assert_eq!(mesh.vertex(8, 8).height(), 20.0);
        assert!(mesh.vertex(7, 8).normal[0] < 0.0, "neighbor tilts away from peak");
        assert!(normal_close(mesh.vertex(0, 0), Vec3::Y), "far vertex untouched");
        for (px, pz) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(
                mesh.patch_height_range(px, pz),
                (5.0, 20.0),
                "all four patches share the corner vertex"
            );
        }
    }

    #[test]
    fn test_sculpted_interior_widens_bounds() {
        let (mut field, mut mesh) = flat_mesh(9, 2);
        field.set(4, 4, -3.0);
        mesh.apply_height_edit(&field, &GridRect::new(4, 4, 4, 4));
        let bounds = mesh.patch_bounds(0, 0);
        assert_eq!(bounds.min, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(16.0, 5.0, 16.0));
        assert_eq!(mesh.patch_height_range(1, 1), (5.0, 5.0));
    }

    #[test]
    fn test_vertex_range_spans_rect_rows() {
        let (_, mesh) = flat_mesh(9, 2);
        let range = mesh.vertex_range(&GridRect::new(2, 3, 5, 4));
        assert_eq!(range, 3 * 17 + 2..4 * 17 + 6);
    }
}
