//! Per-frame patch LOD assignment with neighbor deltas for seam stitching.

use glam::Vec3;
use tessera_terrain::HeightField;

use crate::{LodRegionTable, PatchLayout};

/// Number of neighbor-delta combinations per LOD level.
pub const DELTA_COMBINATIONS: usize = 16;

/// LOD chosen for one patch plus the coarser-neighbor flag on each side.
///
/// Left is -X, right is +X, bottom is -Z, top is +Z. A delta is 1 only when
/// the neighbor on that side has a strictly greater (coarser) core LOD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatchLodEntry {
    pub core: u32,
    pub left: u8,
    pub right: u8,
    pub top: u8,
    pub bottom: u8,
}

impl PatchLodEntry {
    /// Entry with no coarser neighbors.
    pub const fn uniform(core: u32) -> Self {
        Self {
            core,
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        }
    }

    /// The four delta bits packed as `left*8 + right*4 + top*2 + bottom`.
    #[inline]
    pub fn delta_mask(&self) -> usize {
        ((self.left as usize) << 3)
            | ((self.right as usize) << 2)
            | ((self.top as usize) << 1)
            | self.bottom as usize
    }

    /// Flat index-table key: `core * 16 + delta_mask`.
    #[inline]
    pub fn packed_key(&self) -> usize {
        self.core as usize * DELTA_COMBINATIONS + self.delta_mask()
    }

    /// Inverse of [`packed_key`](Self::packed_key).
    pub fn from_packed_key(key: usize) -> Self {
        let mask = key % DELTA_COMBINATIONS;
        Self {
            core: (key / DELTA_COMBINATIONS) as u32,
            left: ((mask >> 3) & 1) as u8,
            right: ((mask >> 2) & 1) as u8,
            top: ((mask >> 1) & 1) as u8,
            bottom: (mask & 1) as u8,
        }
    }
}

/// One [`PatchLodEntry`] per patch, rebuilt wholesale every frame.
#[derive(Clone, Debug)]
pub struct PatchLodMap {
    layout: PatchLayout,
    entries: Vec<PatchLodEntry>,
}

impl PatchLodMap {
    /// Map with every patch at LOD 0.
    pub fn new(layout: PatchLayout) -> Self {
        Self {
            entries: vec![PatchLodEntry::default(); layout.patch_count()],
            layout,
        }
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    /// Recompute every patch from the camera position.
    ///
    /// Pass one classifies each patch by the distance from `camera` to its
    /// middle vertex (including that vertex's height). Pass two derives the
    /// neighbor deltas from the completed core LODs.
    pub fn update(&mut self, camera: Vec3, table: &LodRegionTable, heights: &HeightField) {
        let layout = self.layout;
        let scale = layout.world_scale();
        self.assign_cores(|px, pz| {
            let (gx, gz) = layout.patch_center(px, pz);
            let center = Vec3::new(gx as f32 * scale, heights.get(gx, gz), gz as f32 * scale);
            table.distance_to_lod(camera.distance(center))
        });
    }

    /// Set every core LOD from `core_of(patch_x, patch_z)` and recompute deltas.
    pub fn assign_cores(&mut self, mut core_of: impl FnMut(usize, usize) -> u32) {
        let max_lod = self.layout.max_lod();
        for (px, pz) in self.layout.patches() {
            let index = self.layout.patch_index(px, pz);
            self.entries[index] = PatchLodEntry::uniform(core_of(px, pz).min(max_lod));
        }
        self.compute_deltas();
    }

    fn compute_deltas(&mut self) {
        let nx = self.layout.num_patches_x();
        let nz = self.layout.num_patches_z();
        let cores: Vec<u32> = self.entries.iter().map(|e| e.core).collect();
        let coarser = |core: u32, neighbor: Option<usize>| -> u8 {
            neighbor.is_some_and(|i| cores[i] > core) as u8
        };

        for pz in 0..nz {
            for px in 0..nx {
                let index = pz * nx + px;
                let core = cores[index];
                let entry = &mut self.entries[index];
                entry.left = coarser(core, (px > 0).then(|| index - 1));
                entry.right = coarser(core, (px + 1 < nx).then(|| index + 1));
                entry.bottom = coarser(core, (pz > 0).then(|| index - nx));
                entry.top = coarser(core, (pz + 1 < nz).then(|| index + nx));
            }
        }
    }

    pub fn get(&self, patch_x: usize, patch_z: usize) -> PatchLodEntry {
        self.entries[self.layout.patch_index(patch_x, patch_z)]
    }

    /// Entries in row-major patch order.
    pub fn entries(&self) -> &[PatchLodEntry] {
        &self.entries
    }

    /// Number of patches currently at each LOD, indexed by level.
    pub fn histogram(&self) -> Vec<usize> {
        let mut counts = vec![0; self.layout.max_lod() as usize + 1];
        for entry in &self.entries {
            counts[entry.core as usize] += 1;
        }
        counts
    }
}
