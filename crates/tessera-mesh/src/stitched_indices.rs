//! Shared index buffer holding every LOD and neighbor-delta fan pattern.
//!
//! Each patch is tiled with triangle fans two LOD strides wide. A fan has its
//! center at `(x + step, z + step)` and walks its border counter-clockwise as
//! seen from above: up the left edge, along the top, down the right edge and
//! back along the bottom, emitting two triangles per side. When a fan sits on a
//! patch border whose neighbor is one LOD coarser, that side's two triangles
//! collapse into one spanning the whole `2 * step` edge, so the mid-edge vertex
//! the coarse neighbor lacks is never referenced.
//!
//! Indices are relative to the patch origin inside the full terrain vertex
//! grid, so one table serves every patch through a base-vertex offset.

use tessera_lod::{DELTA_COMBINATIONS, PatchLayout, PatchLodEntry};

/// Slice of the shared index buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub count: u32,
}

impl IndexRange {
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    pub fn triangle_count(&self) -> u32 {
        self.count / 3
    }

    pub fn as_range(&self) -> std::ops::Range<u32> {
        self.start..self.end()
    }
}

/// One index buffer plus a flat `(lod, deltas)` lookup keyed by
/// [`PatchLodEntry::packed_key`].
#[derive(Clone, Debug)]
pub struct StitchedIndexTable {
    indices: Vec<u32>,
    ranges: Vec<IndexRange>,
    patch_size: usize,
    row_stride: usize,
    max_lod: u32,
}

impl StitchedIndexTable {
    /// Build fans for every LOD `0..=max_lod` and all 16 delta combinations.
    pub fn build(layout: &PatchLayout) -> Self {
        let patch_size = layout.patch_size();
        let row_stride = layout.vertices_x();
        let max_lod = layout.max_lod();
        let keys = (max_lod as usize + 1) * DELTA_COMBINATIONS;

        let mut table = Self {
            indices: Vec::with_capacity(Self::estimate_len(patch_size, max_lod)),
            ranges: Vec::with_capacity(keys),
            patch_size,
            row_stride,
            max_lod,
        };

        for key in 0..keys {
            let entry = PatchLodEntry::from_packed_key(key);
            let start = table.indices.len() as u32;
            table.emit_patch(&entry);
            let count = table.indices.len() as u32 - start;
            table.ranges.push(IndexRange { start, count });
        }

        tracing::debug!(
            patch_size,
            max_lod,
            indices = table.indices.len(),
            "stitched index table built"
        );
        table
    }

    /// Upper bound on the index count, ignoring collapsed triangles.
    fn estimate_len(patch_size: usize, max_lod: u32) -> usize {
        (0..=max_lod)
            .map(|lod| {
                let fans = (patch_size - 1) >> (lod + 1);
                fans * fans * 8 * 3 * DELTA_COMBINATIONS
            })
            .sum()
    }

    fn emit_patch(&mut self, entry: &PatchLodEntry) {
        let step = 1usize << entry.core;
        let span = 2 * step;
        let last = self.patch_size - 1 - span;

        for z in (0..self.patch_size - 1).step_by(span) {
            for x in (0..self.patch_size - 1).step_by(span) {
                let collapse_left = x == 0 && entry.left == 1;
                let collapse_right = x == last && entry.right == 1;
                let collapse_bottom = z == 0 && entry.bottom == 1;
                let collapse_top = z == last && entry.top == 1;
                self.emit_fan(
                    x,
                    z,
                    step,
                    [collapse_left, collapse_top, collapse_right, collapse_bottom],
                );
            }
        }
    }

    /// Emit one fan at origin `(x, z)`. `collapse` is ordered left, top, right, bottom.
    fn emit_fan(&mut self, x: usize, z: usize, step: usize, collapse: [bool; 4]) {
        let span = 2 * step;
        let center = (x + step, z + step);
        // Border walk: each side is (start corner, mid-edge, end corner).
        let sides = [
            [(x, z), (x, z + step), (x, z + span)],
            [(x, z + span), (x + step, z + span), (x + span, z + span)],
            [(x + span, z + span), (x + span, z + step), (x + span, z)],
            [(x + span, z), (x + step, z), (x, z)],
        ];

        for (side, skip_mid) in sides.iter().zip(collapse) {
            if skip_mid {
                self.push_triangle(center, side[0], side[2]);
            } else {
                self.push_triangle(center, side[0], side[1]);
                self.push_triangle(center, side[1], side[2]);
            }
        }
    }

    fn push_triangle(&mut self, a: (usize, usize), b: (usize, usize), c: (usize, usize)) {
        for (x, z) in [a, b, c] {
            self.indices.push((z * self.row_stride + x) as u32);
        }
    }

    /// Range for a patch's LOD entry.
    pub fn range_for(&self, entry: &PatchLodEntry) -> IndexRange {
        let key = entry.packed_key().min(self.ranges.len() - 1);
        self.ranges[key]
    }

    /// Range for an explicit `(lod, left, right, top, bottom)` combination.
    ///
    /// `lod` is clamped to `max_lod` and any non-zero delta counts as 1.
    pub fn range(&self, lod: u32, left: u8, right: u8, top: u8, bottom: u8) -> IndexRange {
        self.range_for(&PatchLodEntry {
            core: lod.min(self.max_lod),
            left: (left != 0) as u8,
            right: (right != 0) as u8,
            top: (top != 0) as u8,
            bottom: (bottom != 0) as u8,
        })
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Every recorded range in packed-key order.
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    pub fn max_lod(&self) -> u32 {
        self.max_lod
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    /// Row stride of the vertex grid the indices address.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }
}
