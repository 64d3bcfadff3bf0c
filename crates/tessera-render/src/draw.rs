//! Per-patch draw calls and where they go.

use tessera_lod::PatchLodEntry;
use tessera_mesh::IndexRange;

/// Everything needed to draw one patch from the shared buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchDrawCall {
    pub patch_x: usize,
    pub patch_z: usize,
    pub lod: PatchLodEntry,
    pub base_vertex: u32,
    pub range: IndexRange,
}

/// Receives the visible patches of a frame.
pub trait PatchDrawSink {
    fn draw_patch(&mut self, call: &PatchDrawCall);
}

/// Issues an indexed draw per patch. Buffers must already be bound, see
/// [`TerrainGpuBuffers::bind`](crate::TerrainGpuBuffers::bind).
impl PatchDrawSink for wgpu::RenderPass<'_> {
    fn draw_patch(&mut self, call: &PatchDrawCall) {
        self.draw_indexed(call.range.as_range(), call.base_vertex as i32, 0..1);
    }
}

/// Records calls, for headless runs and tests.
impl PatchDrawSink for Vec<PatchDrawCall> {
    fn draw_patch(&mut self, call: &PatchDrawCall) {
        self.push(*call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_records_calls_in_order() {
        let mut sink: Vec<PatchDrawCall> = Vec::new();
        for patch_x in 0..3 {
            sink.draw_patch(&PatchDrawCall {
                patch_x,
                patch_z: 0,
                lod: PatchLodEntry::uniform(1),
                base_vertex: patch_x as u32 * 8,
                range: IndexRange { start: 0, count: 96 },
            });
        }
        let xs: Vec<usize> = sink.iter().map(|c| c.patch_x).collect();
        assert_eq!(xs, vec![0, 1, 2]);
    }
}
