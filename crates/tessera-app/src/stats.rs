//! Per-frame patch statistics.

use std::fmt;

use tessera_render::PatchDrawCall;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub visible: usize,
    pub culled: usize,
    pub triangles: u64,
    /// Visible patches per core LOD, index 0 the finest.
    pub lod_histogram: Vec<usize>,
}

impl FrameStats {
    pub fn new(max_lod: u32) -> Self {
        Self {
            lod_histogram: vec![0; max_lod as usize + 1],
            ..Self::default()
        }
    }

    pub fn record(&mut self, call: &PatchDrawCall) {
        self.visible += 1;
        self.triangles += call.range.triangle_count() as u64;
        let lod = call.lod.core as usize;
        if lod >= self.lod_histogram.len() {
            self.lod_histogram.resize(lod + 1, 0);
        }
        self.lod_histogram[lod] += 1;
    }

    pub fn total(&self) -> usize {
        self.visible + self.culled
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} patches, {} triangles, lods {:?}",
            self.visible,
            self.total(),
            self.triangles,
            self.lod_histogram
        )
    }
}
