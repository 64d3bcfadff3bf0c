//! Interleaved terrain vertex.

/// One terrain vertex, 32 bytes, uploaded as-is to the GPU.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]` (x and z are grid coordinates times the
///     world scale, y is the height)
///   - `[12..20]` tex_coords `[f32; 2]` (grid position divided by `size - 1`)
///   - `[20..32]` normal `[f32; 3]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

impl TerrainVertex {
    /// Vertex for grid cell `(x, z)` of a terrain `size` vertices wide, normal pointing up.
    pub fn at_grid(x: usize, z: usize, height: f32, size: usize, world_scale: f32) -> Self {
        let denom = size.saturating_sub(1).max(1) as f32;
        Self {
            position: [x as f32 * world_scale, height, z as f32 * world_scale],
            tex_coords: [x as f32 / denom, z as f32 / denom],
            normal: [0.0, 1.0, 0.0],
        }
    }

    pub fn height(&self) -> f32 {
        self.position[1]
    }
}
