//! Canonical `wgpu::VertexBufferLayout` for terrain rendering.
//!
//! | Location | Offset | Format    | Field      |
//! |----------|--------|-----------|------------|
//! | 0        | 0      | Float32x3 | position   |
//! | 1        | 12     | Float32x2 | tex_coords |
//! | 2        | 20     | Float32x3 | normal     |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::vertex::TerrainVertex;

pub const TERRAIN_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 20,
        shader_location: 2,
    },
];

/// Vertex buffer layout shared by every terrain pipeline.
pub const TERRAIN_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TerrainVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TERRAIN_VERTEX_ATTRIBUTES,
};

pub fn terrain_vertex_buffer_layout() -> VertexBufferLayout<'static> {
    TERRAIN_VERTEX_LAYOUT
}

const _: () = assert!(
    mem::size_of::<TerrainVertex>() == 32,
    "TerrainVertex size changed, update TERRAIN_VERTEX_LAYOUT"
);
const _: () = assert!(
    TERRAIN_VERTEX_ATTRIBUTES[1].offset == mem::offset_of!(TerrainVertex, tex_coords) as u64
);
const _: () =
    assert!(TERRAIN_VERTEX_ATTRIBUTES[2].offset == mem::offset_of!(TerrainVertex, normal) as u64);
const _: () = assert!(
    TERRAIN_VERTEX_ATTRIBUTES[2].offset + 12 <= mem::size_of::<TerrainVertex>() as u64,
    "Last attribute exceeds vertex stride"
);
