//! Terrain mesh construction: the interleaved vertex grid, the shared
//! stitched index buffer covering every LOD and neighbor-delta combination,
//! and incremental updates after height edits.

pub mod error;
pub mod stitched_indices;
pub mod terrain_mesh;
pub mod vertex;
pub mod vertex_format;

pub use error::MeshError;
pub use stitched_indices::{IndexRange, StitchedIndexTable};
pub use terrain_mesh::{PatchBounds, TerrainMesh};
pub use vertex::TerrainVertex;
pub use vertex_format::{
    TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT, terrain_vertex_buffer_layout,
};
