//! Tessera terrain: the owning terrain object, the frame/input director and
//! configuration glue on top of the LOD, mesh, splat, brush and render crates.

pub mod director;
pub mod settings;
pub mod stats;
pub mod terrain;


pub use director::{BrushInput, BrushSelection, TerrainDirector};
pub use stats::FrameStats;
pub use terrain::{Terrain, TerrainDesc, TerrainError};
