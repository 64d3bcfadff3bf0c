//! World-space brushes: height sculpting (raise, lower, flatten, smooth,
//! noise) on a [`HeightField`](tessera_terrain::HeightField) and texture
//! painting (paint, erase) on a
//! [`SplatPaintStore`](tessera_splat::SplatPaintStore).

mod engine;
mod falloff;
mod params;

pub use engine::{BrushEngine, BrushSettings, StrokeState};
pub use falloff::{DEFAULT_RAISE_JITTER, brush_falloff, cell_noise, flatten_blend};
pub use params::{BrushKind, BrushParams};
