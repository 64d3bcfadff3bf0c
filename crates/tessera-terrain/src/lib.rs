//! Height-field terrain data: the elevation grid, grid rectangles, generation
//! strategies (flat, midpoint displacement, fBm noise, height-map images) and
//! height-map persistence.

mod error;
mod fbm;
mod height_field;
mod heightmap_io;
mod midpoint;
mod source;

pub use error::HeightFieldError;
pub use fbm::{FbmParams, FbmSampler};
pub use height_field::{GridRect, HeightField};
pub use heightmap_io::{decode_raw_f32, load_png, load_raw_f32, save_png, save_raw_f32};
pub use midpoint::{MidpointParams, midpoint_displacement};
pub use source::HeightSource;
