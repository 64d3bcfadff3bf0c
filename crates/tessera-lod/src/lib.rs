//! Level-of-detail management for patch-based terrain: patch-size validation,
//! distance-to-LOD region tables, and the per-frame patch LOD map with
//! neighbor deltas used for seam stitching.

mod error;
mod layout;
mod patch_lod_map;
mod region_table;

pub use error::LodError;
pub use layout::{PatchLayout, max_lod_for_patch_size};
pub use patch_lod_map::{DELTA_COMBINATIONS, PatchLodEntry, PatchLodMap};
pub use region_table::{CONTROL_FACTOR_RANGE, DEFAULT_CONTROL_FACTOR, LodRegionTable};
