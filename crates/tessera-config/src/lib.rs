//! Configuration for the tessera terrain engine.
//!
//! Settings persist to disk as RON, accept CLI overrides via clap, support
//! hot-reload detection, and stay forward/backward compatible through
//! `#[serde(default)]` on every section.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BrushConfig, Config, CullTestKind, CullingConfig, DebugConfig, DepthConvention,
    HeightSourceConfig, LodConfig, SplatConfig, TerrainConfig,
};
pub use error::ConfigError;
