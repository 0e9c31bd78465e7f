//! Configuration for the geosphere driver.
//!
//! Settings persist to disk as RON files. CLI overrides come from clap, and
//! missing sections or fields fall back to defaults so old files keep
//! loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BasisKind, CameraConfig, Config, DebugConfig, QuadtreeSection, SchedulerSection,
    TerrainSection, default_config_dir,
};
pub use error::ConfigError;
