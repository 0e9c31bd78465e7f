//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{BasisKind, Config};

/// Geosphere command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "geosphere", about = "Fixed-budget planet terrain quadtree")]
pub struct CliArgs {
    /// Number of patches in the pool.
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Planet radius in lattice units.
    #[arg(long)]
    pub radius: Option<i32>,

    /// Root layout.
    #[arg(long, value_enum)]
    pub basis: Option<BasisKind>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of frames to fly.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(n) = args.pool_size {
            self.quadtree.pool_size = n;
        }
        if let Some(r) = args.radius {
            self.quadtree.radius = r;
        }
        if let Some(basis) = args.basis {
            self.quadtree.basis = basis;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(frames) = args.frames {
            self.camera.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
