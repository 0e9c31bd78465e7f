//! Headless driver: builds a terrain quadtree from `config.ron` and flies a
//! camera from orbit down to the surface, logging what the tree does.
//!
//! Run with `cargo run -p geosphere-demo`, or override settings with e.g.
//! `cargo run -p geosphere-demo -- --pool-size 2000 --frames 600`.

mod flight;

use std::process::ExitCode;

use clap::Parser;
use geosphere_config::{CliArgs, Config, default_config_dir};
use tracing::{debug, error, info, warn};

use crate::flight::Demo;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Some(path) =
        geosphere_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        info!(path = %path.display(), "logging to file");
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let mut demo = match Demo::new(&config) {
        Ok(demo) => demo,
        Err(e) => {
            error!("failed to build quadtree: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        pool_size = demo.quadtree.pool_size(),
        radius = demo.quadtree.radius(),
        basis = ?demo.quadtree.basis(),
        frames = demo.flight.frames(),
        "starting flight"
    );

    let frames = demo.flight.frames();
    let report_every = (frames / 12).max(1);
    for frame in 0..frames {
        let report = demo.frame(frame);
        debug!(
            frame,
            altitude = report.altitude,
            splits = report.view.splits,
            merges = report.view.merges,
            resampled = report.render.geometry.resampled,
            restitched = report.render.geometry.restitched,
            draws = report.render.draws,
            "frame"
        );
        if frame % report_every == 0 || frame + 1 == frames {
            info!(
                frame,
                altitude = report.altitude,
                visible = report.view.visible,
                culled = report.view.culled,
                free = report.view.free,
                levels = ?report.levels,
                "view"
            );
        }
        if report.view.free == 0 {
            warn!(frame, "patch pool fully used");
        }
        if demo.validate
            && let Err(violation) = demo.quadtree.validate()
        {
            error!(frame, "topology broken: {violation}");
            return ExitCode::FAILURE;
        }
    }

    let stats = demo.quadtree.stats();
    info!(
        splits = stats.splits,
        forced_splits = stats.forced_splits,
        merges = stats.merges,
        forced_merges = stats.forced_merges,
        reclaim_merges = stats.reclaim_merges,
        cache_hits = stats.cache_hits,
        allocation_failures = stats.allocation_failures,
        "flight finished"
    );
    let (resampled, restitched) = demo.context.mesher().counts();
    info!(resampled, restitched, "geometry totals");
    ExitCode::SUCCESS
}
