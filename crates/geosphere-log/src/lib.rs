//! Structured logging for the geosphere driver.
//!
//! Console output with uptime timestamps and module paths, plus a JSON file in
//! debug builds. The level comes from `RUST_LOG`, then the config, then
//! [`DEFAULT_FILTER`]. Records emitted through the `log` facade (the config
//! crate) are forwarded to the same subscriber.

use std::path::{Path, PathBuf};

use geosphere_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info,geosphere_quadtree=info";

/// Name of the JSON log file inside the log directory.
pub const LOG_FILE: &str = "geosphere.log";

/// Install the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether to write the file at all
/// * `config` - optional configuration supplying the log level
///
/// Returns the path of the log file if one was opened. A second call in the
/// same process leaves the first subscriber in place.
///
/// ```no_run
/// use geosphere_log::init_logging;
///
/// let log_dir = std::path::Path::new("./logs");
/// init_logging(Some(log_dir), true, None);
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber
            .with(file_layer)
            .try_init()
            .is_ok()
            .then(|| log_dir.join(LOG_FILE));
    }

    let _ = subscriber.try_init();
    None
}

/// Filter directives from the config's log level, or [`DEFAULT_FILTER`].
///
/// A bare level such as `debug` applies to every target; anything with a `=`
/// or `,` is passed through as written.
pub fn filter_directives(config: Option<&Config>) -> String {
    match config.map(|c| c.debug.log_level.trim()) {
        Some(level) if !level.is_empty() => level.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = default_env_filter().to_string();
        assert!(filter.contains("geosphere_quadtree=info"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_directives_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,geosphere_quadtree=trace".to_string();
        assert_eq!(
            filter_directives(Some(&config)),
            "debug,geosphere_quadtree=trace"
        );

        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        for directives in [
            "info",
            "debug,geosphere_quadtree=trace",
            "warn,geosphere_mesh=debug,geosphere_terrain=trace",
            "error",
        ] {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "failed to parse {directives}"
            );
        }
    }

    // Only test in this binary that installs the global subscriber.
    #[test]
    fn test_file_logging_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_logging(Some(dir.path()), true, None);
        assert_eq!(path.as_deref(), Some(dir.path().join(LOG_FILE).as_path()));
        assert!(dir.path().join(LOG_FILE).exists());

        tracing::info!(target: "geosphere_quadtree", patches = 6, "log test");
        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert!(contents.contains("\"patches\":6"));
    }
}
