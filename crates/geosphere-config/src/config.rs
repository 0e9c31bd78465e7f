//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Patch pool and planet layout.
    pub quadtree: QuadtreeSection,
    /// Split/merge scheduling.
    pub scheduler: SchedulerSection,
    /// Procedural elevation.
    pub terrain: TerrainSection,
    /// Demo flight path and projection.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Root layout of the planet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum BasisKind {
    /// Six roots on the faces of a cube, projected to a sphere.
    #[default]
    Cube,
    /// One flat root that wraps around on itself.
    Plane,
}

/// Quadtree pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuadtreeSection {
    /// Number of patches, fixed for the lifetime of the tree.
    pub pool_size: usize,
    /// Planet radius in lattice units, a power of two.
    pub radius: i32,
    pub basis: BasisKind,
    /// Free count below which allocation reclaims patches.
    pub low_water: usize,
    /// Free count reclamation stops at.
    pub high_water: usize,
    /// Smallest patch edge, in lattice units.
    pub min_patch_size: i32,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerSection {
    /// Fraction of the screen a visible patch should cover.
    pub target_fraction: f32,
    /// Multiplicative dead band around the target.
    pub hysteresis: f32,
    /// Accumulated error above which a patch splits.
    pub split_threshold: f32,
    /// Accumulated error below which a group merges.
    pub merge_threshold: f32,
}

/// Terrain noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainSection {
    pub seed: u32,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    pub base_frequency: f64,
    /// First octave amplitude in lattice units.
    pub amplitude: f64,
}

/// Camera configuration for the demo flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    /// Near plane as a fraction of the radius.
    pub near: f32,
    /// Far plane as a multiple of the radius.
    pub far: f32,
    /// Starting altitude as a multiple of the radius.
    pub start_altitude: f32,
    /// Final altitude as a multiple of the radius.
    pub end_altitude: f32,
    pub frames: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Check topology invariants after every frame.
    pub validate: bool,
}

// --- Default implementations ---

impl Default for QuadtreeSection {
    fn default() -> Self {
        Self {
            pool_size: 500,
            radius: 1 << 20,
            basis: BasisKind::Cube,
            low_water: 10,
            high_water: 24,
            min_patch_size: 16,
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            target_fraction: 0.02,
            hysteresis: 2.0,
            split_threshold: 0.01,
            merge_threshold: -0.015,
        }
    }
}

impl Default for TerrainSection {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 8,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 2.0,
            amplitude: 4000.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 1e-5,
            far: 100.0,
            start_altitude: 4.0,
            end_altitude: 0.002,
            frames: 240,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            validate: cfg!(debug_assertions),
        }
    }
}

/// `<platform config dir>/geosphere`, or `None` if the platform has none.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("geosphere"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Reject values the quadtree or the demo camera cannot work with.
    ///
    /// The radius must be a power of two so every patch edge stays a multiple
    /// of the 16 mesh samples. Pool limits depend on the basis and are
    /// checked when the quadtree is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::InvalidValue { field, reason });
        if self.quadtree.low_water > self.quadtree.high_water {
            return invalid("quadtree.low_water", "must not exceed high_water");
        }
        let radius = self.quadtree.radius;
        if !((8..=1 << 29).contains(&radius) && (radius as u32).is_power_of_two()) {
            return invalid("quadtree.radius", "must be a power of two from 8 to 2^29");
        }
        if self.quadtree.min_patch_size < 16 || self.quadtree.min_patch_size > radius {
            return invalid("quadtree.min_patch_size", "must be between 16 and the radius");
        }
        if self.scheduler.hysteresis < 1.0 {
            return invalid("scheduler.hysteresis", "must be at least 1");
        }
        if self.scheduler.merge_threshold >= self.scheduler.split_threshold {
            return invalid("scheduler.merge_threshold", "must be below split_threshold");
        }
        if !(self.scheduler.target_fraction > 0.0 && self.scheduler.target_fraction <= 1.0) {
            return invalid("scheduler.target_fraction", "must be in (0, 1]");
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return invalid("camera.near", "must be positive and below far");
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return invalid("camera.fov_degrees", "must be in (0, 180)");
        }
        Ok(())
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("pool_size: 500"));
        assert!(ron_str.contains("basis: Cube"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // No terrain section, and a quadtree section with only the pool size.
        let ron_str = "(quadtree: (pool_size: 64), scheduler: (), camera: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.terrain, TerrainSection::default());
        assert_eq!(config.quadtree.pool_size, 64);
        assert_eq!(config.quadtree.high_water, 24);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.quadtree.pool_size = 2048;
        config.quadtree.basis = BasisKind::Plane;
        config.terrain.seed = 99;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.camera.frames = 10;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.camera.frames), Some(10));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_water_marks() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.quadtree.low_water = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "quadtree.low_water",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_unaligned_radius() {
        let mut config = Config::default();
        for radius in [1000, 0, -4, 1 << 30, 4] {
            config.quadtree.radius = radius;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue {
                    field: "quadtree.radius",
                    ..
                })
            ));
        }
        config.quadtree.radius = 1 << 29;
        assert!(config.validate().is_ok());
        config.quadtree.min_patch_size = 8;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "quadtree.min_patch_size",
                ..
            })
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(scheduler: (hysteresis: 0.5))",
        )
        .unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_default_dir_is_named() {
        if let Some(dir) = default_config_dir() {
            assert!(dir.ends_with("geosphere"));
        }
    }
}
