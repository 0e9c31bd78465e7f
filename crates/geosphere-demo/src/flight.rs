//! Building the tree from config and flying the camera toward the surface.

use geosphere_config::{BasisKind, CameraConfig, Config};
use geosphere_mesh::{FrameStats, LevelHistogram, RenderContext};
use geosphere_quadtree::{
    Basis, Quadtree, QuadtreeConfig, QuadtreeError, SchedulerConfig, ViewUpdate,
};
use geosphere_terrain::{FractalTerrain, TerrainParams};
use glam::{Mat4, Vec3};

pub fn quadtree_config(config: &Config) -> QuadtreeConfig {
    let q = &config.quadtree;
    let s = &config.scheduler;
    QuadtreeConfig {
        pool_size: q.pool_size,
        radius: q.radius,
        basis: match q.basis {
            BasisKind::Cube => Basis::Cube,
            BasisKind::Plane => Basis::Plane,
        },
        min_patch_size: q.min_patch_size,
        low_water: q.low_water,
        high_water: q.high_water,
        scheduler: SchedulerConfig {
            target_fraction: s.target_fraction,
            hysteresis: s.hysteresis,
            split_threshold: s.split_threshold,
            merge_threshold: s.merge_threshold,
        },
    }
}

pub fn terrain_params(config: &Config) -> TerrainParams {
    let t = &config.terrain;
    TerrainParams {
        seed: t.seed,
        octaves: t.octaves,
        lacunarity: t.lacunarity,
        persistence: t.persistence,
        base_frequency: t.base_frequency,
        amplitude: t.amplitude,
    }
}

/// Camera path from the start altitude down to the end altitude, with the
/// altitude shrinking geometrically per frame.
pub struct Flight {
    camera: CameraConfig,
    basis: Basis,
    radius: f32,
    /// Clearance above the highest possible terrain.
    floor: f32,
}

impl Flight {
    pub fn new(camera: CameraConfig, basis: Basis, radius: f32, max_elevation: f32) -> Self {
        Self {
            camera,
            basis,
            radius,
            floor: max_elevation,
        }
    }

    pub fn frames(&self) -> u32 {
        self.camera.frames
    }

    /// Altitude above the reference surface, in lattice units.
    pub fn altitude(&self, frame: u32) -> f32 {
        let t = if self.camera.frames > 1 {
            frame as f32 / (self.camera.frames - 1) as f32
        } else {
            1.0
        };
        let start = self.camera.start_altitude.max(f32::EPSILON);
        let end = self.camera.end_altitude.max(f32::EPSILON);
        start * (end / start).powf(t.clamp(0.0, 1.0)) * self.radius + self.floor
    }

    /// `(view_projection, eye)` for `frame`.
    pub fn view(&self, frame: u32) -> (Mat4, Vec3) {
        let altitude = self.altitude(frame);
        let (eye, target, up) = match self.basis {
            Basis::Cube => {
                let dir = Vec3::new(0.3, 0.4, 1.0).normalize();
                (dir * (self.radius + altitude), Vec3::ZERO, Vec3::Y)
            }
            Basis::Plane => (Vec3::new(0.0, 0.0, altitude), Vec3::ZERO, Vec3::Y),
        };
        let proj = Mat4::perspective_rh(
            self.camera.fov_degrees.to_radians(),
            self.camera.aspect,
            self.camera.near * self.radius,
            self.camera.far * self.radius,
        );
        (proj * Mat4::look_at_rh(eye, target, up), eye)
    }
}

/// One frame's results.
pub struct FrameReport {
    pub altitude: f32,
    pub view: ViewUpdate,
    pub render: FrameStats,
    pub levels: Vec<usize>,
}

/// Quadtree, render context and flight path.
pub struct Demo {
    pub quadtree: Quadtree,
    pub context: RenderContext,
    pub flight: Flight,
    pub validate: bool,
}

impl Demo {
    pub fn new(config: &Config) -> Result<Self, QuadtreeError> {
        let qt_config = quadtree_config(config);
        let terrain = FractalTerrain::new(terrain_params(config));
        let quadtree = Quadtree::new(qt_config, terrain)?;
        let flight = Flight::new(
            config.camera.clone(),
            qt_config.basis,
            qt_config.radius as f32,
            quadtree.elevation().max_elevation(),
        );
        Ok(Self {
            context: RenderContext::new(quadtree.pool_size()),
            quadtree,
            flight,
            validate: config.debug.validate,
        })
    }

    pub fn frame(&mut self, frame: u32) -> FrameReport {
        let (view_projection, eye) = self.flight.view(frame);
        let view = self.quadtree.update_view(&view_projection, eye);
        let mut levels = LevelHistogram::default();
        let render = self.context.frame(&mut self.quadtree, &mut levels);
        FrameReport {
            altitude: self.flight.altitude(frame),
            view,
            render,
            levels: levels.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.quadtree.pool_size = 200;
        config.quadtree.radius = 1 << 16;
        config.terrain.amplitude = 200.0;
        config.camera.frames = 24;
        config.camera.aspect = 1.0;
        config.debug.validate = true;
        config
    }

    #[test]
    fn test_altitude_descends() {
        let config = small_config();
        let flight = Flight::new(config.camera.clone(), Basis::Cube, 1000.0, 0.0);
        assert!((flight.altitude(0) - 4000.0).abs() < 1e-2);
        assert!((flight.altitude(23) - 2.0).abs() < 1e-3);
        assert!(flight.altitude(10) < flight.altitude(9));
    }

    #[test]
    fn test_flight_refines_and_stays_in_budget() {
        let config = small_config();
        let mut demo = Demo::new(&config).unwrap();
        let mut deepest = 0;
        for frame in 0..demo.flight.frames() {
            let report = demo.frame(frame);
            demo.quadtree.validate().unwrap();
            assert_eq!(
                report.view.visible + report.view.culled + report.view.free,
                demo.quadtree.pool_size()
            );
            assert_eq!(report.render.draws, report.view.visible);
            assert_eq!(report.levels.iter().sum::<usize>(), report.render.draws);
            deepest = deepest.max(report.levels.len());
        }
        assert!(deepest > 3, "deepest drawn level {deepest}");
    }

    #[test]
    fn test_plane_flight() {
        let mut config = small_config();
        config.quadtree.basis = BasisKind::Plane;
        config.camera.frames = 8;
        let mut demo = Demo::new(&config).unwrap();
        for frame in 0..demo.flight.frames() {
            demo.frame(frame);
        }
        demo.quadtree.validate().unwrap();
        assert!(demo.quadtree.active_count() > 1);
    }

    #[test]
    fn test_invalid_pool_is_reported() {
        let mut config = small_config();
        config.quadtree.pool_size = 3;
        assert!(matches!(
            Demo::new(&config),
            Err(QuadtreeError::PoolTooSmall { .. })
        ));
    }
}
