//! The procedural terrain seam.

use glam::Vec3;

/// Terrain height and colour at one surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Displacement along the surface normal, in lattice units.
    pub elevation: f32,
    /// RGBA vertex colour.
    pub color: [u8; 4],
}

impl Sample {
    pub fn new(elevation: f32, color: [u8; 4]) -> Self {
        Self { elevation, color }
    }
}

/// Supplies elevation and colour for surface points.
///
/// The coordinate comes from [`crate::Basis::sample_coordinate`]: a unit
/// direction for the cube basis.
pub trait ElevationSource {
    fn sample(&self, coordinate: Vec3) -> Sample;

    /// Upper bound of `|elevation|`, used to pad bounding boxes.
    fn max_elevation(&self) -> f32 {
        0.0
    }
}

impl<F> ElevationSource for F
where
    F: Fn(Vec3) -> Sample,
{
    fn sample(&self, coordinate: Vec3) -> Sample {
        self(coordinate)
    }
}

/// A smooth, uniformly grey surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatElevation;

impl ElevationSource for FlatElevation {
    fn sample(&self, _coordinate: Vec3) -> Sample {
        Sample::new(0.0, [128, 128, 128, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_elevation_source() {
        let source = |dir: Vec3| Sample::new(dir.y * 10.0, [0, 0, 0, 255]);
        assert_eq!(source.sample(Vec3::Y).elevation, 10.0);
        assert_eq!(source.max_elevation(), 0.0);
    }

    #[test]
    fn test_flat_elevation() {
        assert_eq!(FlatElevation.sample(Vec3::X).elevation, 0.0);
    }
}
