//! Multi-octave fractal Brownian motion (fBm) over simplex noise.
//!
//! Sampled on the unit direction from the planet center so the terrain is
//! seamless across cube faces.

use geosphere_quadtree::{ElevationSource, Sample};
use glam::{DVec3, Vec3};
use noise::{NoiseFn, Simplex};

use crate::height_to_color;

/// Parameters of the fBm sum.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    /// World seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per unit of direction.
    pub base_frequency: f64,
    /// Amplitude of the first octave, in lattice units.
    pub amplitude: f64,
}

impl Default for TerrainParams {
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

/// Fractal terrain elevation source.
///
/// Each octave doubles the frequency and halves the amplitude (with the
/// default parameters), so the height is bounded by the geometric sum of
/// the octave amplitudes.
pub struct FractalTerrain {
    noise: Simplex,
    params: TerrainParams,
    max_amplitude: f64,
}

impl FractalTerrain {
    pub fn new(params: TerrainParams) -> Self {
        let noise = Simplex::new(params.seed);
        let max_amplitude = geometric_sum(&params);
        Self {
            noise,
            params,
            max_amplitude,
        }
    }

    /// Raw fBm height at a point, in lattice units.
    pub fn height(&self, point: DVec3) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            let p = point * frequency;
            total += self.noise.get([p.x, p.y, p.z]) * amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Upper bound of `|height|`.
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }
}

fn geometric_sum(params: &TerrainParams) -> f64 {
    let mut sum = 0.0;
    let mut amp = params.amplitude.abs();
    for _ in 0..params.octaves {
        sum += amp;
        amp *= params.persistence.abs();
    }
    sum
}

impl ElevationSource for FractalTerrain {
    fn sample(&self, coordinate: Vec3) -> Sample {
        let height = self.height(coordinate.as_dvec3());
        let normalized = if self.max_amplitude > 0.0 {
            height / self.max_amplitude
        } else {
            0.0
        };
        Sample::new(height as f32, height_to_color(normalized))
    }

    fn max_elevation(&self) -> f32 {
        self.max_amplitude as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn direction(i: usize) -> DVec3 {
        let t = i as f64 * 0.37;
        DVec3::new(t.sin(), (t * 1.3).cos(), (t * 0.7).sin() + 0.1).normalize()
    }

    #[test]
    fn test_same_seed_same_height() {
        let a = FractalTerrain::new(TerrainParams {
            seed: 42,
            ..Default::default()
        });
        let b = FractalTerrain::new(TerrainParams {
            seed: 42,
            ..Default::default()
        });
        for i in 0..32 {
            assert!((a.height(direction(i)) - b.height(direction(i))).abs() < EPSILON);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = FractalTerrain::new(TerrainParams {
            seed: 1,
            ..Default::default()
        });
        let b = FractalTerrain::new(TerrainParams {
            seed: 999,
            ..Default::default()
        });
        let differs = (0..32).any(|i| (a.height(direction(i)) - b.height(direction(i))).abs() > EPSILON);
        assert!(differs);
    }

    #[test]
    fn test_height_within_max_elevation() {
        let terrain = FractalTerrain::new(TerrainParams::default());
        let bound = terrain.max_elevation();
        for i in 0..500 {
            let sample = terrain.sample(direction(i).as_vec3());
            assert!(
                sample.elevation.abs() <= bound,
                "height {} exceeds bound {bound}",
                sample.elevation
            );
        }
    }

    #[test]
    fn test_max_amplitude_is_geometric_sum() {
        let terrain = FractalTerrain::new(TerrainParams {
            amplitude: 1000.0,
            persistence: 0.5,
            octaves: 4,
            ..Default::default()
        });
        assert!((terrain.max_amplitude() - 1875.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let terrain = FractalTerrain::new(TerrainParams {
            amplitude: 0.0,
            ..Default::default()
        });
        let sample = terrain.sample(Vec3::Y);
        assert_eq!(sample.elevation, 0.0);
        assert_eq!(terrain.max_elevation(), 0.0);
    }

    #[test]
    fn test_neighbouring_directions_are_smooth() {
        let terrain = FractalTerrain::new(TerrainParams {
            seed: 7,
            ..Default::default()
        });
        let max_delta = terrain.max_amplitude() * 0.1;
        let step = 1e-4;
        for i in 0..1000 {
            let t = i as f64 * step;
            let a = DVec3::new(t.cos(), t.sin(), 0.3).normalize();
            let b = DVec3::new((t + step).cos(), (t + step).sin(), 0.3).normalize();
            assert!((terrain.height(a) - terrain.height(b)).abs() < max_delta);
        }
    }
}
