//! Construction and scheduling parameters.

use crate::{Basis, PATCH_SAMPLES};

/// Split/merge thresholds for the per-frame scheduler.
///
/// A visible patch accumulates `area - target_fraction` into its error while
/// its screen fraction lies outside `[target / hysteresis, target *
/// hysteresis]`, and resets to zero inside that band. A factor of at least 2
/// keeps a freshly split or merged patch inside the band, since one level
/// changes the area by 4x.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Desired fraction of the screen covered by one visible patch.
    pub target_fraction: f32,
    /// Multiplicative half-width of the dead band around the target.
    pub hysteresis: f32,
    /// Split when the accumulated error exceeds this.
    pub split_threshold: f32,
    /// Merge when the accumulated error drops below this (negative).
    pub merge_threshold: f32,
}

impl SchedulerConfig {
    /// Error after one frame at screen fraction `area`.
    pub(crate) fn accumulate_error(&self, error: f32, area: f32) -> f32 {
        let target = self.target_fraction;
        let hysteresis = self.hysteresis.max(1.0);
        if area < target / hysteresis || area > target * hysteresis {
            (error + area - target).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fraction: 0.02,
            hysteresis: 2.0,
            split_threshold: 0.01,
            merge_threshold: -0.015,
        }
    }
}

/// Quadtree construction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadtreeConfig {
    /// Fixed number of patch slots.
    pub pool_size: usize,
    /// Half edge of the root faces in lattice units; also the sphere radius.
    /// Must be a power of two up to [`crate::MAX_RADIUS`].
    pub radius: i32,
    pub basis: Basis,
    /// Smallest edge length a split may produce; at least [`PATCH_SAMPLES`].
    pub min_patch_size: i32,
    /// Reclamation starts when fewer free slots remain.
    pub low_water: usize,
    /// Reclamation stops once this many slots are free.
    pub high_water: usize,
    pub scheduler: SchedulerConfig,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            pool_size: 500,
            radius: 1 << 20,
            basis: Basis::Cube,
            min_patch_size: PATCH_SAMPLES as i32,
            low_water: 10,
            high_water: 24,
            scheduler: SchedulerConfig::default(),
        }
    }
}
