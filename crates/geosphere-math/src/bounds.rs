//! Center/extent bounding boxes and plane-set culling.

use glam::Vec3;

use crate::Plane;

/// Result of testing a volume against a set of planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullResult {
    /// Fully on the inner side of every plane.
    Inside,
    /// Fully on the outer side of at least one plane.
    Outside,
    /// Straddles at least one plane.
    Intersecting,
}

/// An axis-aligned box stored as center and half extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Box center.
    pub center: Vec3,
    /// Half size along each axis (non-negative).
    pub extent: Vec3,
}

impl BoundingBox {
    /// Create a box from center and half extent.
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        Self {
            center,
            extent: extent.abs(),
        }
    }

    /// The smallest box enclosing all `points`.
    ///
    /// An empty slice yields a zero-sized box at the origin.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        };
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self {
            center: (min + max) * 0.5,
            extent: (max - min) * 0.5,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.extent
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.extent
    }

    /// A copy grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            center: self.center,
            extent: self.extent + Vec3::splat(margin.max(0.0)),
        }
    }

    /// Projection of the half extent onto `normal`.
    pub fn effective_radius(&self, normal: Vec3) -> f32 {
        self.extent.dot(normal.abs())
    }

    /// Classify the box against a single plane.
    pub fn classify(&self, plane: &Plane) -> CullResult {
        let d = plane.signed_distance(self.center);
        let r = self.effective_radius(plane.normal);
        if d <= -r {
            CullResult::Outside
        } else if d < r {
            CullResult::Intersecting
        } else {
            CullResult::Inside
        }
    }

    /// Classify the box against a convex set of inward-facing planes.
    ///
    /// Stops at the first plane the box is completely outside of.
    pub fn cull(&self, planes: &[Plane]) -> CullResult {
        let mut result = CullResult::Inside;
        for plane in planes {
            match self.classify(plane) {
                CullResult::Outside => return CullResult::Outside,
                CullResult::Intersecting => result = CullResult::Intersecting,
                CullResult::Inside => {}
            }
        }
        result
    }
}
