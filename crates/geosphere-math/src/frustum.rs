//! View frustum extraction from a combined view-projection matrix.

use glam::{Mat4, Vec3};

use crate::{BoundingBox, CullResult, Plane};

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Six inward-facing planes of a view volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extract the frustum planes with the Gribb/Hartmann method.
    ///
    /// Expects a `[0, 1]` clip depth range, which is what glam's
    /// `perspective_rh` and `orthographic_rh` produce.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Plane::new(Vec3::ZERO, 0.0); 6];
        planes[LEFT] = Plane::from_coefficients(rows[3] + rows[0]);
        planes[RIGHT] = Plane::from_coefficients(rows[3] - rows[0]);
        planes[BOTTOM] = Plane::from_coefficients(rows[3] + rows[1]);
        planes[TOP] = Plane::from_coefficients(rows[3] - rows[1]);
        planes[NEAR] = Plane::from_coefficients(rows[2]);
        planes[FAR] = Plane::from_coefficients(rows[3] - rows[2]);

        Self { planes }
    }

    /// The six planes: left, right, bottom, top, near, far.
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Returns `true` if the point is inside or on every plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Classify a box against the frustum.
    pub fn cull_box(&self, bounds: &BoundingBox) -> CullResult {
        bounds.cull(&self.planes)
    }
}
