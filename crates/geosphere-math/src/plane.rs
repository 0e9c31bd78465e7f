//! Planes in Hessian normal form.

use glam::{Vec3, Vec4};

/// A plane `normal . p + distance = 0` with a unit-length normal.
///
/// Points with a positive signed distance lie on the inner side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal pointing toward the inner half-space.
    pub normal: Vec3,
    /// Signed offset term.
    pub distance: f32,
}

impl Plane {
    /// Create a plane from an already normalized normal and offset.
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Create a plane from raw `(a, b, c, d)` coefficients, normalizing so
    /// that `(a, b, c)` has unit length.
    ///
    /// Degenerate coefficients (zero-length normal) are kept as-is.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let len = coefficients.truncate().length();
        let c = if len > 0.0 {
            coefficients / len
        } else {
            coefficients
        };
        Self {
            normal: c.truncate(),
            distance: c.w,
        }
    }

    /// Create the plane through `point` facing along `normal`.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Signed distance from the plane to `point`.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}
