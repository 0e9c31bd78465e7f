//! Horizon plane for spherical bodies.
//!
//! Everything on a sphere that lies beyond the tangent cone from the eye is
//! hidden by the sphere itself. The cone touches the sphere along a circle;
//! the plane of that circle separates the visible cap from the rest.

use glam::Vec3;

use crate::Plane;

/// Build the plane of the horizon circle seen from `camera`.
///
/// The plane faces the camera and sits `r^2 / d` from the sphere center,
/// where `d` is the camera distance from the center. Below the surface
/// (`d < r`) there is no tangent cone; the offset is halved instead so the
/// plane still rejects the far side of the body.
///
/// Returns `None` when the camera sits at the sphere center.
pub fn horizon_plane(camera: Vec3, center: Vec3, radius: f32) -> Option<Plane> {
    let to_camera = camera - center;
    let d = to_camera.length();
    if d <= f32::EPSILON {
        return None;
    }
    let normal = to_camera / d;

    let mut offset = radius * radius / d;
    if d < radius {
        offset *= 0.5;
    }

    Some(Plane::new(normal, -(normal.dot(center) + offset)))
}

/// Straight-line distance from an eye at `camera_distance` from the center to
/// the horizon tangent point. Zero at or below the surface.
pub fn horizon_distance(camera_distance: f32, radius: f32) -> f32 {
    if camera_distance <= radius {
        return 0.0;
    }
    (camera_distance * camera_distance - radius * radius).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f32 = 1000.0;

    #[test]
    fn test_sub_camera_point_is_visible() {
        let camera = Vec3::new(0.0, 2.0 * R, 0.0);
        let plane = horizon_plane(camera, Vec3::ZERO, R).unwrap();
        assert!(plane.signed_distance(Vec3::new(0.0, R, 0.0)) > 0.0);
    }

    #[test]
    fn test_far_side_is_hidden() {
        let camera = Vec3::new(0.0, 2.0 * R, 0.0);
        let plane = horizon_plane(camera, Vec3::ZERO, R).unwrap();
        assert!(plane.signed_distance(Vec3::new(0.0, -R, 0.0)) < 0.0);
        // The equator is below the horizon for any finite altitude.
        assert!(plane.signed_distance(Vec3::new(R, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_tangent_point_lies_on_plane() {
        let d = 2.0 * R;
        let camera = Vec3::new(0.0, d, 0.0);
        let plane = horizon_plane(camera, Vec3::ZERO, R).unwrap();
        // cos(theta) = r / d for the tangent circle seen from the center.
        let cos_t = R / d;
        let sin_t = (1.0 - cos_t * cos_t).sqrt();
        let tangent = Vec3::new(R * sin_t, R * cos_t, 0.0);
        assert!(plane.signed_distance(tangent).abs() < 1e-2);
    }

    #[test]
    fn test_below_surface_halves_offset() {
        let camera = Vec3::new(0.0, 0.5 * R, 0.0);
        let plane = horizon_plane(camera, Vec3::ZERO, R).unwrap();
        // r^2 / d = 2R, halved to R.
        assert!((plane.distance + R).abs() < 1e-3);
    }

    #[test]
    fn test_camera_at_center_has_no_plane() {
        assert!(horizon_plane(Vec3::ZERO, Vec3::ZERO, R).is_none());
    }

    #[test]
    fn test_horizon_distance() {
        assert_eq!(horizon_distance(R, R), 0.0);
        let d = horizon_distance(2.0 * R, R);
        assert!((d - 3.0f32.sqrt() * R).abs() < 1e-2);
    }
}
