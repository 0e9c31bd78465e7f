//! Projection of world points to normalized device coordinates.

use glam::{Mat4, Vec2, Vec3};

/// Transform `point` by `view_projection` and divide by `w`.
///
/// Returns `None` for points at or behind the eye plane (`w <= 0`), where the
/// perspective divide would flip or explode.
pub fn project_point(view_projection: &Mat4, point: Vec3) -> Option<Vec3> {
    let clip = *view_projection * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    Some(clip.truncate() / clip.w)
}

/// Area of a quadrilateral given in winding order (shoelace formula).
pub fn quad_area(corners: [Vec2; 4]) -> f32 {
    let mut twice = 0.0;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        twice += a.x * b.y - b.x * a.y;
    }
    (twice * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_square_area() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        assert!((quad_area(square) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_area_ignores_winding() {
        let cw = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(3.0, 2.0),
            Vec2::new(3.0, 0.0),
        ];
        assert!((quad_area(cw) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_point_in_front() {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let ndc = project_point(&(proj * view), Vec3::new(0.0, 0.0, -10.0)).unwrap();
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_project_point_behind_eye() {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        assert!(project_point(&(proj * view), Vec3::new(0.0, 0.0, 10.0)).is_none());
    }
}
