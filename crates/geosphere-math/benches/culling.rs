use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geosphere_math::*;
use glam::{Mat4, Vec2, Vec3};

fn view_projection() -> Mat4 {
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 1.0, 1.0e7);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 3.0e6, 0.0), Vec3::ZERO, Vec3::Z);
    proj * view
}

fn bench_frustum_extraction(c: &mut Criterion) {
    let vp = black_box(view_projection());
    c.bench_function("frustum_from_view_projection", |bencher| {
        bencher.iter(|| black_box(Frustum::from_view_projection(&vp)))
    });
}

fn bench_box_cull(c: &mut Criterion) {
    let frustum = Frustum::from_view_projection(&view_projection());
    let mut planes = frustum.planes().to_vec();
    planes.extend(horizon_plane(Vec3::new(0.0, 3.0e6, 0.0), Vec3::ZERO, 1.0e6));
    let bounds = black_box(BoundingBox::new(
        Vec3::new(1.0e5, 1.0e6, 2.0e5),
        Vec3::splat(5.0e4),
    ));
    c.bench_function("box_cull_seven_planes", |bencher| {
        bencher.iter(|| black_box(bounds.cull(&planes)))
    });
}

fn bench_quad_area(c: &mut Criterion) {
    let corners = black_box([
        Vec2::new(-0.2, -0.1),
        Vec2::new(0.3, -0.15),
        Vec2::new(0.25, 0.4),
        Vec2::new(-0.1, 0.35),
    ]);
    c.bench_function("quad_area", |bencher| {
        bencher.iter(|| black_box(quad_area(corners)))
    });
}

criterion_group!(
    benches,
    bench_frustum_extraction,
    bench_box_cull,
    bench_quad_area
);
criterion_main!(benches);
