//! Scenario tests driving the whole tree through splits, merges and views.

use glam::{Mat4, Vec3};

use crate::pin::PinGuard;
use crate::{
    Basis, FlatElevation, MergePolicy, PatchFlags, PatchHandle, PatchId, Quadrant, Quadtree,
    QuadtreeConfig, RestructureError, Side,
};

const RADIUS: i32 = 1 << 20;

fn cube(pool_size: usize) -> Quadtree {
    Quadtree::create(pool_size, RADIUS, FlatElevation).unwrap()
}

fn id(root: u8, path: &[u8]) -> PatchId {
    let quadrants: Vec<Quadrant> = path.iter().map(|q| Quadrant::from_bits(*q as u64)).collect();
    PatchId::from_path(root, &quadrants)
}

fn split_id(qt: &mut Quadtree, target: PatchId) {
    let h = qt
        .find(target)
        .unwrap_or_else(|| panic!("{target} is not active"));
    qt.split(h).unwrap();
    qt.validate().unwrap();
}

fn assert_conserved(qt: &Quadtree) {
    assert_eq!(qt.free_count() + qt.active_count(), qt.pool_size());
}

fn camera(eye: Vec3, target: Vec3) -> Mat4 {
    let radius = RADIUS as f32;
    let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, radius * 1e-4, radius * 100.0);
    let up = if (target - eye).cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::X
    } else {
        Vec3::Y
    };
    proj * Mat4::look_at_rh(eye, target, up)
}

fn max_visible_level(qt: &Quadtree) -> u8 {
    qt.visible()
        .map(|h| qt.patch(h).unwrap().level())
        .max()
        .unwrap_or(0)
}

/// Move a visible patch to the culled list, as a view update would.
fn cull(qt: &mut Quadtree, h: PatchHandle) {
    qt.detach(h);
    qt.get_mut(h).flags.insert(PatchFlags::CULLED);
    qt.insert_active(h);
}

#[test]
fn test_split_root_links_to_other_roots() {
    let mut qt = cube(64);
    split_id(&mut qt, PatchId::root(1));

    for q in Quadrant::ALL {
        let kid = qt.find(PatchId::new((1 << 2) | q as u64, 1)).unwrap();
        let view = qt.patch(kid).unwrap();
        for side in q.outward_sides() {
            let n = qt.patch(view.neighbours[side.slot(0)]).unwrap();
            assert_eq!(n.level(), 0, "{} {side:?}", view.id);
            assert_ne!(n.id.root_index(), 1);
        }
    }
    // Every other root now sees two children of root 1 along the shared edge.
    for root in [0u8, 2, 3, 4, 5] {
        let h = qt.find(PatchId::root(root)).unwrap();
        let view = qt.patch(h).unwrap();
        let finer = view
            .neighbours
            .iter()
            .filter(|n| qt.patch(**n).unwrap().level() == 1)
            .count();
        if root == 0 {
            assert_eq!(finer, 0, "root 0 is opposite root 1");
        } else {
            assert_eq!(finer, 2, "root {root}");
        }
    }
}

#[test]
fn test_deep_split_sequence_forces_neighbour_splits() {
    let mut qt = cube(500);
    for path in [&[][..], &[2], &[2, 3], &[2, 1], &[2, 1, 1]] {
        split_id(&mut qt, id(1, path));
    }
    let before = qt.stats().forced_splits;
    split_id(&mut qt, id(1, &[2, 1, 1, 0]));

    assert!(qt.stats().forced_splits > before);
    assert!(qt.find(id(1, &[2, 1, 1, 0])).is_none());
    for q in 0..4 {
        assert!(qt.find(id(1, &[2, 1, 1, 0, q])).is_some());
    }
    assert_eq!(id(1, &[2, 1, 1, 0]).to_string(), "1:2.1.1.0");
    assert_conserved(&qt);
}

#[test]
fn test_split_then_merge_restores_region() {
    let mut qt = cube(64);
    split_id(&mut qt, PatchId::root(0));
    let target = qt.find(id(0, &[3])).unwrap();
    // The first split also splits the two roots bordering the target.
    qt.split(target).unwrap();
    let kid = qt.find(id(0, &[3, 2])).unwrap();
    assert_eq!(qt.merge(kid, MergePolicy::Any), Ok(target));
    let before = qt.patch(target).unwrap();

    // Splitting again hands back the same children.
    let cache_hits = qt.stats().cache_hits;
    qt.split(target).unwrap();
    qt.validate().unwrap();
    assert_eq!(qt.find(id(0, &[3, 2])), Some(kid));
    assert_eq!(qt.stats().cache_hits, cache_hits + 4);

    let merged = qt.merge(kid, MergePolicy::Any).unwrap();
    qt.validate().unwrap();
    let after = qt.patch(merged).unwrap();
    assert_eq!(merged, target, "the cached parent slot is reused");
    assert_eq!(after.id, before.id);
    assert_eq!(after.level(), before.level());
    assert_eq!(after.extent, before.extent);
    assert_eq!(after.neighbours, before.neighbours);
}

#[test]
fn test_merge_forces_finer_neighbours() {
    let mut qt = cube(500);
    for path in [&[][..], &[2], &[2, 1]] {
        split_id(&mut qt, id(1, path));
    }
    // 1:2.1 split forced 1:1 to split; merging root 1 back must undo it all.
    let kid = qt.find(id(1, &[0])).unwrap();
    let forced = qt.stats().forced_merges;
    qt.merge(kid, MergePolicy::Any).unwrap();
    qt.validate().unwrap();

    assert!(qt.stats().forced_merges > forced);
    assert!(qt.find(PatchId::root(1)).is_some());
    // Roots 2 and 4 were split to make room for 1:2 and stay at level 1.
    assert!(qt.active().all(|h| qt.patch(h).unwrap().level() <= 1));
    assert_conserved(&qt);
}

#[test]
fn test_pool_is_conserved_through_restructuring() {
    let mut qt = cube(300);
    let mut targets = vec![PatchId::root(4)];
    for _ in 0..4 {
        let mut next = Vec::new();
        for t in targets {
            if let Some(h) = qt.find(t) {
                let _ = qt.split(h);
            }
            next.push(t.child(Quadrant::UpRight));
            next.push(t.child(Quadrant::DownLeft));
        }
        targets = next;
        qt.validate().unwrap();
        assert_conserved(&qt);
    }
    loop {
        let next = qt.active().find(|h| qt.patch(*h).unwrap().level() > 0);
        let Some(h) = next else {
            break;
        };
        qt.merge(h, MergePolicy::Any).unwrap();
        qt.validate().unwrap();
        assert_conserved(&qt);
    }
    assert_eq!(qt.active_count(), 6);
}

#[test]
fn test_failed_split_rolls_back() {
    let config = QuadtreeConfig {
        pool_size: 8,
        radius: RADIUS,
        low_water: 0,
        high_water: 0,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    let root = qt.roots()[0];
    let neighbours = qt.patch(root).unwrap().neighbours;

    assert_eq!(qt.split(root), Err(RestructureError::PoolExhausted));
    assert!(qt.is_active(root));
    assert_eq!(qt.patch(root).unwrap().neighbours, neighbours);
    assert_eq!(qt.free_count(), 2);
    assert_eq!(qt.stats().split_failures, 1);
    assert_eq!(qt.stats().allocation_failures, 1);
    qt.validate().unwrap();
}

#[test]
fn test_failed_forced_split_keeps_topology() {
    // After splitting root 1 there is room for the four children of 1:2 and
    // half of the forced split of root 4.
    let config = QuadtreeConfig {
        pool_size: 15,
        radius: RADIUS,
        low_water: 0,
        high_water: 0,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    split_id(&mut qt, PatchId::root(1));
    let target = qt.find(id(1, &[2])).unwrap();
    let snapshot: Vec<_> = qt.active().map(|h| qt.patch(h).unwrap()).collect();
    let free = qt.free_count();

    assert_eq!(qt.split(target), Err(RestructureError::PoolExhausted));
    qt.validate().unwrap();
    assert_eq!(qt.stats().split_failures, 2);
    assert_eq!(qt.stats().forced_splits, 0);
    assert_eq!(qt.free_count(), free);
    let after: Vec<_> = qt.active().map(|h| qt.patch(h).unwrap()).collect();
    assert_eq!(snapshot.len(), after.len());
    for (a, b) in snapshot.iter().zip(&after) {
        assert_eq!((a.handle, a.neighbours), (b.handle, b.neighbours));
    }
}

#[test]
fn test_pinned_patch_refuses_restructuring() {
    let mut qt = cube(64);
    split_id(&mut qt, PatchId::root(2));
    let kid = qt.find(id(2, &[1])).unwrap();
    let sibling = qt.find(id(2, &[3])).unwrap();

    let mut guard = PinGuard::default();
    qt.pin(&mut guard, kid);
    assert_eq!(qt.split(kid), Err(RestructureError::Pinned));
    assert_eq!(qt.merge(kid, MergePolicy::Any), Err(RestructureError::Pinned));
    // A pinned sibling blocks the whole group.
    assert_eq!(
        qt.merge(sibling, MergePolicy::Any),
        Err(RestructureError::Pinned)
    );
    qt.release_pins(guard);

    qt.validate().unwrap();
    assert!(qt.merge(sibling, MergePolicy::Any).is_ok());
}

#[test]
fn test_reclaim_frees_culled_patches_first() {
    let config = QuadtreeConfig {
        pool_size: 14,
        radius: RADIUS,
        low_water: 4,
        high_water: 5,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    split_id(&mut qt, PatchId::root(0));
    for q in Quadrant::ALL {
        let h = qt.find(PatchId::root(0).child(q)).unwrap();
        cull(&mut qt, h);
    }
    qt.validate().unwrap();

    // Splitting root 1 runs the pool below the low water mark.
    split_id(&mut qt, PatchId::root(1));
    assert_eq!(qt.stats().reclaim_merges, 1);
    let root0 = qt.find(PatchId::root(0)).unwrap();
    assert!(qt.patch(root0).unwrap().is_culled());
    for q in Quadrant::ALL {
        assert!(qt.find(PatchId::root(1).child(q)).is_some());
    }
    assert_conserved(&qt);
}

#[test]
fn test_stale_handles_do_not_resolve() {
    let config = QuadtreeConfig {
        pool_size: 10,
        radius: RADIUS,
        low_water: 0,
        high_water: 0,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    let root = qt.roots()[0];
    qt.split(root).unwrap();
    // The old root is cached on the free list, but no longer active.
    assert!(qt.patch(root).is_some());
    assert!(!qt.is_active(root));

    // Its slot is the only free one; the next split takes it over and fails.
    let kid = qt.find(id(0, &[0])).unwrap();
    assert_eq!(qt.split(kid), Err(RestructureError::PoolExhausted));
    assert!(qt.patch(root).is_none());
    assert!(qt.find(PatchId::root(0)).is_none());
    assert_eq!(qt.merge(root, MergePolicy::Any), Err(RestructureError::Inactive));
    qt.validate().unwrap();
}

#[test]
fn test_far_camera_keeps_roots() {
    let mut qt = cube(500);
    let eye = Vec3::new(0.0, 0.0, 10.0 * RADIUS as f32);
    let vp = camera(eye, Vec3::ZERO);
    for _ in 0..10 {
        qt.update_view(&vp, eye);
    }
    assert_eq!(qt.stats().splits, 0);
    assert_eq!(qt.active_count(), 6);
    assert!(qt.culled_count() >= 1);
}

#[test]
fn test_near_camera_builds_fine_cluster() {
    let mut qt = cube(500);
    let eye = Vec3::new(0.0, 0.0, 1.02 * RADIUS as f32);
    let vp = camera(eye, Vec3::ZERO);
    for _ in 0..40 {
        qt.update_view(&vp, eye);
        assert!(qt.active_count() <= qt.pool_size());
    }
    assert!(max_visible_level(&qt) >= 6);
    let levels: Vec<u8> = qt.active().map(|h| qt.patch(h).unwrap().level()).collect();
    assert!(levels.iter().any(|l| *l <= 1), "coarse rings remain");
    assert_conserved(&qt);

    // Flying back out collapses the cluster again.
    let far = Vec3::new(0.0, 0.0, 10.0 * RADIUS as f32);
    let vp = camera(far, Vec3::ZERO);
    for _ in 0..80 {
        qt.update_view(&vp, far);
    }
    assert!(max_visible_level(&qt) <= 1);
    assert!(qt.stats().merges > 0);
}

#[test]
fn test_small_pool_stays_within_budget() {
    let mut qt = cube(60);
    let eye = Vec3::new(0.0, 0.0, 1.02 * RADIUS as f32);
    let vp = camera(eye, Vec3::ZERO);
    let mut deepest = 0;
    for _ in 0..30 {
        qt.update_view(&vp, eye);
        assert_conserved(&qt);
        deepest = deepest.max(max_visible_level(&qt));
    }
    assert!(deepest >= 3);
}

#[test]
fn test_plane_wraps_through_split_and_merge() {
    let config = QuadtreeConfig {
        pool_size: 64,
        radius: 1 << 10,
        basis: Basis::Plane,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    split_id(&mut qt, PatchId::root(0));

    let dl = qt.find(id(0, &[0])).unwrap();
    let dr = qt.find(id(0, &[1])).unwrap();
    // Wrapped: the lower left child borders the lower right one on both sides.
    assert_eq!(qt.slot(dl, Side::Left, 0), dr);
    assert_eq!(qt.slot(dl, Side::Right, 0), dr);

    split_id(&mut qt, id(0, &[0]));
    assert_eq!(qt.slot(dr, Side::Right, 0), qt.find(id(0, &[0, 0])).unwrap());
    assert_eq!(qt.slot(dr, Side::Right, 1), qt.find(id(0, &[0, 3])).unwrap());

    let grandchild = qt.find(id(0, &[0, 2])).unwrap();
    qt.merge(grandchild, MergePolicy::Any).unwrap();
    qt.validate().unwrap();
    qt.merge(dr, MergePolicy::Any).unwrap();
    qt.validate().unwrap();
    assert_eq!(qt.active_count(), 1);
    let root = qt.roots()[0];
    assert!(qt.patch(root).unwrap().neighbours.iter().all(|n| *n == root));
}

#[test]
fn test_plane_view_update() {
    let config = QuadtreeConfig {
        pool_size: 200,
        radius: 1 << 16,
        basis: Basis::Plane,
        ..QuadtreeConfig::default()
    };
    let mut qt = Quadtree::new(config, FlatElevation).unwrap();
    let eye = Vec3::new(0.0, 0.0, 2000.0);
    let vp = camera(eye, Vec3::new(0.0, 0.0, 0.0));
    for _ in 0..20 {
        qt.update_view(&vp, eye);
    }
    assert!(max_visible_level(&qt) > 0);
    assert_conserved(&qt);
}
