//! Geometry dirty tracking and the seam classification handed to meshers.

use glam::Vec3;

use crate::{Basis, ElevationSource, PatchFlags, PatchHandle, PatchView, Quadtree, Sample, Side};

/// Grid cells along one patch edge.
pub const PATCH_SAMPLES: usize = 16;

/// Vertices along one patch edge.
pub const MESH_SAMPLES: usize = PATCH_SAMPLES + 1;

/// Size of the fixed vertex range owned by every pool slot.
pub const VERTICES_PER_PATCH: u32 = (MESH_SAMPLES * MESH_SAMPLES) as u32;

/// Which sides of a patch border a coarser neighbour.
///
/// Encoded as `ud * 3 + lr` where `lr` is 0 (neither), 1 (right coarser) or
/// 2 (left coarser) and `ud` is 0, 1 (down coarser) or 2 (up coarser). Only
/// one side per axis can be coarser, because the other faces a sibling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NeighbourClass(u8);

impl NeighbourClass {
    /// Number of distinct classes.
    pub const COUNT: usize = 9;

    /// All neighbours at the same level or finer.
    pub const NONE: NeighbourClass = NeighbourClass(0);

    pub fn from_coarser(right: bool, up: bool, left: bool, down: bool) -> Self {
        let lr = if right {
            1
        } else if left {
            2
        } else {
            0
        };
        let ud = if down {
            1
        } else if up {
            2
        } else {
            0
        };
        NeighbourClass(ud * 3 + lr)
    }

    /// The class with index `index`, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(NeighbourClass(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether `side` borders a coarser neighbour.
    pub fn coarser(self, side: Side) -> bool {
        let lr = self.0 % 3;
        let ud = self.0 / 3;
        match side {
            Side::Right => lr == 1,
            Side::Left => lr == 2,
            Side::Down => ud == 1,
            Side::Up => ud == 2,
        }
    }

    /// Iterate all classes in index order.
    pub fn all() -> impl Iterator<Item = NeighbourClass> {
        (0..Self::COUNT as u8).map(NeighbourClass)
    }
}

/// Everything a geometry sink needs to place vertices on the surface.
pub struct Surface<'a> {
    pub basis: Basis,
    pub radius: f32,
    pub elevation: &'a dyn ElevationSource,
}

impl Surface<'_> {
    /// Displaced surface position and colour for a lattice point.
    pub fn vertex(&self, point: Vec3) -> (Vec3, Sample) {
        let sample = self
            .elevation
            .sample(self.basis.sample_coordinate(point, self.radius));
        let position =
            self.basis.surface_point(point, self.radius) + self.basis.up(point) * sample.elevation;
        (position, sample)
    }
}

/// Receives patches whose geometry is out of date.
pub trait GeometrySink {
    /// The patch covers a new region: regenerate all of its vertices.
    fn resample(&mut self, patch: &PatchView, surface: &Surface<'_>);

    /// A neighbour changed level: only the seam pattern changed.
    fn restitch(&mut self, patch: &PatchView);
}

/// Counts for one [`Quadtree::update_geometry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryUpdate {
    pub resampled: usize,
    pub restitched: usize,
}

impl Quadtree {
    /// Seam class of an active patch from the current neighbour levels.
    pub fn neighbour_class(&self, handle: PatchHandle) -> Option<NeighbourClass> {
        self.resolve(handle)
            .filter(|p| p.is_active())
            .map(|_| self.classify(handle))
    }

    pub(crate) fn classify(&self, handle: PatchHandle) -> NeighbourClass {
        let level = self.level(handle);
        let coarser = |side: Side| {
            let n = self.slot(handle, side, 0);
            n != handle && self.level(n) < level
        };
        NeighbourClass::from_coarser(
            coarser(Side::Right),
            coarser(Side::Up),
            coarser(Side::Left),
            coarser(Side::Down),
        )
    }

    /// Hand every active patch with stale geometry to `sink` and clear its
    /// dirty flags. Culled patches are included so their cached geometry is
    /// valid when they come back into view.
    pub fn update_geometry(&mut self, sink: &mut impl GeometrySink) -> GeometryUpdate {
        let dirty: Vec<PatchHandle> = self
            .active()
            .filter(|h| {
                self.get(*h)
                    .flags
                    .intersects(PatchFlags::UPDATE_GEOM | PatchFlags::STITCH_GEOM)
            })
            .collect();

        let mut update = GeometryUpdate::default();
        for h in dirty {
            let class = self.classify(h);
            let flags = {
                let p = self.get_mut(h);
                p.class = class;
                p.flags
            };
            let view = self.view_of(h);
            if flags.contains(PatchFlags::UPDATE_GEOM) {
                let surface = Surface {
                    basis: self.config.basis,
                    radius: self.config.radius as f32,
                    elevation: self.elevation.as_ref(),
                };
                sink.resample(&view, &surface);
                update.resampled += 1;
            } else {
                sink.restitch(&view);
                update.restitched += 1;
            }
            self.get_mut(h)
                .flags
                .remove(PatchFlags::UPDATE_GEOM | PatchFlags::STITCH_GEOM);
        }
        if update != GeometryUpdate::default() {
            tracing::trace!(
                resampled = update.resampled,
                restitched = update.restitched,
                "geometry updated"
            );
        }
        update
    }
}
