//! The quadtree container: pool, lists, roots and inspection.

use geosphere_math::BoundingBox;
use glam::Vec3;

use crate::list::PatchList;
use crate::patch::{ListKind, Patch};
use crate::scheduler::ViewState;
use crate::{
    Basis, ElevationSource, PatchExtent, PatchFlags, PatchHandle, PatchId, PatchView,
    PATCH_SAMPLES, QuadtreeConfig, QuadtreeError, QuadtreeStats, Side, VERTICES_PER_PATCH,
};

/// Largest supported radius; root edges of `2 * MAX_RADIUS` still fit the
/// lattice with room for one more bit.
pub const MAX_RADIUS: i32 = 1 << 29;

/// Whether every patch edge down to `min_patch_size` is a multiple of
/// [`PATCH_SAMPLES`], so that mesh vertices land on lattice points shared
/// across levels.
///
/// Holds when the radius is a power of two no larger than [`MAX_RADIUS`]
/// and the minimum patch size is at least one sample per lattice unit.
pub fn lattice_aligned(radius: i32, min_patch_size: i32) -> bool {
    radius > 0
        && radius <= MAX_RADIUS
        && (radius as u32).is_power_of_two()
        && 2 * radius >= PATCH_SAMPLES as i32
        && min_patch_size >= PATCH_SAMPLES as i32
        && radius >= min_patch_size
}

/// A fixed-budget quadtree approximating a planet surface.
///
/// All patches live in one pool allocated at construction. Patches move
/// between the free list and the two active lists (visible and culled)
/// through splits and merges; none are ever created or destroyed after
/// [`Quadtree::new`].
pub struct Quadtree {
    pub(crate) patches: Vec<Patch>,
    pub(crate) free: PatchList,
    pub(crate) visible: PatchList,
    pub(crate) culled: PatchList,
    pub(crate) reclaiming: bool,
    pub(crate) roots: Vec<PatchHandle>,
    pub(crate) config: QuadtreeConfig,
    pub(crate) elevation: Box<dyn ElevationSource>,
    pub(crate) max_elevation: f32,
    pub(crate) view: Option<ViewState>,
    pub(crate) phase: u32,
    pub(crate) stats: QuadtreeStats,
}

impl Quadtree {
    /// Create a quadtree whose roots cover the basis.
    pub fn new(
        config: QuadtreeConfig,
        elevation: impl ElevationSource + 'static,
    ) -> Result<Self, QuadtreeError> {
        let required = config.basis.root_count();
        if config.pool_size < required {
            return Err(QuadtreeError::PoolTooSmall {
                required,
                available: config.pool_size,
            });
        }
        if u32::try_from(config.pool_size).is_err() {
            return Err(QuadtreeError::PoolTooLarge(config.pool_size));
        }
        if !lattice_aligned(config.radius, config.min_patch_size) {
            return Err(QuadtreeError::InvalidRadius {
                radius: config.radius,
                min_patch_size: config.min_patch_size,
            });
        }
        if config.high_water < config.low_water {
            return Err(QuadtreeError::InvalidWaterMarks {
                low: config.low_water,
                high: config.high_water,
            });
        }

        let mut patches: Vec<Patch> = (0..config.pool_size).map(|_| Patch::unused()).collect();
        let mut free = PatchList::new(ListKind::Free);
        for i in 0..config.pool_size as u32 {
            free.push_back(&mut patches, i);
        }

        let max_elevation = elevation.max_elevation().abs();
        let mut qt = Self {
            patches,
            free,
            visible: PatchList::new(ListKind::Visible),
            culled: PatchList::new(ListKind::Culled),
            reclaiming: false,
            roots: Vec::with_capacity(required),
            config,
            elevation: Box::new(elevation),
            max_elevation,
            view: None,
            phase: 0,
            stats: QuadtreeStats::default(),
        };

        for i in 0..required {
            let extent = config.basis.root_extent(i, config.radius);
            let handle = qt
                .allocate(PatchId::root(i as u8), extent)
                .map_err(|_| QuadtreeError::PoolTooSmall {
                    required,
                    available: config.pool_size,
                })?;
            qt.roots.push(handle);
        }

        for (i, face) in config.basis.faces().iter().enumerate() {
            let root = qt.roots[i];
            for side in Side::ALL {
                let (neighbour, _) = face.neighbours[side as usize];
                qt.set_side(root, side, qt.roots[neighbour as usize]);
            }
        }

        for root in qt.roots.clone() {
            qt.get_mut(root).flags.insert(PatchFlags::ACTIVE);
            qt.insert_active(root);
        }

        tracing::info!(
            pool_size = config.pool_size,
            radius = config.radius,
            basis = ?config.basis,
            "quadtree created"
        );
        Ok(qt)
    }

    /// Shorthand for a cube-basis quadtree with default scheduling.
    pub fn create(
        pool_size: usize,
        radius: i32,
        elevation: impl ElevationSource + 'static,
    ) -> Result<Self, QuadtreeError> {
        Self::new(
            QuadtreeConfig {
                pool_size,
                radius,
                ..QuadtreeConfig::default()
            },
            elevation,
        )
    }

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    pub fn basis(&self) -> Basis {
        self.config.basis
    }

    pub fn radius(&self) -> i32 {
        self.config.radius
    }

    pub fn elevation(&self) -> &dyn ElevationSource {
        self.elevation.as_ref()
    }

    pub fn stats(&self) -> &QuadtreeStats {
        &self.stats
    }

    /// Total number of slots.
    pub fn pool_size(&self) -> usize {
        self.patches.len()
    }

    /// Slots on the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Patches on either active list.
    pub fn active_count(&self) -> usize {
        self.visible.len() + self.culled.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn culled_count(&self) -> usize {
        self.culled.len()
    }

    /// Current root handles. Roots are replaced when a level-1 group merges
    /// back, so prefer [`Quadtree::find`] for long-lived lookups.
    pub fn roots(&self) -> &[PatchHandle] {
        &self.roots
    }

    /// Visible patches in descending priority order.
    pub fn visible(&self) -> impl Iterator<Item = PatchHandle> + '_ {
        self.visible.iter(&self.patches).map(|i| self.handle_of(i))
    }

    /// Culled patches, most recyclable first.
    pub fn culled(&self) -> impl Iterator<Item = PatchHandle> + '_ {
        self.culled.iter(&self.patches).map(|i| self.handle_of(i))
    }

    /// All active patches.
    pub fn active(&self) -> impl Iterator<Item = PatchHandle> + '_ {
        self.visible().chain(self.culled())
    }

    /// The active patch with identity `id`, if any.
    pub fn find(&self, id: PatchId) -> Option<PatchHandle> {
        self.active().find(|h| self.get(*h).id == id)
    }

    /// Snapshot of a live patch (active or cached on the free list).
    pub fn patch(&self, handle: PatchHandle) -> Option<PatchView> {
        self.resolve(handle).map(|_| self.view_of(handle))
    }

    /// Whether `handle` refers to a patch on an active list.
    pub fn is_active(&self, handle: PatchHandle) -> bool {
        self.resolve(handle).is_some_and(|p| p.is_active())
    }

    /// Cached children of a patch that still refer to their original slots.
    pub fn children(&self, handle: PatchHandle) -> Option<[PatchHandle; 4]> {
        let kids = self.resolve(handle)?.kids;
        let mut out = [PatchHandle::DANGLING; 4];
        for (slot, kid) in out.iter_mut().zip(kids) {
            let kid = kid?;
            self.resolve(kid)?;
            *slot = kid;
        }
        Some(out)
    }

    pub(crate) fn resolve(&self, handle: PatchHandle) -> Option<&Patch> {
        self.patches
            .get(handle.index())
            .filter(|p| p.generation == handle.generation() && !p.flags.contains(PatchFlags::UNUSED))
    }

    pub(crate) fn get(&self, handle: PatchHandle) -> &Patch {
        let p = &self.patches[handle.index()];
        debug_assert_eq!(p.generation, handle.generation(), "stale handle {handle:?}");
        p
    }

    pub(crate) fn get_mut(&mut self, handle: PatchHandle) -> &mut Patch {
        let p = &mut self.patches[handle.index()];
        debug_assert_eq!(p.generation, handle.generation(), "stale handle {handle:?}");
        p
    }

    pub(crate) fn handle_of(&self, index: u32) -> PatchHandle {
        PatchHandle::new(index, self.patches[index as usize].generation)
    }

    pub(crate) fn level(&self, handle: PatchHandle) -> u8 {
        self.get(handle).level()
    }

    /// Take an active patch off whichever list holds it.
    pub(crate) fn detach(&mut self, handle: PatchHandle) {
        let index = handle.index() as u32;
        match self.get(handle).list {
            ListKind::Visible => self.visible.remove(&mut self.patches, index),
            ListKind::Culled => self.culled.remove(&mut self.patches, index),
            ListKind::Free => self.free.remove(&mut self.patches, index),
            ListKind::Detached => {}
        }
    }

    /// Insert an active patch into the list matching its `CULLED` flag.
    pub(crate) fn insert_active(&mut self, handle: PatchHandle) {
        let index = handle.index() as u32;
        if self.get(handle).is_culled() {
            self.culled.insert_by_priority(&mut self.patches, index);
        } else {
            self.visible.insert_by_priority(&mut self.patches, index);
        }
    }

    /// Bounding box of the surface over `extent`, padded by the maximum
    /// elevation.
    pub(crate) fn compute_bounds(&self, extent: &PatchExtent) -> BoundingBox {
        let basis = self.config.basis;
        let radius = self.config.radius as f32;
        let mut points = [Vec3::ZERO; 9];
        for (i, point) in points.iter_mut().enumerate() {
            let s = (i % 3) as f32 * 0.5;
            let t = (i / 3) as f32 * 0.5;
            *point = basis.surface_point(extent.point_at(s, t), radius);
        }
        BoundingBox::from_points(&points).expanded(self.max_elevation)
    }

    /// Surface positions of the four corners, counter-clockwise.
    pub(crate) fn surface_corners(&self, extent: &PatchExtent) -> [Vec3; 4] {
        let basis = self.config.basis;
        let radius = self.config.radius as f32;
        extent
            .corners()
            .map(|c| basis.surface_point(c.as_vec3(), radius))
    }

    pub(crate) fn view_of(&self, handle: PatchHandle) -> PatchView {
        let p = self.get(handle);
        PatchView {
            handle,
            id: p.id,
            extent: p.extent,
            bounds: p.bounds,
            flags: p.flags,
            priority: p.priority,
            error: p.error,
            pinned: p.pinned,
            vertex_offset: handle.index() as u32 * VERTICES_PER_PATCH,
            class: if p.is_active() {
                self.classify(handle)
            } else {
                p.class
            },
            neighbours: p.neighbours,
        }
    }
}
