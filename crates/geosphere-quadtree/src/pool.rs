//! Slot allocation, release, cache reuse and reclamation.
//!
//! Released slots keep their region, geometry and child links and go to the
//! tail of the free list, so the free list doubles as an LRU cache: a split
//! or merge that needs exactly the region a cached slot still holds takes it
//! back instead of resampling.

use rustc_hash::FxHashSet;

use crate::patch::ListKind;
use crate::{MergePolicy, PatchExtent, PatchFlags, PatchHandle, PatchId, Quadtree, RestructureError};

impl Quadtree {
    /// Take the least recently released slot and initialize it for `id`.
    ///
    /// Runs reclamation first when the free list is below the low water mark.
    pub(crate) fn allocate(
        &mut self,
        id: PatchId,
        extent: PatchExtent,
    ) -> Result<PatchHandle, RestructureError> {
        if self.free.len() < self.config.low_water && !self.reclaiming {
            self.reclaim();
        }
        let Some(index) = self.free.pop_front(&mut self.patches) else {
            self.stats.allocation_failures += 1;
            tracing::warn!(%id, "patch pool exhausted");
            return Err(RestructureError::PoolExhausted);
        };
        let bounds = self.compute_bounds(&extent);
        let phase = self.phase;
        let p = &mut self.patches[index as usize];
        p.generation = p.generation.wrapping_add(1);
        p.id = id;
        p.extent = extent;
        p.bounds = bounds;
        p.parent = None;
        p.kids = [None; 4];
        p.neighbours = [PatchHandle::DANGLING; 8];
        p.flags = PatchFlags::UPDATE_GEOM;
        p.pinned = 0;
        p.priority = 0.0;
        p.error = 0.0;
        p.phase = phase;
        tracing::trace!(%id, slot = index, "allocated patch");
        Ok(PatchHandle::new(index, p.generation))
    }

    /// Return a detached slot to the tail of the free list.
    ///
    /// Region, geometry, parent and child links survive so the slot can be
    /// reused by [`Quadtree::take_cached`] until it is reallocated.
    pub(crate) fn release(&mut self, handle: PatchHandle) {
        let p = self.get_mut(handle);
        debug_assert_eq!(p.pinned, 0, "releasing pinned patch {}", p.id);
        debug_assert_eq!(p.list, ListKind::Detached, "releasing listed patch {}", p.id);
        p.flags
            .remove(PatchFlags::ACTIVE | PatchFlags::CULLED | PatchFlags::LATE_CULLED);
        self.free.push_back(&mut self.patches, handle.index() as u32);
    }

    /// Undo an allocation that was never linked: the slot forgets its region
    /// and goes to the head of the free list.
    pub(crate) fn discard(&mut self, handle: PatchHandle) {
        let p = self.get_mut(handle);
        debug_assert_eq!(p.list, ListKind::Detached);
        debug_assert_eq!(p.pinned, 0);
        p.flags = PatchFlags::UNUSED;
        p.kids = [None; 4];
        p.parent = None;
        self.free.push_front(&mut self.patches, handle.index() as u32);
    }

    /// Take `handle` off the free list if it still holds `expected`.
    pub(crate) fn take_cached(
        &mut self,
        handle: Option<PatchHandle>,
        expected: PatchId,
    ) -> Option<PatchHandle> {
        let handle = handle?;
        let p = self.resolve(handle)?;
        if p.list != ListKind::Free || p.id != expected {
            return None;
        }
        self.free.remove(&mut self.patches, handle.index() as u32);
        let p = self.get_mut(handle);
        p.neighbours = [PatchHandle::DANGLING; 8];
        self.stats.cache_hits += 1;
        Some(handle)
    }

    /// Merge active patches until the free list reaches the high water mark
    /// or nothing more can be merged.
    ///
    /// Culled groups go first, least important first. Visible groups are
    /// merged from the low-priority end only when no culled group is left.
    pub(crate) fn reclaim(&mut self) {
        self.reclaiming = true;
        let start_free = self.free.len();
        let mut visited: FxHashSet<PatchHandle> = FxHashSet::default();
        let mut merged = 0usize;

        while self.free.len() < self.config.high_water {
            let Some((candidate, policy)) = self.reclaim_candidate(&visited) else {
                break;
            };
            visited.insert(candidate);
            if self.merge(candidate, policy).is_ok() {
                self.stats.reclaim_merges += 1;
                merged += 1;
            }
        }

        self.reclaiming = false;
        tracing::debug!(
            merged,
            free_before = start_free,
            free_after = self.free.len(),
            "reclaimed patches"
        );
    }

    fn reclaim_candidate(
        &self,
        visited: &FxHashSet<PatchHandle>,
    ) -> Option<(PatchHandle, MergePolicy)> {
        let eligible = |index: &u32| {
            let h = self.handle_of(*index);
            let p = self.get(h);
            p.pinned == 0 && p.level() > 0 && !visited.contains(&h)
        };
        if let Some(i) = self.culled.iter(&self.patches).find(eligible) {
            return Some((self.handle_of(i), MergePolicy::CulledOnly));
        }
        self.visible
            .iter_rev(&self.patches)
            .find(eligible)
            .map(|i| (self.handle_of(i), MergePolicy::Any))
    }
}
