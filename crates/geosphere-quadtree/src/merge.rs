//! Replacing four siblings with their parent.

use crate::patch::Patch;
use crate::pin::PinGuard;
use crate::{PatchExtent, PatchFlags, PatchHandle, Quadrant, Quadtree, RestructureError};

/// Which members a merge group may contain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MergePolicy {
    /// Merge regardless of state.
    Any,
    /// Only merge groups that are entirely culled.
    CulledOnly,
    /// Merge groups whose visible members all have an accumulated error
    /// below the threshold.
    ErrorBelow(f32),
}

impl MergePolicy {
    pub(crate) fn admits(self, patch: &Patch) -> bool {
        match self {
            MergePolicy::Any => true,
            MergePolicy::CulledOnly => patch.is_culled(),
            MergePolicy::ErrorBelow(threshold) => patch.is_culled() || patch.error < threshold,
        }
    }
}

impl Quadtree {
    /// Merge `patch` and its three siblings back into their parent.
    ///
    /// Finer neighbours and subdivided siblings are merged first under the
    /// same policy. The parent slot is reused from the free list when it
    /// still holds the region. Returns the parent's handle.
    pub fn merge(
        &mut self,
        patch: PatchHandle,
        policy: MergePolicy,
    ) -> Result<PatchHandle, RestructureError> {
        let result = self.try_merge(patch, policy);
        match result {
            Ok(_) => self.stats.merges += 1,
            Err(_) => self.stats.merge_failures += 1,
        }
        result
    }

    fn try_merge(
        &mut self,
        patch: PatchHandle,
        policy: MergePolicy,
    ) -> Result<PatchHandle, RestructureError> {
        let p = self
            .resolve(patch)
            .filter(|p| p.is_active())
            .ok_or(RestructureError::Inactive)?;
        if p.level() == 0 {
            return Err(RestructureError::RootLevel);
        }
        if p.pinned > 0 {
            return Err(RestructureError::Pinned);
        }
        if !policy.admits(p) {
            return Err(RestructureError::Rejected);
        }

        let mut pins = PinGuard::default();
        let result = self.merge_pinned(patch, policy, &mut pins);
        self.release_pins(pins);
        let (parent, group) = result?;
        for sibling in group {
            self.release(sibling);
        }
        Ok(parent)
    }

    /// Gather the sibling group by walking counter-clockwise from `patch`,
    /// bringing every member and outside neighbour to the group's level.
    fn gather_group(
        &mut self,
        patch: PatchHandle,
        policy: MergePolicy,
        pins: &mut PinGuard,
    ) -> Result<[PatchHandle; 4], RestructureError> {
        let level = self.level(patch);
        let mut group = [PatchHandle::DANGLING; 4];
        let mut current = patch;
        let mut quadrant = self
            .get(patch)
            .id
            .quadrant()
            .ok_or(RestructureError::RootLevel)?;

        for step in 0..4 {
            let p = self.get(current);
            debug_assert_eq!(p.level(), level);
            if !p.is_active() {
                return Err(RestructureError::Inactive);
            }
            if p.pinned > 0 {
                return Err(RestructureError::Pinned);
            }
            if !policy.admits(p) {
                return Err(RestructureError::Rejected);
            }
            self.pin(pins, current);
            group[quadrant as usize] = current;

            for side in quadrant.outward_sides() {
                for half in 0..2 {
                    let n = self.slot(current, side, half);
                    if n != current && self.level(n) > level {
                        self.merge(n, policy)?;
                        self.stats.forced_merges += 1;
                    }
                }
            }

            if step == 3 {
                break;
            }
            let links = quadrant.links();
            let mut next = self.slot(current, links.ccw_side, 0);
            if self.level(next) > level {
                next = self.merge(next, policy)?;
                self.stats.forced_merges += 1;
            }
            debug_assert_eq!(self.get(next).id.quadrant(), Some(links.ccw));
            current = next;
            quadrant = links.ccw;
        }
        Ok(group)
    }

    fn merge_pinned(
        &mut self,
        patch: PatchHandle,
        policy: MergePolicy,
        pins: &mut PinGuard,
    ) -> Result<(PatchHandle, [PatchHandle; 4]), RestructureError> {
        let group = self.gather_group(patch, policy, pins)?;
        let parent_id = self
            .get(patch)
            .id
            .parent()
            .ok_or(RestructureError::RootLevel)?;
        let extent = PatchExtent::merge(&group.map(|h| self.get(h).extent));

        let mut parent = None;
        for sibling in group {
            let cached = self.get(sibling).parent;
            parent = self.take_cached(cached, parent_id);
            if parent.is_some() {
                break;
            }
        }
        let reused = parent.is_some();
        let parent = match parent {
            Some(h) => h,
            None => self.allocate(parent_id, extent)?,
        };
        debug_assert_eq!(self.get(parent).extent, extent);

        let all_culled = group.iter().all(|h| self.get(*h).is_culled());
        let sum: f32 = group.iter().map(|h| self.get(*h).priority).sum();
        let phase = self.phase;
        let p = self.get_mut(parent);
        p.priority = if all_culled { sum * 0.25 } else { sum };
        p.error = 0.0;
        p.phase = phase;
        p.kids = group.map(Some);
        p.flags.insert(PatchFlags::ACTIVE | PatchFlags::STITCH_GEOM);
        p.flags.set(PatchFlags::CULLED, all_culled);
        p.flags.remove(PatchFlags::LATE_CULLED);

        for q in Quadrant::ALL {
            let sibling = group[q as usize];
            for side in q.outward_sides() {
                let mut n = self.slot(sibling, side, 0);
                if group.contains(&n) {
                    n = parent;
                }
                self.set_slot(parent, side, q.half_on(side), n);
            }
        }
        for q in Quadrant::ALL {
            for side in q.outward_sides() {
                self.backlink(parent, side, q.half_on(side), &group);
            }
        }

        for sibling in group {
            self.detach(sibling);
            let s = self.get_mut(sibling);
            s.flags
                .remove(PatchFlags::ACTIVE | PatchFlags::CULLED | PatchFlags::LATE_CULLED);
            s.parent = Some(parent);
        }
        self.insert_active(parent);
        if parent_id.level() == 0 {
            self.roots[parent_id.root_index() as usize] = parent;
        }

        tracing::debug!(id = %parent_id, reused, culled = all_culled, "merged patch");
        Ok((parent, group))
    }
}
