//! Replacing a patch with its four children.

use crate::pin::PinGuard;
use crate::{MAX_LEVEL, PatchFlags, PatchHandle, Quadrant, Quadtree, RestructureError, Side};

impl Quadtree {
    /// Split an active patch into four children one level finer.
    ///
    /// Coarser neighbours are split first so no two active patches differ by
    /// more than one level. Children still cached on the free list from an
    /// earlier split of the same region are reused with their geometry.
    ///
    /// On failure the topology is left as it was, except for forced splits of
    /// neighbours that had already completed.
    pub fn split(&mut self, parent: PatchHandle) -> Result<(), RestructureError> {
        let result = self.try_split(parent);
        match result {
            Ok(()) => self.stats.splits += 1,
            Err(_) => self.stats.split_failures += 1,
        }
        result
    }

    fn try_split(&mut self, parent: PatchHandle) -> Result<(), RestructureError> {
        let p = self
            .resolve(parent)
            .filter(|p| p.is_active())
            .ok_or(RestructureError::Inactive)?;
        if p.pinned > 0 {
            return Err(RestructureError::Pinned);
        }
        if p.level() >= MAX_LEVEL {
            return Err(RestructureError::MaxLevel);
        }
        if p.extent.size() / 2 < self.config.min_patch_size {
            return Err(RestructureError::MinimumSize);
        }

        let mut pins = PinGuard::default();
        self.pin(&mut pins, parent);
        let result = self.split_pinned(parent, &mut pins);
        self.release_pins(pins);
        if result.is_ok() {
            self.release(parent);
        }
        result
    }

    fn split_pinned(
        &mut self,
        parent: PatchHandle,
        pins: &mut PinGuard,
    ) -> Result<(), RestructureError> {
        let (id, extent, cached, culled, priority, level) = {
            let p = self.get(parent);
            (p.id, p.extent, p.kids, p.is_culled(), p.priority, p.level())
        };

        // Children stay detached from every list until linked, so
        // reclamation triggered by the allocations below cannot reach them.
        let mut kids = [PatchHandle::DANGLING; 4];
        let mut reused = [false; 4];
        for q in Quadrant::ALL {
            if let Some(h) = self.take_cached(cached[q as usize], id.child(q)) {
                kids[q as usize] = h;
                reused[q as usize] = true;
            }
        }
        for q in Quadrant::ALL {
            if reused[q as usize] {
                continue;
            }
            match self.allocate(id.child(q), extent.quadrant(q)) {
                Ok(h) => kids[q as usize] = h,
                Err(e) => {
                    self.abandon_children(&kids, &reused);
                    return Err(e);
                }
            }
        }

        let phase = self.phase;
        let kid_priority = if culled { priority } else { priority * 0.25 };
        for kid in kids {
            let k = self.get_mut(kid);
            k.priority = kid_priority;
            k.error = 0.0;
            k.phase = phase;
        }

        let mut forced = 0u32;
        for side in Side::ALL {
            let n = self.slot(parent, side, 0);
            if n != parent && self.level(n) < level {
                if let Err(e) = self.split(n) {
                    self.abandon_children(&kids, &reused);
                    return Err(e);
                }
                self.stats.forced_splits += 1;
                forced += 1;
            }
            let [a, b] = [self.slot(parent, side, 0), self.slot(parent, side, 1)];
            if a != parent {
                self.pin(pins, a);
            }
            if b != a && b != parent {
                self.pin(pins, b);
            }
        }

        for q in Quadrant::ALL {
            self.link_child(parent, &kids, q);
        }
        for q in Quadrant::ALL {
            let kid = kids[q as usize];
            for side in q.outward_sides() {
                if !kids.contains(&self.slot(kid, side, 0)) {
                    self.backlink(kid, side, 0, &[parent]);
                }
            }
        }

        self.detach(parent);
        let p = self.get_mut(parent);
        p.flags.remove(PatchFlags::ACTIVE);
        p.kids = kids.map(Some);
        for kid in kids {
            let k = self.get_mut(kid);
            k.parent = Some(parent);
            k.flags.insert(PatchFlags::ACTIVE | PatchFlags::STITCH_GEOM);
            k.flags.set(PatchFlags::CULLED, culled);
            k.flags.remove(PatchFlags::LATE_CULLED);
            self.insert_active(kid);
        }

        tracing::debug!(
            %id,
            reused = reused.iter().filter(|r| **r).count(),
            forced,
            "split patch"
        );
        Ok(())
    }

    /// Undo the child gathering of a failed split: reused children go back
    /// to the free list untouched, fresh ones are forgotten.
    fn abandon_children(&mut self, kids: &[PatchHandle; 4], reused: &[bool; 4]) {
        for (kid, reused) in kids.iter().zip(reused) {
            if *kid == PatchHandle::DANGLING {
                continue;
            }
            if *reused {
                self.release(*kid);
            } else {
                self.discard(*kid);
            }
        }
    }
}
