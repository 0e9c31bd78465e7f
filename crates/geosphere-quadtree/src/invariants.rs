//! Whole-tree consistency checks.

use crate::patch::ListKind;
use crate::{InvariantViolation, PatchFlags, PatchHandle, Quadtree, Side};

impl Quadtree {
    /// Check every topology invariant at rest.
    ///
    /// - every slot is conserved across the free and active lists;
    /// - list membership matches the `ACTIVE` and `CULLED` flags;
    /// - no pins are held;
    /// - neighbour slots of active patches resolve, differ by at most one
    ///   level and are paired consistently;
    /// - every neighbour links back on its facing side.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let (free, visible, culled) = (self.free.len(), self.visible.len(), self.culled.len());
        if free + visible + culled != self.patches.len() {
            return Err(InvariantViolation::PoolLeak {
                free,
                visible,
                culled,
                total: self.patches.len(),
            });
        }

        self.check_list(ListKind::Free, "free", |f| !f.contains(PatchFlags::ACTIVE))?;
        self.check_list(ListKind::Visible, "visible", |f| {
            f.contains(PatchFlags::ACTIVE) && !f.contains(PatchFlags::CULLED)
        })?;
        self.check_list(ListKind::Culled, "culled", |f| {
            f.contains(PatchFlags::ACTIVE | PatchFlags::CULLED)
        })?;

        if let Some(p) = self.patches.iter().find(|p| p.pinned > 0) {
            return Err(InvariantViolation::StillPinned {
                patch: p.id,
                pinned: p.pinned,
            });
        }

        for h in self.active() {
            self.check_neighbour_levels(h)?;
            self.check_backlinks(h)?;
        }
        Ok(())
    }

    fn check_list(
        &self,
        kind: ListKind,
        name: &'static str,
        flags_ok: impl Fn(PatchFlags) -> bool,
    ) -> Result<(), InvariantViolation> {
        let list = match kind {
            ListKind::Free => &self.free,
            ListKind::Visible => &self.visible,
            ListKind::Culled => &self.culled,
            ListKind::Detached => return Ok(()),
        };
        for i in list.iter(&self.patches) {
            let p = &self.patches[i as usize];
            if p.list != kind || !flags_ok(p.flags) {
                return Err(InvariantViolation::ListMismatch {
                    patch: p.id,
                    flags: p.flags.bits(),
                    list: name,
                });
            }
        }
        Ok(())
    }

    /// Check slot validity, the one-level rule and slot pairing for one
    /// active patch.
    pub fn check_neighbour_levels(&self, handle: PatchHandle) -> Result<(), InvariantViolation> {
        let p = self.get(handle);
        let level = p.level();
        for side in Side::ALL {
            let pair = [p.neighbours[side.slot(0)], p.neighbours[side.slot(1)]];
            for (half, n) in pair.iter().enumerate() {
                let Some(np) = self.resolve(*n).filter(|np| np.is_active()) else {
                    return Err(InvariantViolation::DanglingNeighbour {
                        patch: p.id,
                        slot: side.slot(half),
                    });
                };
                if np.level().abs_diff(level) > 1 {
                    return Err(InvariantViolation::LevelGap {
                        patch: p.id,
                        level,
                        neighbour: np.id,
                        neighbour_level: np.level(),
                    });
                }
            }
            let consistent = if pair[0] == pair[1] {
                self.level(pair[0]) <= level
            } else {
                self.level(pair[0]) == level + 1 && self.level(pair[1]) == level + 1
            };
            if !consistent {
                return Err(InvariantViolation::InconsistentSide { patch: p.id, side });
            }
        }
        Ok(())
    }

    fn check_backlinks(&self, handle: PatchHandle) -> Result<(), InvariantViolation> {
        let p = self.get(handle);
        for side in Side::ALL {
            for half in 0..2 {
                let n = p.neighbours[side.slot(half)];
                if n == handle {
                    continue;
                }
                let np = self.get(n);
                let facing = self
                    .config
                    .basis
                    .facing_side(p.id.root_index(), np.id.root_index(), side);
                let linked = if np.level() >= p.level() {
                    np.neighbours[facing.slot(0)] == handle && np.neighbours[facing.slot(1)] == handle
                } else {
                    let along = p.id.quadrant().map_or(0, |q| q.half_on(side));
                    np.neighbours[facing.slot(along)] == handle
                };
                if !linked {
                    return Err(InvariantViolation::MissingBacklink {
                        patch: p.id,
                        neighbour: np.id,
                        side,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{FlatElevation, InvariantViolation, PatchHandle, Quadtree, Side};

    #[test]
    fn test_fresh_tree_is_valid() {
        let qt = Quadtree::create(16, 1 << 10, FlatElevation).unwrap();
        assert_eq!(qt.validate(), Ok(()));
    }

    #[test]
    fn test_dangling_slot_is_reported() {
        let mut qt = Quadtree::create(16, 1 << 10, FlatElevation).unwrap();
        let root = qt.roots()[0];
        qt.set_slot(root, Side::Up, 1, PatchHandle::DANGLING);
        assert!(matches!(
            qt.check_neighbour_levels(root),
            Err(InvariantViolation::DanglingNeighbour { slot: 3, .. })
        ));
    }

    #[test]
    fn test_missing_backlink_is_reported() {
        let mut qt = Quadtree::create(16, 1 << 10, FlatElevation).unwrap();
        let root = qt.roots()[0];
        let n = qt.slot(root, Side::Right, 0);
        let facing = qt.basis().facing_side(0, 2, Side::Right);
        assert_eq!(qt.get(n).id.root_index(), 2);
        qt.set_side(n, facing, PatchHandle::DANGLING);
        assert!(matches!(
            qt.validate(),
            Err(InvariantViolation::MissingBacklink { side: Side::Right, .. })
        ));
    }
}
