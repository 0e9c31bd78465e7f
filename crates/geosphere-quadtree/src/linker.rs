//! Neighbour slot maintenance.
//!
//! A patch's side holds either one neighbour of the same or the next coarser
//! level in both slots, or two neighbours one level finer, one per half.
//! Splits and merges set the slots of the patches they create from the
//! patches they replace, then patch the facing side of every outside
//! neighbour (the backlink).

use crate::{PatchFlags, PatchHandle, Quadrant, Quadtree, Side};

impl Quadtree {
    /// Neighbour in slot `half` of `side`.
    pub(crate) fn slot(&self, handle: PatchHandle, side: Side, half: usize) -> PatchHandle {
        self.get(handle).neighbours[side.slot(half)]
    }

    /// Point both slots of `side` at `neighbour`.
    pub(crate) fn set_side(&mut self, handle: PatchHandle, side: Side, neighbour: PatchHandle) {
        let slots = &mut self.get_mut(handle).neighbours;
        slots[side.slot(0)] = neighbour;
        slots[side.slot(1)] = neighbour;
    }

    pub(crate) fn set_slot(
        &mut self,
        handle: PatchHandle,
        side: Side,
        half: usize,
        neighbour: PatchHandle,
    ) {
        self.get_mut(handle).neighbours[side.slot(half)] = neighbour;
    }

    fn root_of(&self, handle: PatchHandle) -> u8 {
        self.get(handle).id.root_index()
    }

    /// Fill the slots of child `quadrant` of `parent`.
    ///
    /// Inner sides point at the siblings. Outer sides take the parent's
    /// neighbour on the matching half, which after forced splits is at the
    /// parent's level or one finer. A parent that borders itself (a wrapped
    /// plane root) hands over the sibling on the far side instead.
    pub(crate) fn link_child(
        &mut self,
        parent: PatchHandle,
        kids: &[PatchHandle; 4],
        quadrant: Quadrant,
    ) {
        let child = kids[quadrant as usize];
        let links = quadrant.links();
        self.set_side(child, links.ccw_side, kids[links.ccw as usize]);
        self.set_side(child, links.cw_side, kids[links.cw as usize]);
        for side in quadrant.outward_sides() {
            let mut n = self.slot(parent, side, quadrant.half_on(side));
            if n == parent {
                n = kids[quadrant.mirrored(side) as usize];
            }
            self.set_side(child, side, n);
        }
    }

    /// Make the neighbour in slot `half` of `side` of `patch` point back at
    /// it, replacing whichever of `superseded` it pointed at before.
    pub(crate) fn backlink(
        &mut self,
        patch: PatchHandle,
        side: Side,
        half: usize,
        superseded: &[PatchHandle],
    ) {
        let n = self.slot(patch, side, half);
        if n == patch {
            return;
        }
        let facing = self
            .config
            .basis
            .facing_side(self.root_of(patch), self.root_of(n), side);
        let level = self.level(patch);
        let neighbour_level = self.level(n);

        if level <= neighbour_level {
            for h in 0..2 {
                debug_assert_backlink(self.slot(n, facing, h), patch, superseded);
            }
            self.set_side(n, facing, patch);
        } else {
            debug_assert_eq!(level, neighbour_level + 1);
            let along = self
                .get(patch)
                .id
                .quadrant()
                .map_or(0, |q| q.half_on(side));
            debug_assert_backlink(self.slot(n, facing, along), patch, superseded);
            self.set_slot(n, facing, along, patch);
        }
        self.get_mut(n).flags.insert(PatchFlags::STITCH_GEOM);
    }
}

#[inline]
fn debug_assert_backlink(previous: PatchHandle, patch: PatchHandle, superseded: &[PatchHandle]) {
    debug_assert!(
        previous == patch || superseded.contains(&previous),
        "backlink overwrote {previous:?}, expected one of {superseded:?}"
    );
}
