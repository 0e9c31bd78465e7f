//! Pin bookkeeping for reentrant restructuring.
//!
//! A patch with a non-zero pin count is never split, merged or freed. Every
//! split or merge records the pins it takes in a [`PinGuard`] and hands the
//! guard back through [`Quadtree::release_pins`] on every exit path.

use smallvec::SmallVec;

use crate::{PatchHandle, Quadtree};

#[derive(Debug, Default)]
#[must_use = "pins must be released with Quadtree::release_pins"]
pub(crate) struct PinGuard {
    handles: SmallVec<[PatchHandle; 12]>,
}

impl PinGuard {
    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for PinGuard {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.handles.is_empty(),
                "pin guard dropped with {} pins still held",
                self.handles.len()
            );
        }
    }
}

impl Quadtree {
    pub(crate) fn pin(&mut self, guard: &mut PinGuard, handle: PatchHandle) {
        self.get_mut(handle).pinned += 1;
        guard.handles.push(handle);
    }

    /// Drop every pin recorded in `guard`.
    pub(crate) fn release_pins(&mut self, mut guard: PinGuard) {
        for handle in guard.handles.drain(..) {
            let p = self.get_mut(handle);
            debug_assert!(p.pinned > 0, "unbalanced unpin of {}", p.id);
            p.pinned -= 1;
        }
    }

    pub(crate) fn is_pinned(&self, handle: PatchHandle) -> bool {
        self.get(handle).pinned > 0
    }
}
