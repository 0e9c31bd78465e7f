//! Patch slots, handles and flags.

use std::ops::BitOr;

use geosphere_math::BoundingBox;
use glam::Vec3;

use crate::{NeighbourClass, PatchExtent, PatchId};

/// Generation-checked reference to a pool slot.
///
/// A slot that is re-initialized for a different region gets a new
/// generation, so handles kept by stale caches stop resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatchHandle {
    index: u32,
    generation: u32,
}

impl PatchHandle {
    /// A handle that never resolves. Fills neighbour slots before linking.
    pub const DANGLING: PatchHandle = PatchHandle {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the pool.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when the handle was taken.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Patch state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatchFlags(u8);

impl PatchFlags {
    /// Slot never initialized.
    pub const UNUSED: PatchFlags = PatchFlags(1 << 0);
    /// Part of the rendered topology (on the visible or culled list).
    pub const ACTIVE: PatchFlags = PatchFlags(1 << 1);
    /// Outside the view volume.
    pub const CULLED: PatchFlags = PatchFlags(1 << 2);
    /// Geometry must be resampled.
    pub const UPDATE_GEOM: PatchFlags = PatchFlags(1 << 3);
    /// A neighbour changed level; seams must be restitched.
    pub const STITCH_GEOM: PatchFlags = PatchFlags(1 << 4);
    /// Culled by the post-restructuring pass rather than the frame start.
    pub const LATE_CULLED: PatchFlags = PatchFlags(1 << 5);

    /// No bits set.
    pub const fn empty() -> Self {
        PatchFlags(0)
    }

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether all bits of `other` are set.
    pub fn contains(self, other: PatchFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub fn intersects(self, other: PatchFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: PatchFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PatchFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: PatchFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for PatchFlags {
    type Output = PatchFlags;

    fn bitor(self, rhs: PatchFlags) -> PatchFlags {
        PatchFlags(self.0 | rhs.0)
    }
}

/// Which list a slot is threaded on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    /// On no list: in the middle of a split or merge.
    Detached,
    /// On the free list.
    Free,
    /// On the visible active list.
    Visible,
    /// On the culled active list.
    Culled,
}

/// One pool slot.
#[derive(Clone, Debug)]
pub(crate) struct Patch {
    pub generation: u32,
    pub id: PatchId,
    pub extent: PatchExtent,
    pub bounds: BoundingBox,
    pub parent: Option<PatchHandle>,
    pub kids: [Option<PatchHandle>; 4],
    pub neighbours: [PatchHandle; 8],
    pub flags: PatchFlags,
    pub pinned: u32,
    pub phase: u32,
    pub priority: f32,
    pub error: f32,
    pub list: ListKind,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub class: NeighbourClass,
}

impl Patch {
    pub fn unused() -> Self {
        Self {
            generation: 0,
            id: PatchId::root(0),
            extent: PatchExtent::new(glam::IVec3::ZERO, glam::IVec3::ZERO, glam::IVec3::ZERO),
            bounds: BoundingBox::new(Vec3::ZERO, Vec3::ZERO),
            parent: None,
            kids: [None; 4],
            neighbours: [PatchHandle::DANGLING; 8],
            flags: PatchFlags::UNUSED,
            pinned: 0,
            phase: 0,
            priority: 0.0,
            error: 0.0,
            list: ListKind::Detached,
            prev: None,
            next: None,
            class: NeighbourClass::default(),
        }
    }

    pub fn level(&self) -> u8 {
        self.id.level()
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(PatchFlags::ACTIVE)
    }

    pub fn is_culled(&self) -> bool {
        self.flags.contains(PatchFlags::CULLED)
    }
}

/// Read-only snapshot of a patch handed to geometry sinks, render hooks and
/// inspection code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchView {
    pub handle: PatchHandle,
    pub id: PatchId,
    pub extent: PatchExtent,
    pub bounds: BoundingBox,
    pub flags: PatchFlags,
    pub priority: f32,
    pub error: f32,
    pub pinned: u32,
    /// First vertex of the fixed vertex range owned by this slot.
    pub vertex_offset: u32,
    /// Seam pattern for the current neighbour levels.
    pub class: NeighbourClass,
    pub neighbours: [PatchHandle; 8],
}

impl PatchView {
    pub fn level(&self) -> u8 {
        self.id.level()
    }

    pub fn is_culled(&self) -> bool {
        self.flags.contains(PatchFlags::CULLED)
    }
}
