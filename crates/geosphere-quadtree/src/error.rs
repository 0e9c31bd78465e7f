//! Error types for construction, restructuring and validation.

use crate::{PatchId, Side};

/// Errors that prevent a quadtree from being constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuadtreeError {
    /// The pool cannot hold the root patches of the basis.
    #[error("pool of {available} patches cannot hold the {required} root patches")]
    PoolTooSmall { required: usize, available: usize },

    /// The pool does not fit the 32-bit slot index space.
    #[error("pool of {0} patches exceeds the slot index range")]
    PoolTooLarge(usize),

    /// The radius is not a power of two within the lattice range, or the
    /// minimum patch size would leave patches off the sample lattice.
    #[error("radius {radius} is outside the supported range (minimum patch size {min_patch_size})")]
    InvalidRadius { radius: i32, min_patch_size: i32 },

    /// Reclamation would stop before it started.
    #[error("high water mark {high} is below low water mark {low}")]
    InvalidWaterMarks { low: usize, high: usize },
}

/// Recoverable reasons a split or merge did not happen.
///
/// None of these leave the topology modified; callers skip the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RestructureError {
    /// The handle is stale or the patch is not on an active list.
    #[error("patch is not active")]
    Inactive,
    /// An in-progress operation relies on the patch.
    #[error("patch is pinned")]
    Pinned,
    /// Root patches cannot be merged.
    #[error("root patches cannot be merged")]
    RootLevel,
    /// Children would be smaller than the minimum patch size.
    #[error("patch is already at the minimum size")]
    MinimumSize,
    /// Children would exceed the path code depth.
    #[error("patch is at the maximum level")]
    MaxLevel,
    /// The merge policy rejected a member of the group.
    #[error("merge policy rejected the patch")]
    Rejected,
    /// No slot could be obtained even after reclamation.
    #[error("patch pool exhausted")]
    PoolExhausted,
}

/// A broken topology invariant found by [`crate::Quadtree::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("patch {patch} slot {slot} does not reference an active patch")]
    DanglingNeighbour { patch: PatchId, slot: usize },

    #[error("patch {patch} (level {level}) borders {neighbour} (level {neighbour_level})")]
    LevelGap {
        patch: PatchId,
        level: u8,
        neighbour: PatchId,
        neighbour_level: u8,
    },

    #[error("patch {patch} has inconsistent slots on its {side:?} side")]
    InconsistentSide { patch: PatchId, side: Side },

    #[error("{neighbour} does not link back to {patch} across its {side:?} side")]
    MissingBacklink {
        patch: PatchId,
        neighbour: PatchId,
        side: Side,
    },

    #[error("patch {patch} is flagged {flags:#04x} but threaded on the {list} list")]
    ListMismatch {
        patch: PatchId,
        flags: u8,
        list: &'static str,
    },

    #[error("pool leak: {free} free + {visible} visible + {culled} culled != {total}")]
    PoolLeak {
        free: usize,
        visible: usize,
        culled: usize,
        total: usize,
    },

    #[error("patch {patch} is still pinned {pinned} times at rest")]
    StillPinned { patch: PatchId, pinned: u32 },
}
