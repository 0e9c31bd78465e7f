//! Restructuring counters.

/// Cumulative counters since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadtreeStats {
    /// Successful splits, including forced ones.
    pub splits: u64,
    /// Splits performed to bring a coarser neighbour to the splitting
    /// patch's level.
    pub forced_splits: u64,
    /// Successful merges, including forced and reclaim merges.
    pub merges: u64,
    /// Merges performed to bring a finer neighbour or sibling back to the
    /// merging group's level.
    pub forced_merges: u64,
    /// Merges started by pool reclamation.
    pub reclaim_merges: u64,
    /// Children or parents reused from the free list with their geometry.
    pub cache_hits: u64,
    /// Allocations that found the free list empty.
    pub allocation_failures: u64,
    pub split_failures: u64,
    pub merge_failures: u64,
}
