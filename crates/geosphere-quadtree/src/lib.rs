//! Fixed-budget terrain quadtree: a pool of patches kept split and merged
//! around the camera with at most one level between neighbours.

mod basis;
mod config;
mod direction;
mod elevation;
mod error;
mod extent;
mod geometry;
mod id;
mod invariants;
mod linker;
mod list;
mod merge;
mod patch;
mod pin;
mod pool;
mod quadtree;
mod render;
mod scheduler;
mod split;
mod stats;

#[cfg(test)]
mod tests;

pub use basis::Basis;
pub use config::{QuadtreeConfig, SchedulerConfig};
pub use direction::{
    DOWN, DOWN_1, LEFT, LEFT_1, Quadrant, QuadrantLinks, RIGHT, RIGHT_1, Side, UP, UP_1,
};
pub use elevation::{ElevationSource, FlatElevation, Sample};
pub use error::{InvariantViolation, QuadtreeError, RestructureError};
pub use extent::PatchExtent;
pub use geometry::{
    GeometrySink, GeometryUpdate, MESH_SAMPLES, NeighbourClass, PATCH_SAMPLES, Surface,
    VERTICES_PER_PATCH,
};
pub use id::{MAX_LEVEL, PatchId, child_id, parent_id, sibling_index};
pub use merge::MergePolicy;
pub use patch::{ListKind, PatchFlags, PatchHandle, PatchView};
pub use quadtree::{MAX_RADIUS, Quadtree, lattice_aligned};
pub use render::{DrawCall, NoHook, PrerenderHook, RenderBackend};
pub use scheduler::ViewUpdate;
pub use stats::QuadtreeStats;
