//! Patch meshing for the terrain quadtree: a vertex range per pool slot,
//! seam-aware index tables and a recorded draw list.

mod draw;
mod mesher;
mod seams;
mod vertex;

pub use draw::{DrawList, FrameStats, LevelHistogram, RenderContext};
pub use mesher::PatchMesher;
pub use seams::{INDICES_PER_PATCH, SeamIndexTables, grid_index};
pub use vertex::PatchVertex;
