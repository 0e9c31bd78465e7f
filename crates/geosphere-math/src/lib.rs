//! Plane, bounding-box and projection primitives used by the terrain quadtree.
//!
//! Everything here works in `f32` world space. Planes point inward: a
//! positive signed distance means "inside".

mod bounds;
mod frustum;
mod horizon;
mod plane;
mod projection;

pub use bounds::{BoundingBox, CullResult};
pub use frustum::Frustum;
pub use horizon::{horizon_distance, horizon_plane};
pub use plane::Plane;
pub use projection::{project_point, quad_area};
