//! Procedural elevation for the terrain quadtree: fBm simplex noise sampled on
//! the unit sphere and coloured by a height ramp.

mod heightmap;
mod ramp;

pub use heightmap::{FractalTerrain, TerrainParams};
pub use ramp::height_to_color;
