//! Triangle-strip index tables, one per neighbour class.
//!
//! A patch is a `MESH_SAMPLES x MESH_SAMPLES` vertex grid drawn as one
//! strip: each row of quads is `2 * MESH_SAMPLES` indices and consecutive
//! rows are joined by two degenerate indices. Along a side that borders a
//! coarser patch every odd edge vertex is replaced by its even predecessor,
//! so the edge only uses vertices the coarser patch also has and no
//! T-junction cracks open.

use geosphere_quadtree::{MESH_SAMPLES, NeighbourClass, PATCH_SAMPLES, Side};

/// Indices in every table.
pub const INDICES_PER_PATCH: usize = 2 * MESH_SAMPLES * PATCH_SAMPLES + 2 * (PATCH_SAMPLES - 1);

const LAST: usize = PATCH_SAMPLES;

/// Grid vertex `(i, j)`: `i` runs along `du`, `j` along `dv`.
pub fn grid_index(i: usize, j: usize) -> u16 {
    (j * MESH_SAMPLES + i) as u16
}

/// The nine seam tables.
#[derive(Clone, Debug)]
pub struct SeamIndexTables {
    tables: Vec<Vec<u16>>,
}

impl SeamIndexTables {
    pub fn new() -> Self {
        let tables = NeighbourClass::all().map(build_table).collect();
        Self { tables }
    }

    /// Indices for patches of `class`, relative to the patch's first vertex.
    pub fn table(&self, class: NeighbourClass) -> &[u16] {
        &self.tables[class.index()]
    }
}

impl Default for SeamIndexTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Grid vertex after snapping odd edge vertices on coarser sides.
fn snapped(class: NeighbourClass, mut i: usize, mut j: usize) -> u16 {
    let snap = |k: usize| k - (k & 1);
    if (j == 0 && class.coarser(Side::Down)) || (j == LAST && class.coarser(Side::Up)) {
        i = snap(i);
    }
    if (i == 0 && class.coarser(Side::Left)) || (i == LAST && class.coarser(Side::Right)) {
        j = snap(j);
    }
    grid_index(i, j)
}

fn build_table(class: NeighbourClass) -> Vec<u16> {
    let mut indices = Vec::with_capacity(INDICES_PER_PATCH);
    for j in 0..PATCH_SAMPLES {
        if j > 0 {
            // Degenerate join from the end of the previous row.
            indices.push(snapped(class, LAST, j));
            indices.push(snapped(class, 0, j));
        }
        for i in 0..MESH_SAMPLES {
            indices.push(snapped(class, i, j));
            indices.push(snapped(class, i, j + 1));
        }
    }
    debug_assert_eq!(indices.len(), INDICES_PER_PATCH);
    indices
}
