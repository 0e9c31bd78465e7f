//! CPU-side patch vertex generation.

use geosphere_quadtree::{
    GeometrySink, MESH_SAMPLES, NeighbourClass, PATCH_SAMPLES, PatchView, Surface,
    VERTICES_PER_PATCH,
};

use crate::PatchVertex;

/// Owns one fixed vertex range per pool slot and fills it on demand.
///
/// Ranges written since the last [`PatchMesher::take_dirty`] are reported so
/// a renderer can upload only what changed.
pub struct PatchMesher {
    vertices: Vec<PatchVertex>,
    classes: Vec<NeighbourClass>,
    dirty: Vec<u32>,
    resampled: u64,
    restitched: u64,
}

impl PatchMesher {
    pub fn new(pool_size: usize) -> Self {
        Self {
            vertices: vec![PatchVertex::default(); pool_size * VERTICES_PER_PATCH as usize],
            classes: vec![NeighbourClass::NONE; pool_size],
            dirty: Vec::new(),
            resampled: 0,
            restitched: 0,
        }
    }

    /// The whole vertex array.
    pub fn vertices(&self) -> &[PatchVertex] {
        &self.vertices
    }

    /// The vertex array as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertices of the slot starting at `first_vertex`.
    pub fn patch_vertices(&self, first_vertex: u32) -> &[PatchVertex] {
        let start = first_vertex as usize;
        &self.vertices[start..start + VERTICES_PER_PATCH as usize]
    }

    /// Seam class last recorded for the slot starting at `first_vertex`.
    pub fn class(&self, first_vertex: u32) -> NeighbourClass {
        self.classes[(first_vertex / VERTICES_PER_PATCH) as usize]
    }

    /// First vertices of the ranges rewritten since the last call.
    pub fn take_dirty(&mut self) -> Vec<u32> {
        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.sort_unstable();
        dirty.dedup();
        dirty
    }

    /// Total `(resampled, restitched)` patches.
    pub fn counts(&self) -> (u64, u64) {
        (self.resampled, self.restitched)
    }
}

impl GeometrySink for PatchMesher {
    fn resample(&mut self, patch: &PatchView, surface: &Surface<'_>) {
        let extent = patch.extent;
        let base = patch.vertex_offset as usize;
        let origin = extent.origin.as_i64vec3();
        let (du, dv) = (extent.du.as_i64vec3(), extent.dv.as_i64vec3());
        let n = PATCH_SAMPLES as i64;
        for j in 0..MESH_SAMPLES {
            for i in 0..MESH_SAMPLES {
                // Exact lattice point: the quadtree keeps every edge a
                // multiple of the sample count.
                let point = origin + du * i as i64 / n + dv * j as i64 / n;
                let (position, sample) = surface.vertex(point.as_vec3());
                self.vertices[base + j * MESH_SAMPLES + i] = PatchVertex::new(position, sample.color);
            }
        }
        self.classes[base / VERTICES_PER_PATCH as usize] = patch.class;
        self.dirty.push(patch.vertex_offset);
        self.resampled += 1;
    }

    fn restitch(&mut self, patch: &PatchView) {
        self.classes[patch.vertex_offset as usize / VERTICES_PER_PATCH as usize] = patch.class;
        self.restitched += 1;
    }
}
