//! Draw recording and the per-frame render context.

use geosphere_quadtree::{
    DrawCall, GeometryUpdate, NeighbourClass, PatchView, PrerenderHook, Quadtree, RenderBackend,
};

use crate::{PatchMesher, SeamIndexTables};

/// Records the draws of one frame in issue order.
#[derive(Debug, Default)]
pub struct DrawList {
    calls: Vec<DrawCall>,
    per_class: [usize; NeighbourClass::COUNT],
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.per_class = [0; NeighbourClass::COUNT];
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Draw count for each seam class.
    pub fn per_class(&self) -> &[usize; NeighbourClass::COUNT] {
        &self.per_class
    }
}

impl RenderBackend for DrawList {
    fn draw(&mut self, call: &DrawCall) {
        self.per_class[call.class.index()] += 1;
        self.calls.push(*call);
    }
}

/// Owns everything needed to turn a quadtree into draws.
pub struct RenderContext {
    mesher: PatchMesher,
    tables: SeamIndexTables,
    draws: DrawList,
}

/// What one [`RenderContext::frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub geometry: GeometryUpdate,
    /// Vertex ranges that need uploading.
    pub uploads: usize,
    pub draws: usize,
}

impl RenderContext {
    pub fn new(pool_size: usize) -> Self {
        Self {
            mesher: PatchMesher::new(pool_size),
            tables: SeamIndexTables::new(),
            draws: DrawList::new(),
        }
    }

    /// Bring geometry up to date and record this frame's draws.
    pub fn frame(&mut self, quadtree: &mut Quadtree, hook: &mut impl PrerenderHook) -> FrameStats {
        let geometry = quadtree.update_geometry(&mut self.mesher);
        let uploads = self.mesher.take_dirty().len();
        self.draws.clear();
        let draws = quadtree.render(&mut self.draws, hook);
        FrameStats {
            geometry,
            uploads,
            draws,
        }
    }

    /// Index slice for a recorded draw.
    pub fn indices(&self, call: &DrawCall) -> &[u16] {
        self.tables.table(call.class)
    }

    pub fn draws(&self) -> &DrawList {
        &self.draws
    }

    pub fn mesher(&self) -> &PatchMesher {
        &self.mesher
    }

    pub fn tables(&self) -> &SeamIndexTables {
        &self.tables
    }
}

/// Counts patches per level as they are drawn.
#[derive(Debug, Default)]
pub struct LevelHistogram(pub Vec<usize>);

impl PrerenderHook for LevelHistogram {
    fn before_draw(&mut self, patch: &PatchView) {
        let level = patch.level() as usize;
        if self.0.len() <= level {
            self.0.resize(level + 1, 0);
        }
        self.0[level] += 1;
    }
}
