//! Render traversal over the visible list.

use crate::{NeighbourClass, PatchHandle, PatchId, PatchView, Quadtree, VERTICES_PER_PATCH};

/// One patch draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub handle: PatchHandle,
    pub id: PatchId,
    /// First vertex of the slot's vertex range.
    pub first_vertex: u32,
    pub vertex_count: u32,
    /// Selects the seam index table.
    pub class: NeighbourClass,
}

/// Issues draws.
pub trait RenderBackend {
    fn draw(&mut self, call: &DrawCall);
}

/// Called before each patch is drawn, e.g. to set per-patch uniforms.
pub trait PrerenderHook {
    fn before_draw(&mut self, patch: &PatchView);
}

impl<F> PrerenderHook for F
where
    F: FnMut(&PatchView),
{
    fn before_draw(&mut self, patch: &PatchView) {
        self(patch)
    }
}

/// A hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHook;

impl PrerenderHook for NoHook {
    fn before_draw(&mut self, _patch: &PatchView) {}
}

impl Quadtree {
    /// Draw every visible patch in priority order. Returns the draw count.
    pub fn render(
        &self,
        backend: &mut impl RenderBackend,
        hook: &mut impl PrerenderHook,
    ) -> usize {
        let mut draws = 0;
        for h in self.visible() {
            let view = self.view_of(h);
            hook.before_draw(&view);
            backend.draw(&DrawCall {
                handle: h,
                id: view.id,
                first_vertex: view.vertex_offset,
                vertex_count: VERTICES_PER_PATCH,
                class: view.class,
            });
            draws += 1;
        }
        draws
    }
}
