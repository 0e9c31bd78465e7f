//! Per-frame culling, scoring and the merge / split / re-cull passes.
//!
//! Visible patches are scored by the fraction of the screen they cover and
//! accumulate an error while that fraction stays outside the hysteresis band
//! around the target. Culled patches are scored by normalized camera
//! distance so the farthest are recycled first.

use std::collections::VecDeque;

use geosphere_math::{CullResult, Frustum, Plane, horizon_plane, project_point, quad_area};
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

use crate::{Basis, MergePolicy, PatchFlags, PatchHandle, Quadtree};

/// Camera state of the last [`Quadtree::update_view`].
#[derive(Clone, Debug)]
pub(crate) struct ViewState {
    pub view_projection: Mat4,
    pub camera: Vec3,
    /// Frustum planes plus the horizon plane for the cube basis.
    pub planes: SmallVec<[Plane; 7]>,
}

/// Counts for one [`Quadtree::update_view`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub splits: u64,
    pub merges: u64,
    /// Patches moved to the culled list after restructuring.
    pub late_culled: usize,
    pub visible: usize,
    pub culled: usize,
    pub free: usize,
}

/// Handles to visit in one pass.
///
/// Entries that went stale, left the active lists, or were already visited
/// in this phase are skipped; a returned entry is stamped with the phase.
pub(crate) struct WorkQueue {
    phase: u32,
    handles: VecDeque<PatchHandle>,
}

impl WorkQueue {
    pub fn new(phase: u32, handles: impl IntoIterator<Item = PatchHandle>) -> Self {
        Self {
            phase,
            handles: handles.into_iter().collect(),
        }
    }

    pub fn pop(&mut self, qt: &mut Quadtree) -> Option<PatchHandle> {
        while let Some(h) = self.handles.pop_front() {
            let Some(p) = qt.resolve(h) else {
                continue;
            };
            if !p.is_active() || p.phase == self.phase {
                continue;
            }
            qt.get_mut(h).phase = self.phase;
            return Some(h);
        }
        None
    }
}

enum Score {
    Culled { priority: f32 },
    Visible { area: f32 },
}

impl Quadtree {
    /// Re-score every active patch for a new camera and restructure toward
    /// the target screen fraction.
    ///
    /// `view_projection` must map to a `[0, 1]` depth range (glam's
    /// `perspective_rh`). `camera` is the eye position in the same space as
    /// the surface.
    pub fn update_view(&mut self, view_projection: &Mat4, camera: Vec3) -> ViewUpdate {
        let before = self.stats;
        let frustum = Frustum::from_view_projection(view_projection);
        let mut planes: SmallVec<[Plane; 7]> = frustum.planes().iter().copied().collect();
        if self.config.basis == Basis::Cube {
            planes.extend(horizon_plane(camera, Vec3::ZERO, self.config.radius as f32));
        }
        self.view = Some(ViewState {
            view_projection: *view_projection,
            camera,
            planes,
        });

        self.rescore();
        self.merge_pass();
        self.split_pass();
        let late_culled = self.recull_pass();

        if cfg!(debug_assertions) {
            if let Err(violation) = self.validate() {
                panic!("quadtree invariant violated after update_view: {violation}");
            }
        }

        let update = ViewUpdate {
            splits: self.stats.splits - before.splits,
            merges: self.stats.merges - before.merges,
            late_culled,
            visible: self.visible.len(),
            culled: self.culled.len(),
            free: self.free.len(),
        };
        tracing::debug!(?update, "view updated");
        update
    }

    /// Drain both active lists, score every patch and re-thread them in
    /// descending priority order.
    fn rescore(&mut self) {
        let mut scratch: Vec<u32> = Vec::with_capacity(self.active_count());
        while let Some(i) = self.visible.pop_front(&mut self.patches) {
            scratch.push(i);
        }
        while let Some(i) = self.culled.pop_front(&mut self.patches) {
            scratch.push(i);
        }

        let scheduler = self.config.scheduler;
        for &i in &scratch {
            let h = self.handle_of(i);
            match self.score(h) {
                Score::Culled { priority } => self.mark_culled(h, priority, false),
                Score::Visible { area } => {
                    let p = self.get_mut(h);
                    p.flags.remove(PatchFlags::CULLED | PatchFlags::LATE_CULLED);
                    p.priority = area;
                    p.error = scheduler.accumulate_error(p.error, area);
                }
            }
        }

        let patches = &self.patches;
        scratch.sort_by(|a, b| {
            patches[*b as usize]
                .priority
                .total_cmp(&patches[*a as usize].priority)
        });
        for i in scratch {
            if self.patches[i as usize].is_culled() {
                self.culled.push_back(&mut self.patches, i);
            } else {
                self.visible.push_back(&mut self.patches, i);
            }
        }
    }

    fn score(&self, handle: PatchHandle) -> Score {
        let Some(view) = self.view.as_ref() else {
            return Score::Visible { area: 0.0 };
        };
        let p = self.get(handle);
        if p.bounds.cull(&view.planes) == CullResult::Outside {
            return Score::Culled {
                priority: self.distance_priority(view.camera, p.bounds.center),
            };
        }

        let mut corners = [Vec2::ZERO; 4];
        for (corner, point) in corners.iter_mut().zip(self.surface_corners(&p.extent)) {
            match project_point(&view.view_projection, point) {
                Some(ndc) => *corner = ndc.truncate(),
                // A corner behind the eye: the patch fills the view.
                None => return Score::Visible { area: 1.0 },
            }
        }
        // NDC spans [-1, 1] on both axes, an area of 4.
        let area = (quad_area(corners) * 0.25).min(1.0);
        Score::Visible { area }
    }

    fn distance_priority(&self, camera: Vec3, center: Vec3) -> f32 {
        (camera - center).length() / (camera.length() + self.config.radius as f32)
    }

    /// Flag a detached or listed patch as culled with distance priority.
    fn mark_culled(&mut self, handle: PatchHandle, priority: f32, late: bool) {
        let p = self.get_mut(handle);
        p.flags.insert(PatchFlags::CULLED);
        p.flags.set(PatchFlags::LATE_CULLED, late);
        p.priority = priority;
        p.error = 0.0;
    }

    fn next_phase(&mut self) -> u32 {
        self.phase = self.phase.wrapping_add(1);
        self.phase
    }

    /// Merge visible groups whose error fell below the merge threshold,
    /// least important first.
    fn merge_pass(&mut self) {
        let phase = self.next_phase();
        let threshold = self.config.scheduler.merge_threshold;
        let handles: Vec<PatchHandle> = self
            .visible
            .iter_rev(&self.patches)
            .map(|i| self.handle_of(i))
            .collect();
        let mut queue = WorkQueue::new(phase, handles);
        while let Some(h) = queue.pop(self) {
            let p = self.get(h);
            if p.level() > 0 && p.error < threshold {
                if let Err(e) = self.merge(h, MergePolicy::ErrorBelow(threshold)) {
                    tracing::trace!(id = %self.get(h).id, error = %e, "merge skipped");
                }
            }
        }
    }

    /// Split visible patches whose error rose above the split threshold,
    /// most important first.
    ///
    /// The queue is a snapshot of the visible list taken before the pass,
    /// and the scan does not restart after a split. Children created here
    /// are scored and considered on the next frame.
    fn split_pass(&mut self) {
        let phase = self.next_phase();
        let threshold = self.config.scheduler.split_threshold;
        let handles: Vec<PatchHandle> = self.visible().collect();
        let mut queue = WorkQueue::new(phase, handles);
        while let Some(h) = queue.pop(self) {
            let p = self.get(h);
            if !p.is_culled() && p.error > threshold {
                if let Err(e) = self.split(h) {
                    tracing::trace!(id = %self.get(h).id, error = %e, "split skipped");
                }
            }
        }
    }

    /// Move visible patches that ended up outside the view volume to the
    /// culled list, until nothing moves.
    fn recull_pass(&mut self) -> usize {
        let Some(view) = self.view.take() else {
            return 0;
        };
        let mut total = 0;
        loop {
            let phase = self.next_phase();
            let handles: Vec<PatchHandle> = self.visible().collect();
            let mut queue = WorkQueue::new(phase, handles);
            let mut moved = 0;
            while let Some(h) = queue.pop(self) {
                let p = self.get(h);
                if p.is_culled() || p.bounds.cull(&view.planes) != CullResult::Outside {
                    continue;
                }
                let priority = self.distance_priority(view.camera, p.bounds.center);
                self.detach(h);
                self.mark_culled(h, priority, true);
                self.insert_active(h);
                moved += 1;
            }
            total += moved;
            if moved == 0 {
                break;
            }
        }
        self.view = Some(view);
        total
    }
}
