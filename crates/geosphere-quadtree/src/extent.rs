//! Integer patch extents.

use glam::{IVec3, Vec3};

use crate::Quadrant;

/// The region covered by a patch: a corner and two edge vectors on one
/// axis-aligned face.
///
/// Integer coordinates keep subdivision exact, so procedural sampling of a
/// region is reproducible no matter how often it was split and merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatchExtent {
    /// Corner at local `(0, 0)`.
    pub origin: IVec3,
    /// Edge from local `(0, 0)` to `(1, 0)`.
    pub du: IVec3,
    /// Edge from local `(0, 0)` to `(0, 1)`.
    pub dv: IVec3,
}

impl PatchExtent {
    /// Create an extent from a corner and its two edges.
    pub fn new(origin: IVec3, du: IVec3, dv: IVec3) -> Self {
        Self { origin, du, dv }
    }

    /// Edge length (the longer of the two edges).
    pub fn size(&self) -> i32 {
        self.du.abs().max_element().max(self.dv.abs().max_element())
    }

    /// Point at local coordinates `(s, t)` in `[0, 1]^2`.
    pub fn point_at(&self, s: f32, t: f32) -> Vec3 {
        self.origin.as_vec3() + self.du.as_vec3() * s + self.dv.as_vec3() * t
    }

    /// Corner of `quadrant`.
    pub fn corner(&self, quadrant: Quadrant) -> IVec3 {
        self.origin
            + if quadrant.sx() == 1 { self.du } else { IVec3::ZERO }
            + if quadrant.sy() == 1 { self.dv } else { IVec3::ZERO }
    }

    /// The four corners in counter-clockwise order from local `(0, 0)`.
    pub fn corners(&self) -> [IVec3; 4] {
        Quadrant::ALL.map(|q| self.corner(q))
    }

    /// Extent of child `quadrant`.
    ///
    /// The first half of each edge is `d / 2`, the second `d - d / 2`, so
    /// the four children tile the parent exactly.
    pub fn quadrant(&self, quadrant: Quadrant) -> Self {
        let half_u = self.du / 2;
        let half_v = self.dv / 2;
        let (origin_u, du) = if quadrant.sx() == 0 {
            (IVec3::ZERO, half_u)
        } else {
            (half_u, self.du - half_u)
        };
        let (origin_v, dv) = if quadrant.sy() == 0 {
            (IVec3::ZERO, half_v)
        } else {
            (half_v, self.dv - half_v)
        };
        Self {
            origin: self.origin + origin_u + origin_v,
            du,
            dv,
        }
    }

    /// Recombine four children (indexed by quadrant) into their parent.
    pub fn merge(children: &[PatchExtent; 4]) -> Self {
        let dl = &children[Quadrant::DownLeft as usize];
        Self {
            origin: dl.origin,
            du: dl.du + children[Quadrant::DownRight as usize].du,
            dv: dl.dv + children[Quadrant::UpLeft as usize].dv,
        }
    }
}
