//! Root faces and their adjacency.
//!
//! Each cube face is parameterized from its corner with the smallest
//! `x + y + z`, with `du x dv` pointing outward. With that choice the two
//! faces sharing an edge agree on which end of the edge is its origin, so the
//! slot halves of a side line up across face boundaries without remapping.
//!
//! ```text
//!   face  normal  origin        du   dv
//!   0     +X      (+1, -1, -1)  +Y   +Z
//!   1     -X      (-1, -1, -1)  +Z   +Y
//!   2     +Y      (-1, +1, -1)  +Z   +X
//!   3     -Y      (-1, -1, -1)  +X   +Z
//!   4     +Z      (-1, -1, +1)  +X   +Y
//!   5     -Z      (-1, -1, -1)  +Y   +X
//! ```

use glam::{IVec3, Vec3};

use crate::{PatchExtent, Side};

/// Shape of the approximated surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Basis {
    /// Six cube faces projected onto a sphere.
    #[default]
    Cube,
    /// A single square face wrapped onto itself on both axes.
    Plane,
}

/// A root face and the face/side across each of its sides.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RootFace {
    pub origin: IVec3,
    pub du: IVec3,
    pub dv: IVec3,
    /// Indexed by `Side`: neighbouring root and the side of it that faces us.
    pub neighbours: [(u8, Side); 4],
}

const X: IVec3 = IVec3::X;
const Y: IVec3 = IVec3::Y;
const Z: IVec3 = IVec3::Z;

const CUBE: [RootFace; 6] = [
    RootFace {
        origin: IVec3::new(1, -1, -1),
        du: Y,
        dv: Z,
        neighbours: [(2, Side::Up), (4, Side::Right), (3, Side::Right), (5, Side::Up)],
    },
    RootFace {
        origin: IVec3::new(-1, -1, -1),
        du: Z,
        dv: Y,
        neighbours: [(4, Side::Left), (2, Side::Down), (5, Side::Down), (3, Side::Left)],
    },
    RootFace {
        origin: IVec3::new(-1, 1, -1),
        du: Z,
        dv: X,
        neighbours: [(4, Side::Up), (0, Side::Right), (5, Side::Right), (1, Side::Up)],
    },
    RootFace {
        origin: IVec3::new(-1, -1, -1),
        du: X,
        dv: Z,
        neighbours: [(0, Side::Left), (4, Side::Down), (1, Side::Down), (5, Side::Left)],
    },
    RootFace {
        origin: IVec3::new(-1, -1, 1),
        du: X,
        dv: Y,
        neighbours: [(0, Side::Up), (2, Side::Right), (1, Side::Right), (3, Side::Up)],
    },
    RootFace {
        origin: IVec3::new(-1, -1, -1),
        du: Y,
        dv: X,
        neighbours: [(2, Side::Left), (0, Side::Down), (3, Side::Down), (1, Side::Left)],
    },
];

const PLANE: [RootFace; 1] = [RootFace {
    origin: IVec3::new(-1, -1, 0),
    du: X,
    dv: Y,
    neighbours: [(0, Side::Left), (0, Side::Down), (0, Side::Right), (0, Side::Up)],
}];

impl Basis {
    /// Number of root patches.
    pub fn root_count(self) -> usize {
        self.faces().len()
    }

    pub(crate) fn faces(self) -> &'static [RootFace] {
        match self {
            Basis::Cube => &CUBE,
            Basis::Plane => &PLANE,
        }
    }

    /// Extent of root `index` scaled to `radius`.
    pub(crate) fn root_extent(self, index: usize, radius: i32) -> PatchExtent {
        let face = &self.faces()[index];
        // Unit edge vectors span 2 units from the -1 corner.
        PatchExtent::new(face.origin * radius, face.du * 2 * radius, face.dv * 2 * radius)
    }

    /// The side of a patch on root `to` that faces `side` of a patch on root
    /// `from`.
    pub(crate) fn facing_side(self, from: u8, to: u8, side: Side) -> Side {
        if from == to {
            return side.opposite();
        }
        let (root, facing) = self.faces()[from as usize].neighbours[side as usize];
        debug_assert_eq!(root, to, "patches on roots {from} and {to} do not share an edge");
        facing
    }

    /// Map a point of the integer lattice onto the surface.
    pub fn surface_point(self, point: Vec3, radius: f32) -> Vec3 {
        match self {
            Basis::Cube => point.normalize_or_zero() * radius,
            Basis::Plane => point,
        }
    }

    /// Outward unit direction at a lattice point: the sphere normal for the
    /// cube, `+Z` for the plane.
    pub fn up(self, point: Vec3) -> Vec3 {
        match self {
            Basis::Cube => point.normalize_or_zero(),
            Basis::Plane => Vec3::Z,
        }
    }

    /// Coordinate handed to the elevation source for a lattice point.
    ///
    /// The cube passes the unit direction from the center; the plane passes
    /// the point scaled into `[-1, 1]` on `x` and `y`.
    pub fn sample_coordinate(self, point: Vec3, radius: f32) -> Vec3 {
        match self {
            Basis::Cube => point.normalize_or_zero(),
            Basis::Plane => point / radius.max(f32::EPSILON),
        }
    }
}
