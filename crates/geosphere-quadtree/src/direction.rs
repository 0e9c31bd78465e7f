//! Sides, neighbour slots, quadrants and the fixed tables that relate them.
//!
//! Every patch has 8 neighbour slots, two per side:
//!
//! ```text
//!            UP_1   UP
//!          +------+------+
//!   LEFT_1 |             | RIGHT_1
//!          +     UL UR   +
//!   LEFT   |     DL DR   | RIGHT
//!          +------+------+
//!            DOWN  DOWN_1
//! ```
//!
//! Slot 0 of a side covers the half nearer the side's origin: the low `v`
//! end for left/right, the low `u` end for up/down.

/// Neighbour slot indices.
pub const RIGHT: usize = 0;
pub const RIGHT_1: usize = 1;
pub const UP: usize = 2;
pub const UP_1: usize = 3;
pub const LEFT: usize = 4;
pub const LEFT_1: usize = 5;
pub const DOWN: usize = 6;
pub const DOWN_1: usize = 7;

/// One of the four sides of a patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Right = 0,
    Up = 1,
    Left = 2,
    Down = 3,
}

impl Side {
    /// All sides in slot order.
    pub const ALL: [Side; 4] = [Side::Right, Side::Up, Side::Left, Side::Down];

    /// Index of the slot covering `half` (0 or 1) of this side.
    pub fn slot(self, half: usize) -> usize {
        debug_assert!(half < 2);
        self as usize * 2 + half
    }

    /// The side facing this one across a shared edge in the same frame.
    pub fn opposite(self) -> Side {
        match self {
            Side::Right => Side::Left,
            Side::Up => Side::Down,
            Side::Left => Side::Right,
            Side::Down => Side::Up,
        }
    }

    /// Whether the side runs along `v` (left or right).
    pub fn is_left_right(self) -> bool {
        matches!(self, Side::Right | Side::Left)
    }
}

/// Position of a child inside its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Quadrant {
    DownLeft = 0,
    DownRight = 1,
    UpRight = 2,
    UpLeft = 3,
}

/// Sibling and side relations of one quadrant.
#[derive(Clone, Copy, Debug)]
pub struct QuadrantLinks {
    /// Counter-clockwise sibling.
    pub ccw: Quadrant,
    /// Clockwise sibling.
    pub cw: Quadrant,
    /// Side facing the counter-clockwise sibling.
    pub ccw_side: Side,
    /// Side facing the clockwise sibling.
    pub cw_side: Side,
    /// Outward side along the parent's left/right edge.
    pub lr: Side,
    /// Outward side along the parent's up/down edge.
    pub ud: Side,
}

const LINKS: [QuadrantLinks; 4] = [
    QuadrantLinks {
        ccw: Quadrant::DownRight,
        cw: Quadrant::UpLeft,
        ccw_side: Side::Right,
        cw_side: Side::Up,
        lr: Side::Left,
        ud: Side::Down,
    },
    QuadrantLinks {
        ccw: Quadrant::UpRight,
        cw: Quadrant::DownLeft,
        ccw_side: Side::Up,
        cw_side: Side::Left,
        lr: Side::Right,
        ud: Side::Down,
    },
    QuadrantLinks {
        ccw: Quadrant::UpLeft,
        cw: Quadrant::DownRight,
        ccw_side: Side::Left,
        cw_side: Side::Down,
        lr: Side::Right,
        ud: Side::Up,
    },
    QuadrantLinks {
        ccw: Quadrant::DownLeft,
        cw: Quadrant::UpRight,
        ccw_side: Side::Down,
        cw_side: Side::Right,
        lr: Side::Left,
        ud: Side::Up,
    },
];

impl Quadrant {
    /// All quadrants in counter-clockwise order from lower left.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DownLeft,
        Quadrant::DownRight,
        Quadrant::UpRight,
        Quadrant::UpLeft,
    ];

    /// Decode the two low bits of a path code.
    pub fn from_bits(bits: u64) -> Quadrant {
        Self::ALL[(bits & 3) as usize]
    }

    /// Quadrant at horizontal offset `sx` and vertical offset `sy`.
    pub fn from_offsets(sx: usize, sy: usize) -> Quadrant {
        match (sx & 1, sy & 1) {
            (0, 0) => Quadrant::DownLeft,
            (1, 0) => Quadrant::DownRight,
            (1, _) => Quadrant::UpRight,
            _ => Quadrant::UpLeft,
        }
    }

    /// Horizontal offset inside the parent (0 left, 1 right).
    pub fn sx(self) -> usize {
        matches!(self, Quadrant::DownRight | Quadrant::UpRight) as usize
    }

    /// Vertical offset inside the parent (0 down, 1 up).
    pub fn sy(self) -> usize {
        matches!(self, Quadrant::UpRight | Quadrant::UpLeft) as usize
    }

    /// Sibling and side relations.
    pub fn links(self) -> &'static QuadrantLinks {
        &LINKS[self as usize]
    }

    /// The two outward sides (left/right first).
    pub fn outward_sides(self) -> [Side; 2] {
        let links = self.links();
        [links.lr, links.ud]
    }

    /// Which half of `side` this quadrant occupies in its parent.
    pub fn half_on(self, side: Side) -> usize {
        if side.is_left_right() {
            self.sy()
        } else {
            self.sx()
        }
    }

    /// The sibling on the far side of the parent across `side`.
    pub fn mirrored(self, side: Side) -> Quadrant {
        if side.is_left_right() {
            Quadrant::from_offsets(self.sx() ^ 1, self.sy())
        } else {
            Quadrant::from_offsets(self.sx(), self.sy() ^ 1)
        }
    }
}
