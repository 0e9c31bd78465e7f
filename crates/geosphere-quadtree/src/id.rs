//! Patch identity: the root face index followed by two bits per level.

use std::fmt;

use crate::Quadrant;

/// Deepest level a path code can describe (3 root bits + 2 bits per level).
pub const MAX_LEVEL: u8 = 30;

/// Path code of child `quadrant` of `parent`.
pub fn child_id(parent: u64, quadrant: Quadrant) -> u64 {
    (parent << 2) | quadrant as u64
}

/// Path code of the ancestor `n` levels above `id`.
pub fn parent_id(id: u64, n: u8) -> u64 {
    id.checked_shr(2 * u32::from(n)).unwrap_or(0)
}

/// Position of a patch among its siblings.
pub fn sibling_index(id: u64) -> Quadrant {
    Quadrant::from_bits(id)
}

/// Identity of a patch: path code plus level.
///
/// Displays as `root:q.q.q`, for example `1:2.1.1.0` for the patch reached
/// from root 1 through quadrants 2, 1, 1 and 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatchId {
    code: u64,
    level: u8,
}

impl PatchId {
    /// Identity of root face `index`.
    pub fn root(index: u8) -> Self {
        Self {
            code: u64::from(index),
            level: 0,
        }
    }

    /// Identity of the patch reached from root `index` through `path`.
    pub fn from_path(index: u8, path: &[Quadrant]) -> Self {
        path.iter().fold(Self::root(index), |id, q| id.child(*q))
    }

    /// Build an identity from a raw code and level.
    pub fn new(code: u64, level: u8) -> Self {
        Self { code, level }
    }

    /// Raw path code.
    pub fn code(self) -> u64 {
        self.code
    }

    /// Depth below the root face.
    pub fn level(self) -> u8 {
        self.level
    }

    /// Identity of child `quadrant`.
    #[must_use]
    pub fn child(self, quadrant: Quadrant) -> Self {
        Self {
            code: child_id(self.code, quadrant),
            level: self.level + 1,
        }
    }

    /// Identity of the parent, `None` for a root.
    pub fn parent(self) -> Option<Self> {
        (self.level > 0).then(|| Self {
            code: parent_id(self.code, 1),
            level: self.level - 1,
        })
    }

    /// Position among siblings, `None` for a root.
    pub fn quadrant(self) -> Option<Quadrant> {
        (self.level > 0).then(|| sibling_index(self.code))
    }

    /// Index of the root face this patch descends from.
    pub fn root_index(self) -> u8 {
        parent_id(self.code, self.level) as u8
    }

    /// Quadrants from the root down to this patch.
    pub fn path(self) -> impl Iterator<Item = Quadrant> {
        (0..self.level)
            .rev()
            .map(move |l| sibling_index(parent_id(self.code, l)))
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root_index())?;
        for (i, q) in self.path().enumerate() {
            let sep = if i == 0 { ':' } else { '.' };
            write!(f, "{sep}{}", q as u8)?;
        }
        Ok(())
    }
}
