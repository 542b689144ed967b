#![forbid(unsafe_code)]

//! Entry types stored in a [`MoveLog`](crate::MoveLog).
//!
//! A log is a chain of entries. Each entry is either a [`Move`] (a reversible
//! transition identified by an opaque [`MoveId`], a [`Direction`] and a
//! [`SliceMask`]) or a mark: a zero-width, single-character bookmark.
//!
//! Equality on these types is by value and never by chain position, which
//! is what the cancellation rule compares.

use std::fmt;
use std::ops::Neg;

/// Reserved mark opening a recorded macro.
pub const MARK_MACRO_OPEN: char = '[';
/// Reserved mark closing a recorded macro.
pub const MARK_MACRO_CLOSE: char = ']';
/// Reserved mark separating a scramble from the moves made after it.
pub const MARK_SCRAMBLE_BOUNDARY: char = '|';

/// Opaque identifier of a move. The log only compares and transports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveId(pub u32);

impl MoveId {
    /// Create a new move ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Turning direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Clockwise, persisted as `-1`.
    Cw,
    /// Counter-clockwise, persisted as `1`.
    Ccw,
}

impl Direction {
    /// Signed value used by the save format.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Cw => -1,
            Self::Ccw => 1,
        }
    }

    /// Parse the signed save-format value. Anything but `±1` is rejected.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Cw),
            1 => Some(Self::Ccw),
            _ => None,
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }
}

impl Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        self.reversed()
    }
}

/// Bit mask of the parallel layers a move affects.
///
/// A raw value of `0` means "the outermost layer" and is normalized to `1`
/// when a move enters a log so that equal moves always compare equal. Any
/// other value, negative ones included, is kept as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceMask(pub i32);

impl SliceMask {
    /// Mask selecting only the outermost layer.
    pub const OUTER: Self = Self(1);

    /// Mask with every bit set.
    pub const ALL: Self = Self(-1);

    /// Get the raw mask value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Replace the `0` shorthand with the explicit outer-layer mask.
    #[must_use]
    pub const fn normalized(self) -> Self {
        if self.0 == 0 { Self::OUTER } else { self }
    }

    /// Whether the mask covers every one of `layers` layers, which makes the
    /// move a whole-puzzle rotation rather than a twist.
    #[must_use]
    pub fn covers_all(self, layers: u32) -> bool {
        (0..layers).all(|layer| layer < i32::BITS && self.0 & (1 << layer) != 0)
    }
}

impl Default for SliceMask {
    fn default() -> Self {
        Self::OUTER
    }
}

/// A reversible move: what to turn, which way, and which layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub id: MoveId,
    pub direction: Direction,
    pub slices: SliceMask,
}

impl Move {
    /// Create a new move.
    #[must_use]
    pub const fn new(id: MoveId, direction: Direction, slices: SliceMask) -> Self {
        Self {
            id,
            direction,
            slices,
        }
    }

    /// The same move turned the other way.
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self
        }
    }

    /// Whether `other` is the exact inverse of this move.
    #[must_use]
    pub fn cancels(&self, other: &Move) -> bool {
        self.id == other.id && self.slices == other.slices && self.direction == -other.direction
    }

    /// Whether this move turns all `layers` layers at once.
    #[must_use]
    pub fn is_rotation(&self, layers: u32) -> bool {
        self.slices.covers_all(layers)
    }

    pub(crate) fn normalized(self) -> Self {
        Self {
            slices: self.slices.normalized(),
            ..self
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.id,
            self.direction.as_i32(),
            self.slices.raw()
        )
    }
}

/// One entry of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    /// A reversible move.
    Move(Move),
    /// A zero-width bookmark.
    Mark(char),
}

impl Entry {
    /// The move carried by this entry, if it is one.
    #[must_use]
    pub const fn as_move(&self) -> Option<&Move> {
        match self {
            Self::Move(mv) => Some(mv),
            Self::Mark(_) => None,
        }
    }

    /// Whether this entry is a mark.
    #[must_use]
    pub const fn is_mark(&self) -> bool {
        matches!(self, Self::Mark(_))
    }

    /// Whether this entry is the mark `id`.
    #[must_use]
    pub fn is_mark_of(&self, id: char) -> bool {
        matches!(self, Self::Mark(mark) if *mark == id)
    }
}

impl From<Move> for Entry {
    fn from(mv: Move) -> Self {
        Self::Move(mv)
    }
}
