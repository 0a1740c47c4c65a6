//! Value types shared by every board variant.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// The mark a player places.
///
/// Seat 0 plays X, seat 1 plays O. X always opens a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The symbol that moves first in every round.
    pub const FIRST: Symbol = Symbol::X;

    /// Returns the opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// The seat index that plays this symbol.
    pub fn seat(self) -> usize {
        match self {
            Self::X => 0,
            Self::O => 1,
        }
    }

    /// The symbol played from a seat index. `None` past the second seat.
    pub fn from_seat(seat: usize) -> Option<Self> {
        match seat {
            0 => Some(Self::X),
            1 => Some(Self::O),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A cell address.
///
/// On the 3x3 board `x` is the row and `y` the column, both `0..3`.
/// The sparse board accepts any pair, negatives included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Moves `steps` times along `(dx, dy)`.
    ///
    /// Returns `None` instead of wrapping when the result leaves the
    /// `i32` domain.
    pub fn step(self, dx: i32, dy: i32, steps: i32) -> Option<Coord> {
        let x = self.x.checked_add(dx.checked_mul(steps)?)?;
        let y = self.y.checked_add(dy.checked_mul(steps)?)?;
        Some(Coord { x, y })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of evaluating a board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The round continues.
    Ongoing,
    /// The given symbol completed a line.
    Win(Symbol),
    /// No cells left and no line. Only bounded boards can draw.
    Draw,
}

impl Outcome {
    /// `true` for `Win` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}
