//! The `Board` capability trait shared by both variants.
//!
//! The two boards differ in storage and in what "legal" and "full" mean,
//! but line detection is identical: walk outward from the cell that was
//! just played. That walk lives here as the default `evaluate`.

use std::fmt;

use crate::{BoardError, BoardVariant, Coord, Outcome, Symbol};

/// The four axis pairs checked for a line: horizontal, vertical, and
/// both diagonals. Each is walked in both directions.
const AXES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A game board.
///
/// Implemented by [`ClassicBoard`](crate::ClassicBoard) (fixed 3x3) and
/// [`FreeBoard`](crate::FreeBoard) (sparse, unbounded). Rooms hold one as
/// `Box<dyn Board>` and never care which.
pub trait Board: Send + Sync + fmt::Debug {
    /// Which variant this board implements.
    fn variant(&self) -> BoardVariant;

    /// The symbol at `at`, or `None` when empty or off the board.
    fn get(&self, at: Coord) -> Option<Symbol>;

    /// Whether `at` is inside the variant's legal domain.
    fn in_bounds(&self, at: Coord) -> bool;

    /// Places `symbol` at `at`.
    ///
    /// # Errors
    /// [`BoardError::OutOfRange`] outside the legal domain,
    /// [`BoardError::Occupied`] if the cell already holds a symbol.
    /// A rejected move leaves the board untouched.
    fn apply_move(&mut self, at: Coord, symbol: Symbol) -> Result<(), BoardError>;

    /// Contiguous same-symbol cells needed to win.
    fn run_length(&self) -> u32;

    /// `true` when no legal empty cell remains. Always `false` on an
    /// unbounded board.
    fn is_full(&self) -> bool;

    /// Number of occupied cells.
    fn stones(&self) -> usize;

    /// Every occupied cell, ordered by coordinate.
    fn occupied(&self) -> Vec<(Coord, Symbol)>;

    /// Clears every cell. The only way an occupied cell ever empties.
    fn reset(&mut self);

    /// Judges the board after `symbol` was played at `last`.
    ///
    /// Only the lines through `last` are inspected, so the cost is
    /// O(run length) regardless of how large the board has grown.
    fn evaluate(&self, last: Coord, symbol: Symbol) -> Outcome {
        if self.get(last) != Some(symbol) {
            return Outcome::Ongoing;
        }
        let needed = self.run_length().max(1);
        for (dx, dy) in AXES {
            let run = 1 + contiguous(self, last, dx, dy, symbol, needed)
                + contiguous(self, last, -dx, -dy, symbol, needed);
            if run >= needed {
                return Outcome::Win(symbol);
            }
        }
        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }
}

/// Counts cells matching `symbol` starting one step from `from` in
/// direction `(dx, dy)`, stopping at the first gap. Never walks further
/// than `needed - 1` steps.
fn contiguous<B: Board + ?Sized>(
    board: &B,
    from: Coord,
    dx: i32,
    dy: i32,
    symbol: Symbol,
    needed: u32,
) -> u32 {
    let limit = i32::try_from(needed).unwrap_or(i32::MAX);
    let mut count = 0;
    for steps in 1..limit {
        match from.step(dx, dy, steps) {
            Some(at) if board.get(at) == Some(symbol) => count += 1,
            _ => break,
        }
    }
    count
}
