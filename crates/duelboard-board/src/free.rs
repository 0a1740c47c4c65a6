//! The sparse, unbounded board used for five-in-a-row.
//!
//! Only occupied cells are stored, so the board "grows" in any
//! direction, negative coordinates included, without ever reallocating
//! a grid. There is no draw: an unbounded board is never full.

use std::collections::HashMap;

use crate::{Board, BoardError, BoardVariant, Coord, Symbol};

/// Default line length for gomoku.
pub const DEFAULT_RUN_LENGTH: u32 = 5;

/// Shortest line a gomoku room may be configured with.
pub const MIN_RUN_LENGTH: u32 = 3;

/// Longest line a gomoku room may be configured with.
pub const MAX_RUN_LENGTH: u32 = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBoard {
    cells: HashMap<Coord, Symbol>,
    run_length: u32,
}

impl FreeBoard {
    /// Creates an empty board. A `run_length` of 0 is treated as 1.
    ///
    /// Any length is accepted here; rooms go through
    /// [`BoardVariant::validate`] first.
    pub fn new(run_length: u32) -> Self {
        Self {
            cells: HashMap::new(),
            run_length: run_length.max(1),
        }
    }
}

impl Default for FreeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_LENGTH)
    }
}

impl Board for FreeBoard {
    fn variant(&self) -> BoardVariant {
        BoardVariant::Gomoku {
            run_length: self.run_length,
        }
    }

    fn get(&self, at: Coord) -> Option<Symbol> {
        self.cells.get(&at).copied()
    }

    fn in_bounds(&self, _at: Coord) -> bool {
        true
    }

    fn apply_move(&mut self, at: Coord, symbol: Symbol) -> Result<(), BoardError> {
        match self.cells.entry(at) {
            std::collections::hash_map::Entry::Occupied(_) => Err(BoardError::Occupied(at)),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(symbol);
                Ok(())
            }
        }
    }

    fn run_length(&self) -> u32 {
        self.run_length
    }

    fn is_full(&self) -> bool {
        false
    }

    fn stones(&self) -> usize {
        self.cells.len()
    }

    fn occupied(&self) -> Vec<(Coord, Symbol)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(c, s)| (*c, *s)).collect();
        cells.sort_unstable_by_key(|(c, _)| *c);
        cells
    }

    fn reset(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;

    fn place_all(board: &mut FreeBoard, cells: &[(i32, i32)], symbol: Symbol) {
        for &(x, y) in cells {
            board.apply_move(Coord::new(x, y), symbol).unwrap();
        }
    }

    #[test]
    fn test_five_in_a_row_on_each_axis() {
        let axes: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];
        for (dx, dy) in axes {
            let mut b = FreeBoard::default();
            let line: Vec<_> = (0..4).map(|i| (10 + dx * i, -7 + dy * i)).collect();
            place_all(&mut b, &line, Symbol::X);
            let last = Coord::new(10 + dx * 4, -7 + dy * 4);
            b.apply_move(last, Symbol::X).unwrap();
            assert_eq!(b.evaluate(last, Symbol::X), Outcome::Win(Symbol::X), "axis ({dx}, {dy})");
        }
    }

    #[test]
    fn test_four_is_not_enough() {
        let mut b = FreeBoard::default();
        place_all(&mut b, &[(0, 0), (1, 0), (2, 0)], Symbol::O);
        b.apply_move(Coord::new(3, 0), Symbol::O).unwrap();
        assert_eq!(b.evaluate(Coord::new(3, 0), Symbol::O), Outcome::Ongoing);
    }

    #[test]
    fn test_gap_breaks_the_run() {
        // X X _ X X X : six cells wide but never five contiguous
        let mut b = FreeBoard::default();
        place_all(&mut b, &[(0, 0), (1, 0), (3, 0), (4, 0)], Symbol::X);
        b.apply_move(Coord::new(5, 0), Symbol::X).unwrap();
        assert_eq!(b.evaluate(Coord::new(5, 0), Symbol::X), Outcome::Ongoing);
    }

    #[test]
    fn test_opponent_stone_breaks_the_run() {
        let mut b = FreeBoard::default();
        place_all(&mut b, &[(0, 0), (0, 1), (0, 3), (0, 4)], Symbol::X);
        b.apply_move(Coord::new(0, 2), Symbol::O).unwrap();
        assert_eq!(b.evaluate(Coord::new(0, 2), Symbol::O), Outcome::Ongoing);
    }

    #[test]
    fn test_filling_the_middle_completes_a_line() {
        let mut b = FreeBoard::default();
        place_all(&mut b, &[(-2, -2), (-1, -1), (1, 1), (2, 2)], Symbol::O);
        b.apply_move(Coord::ORIGIN, Symbol::O).unwrap();
        assert_eq!(b.evaluate(Coord::ORIGIN, Symbol::O), Outcome::Win(Symbol::O));
    }

    #[test]
    fn test_overline_counts_as_win() {
        let mut b = FreeBoard::default();
        place_all(&mut b, &[(0, 0), (0, 1), (0, 2), (0, 4), (0, 5)], Symbol::X);
        b.apply_move(Coord::new(0, 3), Symbol::X).unwrap();
        assert_eq!(b.evaluate(Coord::new(0, 3), Symbol::X), Outcome::Win(Symbol::X));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let mut b = FreeBoard::default();
        let corner = Coord::new(i32::MAX, i32::MIN);
        b.apply_move(corner, Symbol::X).unwrap();
        assert_eq!(b.evaluate(corner, Symbol::X), Outcome::Ongoing);

        place_all(
            &mut b,
            &[(i32::MAX - 1, 0), (i32::MAX - 2, 0), (i32::MAX - 3, 0), (i32::MAX - 4, 0)],
            Symbol::O,
        );
        b.apply_move(Coord::new(i32::MAX, 0), Symbol::O).unwrap();
        assert_eq!(b.evaluate(Coord::new(i32::MAX, 0), Symbol::O), Outcome::Win(Symbol::O));
    }

    #[test]
    fn test_never_full_never_draw() {
        let mut b = FreeBoard::new(5);
        for i in 0..50 {
            let s = if i % 2 == 0 { Symbol::X } else { Symbol::O };
            b.apply_move(Coord::new(i * 3, i * 7), s).unwrap();
        }
        assert!(!b.is_full());
        assert_eq!(b.evaluate(Coord::new(0, 0), Symbol::X), Outcome::Ongoing);
    }

    #[test]
    fn test_occupied_rejected_and_kept() {
        let mut b = FreeBoard::default();
        b.apply_move(Coord::new(-4, 9), Symbol::X).unwrap();
        assert_eq!(
            b.apply_move(Coord::new(-4, 9), Symbol::O),
            Err(BoardError::Occupied(Coord::new(-4, 9)))
        );
        assert_eq!(b.get(Coord::new(-4, 9)), Some(Symbol::X));
        assert_eq!(b.stones(), 1);
    }

    #[test]
    fn test_custom_run_length() {
        let mut b = FreeBoard::new(3);
        place_all(&mut b, &[(5, 5), (6, 6)], Symbol::X);
        b.apply_move(Coord::new(7, 7), Symbol::X).unwrap();
        assert_eq!(b.evaluate(Coord::new(7, 7), Symbol::X), Outcome::Win(Symbol::X));
        assert_eq!(FreeBoard::new(0).run_length(), 1);
    }

    #[test]
    fn test_huge_run_length_is_never_reached() {
        let mut b = FreeBoard::new(u32::MAX);
        place_all(&mut b, &[(0, 0), (1, 0), (2, 0), (3, 0)], Symbol::X);
        b.apply_move(Coord::new(4, 0), Symbol::X).unwrap();
        assert_eq!(b.evaluate(Coord::new(4, 0), Symbol::X), Outcome::Ongoing);
    }
}
