//! The fixed 3x3 tic-tac-toe board.

use crate::{Board, BoardError, BoardVariant, Coord, Symbol};

const SIDE: i32 = 3;

/// A 3x3 board stored as a flat array, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassicBoard {
    cells: [Option<Symbol>; 9],
}

impl ClassicBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(at: Coord) -> Option<usize> {
        if (0..SIDE).contains(&at.x) && (0..SIDE).contains(&at.y) {
            Some((at.x * SIDE + at.y) as usize)
        } else {
            None
        }
    }
}

impl Board for ClassicBoard {
    fn variant(&self) -> BoardVariant {
        BoardVariant::Classic
    }

    fn get(&self, at: Coord) -> Option<Symbol> {
        Self::index(at).and_then(|i| self.cells[i])
    }

    fn in_bounds(&self, at: Coord) -> bool {
        Self::index(at).is_some()
    }

    fn apply_move(&mut self, at: Coord, symbol: Symbol) -> Result<(), BoardError> {
        let i = Self::index(at).ok_or(BoardError::OutOfRange(at))?;
        if self.cells[i].is_some() {
            return Err(BoardError::Occupied(at));
        }
        self.cells[i] = Some(symbol);
        Ok(())
    }

    fn run_length(&self) -> u32 {
        SIDE as u32
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    fn occupied(&self) -> Vec<(Coord, Symbol)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                let i = i as i32;
                cell.map(|s| (Coord::new(i / SIDE, i % SIDE), s))
            })
            .collect()
    }

    fn reset(&mut self) {
        self.cells = [None; 9];
    }
}
