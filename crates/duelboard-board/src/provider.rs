//! Move providers: where a computer seat gets its moves from.
//!
//! A provider is stateless. Everything it needs (the board, its symbol,
//! the last move) is passed in on every call, so one instance can serve
//! every room at once.

use crate::{Board, BoardVariant, Coord, Symbol};

/// Rings searched around the anchor before giving up.
const MAX_RING: i32 = 32;

/// Picks a move for a computer seat.
pub trait MoveProvider: Send + Sync + 'static {
    /// Returns a legal empty cell for `symbol`, or `None` if it finds
    /// nothing to play.
    fn choose(&self, board: &dyn Board, symbol: Symbol, last: Option<Coord>) -> Option<Coord>;
}

/// Plays the empty cell closest to the last move.
///
/// Cells are scanned ring by ring (Chebyshev distance) around the last
/// move, or around the board's centre when no move has been made yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestOpenCell;

impl MoveProvider for NearestOpenCell {
    fn choose(&self, board: &dyn Board, _symbol: Symbol, last: Option<Coord>) -> Option<Coord> {
        let anchor = last.unwrap_or(match board.variant() {
            BoardVariant::Classic => Coord::new(1, 1),
            BoardVariant::Gomoku { .. } => Coord::ORIGIN,
        });

        for ring in 0..=MAX_RING {
            for dx in -ring..=ring {
                for dy in -ring..=ring {
                    if dx.abs().max(dy.abs()) != ring {
                        continue;
                    }
                    let Some(at) = anchor.step(dx, dy, 1) else {
                        continue;
                    };
                    if board.in_bounds(at) && board.get(at).is_none() {
                        return Some(at);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassicBoard, FreeBoard};

    #[test]
    fn test_opens_in_the_centre() {
        let board = ClassicBoard::new();
        assert_eq!(NearestOpenCell.choose(&board, Symbol::O, None), Some(Coord::new(1, 1)));
    }

    #[test]
    fn test_stays_next_to_last_move() {
        let mut board = FreeBoard::default();
        board.apply_move(Coord::new(40, -3), Symbol::X).unwrap();
        let pick = NearestOpenCell
            .choose(&board, Symbol::O, Some(Coord::new(40, -3)))
            .unwrap();
        assert!((pick.x - 40).abs() <= 1 && (pick.y + 3).abs() <= 1);
        assert_ne!(pick, Coord::new(40, -3));
    }

    #[test]
    fn test_never_picks_occupied_or_out_of_range() {
        let mut board = ClassicBoard::new();
        let mut symbol = Symbol::X;
        let mut last = None;
        for _ in 0..9 {
            let at = NearestOpenCell.choose(&board, symbol, last).expect("a cell is free");
            board.apply_move(at, symbol).expect("provider must pick a legal cell");
            last = Some(at);
            symbol = symbol.other();
        }
        assert!(board.is_full());
        assert_eq!(NearestOpenCell.choose(&board, symbol, last), None);
    }
}
