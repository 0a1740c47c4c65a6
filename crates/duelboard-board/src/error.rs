//! Error types for the board engine.

use crate::Coord;

/// Why a move or a board request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The target cell already holds a symbol.
    #[error("cell {0} is already occupied")]
    Occupied(Coord),

    /// The coordinate lies outside the variant's legal domain.
    #[error("cell {0} is out of range")]
    OutOfRange(Coord),

    /// A variant name that no board implements.
    #[error("unknown board variant: {0}")]
    UnknownVariant(String),

    /// A gomoku line length outside the supported range.
    #[error("run length {0} is out of range")]
    InvalidRunLength(u32),
}
