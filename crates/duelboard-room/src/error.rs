//! Error types for the room layer.

use duelboard_board::{BoardError, Symbol};
use duelboard_protocol::RoomId;

use crate::RoomState;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// A live room already uses this id.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The connection already holds a seat, in the named room.
    #[error("connection already seated in room {0}")]
    AlreadyBound(RoomId),

    /// The connection holds no seat.
    #[error("connection is not seated in any room")]
    NotBound,

    /// The move was refused. Nothing changed and nothing was broadcast.
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveRejection),

    /// The room's actor has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

/// Why a move was refused.
#[derive(Debug, thiserror::Error)]
pub enum MoveRejection {
    #[error("room is {0}, not accepting moves")]
    NotActive(RoomState),

    #[error("it is {expected}'s turn")]
    WrongTurn { expected: Symbol },

    #[error(transparent)]
    Board(#[from] BoardError),
}
