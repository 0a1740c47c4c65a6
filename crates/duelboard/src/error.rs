//! Unified error type for Duelboard.

use duelboard_board::BoardError;
use duelboard_protocol::ProtocolError;
use duelboard_room::RoomError;
use duelboard_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DuelboardError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, illegal move).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A board-level error, such as an unknown variant name.
    #[error(transparent)]
    Board(#[from] BoardError),
}
