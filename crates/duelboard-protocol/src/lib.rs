//! Wire protocol for Duelboard.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Envelope`], ...):
//!   the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how they become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Rooms (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardSnapshot, ClientMessage, CloseReason, Envelope, PlayerInfo, RoomId, RoomListEntry,
    Scores, ServerMessage, Stone,
};
