//! # Duelboard
//!
//! A realtime server for two-player board games: five-in-a-row on an
//! unbounded grid, and classic 3x3 tic-tac-toe.
//!
//! Clients connect over WebSocket, open or join rooms by code, and send
//! moves. Each room is its own Tokio task that enforces turn order,
//! judges every move, keeps score, and clears the board a moment after
//! each round.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duelboard::prelude::*;
//!
//! # async fn run() -> Result<(), DuelboardError> {
//! let server = DuelboardServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod session;

pub use config::ServerConfig;
pub use error::DuelboardError;
pub use server::{DuelboardServer, DuelboardServerBuilder};
pub use session::Session;

pub use duelboard_board as board;
pub use duelboard_protocol as protocol;
pub use duelboard_room as room;
pub use duelboard_transport as transport;

/// The types most servers need.
pub mod prelude {
    pub use crate::{DuelboardError, DuelboardServer, DuelboardServerBuilder, ServerConfig};
    pub use duelboard_board::{BoardVariant, Coord, MoveProvider, NearestOpenCell, Symbol};
    pub use duelboard_protocol::{
        BoardSnapshot, ClientMessage, CloseReason, Envelope, PlayerInfo, RoomId, Scores,
        ServerMessage,
    };
    pub use duelboard_room::{RegistryConfig, RoomConfig, RoomError, RoomRegistry};
}
