//! Room registry and turn coordination for Duelboard.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! board, seats, scores, and round timer. The registry maps room ids and
//! connections to those actors.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, seats and unseats connections
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`RoomConfig`] / [`RegistryConfig`]: room and registry settings

mod config;
mod error;
mod registry;
mod room;

pub use config::{RegistryConfig, RoomConfig, RoomState};
pub use error::{MoveRejection, RoomError};
pub use registry::{ROOM_CODE_LEN, RoomRegistry};
pub use room::{JoinAck, MoveRecord, PlayerSender, RoomHandle, RoomInfo};
