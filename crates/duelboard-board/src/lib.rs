//! Board engine for Duelboard.
//!
//! Pure game rules, no I/O and no async:
//!
//! - [`Board`]: the capability trait every variant implements
//! - [`ClassicBoard`]: 3x3 tic-tac-toe, can draw
//! - [`FreeBoard`]: sparse unbounded grid for five-in-a-row, never draws
//! - [`BoardVariant`]: picks and builds a board at runtime
//! - [`MoveProvider`]: stateless move source for computer seats
//!
//! Win detection only looks at lines through the cell just played, so
//! a move costs O(run length) no matter how big the board grows.

mod board;
mod classic;
mod error;
mod free;
mod provider;
mod types;
mod variant;

pub use board::Board;
pub use classic::ClassicBoard;
pub use error::BoardError;
pub use free::{DEFAULT_RUN_LENGTH, FreeBoard, MAX_RUN_LENGTH, MIN_RUN_LENGTH};
pub use provider::{MoveProvider, NearestOpenCell};
pub use types::{Coord, Outcome, Symbol};
pub use variant::BoardVariant;
