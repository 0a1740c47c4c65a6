//! Core protocol types for Duelboard's wire format.
//!
//! Every type here crosses the network. Inbound frames are a bare
//! [`ClientMessage`]; outbound frames are an [`Envelope`] around a
//! [`ServerMessage`]. Both enums are internally tagged by `type`, so a
//! frame reads `{"type": "MakeMove", "x": 3, "y": 4}`.

use std::fmt;

use duelboard_board::{BoardVariant, Coord, Symbol};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A room code.
///
/// Either supplied by the client (any string) or generated by the
/// registry. `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Room-facing value types
// ---------------------------------------------------------------------------

/// One occupied seat as the other participants see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Seat index, 0 or 1.
    pub slot: usize,
    pub symbol: Symbol,
    /// Display name as given at join. Not validated, may collide.
    pub name: String,
    /// `true` for a seat driven by a move provider instead of a client.
    #[serde(default)]
    pub computer: bool,
}

/// A single occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone {
    pub x: i32,
    pub y: i32,
    pub symbol: Symbol,
}

impl From<(Coord, Symbol)> for Stone {
    fn from((at, symbol): (Coord, Symbol)) -> Self {
        Self {
            x: at.x,
            y: at.y,
            symbol,
        }
    }
}

/// Full board state: which variant, plus every occupied cell.
///
/// Sent on join and after a reset so a client never has to replay
/// history to draw the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub variant: BoardVariant,
    pub cells: Vec<Stone>,
}

/// Cumulative round wins per symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "X")]
    pub x: u32,
    #[serde(rename = "O")]
    pub o: u32,
}

impl Scores {
    /// Adds one win for `symbol` and returns the new total.
    pub fn increment(&mut self, symbol: Symbol) -> u32 {
        let slot = match symbol {
            Symbol::X => &mut self.x,
            Symbol::O => &mut self.o,
        };
        *slot += 1;
        *slot
    }

    pub fn clear(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::X => self.x = 0,
            Symbol::O => self.o = 0,
        }
    }
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    pub player_count: usize,
    pub variant: BoardVariant,
}

/// Why a room stopped existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CloseReason {
    /// A player reached the room's win target.
    MatchWon { winner: PlayerInfo },
    /// Created but never joined before the idle deadline.
    Expired,
    /// The server is shutting the room down.
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchWon { winner } => write!(f, "match won by {}", winner.name),
            Self::Expired => write!(f, "expired"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Opens a room without joining it. Omitted fields take the
    /// server's defaults; an omitted `room_id` is generated.
    CreateRoom {
        #[serde(default)]
        room_id: Option<RoomId>,
        #[serde(default)]
        variant: Option<BoardVariant>,
        #[serde(default)]
        vs_computer: bool,
        #[serde(default)]
        win_target: Option<u32>,
    },

    /// Takes a seat. Depending on server policy an unknown room is
    /// created on the spot or answered with a 404 `Error`.
    JoinRoom {
        room_id: RoomId,
        player_name: String,
    },

    /// Places the sender's symbol. `room_id` is optional because a
    /// connection is bound to at most one room; when given it must match.
    MakeMove {
        #[serde(default)]
        room_id: Option<RoomId>,
        x: i32,
        y: i32,
    },

    /// Gives up the current seat without closing the connection.
    LeaveRoom,

    /// Asks for the joinable rooms.
    ListRooms,

    /// Keep-alive. Echoed back as `HeartbeatAck`.
    Heartbeat { client_time: u64 },
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Everything the server sends.
///
/// Replies go only to the asking connection; the rest are broadcast to
/// every connection seated in the room, in the order the room accepted
/// the events that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    // -- Replies --
    RoomCreated {
        room_id: RoomId,
    },

    /// The joiner's own seat plus the board as it stands.
    RoomJoined {
        room_id: RoomId,
        slot: usize,
        symbol: Symbol,
        board: BoardSnapshot,
        players: Vec<PlayerInfo>,
    },

    /// Join refused because both seats are taken.
    RoomFull {
        room_id: RoomId,
    },

    RoomList {
        rooms: Vec<RoomListEntry>,
    },

    HeartbeatAck {
        client_time: u64,
        server_time: u64,
    },

    /// `code` follows HTTP conventions: 400 bad request, 404 no such
    /// room, 409 conflict, 503 room unavailable.
    Error {
        code: u16,
        message: String,
    },

    // -- Broadcasts --
    /// Sent to the players already seated when someone new sits down.
    PlayerJoined {
        player: PlayerInfo,
    },

    /// Both seats are filled; a round begins with `turn` to move.
    StartGame {
        players: Vec<PlayerInfo>,
        turn: Symbol,
        round: u32,
    },

    /// `next_turn` is `None` when the move ended the round.
    MoveMade {
        x: i32,
        y: i32,
        symbol: Symbol,
        next_turn: Option<Symbol>,
    },

    /// `winner` is `None` on a draw.
    RoundOver {
        winner: Option<PlayerInfo>,
        scores: Scores,
        round: u32,
    },

    /// The board was cleared for a new round.
    BoardReset {
        board: BoardSnapshot,
        turn: Symbol,
        round: u32,
    },

    PlayerLeft {
        player: PlayerInfo,
    },

    RoomClosed {
        room_id: RoomId,
        reason: CloseReason,
    },
}

impl ServerMessage {
    /// Shorthand for an `Error` frame.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The outer frame of every server message.
///
/// `seq` counts up per connection starting at 1, so a client can spot a
/// gap. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub seq: u64,
    pub timestamp: u64,
    pub payload: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_id_is_plain_string() {
        let id = RoomId::new("r1");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("r1"));
        assert_eq!(id.to_string(), "r1");
    }

    #[test]
    fn test_join_room_json_shape() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "JoinRoom", "room_id": "r1", "player_name": "Alice"}))
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                room_id: "r1".into(),
                player_name: "Alice".into(),
            }
        );
    }

    #[test]
    fn test_create_room_fields_are_optional() {
        let msg: ClientMessage = serde_json::from_value(json!({"type": "CreateRoom"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::CreateRoom {
                room_id: None,
                variant: None,
                vs_computer: false,
                win_target: None,
            }
        );

        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "CreateRoom",
            "room_id": "den",
            "variant": {"kind": "classic"},
            "vs_computer": true
        }))
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::CreateRoom {
                variant: Some(BoardVariant::Classic),
                vs_computer: true,
                ..
            }
        ));
    }

    #[test]
    fn test_make_move_accepts_negative_coordinates() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "MakeMove", "x": -7, "y": 12})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MakeMove {
                room_id: None,
                x: -7,
                y: 12
            }
        );
    }

    #[test]
    fn test_unit_variants_need_only_type() {
        let msg: ClientMessage = serde_json::from_value(json!({"type": "LeaveRoom"})).unwrap();
        assert_eq!(msg, ClientMessage::LeaveRoom);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<ClientMessage, _> = serde_json::from_value(json!({"type": "Teleport"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_move_made_json_shape() {
        let msg = ServerMessage::MoveMade {
            x: 0,
            y: 0,
            symbol: Symbol::X,
            next_turn: Some(Symbol::O),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "MoveMade", "x": 0, "y": 0, "symbol": "X", "next_turn": "O"})
        );
    }

    #[test]
    fn test_round_over_scores_keyed_by_symbol() {
        let msg = ServerMessage::RoundOver {
            winner: None,
            scores: Scores { x: 2, o: 1 },
            round: 3,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["winner"], serde_json::Value::Null);
        assert_eq!(value["scores"], json!({"X": 2, "O": 1}));
    }

    #[test]
    fn test_room_closed_reason_tagged() {
        let msg = ServerMessage::RoomClosed {
            room_id: "r1".into(),
            reason: CloseReason::Expired,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "RoomClosed", "room_id": "r1", "reason": {"kind": "Expired"}})
        );
    }

    #[test]
    fn test_scores_increment_and_clear() {
        let mut scores = Scores::default();
        assert_eq!(scores.increment(Symbol::O), 1);
        assert_eq!(scores.increment(Symbol::O), 2);
        assert_eq!(scores.x, 0);
        scores.clear(Symbol::O);
        assert_eq!(scores, Scores::default());
    }
}
