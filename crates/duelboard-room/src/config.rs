//! Room configuration and state machine.

use std::time::Duration;

use duelboard_board::BoardVariant;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings fixed when a room is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Which board the room plays on.
    pub variant: BoardVariant,

    /// Pause between a finished round and the cleared board.
    pub reset_delay: Duration,

    /// Round wins that end the match and close the room. `None` plays
    /// rounds forever.
    pub win_target: Option<u32>,

    /// Seat a computer opponent in slot 1 at creation.
    pub vs_computer: bool,

    /// A room nobody has joined closes after this long. `None` keeps it
    /// open until someone joins and leaves.
    pub empty_room_ttl: Option<Duration>,

    /// Capacity of the actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            variant: BoardVariant::default(),
            reset_delay: Duration::from_secs(2),
            win_target: None,
            vs_computer: false,
            empty_room_ttl: Some(Duration::from_secs(60)),
            channel_size: 64,
        }
    }
}

/// Registry-wide policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Whether `join_room` on an unknown id creates the room instead of
    /// failing with `NotFound`.
    pub create_on_join: bool,

    /// Settings for rooms created without explicit ones.
    pub room: RoomConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            create_on_join: true,
            room: RoomConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// WaitingForPlayer → Active ⇄ RoundOver
///        ↑             │         │
///        └──── a player leaves ──┘
/// any state → Closed
/// ```
///
/// - **WaitingForPlayer**: fewer than two seats filled. No moves.
/// - **Active**: both seats filled, a round is in play.
/// - **RoundOver**: the round ended; a reset is pending.
/// - **Closed**: terminal. The room is leaving the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForPlayer,
    Active,
    RoundOver,
    Closed,
}

impl RoomState {
    /// Returns `true` if the room has a free seat to offer.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayer)
    }

    /// Returns `true` if moves may be played.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoomState::*;
        match (self, target) {
            (Closed, _) => false,
            (_, Closed) => true,
            (WaitingForPlayer, Active) => true,
            (Active, RoundOver) | (Active, WaitingForPlayer) => true,
            (RoundOver, Active) | (RoundOver, WaitingForPlayer) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayer => write!(f, "WaitingForPlayer"),
            Self::Active => write!(f, "Active"),
            Self::RoundOver => write!(f, "RoundOver"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_transitions() {
        use RoomState::*;
        assert!(WaitingForPlayer.can_transition_to(Active));
        assert!(Active.can_transition_to(RoundOver));
        assert!(RoundOver.can_transition_to(Active));
        assert!(RoundOver.can_transition_to(WaitingForPlayer));
        assert!(Active.can_transition_to(Closed));

        assert!(!WaitingForPlayer.can_transition_to(RoundOver));
        assert!(!Closed.can_transition_to(Active));
        assert!(!Closed.can_transition_to(Closed));
    }

    #[test]
    fn test_room_state_is_joinable() {
        assert!(RoomState::WaitingForPlayer.is_joinable());
        assert!(!RoomState::Active.is_joinable());
        assert!(!RoomState::RoundOver.is_joinable());
        assert!(!RoomState::Closed.is_joinable());
    }

    #[test]
    fn test_only_active_accepts_moves() {
        assert!(RoomState::Active.accepts_moves());
        assert!(!RoomState::WaitingForPlayer.accepts_moves());
        assert!(!RoomState::RoundOver.accepts_moves());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::WaitingForPlayer.to_string(), "WaitingForPlayer");
        assert_eq!(RoomState::RoundOver.to_string(), "RoundOver");
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(config.create_on_join);
        assert_eq!(config.room.reset_delay, Duration::from_secs(2));
        assert_eq!(config.room.variant, BoardVariant::Gomoku { run_length: 5 });
        assert_eq!(config.room.win_target, None);
        assert!(!config.room.vs_computer);
    }
}
