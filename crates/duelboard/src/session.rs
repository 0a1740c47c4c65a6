//! Per-connection session record.
//!
//! The handler owns one [`Session`] per connection. It remembers the
//! room the connection is seated in so that moves go straight to the
//! room actor without touching the registry's lock.

use duelboard_protocol::RoomId;
use duelboard_room::{RoomHandle, RoomRegistry};
use duelboard_transport::ConnectionId;

/// What the gateway knows about one live connection.
#[derive(Debug)]
pub struct Session {
    conn_id: ConnectionId,
    /// Name given at the last successful join.
    player_name: Option<String>,
    /// Cached handle of the room this connection is seated in.
    room: Option<RoomHandle>,
}

impl Session {
    pub fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id,
            player_name: None,
            room: None,
        }
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Records a successful join.
    pub fn bind(&mut self, room: RoomHandle, player_name: String) {
        self.room = Some(room);
        self.player_name = Some(player_name);
    }

    /// Forgets the cached room, returning it.
    pub fn unbind(&mut self) -> Option<RoomHandle> {
        self.room.take()
    }

    /// Id of the cached room, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        self.room.as_ref().map(RoomHandle::room_id)
    }

    /// The room this connection is seated in.
    ///
    /// Uses the cached handle while its room is alive. Once that room
    /// has closed (a match was won, say) the registry is asked again,
    /// and the answer is cached.
    pub async fn room(&mut self, registry: &RoomRegistry) -> Option<RoomHandle> {
        if let Some(handle) = self.room.as_ref().filter(|h| !h.is_closed()) {
            return Some(handle.clone());
        }
        self.room = registry.binding(self.conn_id).await;
        self.room.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_unseated_session_has_no_room() {
        let registry = RoomRegistry::default();
        let mut session = Session::new(ConnectionId::new(1));
        assert!(session.room(&registry).await.is_none());
        assert!(session.room_id().is_none());
    }

    #[tokio::test]
    async fn test_session_picks_up_registry_binding() {
        let registry = RoomRegistry::default();
        let conn = ConnectionId::new(1);
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .join_room(conn, "r1".into(), "Alice", tx)
            .await
            .unwrap();

        let mut session = Session::new(conn);
        let handle = session.room(&registry).await.unwrap();
        assert_eq!(handle.room_id().as_str(), "r1");
        assert_eq!(session.room_id().map(RoomId::as_str), Some("r1"));
    }

    #[tokio::test]
    async fn test_closed_room_falls_out_of_cache() {
        let registry = RoomRegistry::default();
        let conn = ConnectionId::new(1);
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .join_room(conn, "r1".into(), "Alice", tx)
            .await
            .unwrap();
        let mut session = Session::new(conn);
        let handle = registry.binding(conn).await.unwrap();
        session.bind(handle, "Alice".into());
        assert_eq!(session.player_name(), Some("Alice"));

        registry.close_room(&"r1".into()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(session.room(&registry).await.is_none());
        assert!(session.room_id().is_none());
    }
}
