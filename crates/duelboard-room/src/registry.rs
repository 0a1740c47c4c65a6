//! Room registry: creates rooms, seats connections, and tracks which
//! connection sits in which room.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use duelboard_board::{Coord, MoveProvider, NearestOpenCell};
use duelboard_protocol::{RoomId, RoomListEntry};
use duelboard_transport::ConnectionId;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::room::spawn_room;
use crate::{JoinAck, PlayerSender, RegistryConfig, RoomConfig, RoomError, RoomHandle};

/// Length of generated room codes.
pub const ROOM_CODE_LEN: usize = 6;

/// No 0/O or 1/I, so codes survive being read aloud.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A join races a room that is closing at most once: the second lookup
/// sees the closed handle and treats the id as free.
const JOIN_ATTEMPTS: usize = 2;

/// State shared between the registry handle and the room actors.
pub(crate) struct Shared {
    tables: Mutex<Tables>,
    config: RegistryConfig,
    provider: Arc<dyn MoveProvider>,
    next_epoch: AtomicU64,
}

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, RoomHandle>,
    /// A connection holds at most one seat at a time.
    bindings: HashMap<ConnectionId, RoomHandle>,
}

impl Tables {
    /// The registered room for `id`, pruning it if its actor stopped.
    fn live_room(&mut self, id: &RoomId) -> Option<RoomHandle> {
        let handle = self.rooms.get(id)?;
        if handle.is_closed() {
            self.rooms.remove(id);
            return None;
        }
        Some(handle.clone())
    }

    /// The room `conn` is seated in, pruning a binding to a room that
    /// is gone or was replaced.
    fn live_binding(&mut self, conn: ConnectionId) -> Option<RoomHandle> {
        let bound = self.bindings.get(&conn)?.clone();
        match self.live_room(bound.room_id()) {
            Some(current) if current.epoch() == bound.epoch() => Some(bound),
            _ => {
                self.bindings.remove(&conn);
                None
            }
        }
    }
}

/// Owns every live room.
///
/// Cloning is cheap and every clone sees the same rooms. The internal
/// lock guards only the id and binding maps and is never held while
/// waiting on a room, so rooms run fully in parallel.
#[derive(Clone)]
pub struct RoomRegistry {
    shared: Arc<Shared>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl RoomRegistry {
    /// Creates an empty registry. Computer seats use [`NearestOpenCell`].
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_provider(config, Arc::new(NearestOpenCell))
    }

    /// Creates an empty registry whose computer seats ask `provider`.
    pub fn with_provider(config: RegistryConfig, provider: Arc<dyn MoveProvider>) -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: Mutex::new(Tables::default()),
                config,
                provider,
                next_epoch: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.shared.config
    }

    /// Opens a room without seating anyone.
    ///
    /// With no `id` a fresh code is generated. `config` falls back to the
    /// registry's default room settings.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] if `id` names a live room.
    pub async fn create_room(
        &self,
        id: Option<RoomId>,
        config: Option<RoomConfig>,
    ) -> Result<RoomId, RoomError> {
        let config = config.unwrap_or_else(|| self.shared.config.room.clone());
        let mut tables = self.shared.tables.lock().await;

        let room_id = match id {
            Some(id) => {
                if tables.live_room(&id).is_some() {
                    return Err(RoomError::AlreadyExists(id));
                }
                id
            }
            None => loop {
                let candidate = generate_code();
                if tables.live_room(&candidate).is_none() {
                    break candidate;
                }
            },
        };

        self.spawn_locked(&mut tables, room_id.clone(), config);
        Ok(room_id)
    }

    /// Seats `conn` in room `room_id` under the display name `name`.
    ///
    /// An unknown id creates the room with default settings when
    /// `create_on_join` is on. Room messages for this connection go to
    /// `sender`, starting with `RoomJoined`.
    ///
    /// # Errors
    /// [`RoomError::AlreadyBound`] if `conn` is seated anywhere,
    /// [`RoomError::RoomFull`] if both seats are taken,
    /// [`RoomError::NotFound`] for an unknown id with `create_on_join` off.
    pub async fn join_room(
        &self,
        conn: ConnectionId,
        room_id: RoomId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        let name = name.into();

        for _ in 0..JOIN_ATTEMPTS {
            let handle = {
                let mut tables = self.shared.tables.lock().await;
                if let Some(bound) = tables.live_binding(conn) {
                    return Err(RoomError::AlreadyBound(bound.room_id().clone()));
                }
                match tables.live_room(&room_id) {
                    Some(handle) => handle,
                    None if self.shared.config.create_on_join => {
                        let config = self.shared.config.room.clone();
                        self.spawn_locked(&mut tables, room_id.clone(), config)
                    }
                    None => return Err(RoomError::NotFound(room_id)),
                }
            };

            match handle.join(conn, name.clone(), sender.clone()).await {
                Ok(ack) => {
                    let mut tables = self.shared.tables.lock().await;
                    if tables
                        .live_room(&room_id)
                        .is_some_and(|h| h.epoch() == handle.epoch())
                    {
                        tables.bindings.insert(conn, handle);
                    }
                    return Ok(ack);
                }
                Err(RoomError::Unavailable(_)) => {
                    debug!(%room_id, %conn, "room closed during join, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(RoomError::Unavailable(room_id))
    }

    /// Frees the seat `conn` holds and returns the room it was in.
    ///
    /// # Errors
    /// [`RoomError::NotBound`] if `conn` holds no seat.
    pub async fn leave_room(&self, conn: ConnectionId) -> Result<RoomId, RoomError> {
        let handle = {
            let mut tables = self.shared.tables.lock().await;
            let handle = tables.live_binding(conn).ok_or(RoomError::NotBound)?;
            tables.bindings.remove(&conn);
            handle
        };

        match handle.leave(conn).await {
            // A room that closed on its own already freed the seat.
            Ok(()) | Err(RoomError::Unavailable(_)) | Err(RoomError::NotBound) => {
                Ok(handle.room_id().clone())
            }
            Err(err) => Err(err),
        }
    }

    /// Drops whatever seat `conn` holds. Unknown or unseated connections
    /// are a no-op, so calling this twice is harmless.
    pub async fn remove_connection(&self, conn: ConnectionId) {
        match self.leave_room(conn).await {
            Ok(room_id) => debug!(%room_id, %conn, "connection removed from room"),
            Err(RoomError::NotBound) => {}
            Err(err) => warn!(%conn, %err, "failed to remove connection"),
        }
    }

    /// Plays a move for `conn` in whatever room it is seated in.
    pub async fn submit_move(&self, conn: ConnectionId, at: Coord) -> Result<(), RoomError> {
        let handle = self.binding(conn).await.ok_or(RoomError::NotBound)?;
        handle.submit_move(conn, at).await
    }

    /// Closes a room, telling its players why.
    pub async fn close_room(&self, id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .room(id)
            .await
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        handle.shutdown().await
    }

    /// Handle to a live room.
    pub async fn room(&self, id: &RoomId) -> Option<RoomHandle> {
        self.shared.tables.lock().await.live_room(id)
    }

    /// Handle to the room `conn` is seated in.
    pub async fn binding(&self, conn: ConnectionId) -> Option<RoomHandle> {
        self.shared.tables.lock().await.live_binding(conn)
    }

    /// Rooms with a free seat, ordered by id.
    pub async fn list_rooms(&self) -> Vec<RoomListEntry> {
        let handles: Vec<RoomHandle> = {
            let tables = self.shared.tables.lock().await;
            tables.rooms.values().cloned().collect()
        };

        let mut entries = Vec::new();
        for handle in handles {
            let Ok(info) = handle.info().await else {
                continue;
            };
            if info.state.is_joinable() {
                entries.push(RoomListEntry {
                    room_id: info.room_id,
                    player_count: info.player_count,
                    variant: info.variant,
                });
            }
        }
        entries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        entries
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        let tables = self.shared.tables.lock().await;
        tables.rooms.values().filter(|h| !h.is_closed()).count()
    }

    fn spawn_locked(&self, tables: &mut Tables, room_id: RoomId, config: RoomConfig) -> RoomHandle {
        let epoch = self.shared.next_epoch.fetch_add(1, Ordering::Relaxed);
        let handle = spawn_room(
            room_id.clone(),
            epoch,
            config,
            Arc::clone(&self.shared.provider),
            Arc::downgrade(&self.shared),
        );
        tables.rooms.insert(room_id.clone(), handle.clone());
        info!(%room_id, epoch, "room created");
        handle
    }
}

/// Removes a closed room and every binding into it.
///
/// Matches on `epoch`, so a room that closes late never unregisters a
/// newer room that reused its id.
pub(crate) async fn deregister(shared: &Weak<Shared>, room_id: &RoomId, epoch: u64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut tables = shared.tables.lock().await;
    if tables.rooms.get(room_id).is_some_and(|h| h.epoch() == epoch) {
        tables.rooms.remove(room_id);
        info!(%room_id, epoch, "room removed");
    }
    tables.bindings.retain(|_, h| h.epoch() != epoch);
}

fn generate_code() -> RoomId {
    let mut rng = rand::rng();
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomId::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_use_alphabet() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
            assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn test_generated_ids_unique_within_live_set() {
        let registry = RoomRegistry::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let id = registry.create_room(None, None).await.unwrap();
            assert!(seen.insert(id));
        }
        assert_eq!(registry.room_count().await, 50);
    }

    #[tokio::test]
    async fn test_stale_binding_is_pruned() {
        let registry = RoomRegistry::default();
        let conn = ConnectionId::new(7);
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        registry.join_room(conn, "r1".into(), "Alice", tx).await.unwrap();
        assert!(registry.binding(conn).await.is_some());

        registry.close_room(&"r1".into()).await.unwrap();
        // The actor deregisters asynchronously; once its channel is
        // closed the binding must read as gone either way.
        for _ in 0..10 {
            if registry.binding(conn).await.is_none() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("binding survived room close");
    }
}
