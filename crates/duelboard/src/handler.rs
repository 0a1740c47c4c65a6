//! Per-connection handler: decode client messages and route them.
//!
//! Each accepted connection gets two tasks:
//!   1. the reader (this handler) decodes `ClientMessage`s and calls into
//!      the registry or the session's cached room
//!   2. the writer drains the connection's outbound channel, wrapping
//!      each message in an `Envelope` with the next sequence number
//!
//! Room actors push into the same outbound channel, so direct replies
//! and room broadcasts reach the client as one ordered stream.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use duelboard_board::Coord;
use duelboard_protocol::{ClientMessage, Codec, Envelope, ProtocolError, ServerMessage};
use duelboard_room::{PlayerSender, RoomError, RoomRegistry};
use duelboard_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::DuelboardError;
use crate::server::ServerState;
use crate::session::Session;

/// Drop guard that frees the connection's seat when the handler exits.
///
/// Runs even if the handler panics. `Drop` is synchronous, so the
/// registry call goes on a fire-and-forget task.
struct ConnectionGuard {
    conn_id: ConnectionId,
    registry: RoomRegistry,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            registry.remove_connection(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DuelboardError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_writer(Arc::clone(&conn), Arc::clone(&state), rx));

    let _guard = ConnectionGuard {
        conn_id,
        registry: state.registry.clone(),
    };
    let mut session = Session::new(conn_id);

    loop {
        let received = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::info!(%conn_id, "connection timed out");
                    break;
                }
            },
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "dropping malformed frame");
                reply(&tx, ServerMessage::error(400, e.to_string()));
                continue;
            }
        };

        dispatch(&state, &mut session, &tx, msg).await;
    }

    let _ = conn.close().await;
    // Dropping _guard frees the seat; the writer ends once the room
    // lets go of its sender.
    Ok(())
}

/// Routes one decoded client message.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    session: &mut Session,
    tx: &PlayerSender,
    msg: ClientMessage,
) {
    let conn_id = session.conn_id();

    match msg {
        ClientMessage::CreateRoom {
            room_id,
            variant,
            vs_computer,
            win_target,
        } => {
            let mut config = state.registry.config().room.clone();
            if let Some(variant) = variant {
                match variant.validate() {
                    Ok(variant) => config.variant = variant,
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "rejecting room variant");
                        reply(tx, ServerMessage::error(400, e.to_string()));
                        return;
                    }
                }
            }
            config.vs_computer = vs_computer;
            config.win_target = win_target.or(config.win_target);

            match state.registry.create_room(room_id, Some(config)).await {
                Ok(room_id) => {
                    tracing::info!(%conn_id, %room_id, "room created");
                    reply(tx, ServerMessage::RoomCreated { room_id });
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "create room failed");
                    reply(tx, error_message(&e));
                }
            }
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            let result = state
                .registry
                .join_room(conn_id, room_id.clone(), player_name.clone(), tx.clone())
                .await;
            match result {
                // The room already pushed RoomJoined down `tx`.
                Ok(_) => {
                    if let Some(handle) = state.registry.binding(conn_id).await {
                        session.bind(handle, player_name);
                    }
                }
                Err(e) => {
                    tracing::debug!(%conn_id, %room_id, error = %e, "join failed");
                    reply(tx, error_message(&e));
                }
            }
        }

        ClientMessage::MakeMove { room_id, x, y } => {
            let Some(handle) = session.room(&state.registry).await else {
                tracing::debug!(%conn_id, "move from unseated connection");
                return;
            };
            if let Some(named) = room_id.filter(|id| id != handle.room_id()) {
                let err = ProtocolError::InvalidMessage(format!(
                    "move names room {named} but connection is seated in {}",
                    handle.room_id()
                ));
                tracing::debug!(%conn_id, error = %err, "move for another room");
                reply(tx, ServerMessage::error(400, err.to_string()));
                return;
            }
            // Rejected moves change nothing and are not answered.
            if let Err(e) = handle.submit_move(conn_id, Coord::new(x, y)).await {
                tracing::debug!(%conn_id, room_id = %handle.room_id(), error = %e, "move rejected");
                if matches!(e, RoomError::Unavailable(_)) {
                    session.unbind();
                }
            }
        }

        ClientMessage::LeaveRoom => {
            session.unbind();
            match state.registry.leave_room(conn_id).await {
                Ok(room_id) => tracing::info!(%conn_id, %room_id, "left room"),
                Err(e) => tracing::debug!(%conn_id, error = %e, "leave failed"),
            }
        }

        ClientMessage::ListRooms => {
            let rooms = state.registry.list_rooms().await;
            reply(tx, ServerMessage::RoomList { rooms });
        }

        ClientMessage::Heartbeat { client_time } => {
            reply(
                tx,
                ServerMessage::HeartbeatAck {
                    client_time,
                    server_time: now_millis(),
                },
            );
        }
    }
}

/// Drains the outbound channel onto the socket until either side is gone.
async fn run_writer<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let conn_id = conn.id();
    let mut seq: u64 = 1;

    while let Some(payload) = rx.recv().await {
        let envelope = Envelope {
            seq: next_seq(&mut seq),
            timestamp: now_millis(),
            payload,
        };
        let bytes = match state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}

/// The reply a client gets when a room request fails.
fn error_message(err: &RoomError) -> ServerMessage {
    match err {
        RoomError::RoomFull(room_id) => ServerMessage::RoomFull {
            room_id: room_id.clone(),
        },
        RoomError::NotFound(_) => ServerMessage::error(404, err.to_string()),
        RoomError::AlreadyExists(_) | RoomError::AlreadyBound(_) | RoomError::NotBound => {
            ServerMessage::error(409, err.to_string())
        }
        RoomError::IllegalMove(_) => ServerMessage::error(400, err.to_string()),
        RoomError::Unavailable(_) => ServerMessage::error(503, err.to_string()),
    }
}

/// Queues a message for this connection's writer. A closed writer
/// means the connection is going away anyway.
fn reply(tx: &PlayerSender, msg: ServerMessage) {
    let _ = tx.send(msg);
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
