//! Room actor: an isolated Tokio task that owns one board and runs its
//! turn coordination.
//!
//! Joins, leaves, moves, and timer wake-ups for a room all pass through
//! the actor's loop one at a time, so no two mutations of a room ever
//! interleave. Every broadcast is pushed from inside the same step that
//! caused it, which keeps all seated connections seeing events in the
//! order the room accepted them.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use duelboard_board::{Board, BoardVariant, Coord, MoveProvider, Outcome, Symbol};
use duelboard_protocol::{
    BoardSnapshot, CloseReason, PlayerInfo, RoomId, Scores, ServerMessage, Stone,
};
use duelboard_timer::Timer;
use duelboard_transport::ConnectionId;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::registry::{self, Shared};
use crate::{MoveRejection, RoomConfig, RoomError, RoomState};

/// Seat index to symbol. The first seat always plays X.
const SEAT_SYMBOLS: [Symbol; 2] = [Symbol::X, Symbol::O];

const COMPUTER_NAME: &str = "Computer";

/// Channel sender for delivering outbound messages to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<JoinAck, RoomError>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Move {
        conn: ConnectionId,
        at: Coord,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    History {
        reply: oneshot::Sender<Vec<MoveRecord>>,
    },
    Shutdown,
}

/// What a successful join hands back to the caller.
///
/// The joiner also receives the same facts as a `RoomJoined` message on
/// its own channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAck {
    pub room_id: RoomId,
    pub slot: usize,
    pub symbol: Symbol,
    pub board: BoardSnapshot,
    pub players: Vec<PlayerInfo>,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    /// Occupied seats, computer seats included.
    pub player_count: usize,
    pub variant: BoardVariant,
    /// Rounds started so far. 0 until both seats fill.
    pub round: u32,
    pub turn: Symbol,
    pub scores: Scores,
    /// Time until the board clears, while a finished round waits.
    pub reset_in: Option<Duration>,
}

/// One accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub round: u32,
    pub coord: Coord,
    pub symbol: Symbol,
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Cheap to clone.
///
/// Every method fails with [`RoomError::Unavailable`] once the actor has
/// stopped.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    epoch: u64,
    sender: mpsc::Sender<RoomCommand>,
}

impl fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomHandle")
            .field("room_id", &self.room_id)
            .field("epoch", &self.epoch)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Distinguishes this room from earlier rooms that used the same id.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `true` once the actor has stopped taking commands.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Seats a connection. Prefer [`RoomRegistry::join_room`], which also
    /// records the connection's binding.
    ///
    /// [`RoomRegistry::join_room`]: crate::RoomRegistry::join_room
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        self.request(|reply| RoomCommand::Join {
            conn,
            name,
            sender,
            reply,
        })
        .await?
    }

    /// Frees the connection's seat.
    pub async fn leave(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave { conn, reply }).await?
    }

    /// Plays the connection's symbol at `at`.
    ///
    /// # Errors
    /// [`RoomError::NotBound`] if the connection holds no seat here,
    /// [`RoomError::IllegalMove`] if the room is not active, it is not
    /// the sender's turn, or the board refuses the cell.
    pub async fn submit_move(&self, conn: ConnectionId, at: Coord) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Move { conn, at, reply })
            .await?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::Info { reply }).await
    }

    /// Every move accepted since the room opened, oldest first.
    pub async fn history(&self) -> Result<Vec<MoveRecord>, RoomError> {
        self.request(|reply| RoomCommand::History { reply }).await
    }

    /// Closes the room, telling seated players why.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

// ---------------------------------------------------------------------------
// RoomActor
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Occupant {
    Human {
        conn: ConnectionId,
        sender: PlayerSender,
    },
    Computer,
}

#[derive(Debug)]
struct Seat {
    name: String,
    symbol: Symbol,
    occupant: Occupant,
}

impl Seat {
    fn conn(&self) -> Option<ConnectionId> {
        match &self.occupant {
            Occupant::Human { conn, .. } => Some(*conn),
            Occupant::Computer => None,
        }
    }

    fn is_computer(&self) -> bool {
        matches!(self.occupant, Occupant::Computer)
    }

    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            slot: self.symbol.seat(),
            symbol: self.symbol,
            name: self.name.clone(),
            computer: self.is_computer(),
        }
    }
}

/// What woke the actor loop.
enum Wake {
    Command(Option<RoomCommand>),
    ResetDue,
    Expired,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    epoch: u64,
    config: RoomConfig,
    state: RoomState,
    board: Box<dyn Board>,
    turn: Symbol,
    round: u32,
    scores: Scores,
    seats: [Option<Seat>; 2],
    history: Vec<MoveRecord>,
    last_move: Option<Coord>,
    reset_timer: Timer,
    idle_timer: Timer,
    provider: Arc<dyn MoveProvider>,
    registry: Weak<Shared>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until the room closes or every handle drops.
    async fn run(mut self) {
        info!(
            room_id = %self.room_id,
            epoch = self.epoch,
            variant = %self.config.variant,
            "room actor started"
        );
        if let Some(ttl) = self.config.empty_room_ttl {
            self.idle_timer.arm(ttl);
        }

        loop {
            let wake = tokio::select! {
                cmd = self.receiver.recv() => Wake::Command(cmd),
                _ = self.reset_timer.wait() => Wake::ResetDue,
                _ = self.idle_timer.wait() => Wake::Expired,
            };

            match wake {
                Wake::Command(Some(cmd)) => self.handle_command(cmd),
                Wake::Command(None) => self.close(None),
                Wake::ResetDue => self.reset_round(),
                Wake::Expired => {
                    info!(room_id = %self.room_id, "nobody joined, closing room");
                    self.close(Some(CloseReason::Expired));
                }
            }

            if self.state == RoomState::Closed {
                break;
            }
        }

        // Queued commands are dropped with their reply channels, so their
        // callers see `Unavailable`.
        self.receiver.close();
        registry::deregister(&self.registry, &self.room_id, self.epoch).await;
        info!(room_id = %self.room_id, epoch = self.epoch, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                conn,
                name,
                sender,
                reply,
            } => {
                let result = self.handle_join(conn, name, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { conn, reply } => {
                let result = self.handle_leave(conn);
                let _ = reply.send(result);
            }
            RoomCommand::Move { conn, at, reply } => {
                let result = self.handle_move(conn, at);
                if let Err(err) = &result {
                    debug!(room_id = %self.room_id, %conn, %at, %err, "move rejected");
                }
                let _ = reply.send(result);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::History { reply } => {
                let _ = reply.send(self.history.clone());
            }
            RoomCommand::Shutdown => {
                info!(room_id = %self.room_id, "room shutting down");
                self.close(Some(CloseReason::Shutdown));
            }
        }
    }

    // -- Joining and leaving --

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<JoinAck, RoomError> {
        if self.slot_of(conn).is_some() {
            return Err(RoomError::AlreadyBound(self.room_id.clone()));
        }
        let Some(slot) = self.seats.iter().position(Option::is_none) else {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        };

        self.idle_timer.cancel();
        let seat = Seat {
            name,
            symbol: SEAT_SYMBOLS[slot],
            occupant: Occupant::Human {
                conn,
                sender: sender.clone(),
            },
        };
        let player = seat.info();
        self.seats[slot] = Some(seat);
        info!(
            room_id = %self.room_id,
            %conn,
            slot,
            symbol = %player.symbol,
            name = %player.name,
            "player joined"
        );

        let ack = JoinAck {
            room_id: self.room_id.clone(),
            slot,
            symbol: player.symbol,
            board: self.snapshot(),
            players: self.players(),
        };
        let _ = sender.send(ServerMessage::RoomJoined {
            room_id: ack.room_id.clone(),
            slot,
            symbol: ack.symbol,
            board: ack.board.clone(),
            players: ack.players.clone(),
        });
        self.broadcast_except(slot, ServerMessage::PlayerJoined { player });

        if self.seats.iter().all(Option::is_some) {
            self.start_round();
        }
        Ok(ack)
    }

    fn handle_leave(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        let slot = self.slot_of(conn).ok_or(RoomError::NotBound)?;
        let seat = self.seats[slot].take().ok_or(RoomError::NotBound)?;
        let player = seat.info();
        info!(room_id = %self.room_id, %conn, slot, name = %player.name, "player left");

        if self.human_count() == 0 {
            self.close(None);
            return Ok(());
        }

        self.reset_timer.cancel();
        self.board.reset();
        self.scores.clear(player.symbol);
        self.turn = Symbol::FIRST;
        self.last_move = None;
        self.transition(RoomState::WaitingForPlayer);
        self.broadcast(ServerMessage::PlayerLeft { player });
        Ok(())
    }

    // -- Turn coordination --

    fn start_round(&mut self) {
        self.board.reset();
        self.turn = Symbol::FIRST;
        self.round += 1;
        self.last_move = None;
        self.transition(RoomState::Active);
        info!(room_id = %self.room_id, round = self.round, "round started");

        self.broadcast(ServerMessage::StartGame {
            players: self.players(),
            turn: self.turn,
            round: self.round,
        });
        self.play_computer_turns();
    }

    fn handle_move(&mut self, conn: ConnectionId, at: Coord) -> Result<(), RoomError> {
        let slot = self.slot_of(conn).ok_or(RoomError::NotBound)?;
        if !self.state.accepts_moves() {
            return Err(MoveRejection::NotActive(self.state).into());
        }
        let symbol = SEAT_SYMBOLS[slot];
        if symbol != self.turn {
            return Err(MoveRejection::WrongTurn {
                expected: self.turn,
            }
            .into());
        }
        self.board
            .apply_move(at, symbol)
            .map_err(MoveRejection::from)?;

        self.accept_move(at, symbol);
        self.play_computer_turns();
        Ok(())
    }

    /// Records, announces, and judges a move the board already took.
    fn accept_move(&mut self, at: Coord, symbol: Symbol) {
        self.history.push(MoveRecord {
            round: self.round,
            coord: at,
            symbol,
        });
        self.last_move = Some(at);

        let outcome = self.board.evaluate(at, symbol);
        let next_turn = (!outcome.is_terminal()).then(|| symbol.other());
        self.broadcast(ServerMessage::MoveMade {
            x: at.x,
            y: at.y,
            symbol,
            next_turn,
        });

        match outcome {
            Outcome::Ongoing => self.turn = symbol.other(),
            Outcome::Win(winner) => self.finish_round(Some(winner)),
            Outcome::Draw => self.finish_round(None),
        }
    }

    fn finish_round(&mut self, winner: Option<Symbol>) {
        let winner_info = winner.and_then(|s| self.seats[s.seat()].as_ref().map(Seat::info));
        let total = winner.map(|s| self.scores.increment(s));
        self.transition(RoomState::RoundOver);
        info!(
            room_id = %self.room_id,
            round = self.round,
            winner = ?winner,
            "round over"
        );

        self.broadcast(ServerMessage::RoundOver {
            winner: winner_info.clone(),
            scores: self.scores,
            round: self.round,
        });

        match (self.config.win_target, total, winner_info) {
            (Some(target), Some(total), Some(info)) if total >= target => {
                info!(room_id = %self.room_id, winner = %info.name, total, "match won");
                self.close(Some(CloseReason::MatchWon { winner: info }));
            }
            _ => {
                self.reset_timer.arm(self.config.reset_delay);
            }
        }
    }

    fn reset_round(&mut self) {
        if self.state != RoomState::RoundOver {
            return;
        }
        self.board.reset();
        self.turn = Symbol::FIRST;
        self.round += 1;
        self.last_move = None;
        self.transition(RoomState::Active);
        debug!(room_id = %self.room_id, round = self.round, "board reset");

        self.broadcast(ServerMessage::BoardReset {
            board: self.snapshot(),
            turn: self.turn,
            round: self.round,
        });
        self.play_computer_turns();
    }

    /// Lets computer seats move for as long as it is their turn.
    fn play_computer_turns(&mut self) {
        while self.state.accepts_moves() {
            let symbol = self.turn;
            if !self.seats[symbol.seat()]
                .as_ref()
                .is_some_and(Seat::is_computer)
            {
                return;
            }
            let Some(at) = self
                .provider
                .choose(self.board.as_ref(), symbol, self.last_move)
            else {
                warn!(room_id = %self.room_id, %symbol, "move provider found no cell");
                return;
            };
            if let Err(err) = self.board.apply_move(at, symbol) {
                warn!(room_id = %self.room_id, %at, %err, "move provider chose an illegal cell");
                return;
            }
            debug!(room_id = %self.room_id, %at, %symbol, "computer moved");
            self.accept_move(at, symbol);
        }
    }

    // -- Closing --

    /// Moves the room to `Closed`. `reason` is broadcast when given.
    fn close(&mut self, reason: Option<CloseReason>) {
        if self.state == RoomState::Closed {
            return;
        }
        self.reset_timer.cancel();
        self.idle_timer.cancel();
        if let Some(reason) = reason {
            self.broadcast(ServerMessage::RoomClosed {
                room_id: self.room_id.clone(),
                reason,
            });
        }
        self.transition(RoomState::Closed);
    }

    fn transition(&mut self, to: RoomState) {
        if self.state == to {
            return;
        }
        if !self.state.can_transition_to(to) {
            warn!(room_id = %self.room_id, from = %self.state, %to, "unexpected room transition");
        }
        debug!(room_id = %self.room_id, from = %self.state, %to, "room state changed");
        self.state = to;
    }

    // -- Lookups and delivery --

    fn slot_of(&self, conn: ConnectionId) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.as_ref().and_then(Seat::conn) == Some(conn))
    }

    fn human_count(&self) -> usize {
        self.seats
            .iter()
            .flatten()
            .filter(|s| !s.is_computer())
            .count()
    }

    fn players(&self) -> Vec<PlayerInfo> {
        self.seats.iter().flatten().map(Seat::info).collect()
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            variant: self.board.variant(),
            cells: self.board.occupied().into_iter().map(Stone::from).collect(),
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        self.deliver(None, msg);
    }

    fn broadcast_except(&self, slot: usize, msg: ServerMessage) {
        self.deliver(Some(slot), msg);
    }

    /// Pushes `msg` to every human seat except `skip`. A seat whose
    /// connection already went away is skipped silently; its handler
    /// will send the leave.
    fn deliver(&self, skip: Option<usize>, msg: ServerMessage) {
        for (slot, seat) in self.seats.iter().enumerate() {
            if Some(slot) == skip {
                continue;
            }
            if let Some(Seat {
                occupant: Occupant::Human { sender, .. },
                ..
            }) = seat
            {
                let _ = sender.send(msg.clone());
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            state: self.state,
            player_count: self.seats.iter().flatten().count(),
            variant: self.config.variant,
            round: self.round,
            turn: self.turn,
            scores: self.scores,
            reset_in: self.reset_timer.remaining(),
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    epoch: u64,
    config: RoomConfig,
    provider: Arc<dyn MoveProvider>,
    registry: Weak<Shared>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let mut seats = [None, None];
    if config.vs_computer {
        seats[1] = Some(Seat {
            name: COMPUTER_NAME.to_string(),
            symbol: SEAT_SYMBOLS[1],
            occupant: Occupant::Computer,
        });
    }

    let actor = RoomActor {
        room_id: room_id.clone(),
        epoch,
        board: config.variant.build(),
        config,
        state: RoomState::WaitingForPlayer,
        turn: Symbol::FIRST,
        round: 0,
        scores: Scores::default(),
        seats,
        history: Vec::new(),
        last_move: None,
        reset_timer: Timer::new("reset"),
        idle_timer: Timer::new("empty-room"),
        provider,
        registry,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        epoch,
        sender: tx,
    }
}
