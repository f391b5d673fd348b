//! Arena session task and registry of live sessions

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::{Clock, SIMULATION_TPS, SNAPSHOT_TPS, TICK_DURATION_MICROS};
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::arena::{Arena, ArenaEvent, ArenaPhase};
use super::kinematics::{MoveKeys, Vec2};
use super::snapshot::SnapshotBuilder;
use super::TickInput;

/// Handle to a running arena session
#[derive(Clone)]
pub struct ArenaHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<ClientMsg>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
}

/// Registry of all live arena sessions
pub struct ArenaRegistry {
    arenas: DashMap<Uuid, ArenaHandle>,
}

impl ArenaRegistry {
    pub fn new() -> Self {
        Self {
            arenas: DashMap::new(),
        }
    }

    pub fn insert(&self, handle: ArenaHandle) {
        self.arenas.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<ArenaHandle> {
        self.arenas.remove(id).map(|(_, h)| h)
    }

    pub fn active_arenas(&self) -> usize {
        self.arenas.len()
    }
}

impl Default for ArenaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-player arena driven at the simulation tick rate
pub struct ArenaSession {
    id: Uuid,
    arena: Arena,
    input_rx: mpsc::Receiver<ClientMsg>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    current_input: TickInput,
    /// Highest input sequence number accepted so far
    last_seq: Option<u32>,
    pending_events: Vec<ArenaEvent>,
    game_over_sent: bool,
}

impl ArenaSession {
    /// Create a new session
    pub fn new(id: Uuid, seed: u64, clock: Arc<dyn Clock>) -> (Self, ArenaHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);

        let handle = ArenaHandle {
            id,
            input_tx,
            snapshot_tx: snapshot_tx.clone(),
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let session = Self {
            id,
            arena: Arena::new(seed, clock),
            input_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            current_input: TickInput::default(),
            last_seq: None,
            pending_events: Vec::new(),
            game_over_sent: false,
        };

        (session, handle)
    }

    /// Run the tick loop until every input sender is dropped
    pub async fn run(mut self) {
        info!(arena_id = %self.id, seed = self.arena.seed(), "Arena session started");

        let tick_duration = Duration::from_micros(TICK_DURATION_MICROS);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if !self.process_inputs() {
                break;
            }

            self.run_tick();

            if self.snapshot_builder.should_send() {
                let events = std::mem::take(&mut self.pending_events);
                let snapshot = self.snapshot_builder.build(&self.arena, events);
                let _ = self.snapshot_tx.send(snapshot);
            }
        }

        info!(
            arena_id = %self.id,
            tick = self.arena.tick(),
            score = self.arena.score(),
            "Arena session closed"
        );
    }

    /// Drain queued inputs. Returns false once the client side is gone.
    fn process_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(msg) => self.handle_msg(msg),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_msg(&mut self, msg: ClientMsg) {
        match msg {
            ClientMsg::Input {
                seq,
                up,
                down,
                left,
                right,
                aim_x,
                aim_y,
                shoot,
            } => {
                if self.last_seq.is_some_and(|last| seq <= last) {
                    debug!(arena_id = %self.id, seq, "Dropping stale input");
                    return;
                }
                self.last_seq = Some(seq);
                self.current_input.keys = MoveKeys {
                    up,
                    down,
                    left,
                    right,
                };
                if let (Some(x), Some(y)) = (aim_x, aim_y) {
                    self.current_input.aim = Some(Vec2::new(x, y));
                }
                // Clicks latch until the next tick consumes them.
                self.current_input.shoot |= shoot;
            }
            ClientMsg::ToggleFlashlight => {
                self.current_input.toggle_flashlight = !self.current_input.toggle_flashlight;
            }
            ClientMsg::Restart => {
                if self.arena.phase() == ArenaPhase::GameOver {
                    self.arena.restart();
                    self.pending_events.clear();
                    self.game_over_sent = false;
                    self.snapshot_builder.force_next();
                    info!(arena_id = %self.id, seed = self.arena.seed(), "Arena restarted");
                }
            }
            ClientMsg::Ping { t } => {
                let _ = self.snapshot_tx.send(ServerMsg::Pong { t });
            }
        }
    }

    fn run_tick(&mut self) {
        let events = self.arena.step(&self.current_input);
        self.current_input.shoot = false;
        self.current_input.toggle_flashlight = false;
        self.pending_events.extend(events);

        if self.arena.phase() == ArenaPhase::GameOver && !self.game_over_sent {
            self.game_over_sent = true;
            self.snapshot_builder.force_next();
            let _ = self.snapshot_tx.send(ServerMsg::GameOver {
                score: self.arena.score(),
                tick: self.arena.tick(),
            });
            info!(arena_id = %self.id, score = self.arena.score(), "Game over");
        }
    }
}
