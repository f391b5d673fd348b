//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::arena::{ArenaEvent, ArenaPhase};
use crate::game::enemy::EnemyState;
use crate::game::projectile::Projectile;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Held keys and pointer for the coming ticks
    Input {
        /// Increasing sequence number; stale inputs are dropped
        seq: u32,
        #[serde(default)]
        up: bool,
        #[serde(default)]
        down: bool,
        #[serde(default)]
        left: bool,
        #[serde(default)]
        right: bool,
        /// Pointer position in arena coordinates
        #[serde(default)]
        aim_x: Option<f32>,
        #[serde(default)]
        aim_y: Option<f32>,
        /// Mouse click since the last input
        #[serde(default)]
        shoot: bool,
    },

    /// Flip the flashlight on or off
    ToggleFlashlight,

    /// Start a new game after game over
    Restart,

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        arena_id: Uuid,
        /// Seed of the arena's random stream
        seed: u64,
        server_time: u64,
    },

    /// Arena state snapshot (sent at regular intervals)
    Snapshot {
        tick: u64,
        phase: ArenaPhase,
        score: u32,
        player: PlayerView,
        enemies: Vec<EnemyView>,
        bullets: Vec<Projectile>,
        enemy_bullets: Vec<Projectile>,
        /// Events that occurred since last snapshot
        events: Vec<ArenaEvent>,
    },

    /// The player died
    GameOver {
        score: u32,
        tick: u64,
    },

    /// Pong response
    Pong {
        t: u64,
    },

    /// Error message
    Error {
        code: String,
        message: String,
    },
}

/// Player state for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: f32,
    pub ammo: f32,
    pub max_ammo: f32,
    pub flashlight_on: bool,
}

/// Enemy state for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub state: EnemyState,
}
