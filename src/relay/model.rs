//! Race session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Players per race
pub const MAX_PLAYERS: usize = 2;
/// Lane position of the session creator (canvas centre)
pub const HOST_START_X: f32 = 300.0;
/// Lane position of the joining player
pub const GUEST_START_X: f32 = 350.0;
pub const DEFAULT_ROAD_SPEED: f32 = 3.0;
/// Seeds are drawn from `0..SEED_LIMIT`
pub const SEED_LIMIT: u32 = 10_000;

/// Client-supplied user id; clients send either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

/// One player's self-reported race state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacePlayer {
    pub user_id: UserId,
    pub x: f32,
    pub score: f32,
    pub avoided: u32,
}

impl RacePlayer {
    pub fn new(user_id: UserId, x: f32) -> Self {
        Self {
            user_id,
            x,
            score: 0.0,
            avoided: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSession {
    pub session_id: Uuid,
    pub players: Vec<RacePlayer>,
    pub road_speed: f32,
    /// Shared obstacle seed
    pub seed: u32,
    pub created_at: DateTime<Utc>,
}

impl RaceSession {
    pub fn new(session_id: Uuid, host: UserId, seed: u32) -> Self {
        Self {
            session_id,
            players: vec![RacePlayer::new(host, HOST_START_X)],
            road_speed: DEFAULT_ROAD_SPEED,
            seed,
            created_at: Utc::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn player_mut(&mut self, user_id: &UserId) -> Option<&mut RacePlayer> {
        self.players.iter_mut().find(|p| &p.user_id == user_id)
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            seed: self.seed,
            players: self.players.clone(),
            road_speed: self.road_speed,
        }
    }
}

/// What a client gets back after reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSnapshot {
    pub seed: u32,
    pub players: Vec<RacePlayer>,
    pub road_speed: f32,
}
