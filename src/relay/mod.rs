//! Two-player race session relay
//!
//! Sessions are shared, unauthoritative records: each client simulates its own
//! race from the shared seed and reports its lane position and score, and the
//! relay hands back the whole record so the opponent can be drawn as a ghost.

pub mod model;
pub mod service;
pub mod store;

pub use model::{RacePlayer, RaceSession, RaceSnapshot, UserId};
pub use service::RaceRelay;
pub use store::{InMemorySessionStore, SessionStore};

/// Relay errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session is full")]
    SessionFull,

    #[error("Player not in session")]
    PlayerNotFound,

    #[error("Report contains non-finite values")]
    InvalidReport,
}
