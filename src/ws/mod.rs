//! WebSocket arena play

pub mod handler;
pub mod protocol;
