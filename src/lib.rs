//! Nightwatch game server
//!
//! Hosts two minigames:
//! - a single-player survival arena simulated server-side and streamed over WebSocket
//! - a two-player race relay that pairs clients and shares their reported positions

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod relay;
pub mod util;
pub mod ws;
