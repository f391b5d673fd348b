//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::ArenaRegistry;
use crate::relay::{InMemorySessionStore, RaceRelay, SessionStore};
use crate::util::time::{Clock, MonotonicClock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub relay: Arc<RaceRelay>,
    pub arena_registry: Arc<ArenaRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self::with_parts(config, store, Arc::new(MonotonicClock::new()))
    }

    /// Build state around a specific session store and clock
    pub fn with_parts(config: Config, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(config);

        // Initialize race relay
        let relay = Arc::new(RaceRelay::new(store, clock.clone(), config.session_ttl));

        // Initialize arena registry
        let arena_registry = Arc::new(ArenaRegistry::new());

        Self {
            config,
            clock,
            relay,
            arena_registry,
        }
    }
}
