//! Race relay operations

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::Clock;

use super::model::{RacePlayer, RaceSession, RaceSnapshot, UserId, GUEST_START_X, SEED_LIMIT};
use super::store::SessionStore;
use super::RelayError;

/// Race relay service
pub struct RaceRelay {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    /// Idle time after which a session is evicted
    ttl: Duration,
}

impl RaceRelay {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Open a session with the caller in the first slot
    pub fn create_session(&self, user_id: UserId) -> Uuid {
        let session_id = Uuid::new_v4();
        let seed = rand::thread_rng().gen_range(0..SEED_LIMIT);

        info!(session_id = %session_id, user_id = %user_id, seed, "Race session created");
        self.store.insert(
            RaceSession::new(session_id, user_id, seed),
            self.clock.now_millis(),
        );
        session_id
    }

    /// Take the second slot, returns the shared obstacle seed
    pub fn join_session(&self, session_id: &Uuid, user_id: UserId) -> Result<u32, RelayError> {
        let now = self.clock.now_millis();
        let mut joiner = Some(RacePlayer::new(user_id.clone(), GUEST_START_X));

        let session = self.store.modify(session_id, now, &mut |session| {
            if session.is_full() {
                return Err(RelayError::SessionFull);
            }
            if let Some(player) = joiner.take() {
                session.players.push(player);
            }
            Ok(())
        })?;

        info!(session_id = %session_id, user_id = %user_id, "Player joined race session");
        Ok(session.seed)
    }

    /// Overwrite one player's reported state; last write wins
    pub fn update_player(
        &self,
        session_id: &Uuid,
        user_id: &UserId,
        x: f32,
        score: f32,
        avoided: u32,
    ) -> Result<RaceSnapshot, RelayError> {
        if !x.is_finite() || !score.is_finite() {
            return Err(RelayError::InvalidReport);
        }

        let now = self.clock.now_millis();
        let session = self.store.modify(session_id, now, &mut |session| {
            let player = session
                .player_mut(user_id)
                .ok_or(RelayError::PlayerNotFound)?;
            player.x = x;
            player.score = score;
            player.avoided = avoided;
            Ok(())
        })?;

        Ok(session.snapshot())
    }

    pub fn get_session(&self, session_id: &Uuid) -> Option<RaceSession> {
        self.store.get(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Evict sessions idle for longer than the TTL
    pub fn evict_expired(&self) -> usize {
        let ttl_ms = self.ttl.as_millis() as u64;
        let cutoff = self.clock.now_millis().saturating_sub(ttl_ms);
        self.store.evict_idle(cutoff)
    }

    /// Periodic eviction loop
    pub async fn run_eviction(self: Arc<Self>, every: Duration) {
        info!(ttl_secs = self.ttl.as_secs(), "Race session eviction started");
        let mut ticker = interval(every);

        loop {
            ticker.tick().await;
            let evicted = self.evict_expired();
            if evicted > 0 {
                info!(evicted, remaining = self.session_count(), "Evicted idle race sessions");
            } else {
                debug!(remaining = self.session_count(), "No idle race sessions");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::model::{HOST_START_X, MAX_PLAYERS};
    use crate::relay::store::InMemorySessionStore;
    use crate::util::time::ManualClock;

    fn relay() -> (RaceRelay, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let relay = RaceRelay::new(
            Arc::new(InMemorySessionStore::new()),
            clock.clone(),
            Duration::from_secs(60),
        );
        (relay, clock)
    }

    #[test]
    fn join_returns_the_creation_seed() {
        let (relay, _) = relay();
        let sid = relay.create_session(UserId::from("u1"));
        let stored = relay.get_session(&sid).unwrap();
        assert!(stored.seed < SEED_LIMIT);

        let seed = relay.join_session(&sid, UserId::from("u2")).unwrap();
        assert_eq!(seed, stored.seed);

        let session = relay.get_session(&sid).unwrap();
        assert_eq!(session.players.len(), MAX_PLAYERS);
        assert_eq!(session.players[0].x, HOST_START_X);
        assert_eq!(session.players[1].x, GUEST_START_X);
        assert_eq!(session.road_speed, 3.0);
    }

    #[test]
    fn third_join_is_rejected() {
        let (relay, _) = relay();
        let sid = relay.create_session(UserId::from("u1"));
        relay.join_session(&sid, UserId::from("u2")).unwrap();
        assert_eq!(
            relay.join_session(&sid, UserId::from("u3")),
            Err(RelayError::SessionFull)
        );
        assert_eq!(relay.get_session(&sid).unwrap().players.len(), 2);
    }

    #[test]
    fn join_unknown_session_fails() {
        let (relay, _) = relay();
        assert_eq!(
            relay.join_session(&Uuid::new_v4(), UserId::from("u2")),
            Err(RelayError::SessionNotFound)
        );
    }

    #[test]
    fn update_overwrites_only_the_reporting_slot() {
        let (relay, _) = relay();
        let sid = relay.create_session(UserId::Numeric(1));
        relay.join_session(&sid, UserId::Numeric(2)).unwrap();

        let snap = relay
            .update_player(&sid, &UserId::Numeric(2), 410.0, 12.5, 3)
            .unwrap();
        assert_eq!(snap.players[0], RacePlayer::new(UserId::Numeric(1), HOST_START_X));
        assert_eq!(snap.players[1].x, 410.0);
        assert_eq!(snap.players[1].score, 12.5);
        assert_eq!(snap.players[1].avoided, 3);

        let snap = relay
            .update_player(&sid, &UserId::Numeric(2), 200.0, 14.0, 4)
            .unwrap();
        assert_eq!(snap.players[1].x, 200.0);
    }

    #[test]
    fn update_rejects_unknowns_and_garbage() {
        let (relay, _) = relay();
        let sid = relay.create_session(UserId::from("u1"));
        assert_eq!(
            relay.update_player(&sid, &UserId::from("ghost"), 1.0, 1.0, 1),
            Err(RelayError::PlayerNotFound)
        );
        assert_eq!(
            relay.update_player(&Uuid::new_v4(), &UserId::from("u1"), 1.0, 1.0, 1),
            Err(RelayError::SessionNotFound)
        );
        assert_eq!(
            relay.update_player(&sid, &UserId::from("u1"), f32::NAN, 1.0, 1),
            Err(RelayError::InvalidReport)
        );
    }

    #[test]
    fn idle_sessions_expire_but_active_ones_stay() {
        let (relay, clock) = relay();
        let idle = relay.create_session(UserId::from("a"));
        let active = relay.create_session(UserId::from("b"));

        clock.advance(50_000);
        relay
            .update_player(&active, &UserId::from("b"), 300.0, 1.0, 0)
            .unwrap();
        clock.advance(20_000);

        assert_eq!(relay.evict_expired(), 1);
        assert!(relay.get_session(&idle).is_none());
        assert!(relay.get_session(&active).is_some());
    }
}
