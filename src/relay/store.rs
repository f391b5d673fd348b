//! Session storage behind a trait so deployments can swap the backend

use dashmap::DashMap;
use uuid::Uuid;

use super::model::RaceSession;
use super::RelayError;

/// Key-value store for race sessions.
///
/// Every mutation of a single session is atomic; sessions are independent of
/// each other. `touched_ms` values come from the relay's monotonic clock.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: RaceSession, now_ms: u64);

    fn get(&self, id: &Uuid) -> Option<RaceSession>;

    /// Apply `f` to a session under its lock and return the updated record.
    /// `f` must validate before mutating: an error leaves the session as it was.
    fn modify(
        &self,
        id: &Uuid,
        now_ms: u64,
        f: &mut dyn FnMut(&mut RaceSession) -> Result<(), RelayError>,
    ) -> Result<RaceSession, RelayError>;

    /// Drop sessions last touched before `cutoff_ms`, returns how many went
    fn evict_idle(&self, cutoff_ms: u64) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct StoredSession {
    session: RaceSession,
    touched_ms: u64,
}

/// Process-local store backed by a sharded concurrent map
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, StoredSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: RaceSession, now_ms: u64) {
        self.sessions.insert(
            session.session_id,
            StoredSession {
                session,
                touched_ms: now_ms,
            },
        );
    }

    fn get(&self, id: &Uuid) -> Option<RaceSession> {
        self.sessions.get(id).map(|s| s.session.clone())
    }

    fn modify(
        &self,
        id: &Uuid,
        now_ms: u64,
        f: &mut dyn FnMut(&mut RaceSession) -> Result<(), RelayError>,
    ) -> Result<RaceSession, RelayError> {
        let mut entry = self.sessions.get_mut(id).ok_or(RelayError::SessionNotFound)?;
        f(&mut entry.session)?;
        entry.touched_ms = now_ms;
        Ok(entry.session.clone())
    }

    fn evict_idle(&self, cutoff_ms: u64) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, stored| {
            let keep = stored.touched_ms >= cutoff_ms;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::model::UserId;

    fn session() -> RaceSession {
        RaceSession::new(Uuid::new_v4(), UserId::from("u1"), 7)
    }

    #[test]
    fn failed_modify_changes_nothing() {
        let store = InMemorySessionStore::new();
        let s = session();
        let id = s.session_id;
        store.insert(s.clone(), 0);

        let result = store.modify(&id, 50, &mut |session| {
            if session.seed == 7 {
                return Err(RelayError::SessionFull);
            }
            session.road_speed = 99.0;
            Ok(())
        });

        assert_eq!(result, Err(RelayError::SessionFull));
        assert_eq!(store.get(&id), Some(s));
        // Still counts as idle since time 0.
        assert_eq!(store.evict_idle(1), 1);
    }

    #[test]
    fn modify_on_missing_session_fails() {
        let store = InMemorySessionStore::new();
        let result = store.modify(&Uuid::new_v4(), 0, &mut |_| Ok(()));
        assert_eq!(result, Err(RelayError::SessionNotFound));
    }

    #[test]
    fn eviction_keeps_recently_touched() {
        let store = InMemorySessionStore::new();
        let old = session();
        let fresh = session();
        let fresh_id = fresh.session_id;
        store.insert(old, 100);
        store.insert(fresh, 900);

        assert_eq!(store.evict_idle(500), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&fresh_id).is_some());
    }

    #[test]
    fn concurrent_writers_on_different_sessions() {
        use std::sync::Arc;

        let store = Arc::new(InMemorySessionStore::new());
        let ids: Vec<Uuid> = (0..8)
            .map(|_| {
                let s = session();
                let id = s.session_id;
                store.insert(s, 0);
                id
            })
            .collect();

        let threads: Vec<_> = ids
            .iter()
            .copied()
            .map(|id| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        store
                            .modify(&id, i, &mut |s| {
                                s.players[0].avoided += 1;
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        for id in ids {
            assert_eq!(store.get(&id).unwrap().players[0].avoided, 500);
        }
    }
}
