//! Snapshot building for network transmission

use crate::ws::protocol::{EnemyView, PlayerView, ServerMsg};

use super::arena::{Arena, ArenaEvent};

/// Builds snapshots at a fixed tick interval
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot message
    pub fn build(&self, arena: &Arena, events: Vec<ArenaEvent>) -> ServerMsg {
        let player = arena.player();
        let enemies = arena
            .enemies()
            .iter()
            .map(|e| EnemyView {
                id: e.id,
                x: e.pos.x,
                y: e.pos.y,
                state: e.state,
            })
            .collect();

        ServerMsg::Snapshot {
            tick: arena.tick(),
            phase: arena.phase(),
            score: arena.score(),
            player: PlayerView {
                x: player.pos.x,
                y: player.pos.y,
                angle: player.angle,
                health: player.health,
                ammo: player.ammo,
                max_ammo: player.stats.max_ammo,
                flashlight_on: player.flashlight_on,
            },
            enemies,
            bullets: arena.bullets().to_vec(),
            enemy_bullets: arena.enemy_bullets().to_vec(),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::time::ManualClock;
    use std::sync::Arc;

    #[test]
    fn sends_every_interval() {
        let mut builder = SnapshotBuilder::new(2);
        let sent: Vec<bool> = (0..4).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, true, false, true]);

        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn snapshot_mirrors_the_arena() {
        let arena = Arena::new(11, Arc::new(ManualClock::new(0)));
        let builder = SnapshotBuilder::new(2);

        match builder.build(&arena, Vec::new()) {
            ServerMsg::Snapshot {
                tick,
                player,
                enemies,
                score,
                ..
            } => {
                assert_eq!(tick, 0);
                assert_eq!(score, 0);
                assert_eq!(player.x, 400.0);
                assert_eq!(player.max_ammo, 30.0);
                assert_eq!(enemies.len(), 2);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
