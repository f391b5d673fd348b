//! Arena simulation: one player, a growing pack of enemies, and their bullets

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::util::time::Clock;

use super::enemy::{Enemy, EnemyTuning};
use super::kinematics::{Vec2, ARENA_HEIGHT, ARENA_WIDTH};
use super::player::{Player, PlayerStats};
use super::projectile::{Projectile, ProjectileStats};
use super::TickInput;

/// Distance outside the arena edge at which enemies appear
const SPAWN_OFFSET: f32 = 20.0;

/// Arena rules
#[derive(Debug, Clone, Copy)]
pub struct ArenaConfig {
    pub player_start: Vec2,
    pub initial_enemies: usize,
    /// Ticks between enemy spawns
    pub spawn_rate: u32,
    pub hit_score: u32,
    pub kill_bonus: u32,
    pub enemy_bullet_damage: f32,
    pub contact_radius: f32,
    /// Damage per tick while an enemy touches the player
    pub contact_damage: f32,
    pub player: PlayerStats,
    pub enemy: EnemyTuning,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_start: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            initial_enemies: 2,
            spawn_rate: 150,
            hit_score: 10,
            kill_bonus: 40,
            enemy_bullet_damage: 8.0,
            contact_radius: 15.0,
            contact_damage: 0.2,
            player: PlayerStats::default(),
            enemy: EnemyTuning::default(),
        }
    }
}

/// Arena phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaPhase {
    Running,
    GameOver,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArenaEvent {
    ShotFired { x: f32, y: f32 },
    EnemySpawned { enemy_id: u32 },
    EnemyFired { enemy_id: u32 },
    EnemyKilled { enemy_id: u32, x: f32, y: f32 },
    PlayerHit { damage: f32, health: f32 },
    GameOver { score: u32 },
}

pub struct Arena {
    config: ArenaConfig,
    seed: u64,
    phase: ArenaPhase,
    tick: u64,
    score: u32,
    player: Player,
    enemies: Vec<Enemy>,
    bullets: Vec<Projectile>,
    enemy_bullets: Vec<Projectile>,
    spawn_counter: u32,
    next_enemy_id: u32,
    rng: ChaCha8Rng,
    clock: Arc<dyn Clock>,
}

impl Arena {
    pub fn new(seed: u64, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(ArenaConfig::default(), seed, clock)
    }

    pub fn with_config(config: ArenaConfig, seed: u64, clock: Arc<dyn Clock>) -> Self {
        let mut arena = Self {
            config,
            seed,
            phase: ArenaPhase::Running,
            tick: 0,
            score: 0,
            player: Player::with_stats(config.player_start, config.player),
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            spawn_counter: 0,
            next_enemy_id: 1,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock,
        };
        for _ in 0..config.initial_enemies {
            arena.spawn_enemy();
        }
        arena
    }

    /// Start over with a fresh random stream derived from the original seed
    pub fn restart(&mut self) {
        let seed = self.seed.wrapping_add(self.tick).wrapping_add(1);
        *self = Self::with_config(self.config, seed, self.clock.clone());
    }

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bullets(&self) -> &[Projectile] {
        &self.bullets
    }

    pub fn enemy_bullets(&self) -> &[Projectile] {
        &self.enemy_bullets
    }

    /// Run one simulation tick. Does nothing once the game is over.
    pub fn step(&mut self, input: &TickInput) -> Vec<ArenaEvent> {
        let mut events = Vec::new();
        if self.phase == ArenaPhase::GameOver {
            return events;
        }

        self.tick += 1;
        let now = self.clock.now_millis();

        self.apply_input(input, now, &mut events);
        self.player.update(input.keys);
        self.update_enemies(now, &mut events);
        self.update_player_bullets(&mut events);
        self.update_enemy_bullets(&mut events);
        self.apply_contact_damage();

        self.enemies.retain(|e| !e.is_dead());

        self.spawn_counter += 1;
        if self.spawn_counter > self.config.spawn_rate {
            let id = self.spawn_enemy();
            events.push(ArenaEvent::EnemySpawned { enemy_id: id });
            self.spawn_counter = 0;
        }

        if self.player.is_dead() {
            self.phase = ArenaPhase::GameOver;
            events.push(ArenaEvent::GameOver { score: self.score });
        }

        events
    }

    fn apply_input(&mut self, input: &TickInput, now: u64, events: &mut Vec<ArenaEvent>) {
        if let Some(aim) = input.aim {
            self.player.aim_at(aim);
        }
        if input.toggle_flashlight {
            self.player.toggle_flashlight();
        }
        if input.shoot {
            if let Some(bullet) = self.player.try_shoot(now) {
                self.bullets.push(bullet);
                let shot_pos = self.player.pos;
                for enemy in self.enemies.iter_mut() {
                    enemy.on_shot_heard(shot_pos, now);
                }
                events.push(ArenaEvent::ShotFired {
                    x: shot_pos.x,
                    y: shot_pos.y,
                });
            }
        }
    }

    fn update_enemies(&mut self, now: u64, events: &mut Vec<ArenaEvent>) {
        let target = self.player.snapshot();
        for enemy in self.enemies.iter_mut() {
            if let Some(bullet) = enemy.tick(&target, now, &mut self.rng) {
                self.enemy_bullets.push(bullet);
                events.push(ArenaEvent::EnemyFired { enemy_id: enemy.id });
            }
        }
    }

    fn update_player_bullets(&mut self, events: &mut Vec<ArenaEvent>) {
        let Arena {
            bullets,
            enemies,
            score,
            config,
            ..
        } = self;
        let hit_radius = ProjectileStats::PLAYER.hit_radius;

        bullets.retain_mut(|bullet| {
            if !bullet.step() {
                return false;
            }
            // Newest enemies are checked first.
            for enemy in enemies.iter_mut().rev() {
                if enemy.is_dead() || !bullet.hits(enemy.pos, hit_radius) {
                    continue;
                }
                *score += config.hit_score;
                if enemy.take_hit() {
                    *score += config.kill_bonus;
                    debug!(enemy_id = enemy.id, "Enemy killed");
                    events.push(ArenaEvent::EnemyKilled {
                        enemy_id: enemy.id,
                        x: enemy.pos.x,
                        y: enemy.pos.y,
                    });
                }
                return false;
            }
            true
        });
    }

    fn update_enemy_bullets(&mut self, events: &mut Vec<ArenaEvent>) {
        let Arena {
            enemy_bullets,
            player,
            config,
            ..
        } = self;
        let hit_radius = ProjectileStats::ENEMY.hit_radius;

        enemy_bullets.retain_mut(|bullet| {
            if !bullet.step() {
                return false;
            }
            if bullet.hits(player.pos, hit_radius) {
                player.take_damage(config.enemy_bullet_damage);
                events.push(ArenaEvent::PlayerHit {
                    damage: config.enemy_bullet_damage,
                    health: player.health,
                });
                return false;
            }
            true
        });
    }

    fn apply_contact_damage(&mut self) {
        let touching = self
            .enemies
            .iter()
            .filter(|e| !e.is_dead())
            .filter(|e| e.pos.distance_to(self.player.pos) < self.config.contact_radius)
            .count();
        for _ in 0..touching {
            self.player.take_damage(self.config.contact_damage);
        }
    }

    /// Spawn an enemy just outside a random edge, returns its id
    fn spawn_enemy(&mut self) -> u32 {
        let pos = match self.rng.gen_range(0..4) {
            0 => Vec2::new(self.rng.gen_range(0.0..=ARENA_WIDTH), -SPAWN_OFFSET),
            1 => Vec2::new(ARENA_WIDTH + SPAWN_OFFSET, self.rng.gen_range(0.0..=ARENA_HEIGHT)),
            2 => Vec2::new(self.rng.gen_range(0.0..=ARENA_WIDTH), ARENA_HEIGHT + SPAWN_OFFSET),
            _ => Vec2::new(-SPAWN_OFFSET, self.rng.gen_range(0.0..=ARENA_HEIGHT)),
        };

        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies
            .push(Enemy::spawn_with(id, pos, self.config.enemy, &mut self.rng));
        debug!(enemy_id = id, x = pos.x, y = pos.y, "Enemy spawned");
        id
    }
}
