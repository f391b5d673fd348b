//! Enemy behavior: patrol / chase / investigate state machine
//!
//! Each tick an enemy first resolves its state from what it currently perceives
//! and what it last heard, then picks a velocity for that state, integrates it,
//! and finally (while chasing) rolls to fire at the player.

use std::f32::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::kinematics::{KinematicsSystem, Vec2};
use super::perception::PerceptionModel;
use super::player::PlayerSnapshot;
use super::projectile::{Projectile, ProjectileStats};

/// Behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    /// Random walk
    #[default]
    Patrol,
    /// Direct pursuit of a visible player
    Chase,
    /// Walking to the last heard gunshot
    Investigate,
}

/// Enemy behavior constants
#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Movement speed in units per second
    pub speed: f32,
    pub starting_health: i32,
    /// Gunshots closer than this are heard
    pub hearing_radius: f32,
    /// How long a heard gunshot stays interesting
    pub investigate_window_ms: u64,
    /// Closer than this to the gunshot counts as arrived
    pub investigate_arrive_dist: f32,
    pub investigate_speed_factor: f32,
    /// Per-tick velocity decay once arrived
    pub arrive_decay: f32,
    pub patrol_ticks_min: u32,
    pub patrol_ticks_max: u32,
    /// Probability of firing on each chasing tick
    pub fire_chance: f64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 80.0,
            starting_health: 1,
            hearing_radius: 300.0,
            investigate_window_ms: 3_000,
            investigate_arrive_dist: 5.0,
            investigate_speed_factor: 0.8,
            arrive_decay: 0.8,
            patrol_ticks_min: 100,
            patrol_ticks_max: 300,
            fire_chance: 0.03,
        }
    }
}

/// A gunshot the enemy heard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeardShot {
    pub pos: Vec2,
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub state: EnemyState,
    pub patrol_angle: f32,
    /// Ticks left before a new patrol heading is drawn
    pub patrol_timer: u32,
    pub heard: Option<HeardShot>,
    pub tuning: EnemyTuning,
}

impl Enemy {
    pub fn spawn<R: Rng>(id: u32, pos: Vec2, rng: &mut R) -> Self {
        Self::spawn_with(id, pos, EnemyTuning::default(), rng)
    }

    pub fn spawn_with<R: Rng>(
        id: u32,
        pos: Vec2,
        tuning: EnemyTuning,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            health: tuning.starting_health,
            state: EnemyState::Patrol,
            patrol_angle: rng.gen_range(0.0..TAU),
            patrol_timer: rng.gen_range(tuning.patrol_ticks_min..=tuning.patrol_ticks_max),
            heard: None,
            tuning,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Remove one hit point, returns true if this killed the enemy
    pub fn take_hit(&mut self) -> bool {
        self.health -= 1;
        self.is_dead()
    }

    /// Register a gunshot. Heard in every state; only the next state
    /// resolution decides whether it matters.
    pub fn on_shot_heard(&mut self, pos: Vec2, now_ms: u64) {
        if !pos.is_finite() {
            return;
        }
        if self.pos.distance_to(pos) < self.tuning.hearing_radius {
            self.heard = Some(HeardShot { pos, at_ms: now_ms });
        }
    }

    /// Resolve this tick's state, in priority order: seen, heard, neither.
    pub fn resolve_state(&mut self, target: &PlayerSnapshot, now_ms: u64) -> EnemyState {
        let visible = PerceptionModel::can_see(&target.flashlight(), self.pos);
        let window = self.tuning.investigate_window_ms;
        let recent_shot = self
            .heard
            .filter(|shot| now_ms.saturating_sub(shot.at_ms) < window)
            .is_some();

        self.state = if visible {
            self.heard = None;
            EnemyState::Chase
        } else if recent_shot {
            EnemyState::Investigate
        } else {
            self.heard = None;
            EnemyState::Patrol
        };
        self.state
    }

    /// Pick this tick's velocity for the current state
    pub fn steer<R: Rng>(&mut self, target: &PlayerSnapshot, rng: &mut R) {
        let speed = self.tuning.speed;
        match self.state {
            EnemyState::Chase => {
                self.vel = self
                    .pos
                    .toward(target.position(), speed)
                    .unwrap_or(Vec2::ZERO);
            }
            EnemyState::Investigate => {
                let goal = self.heard.map(|shot| shot.pos);
                match goal {
                    Some(goal)
                        if self.pos.distance_to(goal) > self.tuning.investigate_arrive_dist =>
                    {
                        let pace = speed * self.tuning.investigate_speed_factor;
                        self.vel = self.pos.toward(goal, pace).unwrap_or(Vec2::ZERO);
                    }
                    _ => {
                        self.vel = self.vel.scale(self.tuning.arrive_decay);
                    }
                }
            }
            EnemyState::Patrol => {
                self.patrol_timer = self.patrol_timer.saturating_sub(1);
                if self.patrol_timer == 0 {
                    self.patrol_angle = rng.gen_range(0.0..TAU);
                    self.patrol_timer = rng
                        .gen_range(self.tuning.patrol_ticks_min..=self.tuning.patrol_ticks_max);
                }
                self.vel = Vec2::from_angle(self.patrol_angle, speed);
            }
        }
    }

    /// Move by one tick and keep inside the walls.
    /// Wall hits bend the patrol heading, never the current velocity.
    pub fn integrate(&mut self) {
        let moved = KinematicsSystem::step(self.pos, self.vel);
        let (clamped, contact) = KinematicsSystem::clamp_to_walls(moved);
        self.pos = clamped;

        if contact.vertical {
            self.patrol_angle = PI - self.patrol_angle;
        }
        if contact.horizontal {
            self.patrol_angle = -self.patrol_angle;
        }
    }

    /// Bernoulli trial per chasing tick; no cooldown.
    pub fn try_fire<R: Rng>(
        &self,
        target: &PlayerSnapshot,
        rng: &mut R,
    ) -> Option<Projectile> {
        if self.state != EnemyState::Chase {
            return None;
        }
        if !rng.gen_bool(self.tuning.fire_chance) {
            return None;
        }
        Projectile::aimed_at(self.pos, target.position(), &ProjectileStats::ENEMY)
    }

    /// Full per-tick update. Returns a projectile if the enemy fired.
    pub fn tick<R: Rng>(
        &mut self,
        target: &PlayerSnapshot,
        now_ms: u64,
        rng: &mut R,
    ) -> Option<Projectile> {
        self.resolve_state(target, now_ms);
        self.steer(target, rng);
        self.integrate();
        self.try_fire(target, rng)
    }
}
