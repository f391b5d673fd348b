//! Projectiles fired by the player and by enemies

use serde::{Deserialize, Serialize};

use super::kinematics::{KinematicsSystem, Vec2};

/// Projectile stats per shooter kind
#[derive(Debug, Clone, Copy)]
pub struct ProjectileStats {
    /// Travel speed in units per second
    pub speed: f32,
    /// Lifetime in ticks
    pub life: i32,
    /// Distance at which the projectile connects with its target
    pub hit_radius: f32,
}

impl ProjectileStats {
    /// Player bullets
    pub const PLAYER: ProjectileStats = ProjectileStats {
        speed: 350.0,
        life: 100,
        hit_radius: 10.0,
    };

    /// Enemy bullets
    pub const ENEMY: ProjectileStats = ProjectileStats {
        speed: 250.0,
        life: 80,
        hit_radius: 8.0,
    };
}

/// Active projectile in the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: i32,
}

impl Projectile {
    /// Create a projectile travelling along `direction` (radians)
    pub fn new(origin: Vec2, direction: f32, stats: &ProjectileStats) -> Self {
        let vel = Vec2::from_angle(direction, stats.speed);
        Self {
            x: origin.x,
            y: origin.y,
            vx: vel.x,
            vy: vel.y,
            life: stats.life,
        }
    }

    /// Create a projectile aimed at a point. `None` if origin and target coincide.
    pub fn aimed_at(origin: Vec2, target: Vec2, stats: &ProjectileStats) -> Option<Self> {
        let vel = origin.toward(target, stats.speed)?;
        Some(Self {
            x: origin.x,
            y: origin.y,
            vx: vel.x,
            vy: vel.y,
            life: stats.life,
        })
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Advance one tick; returns false once expired or outside the arena
    pub fn step(&mut self) -> bool {
        let pos = KinematicsSystem::step(self.position(), Vec2::new(self.vx, self.vy));
        self.x = pos.x;
        self.y = pos.y;
        self.life -= 1;
        self.life > 0 && KinematicsSystem::in_arena(pos)
    }

    /// Check collision with a target
    pub fn hits(&self, target: Vec2, radius: f32) -> bool {
        self.position().distance_to(target) < radius
    }
}
