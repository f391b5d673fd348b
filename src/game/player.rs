//! Player actor: movement, aiming, ammo and the flashlight

use serde::Serialize;

use super::kinematics::{KinematicsSystem, MoveKeys, Vec2};
use super::perception::SensingCone;
use super::projectile::{Projectile, ProjectileStats};

/// Player constants
#[derive(Debug, Clone, Copy)]
pub struct PlayerStats {
    pub speed: f32,
    pub max_health: f32,
    pub max_ammo: f32,
    /// Ammo regained per tick
    pub ammo_regen: f32,
    pub shot_cooldown_ms: u64,
    pub flashlight_range: f32,
    pub flashlight_half_angle: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: 150.0,
            max_health: 100.0,
            max_ammo: 30.0,
            ammo_regen: 0.08,
            shot_cooldown_ms: 100,
            flashlight_range: 220.0,
            flashlight_half_angle: 0.6,
        }
    }
}

/// The state enemies react to each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub flashlight_on: bool,
    pub flashlight_range: f32,
    pub flashlight_angle: f32,
}

impl PlayerSnapshot {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// The flashlight beam as a sensing cone
    pub fn flashlight(&self) -> SensingCone {
        SensingCone {
            origin: self.position(),
            facing: self.angle,
            range: self.flashlight_range,
            half_angle: self.flashlight_angle,
            enabled: self.flashlight_on,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub ammo: f32,
    pub flashlight_on: bool,
    pub stats: PlayerStats,
    last_shot_ms: Option<u64>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self::with_stats(pos, PlayerStats::default())
    }

    pub fn with_stats(pos: Vec2, stats: PlayerStats) -> Self {
        Self {
            pos,
            angle: 0.0,
            health: stats.max_health,
            ammo: stats.max_ammo,
            flashlight_on: true,
            stats,
            last_shot_ms: None,
        }
    }

    /// Face toward a pointer position. Non-finite points are ignored.
    pub fn aim_at(&mut self, point: Vec2) {
        if !point.is_finite() {
            return;
        }
        let delta = point - self.pos;
        self.angle = delta.y.atan2(delta.x);
    }

    pub fn toggle_flashlight(&mut self) {
        self.flashlight_on = !self.flashlight_on;
    }

    /// Per-tick movement and ammo regeneration
    pub fn update(&mut self, keys: MoveKeys) {
        let vel = KinematicsSystem::key_velocity(keys, self.stats.speed);
        let moved = KinematicsSystem::step(self.pos, vel);
        // No bounce for the player, just clamp.
        let (clamped, _) = KinematicsSystem::clamp_to_walls(moved);
        self.pos = clamped;

        if self.ammo < self.stats.max_ammo {
            self.ammo = (self.ammo + self.stats.ammo_regen).min(self.stats.max_ammo);
        }
    }

    /// Fire along the facing angle.
    /// Returns the bullet, or `None` when out of ammo or still cooling down.
    pub fn try_shoot(&mut self, now_ms: u64) -> Option<Projectile> {
        if self.ammo <= 0.0 {
            return None;
        }
        if let Some(last) = self.last_shot_ms {
            if now_ms.saturating_sub(last) < self.stats.shot_cooldown_ms {
                return None;
            }
        }

        self.last_shot_ms = Some(now_ms);
        // A partly regenerated round still fires; ammo never goes below zero.
        self.ammo = (self.ammo - 1.0).max(0.0);
        Some(Projectile::new(self.pos, self.angle, &ProjectileStats::PLAYER))
    }

    /// Apply damage, returns true if the player died
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.pos.x,
            y: self.pos.y,
            angle: self.angle,
            flashlight_on: self.flashlight_on,
            flashlight_range: self.stats.flashlight_range,
            flashlight_angle: self.stats.flashlight_half_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_is_clamped_without_bounce() {
        let mut player = Player::new(Vec2::new(12.0, 300.0));
        let keys = MoveKeys {
            left: true,
            ..Default::default()
        };
        player.update(keys);
        assert_eq!(player.pos.x, 10.0);
        player.update(keys);
        assert_eq!(player.pos.x, 10.0);
    }

    #[test]
    fn shooting_respects_cooldown_and_ammo() {
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        assert!(player.try_shoot(1_000).is_some());
        assert!(player.try_shoot(1_050).is_none());
        assert!(player.try_shoot(1_100).is_some());
        assert_eq!(player.ammo, 28.0);

        player.ammo = 0.0;
        assert!(player.try_shoot(5_000).is_none());
    }

    #[test]
    fn partial_round_fires_without_going_negative() {
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        player.ammo = 0.0;
        player.update(MoveKeys::default());
        assert!((player.ammo - 0.08).abs() < 1e-6);

        assert!(player.try_shoot(1_000).is_some());
        assert_eq!(player.ammo, 0.0);
        assert!(player.try_shoot(2_000).is_none());
        assert!((0.0..=player.stats.max_ammo).contains(&player.ammo));
    }

    #[test]
    fn ammo_regenerates_up_to_max() {
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        player.ammo = 29.95;
        player.update(MoveKeys::default());
        assert_eq!(player.ammo, 30.0);
        player.ammo = 10.0;
        player.update(MoveKeys::default());
        assert!((player.ammo - 10.08).abs() < 1e-4);
    }

    #[test]
    fn aiming_points_the_flashlight() {
        let mut player = Player::new(Vec2::new(100.0, 250.0));
        player.aim_at(Vec2::new(100.0, 100.0));
        assert!((player.angle + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        player.aim_at(Vec2::new(f32::NAN, 0.0));
        assert!((player.angle + std::f32::consts::FRAC_PI_2).abs() < 1e-5);

        let cone = player.snapshot().flashlight();
        assert!(cone.enabled);
        assert_eq!(cone.range, 220.0);
        player.toggle_flashlight();
        assert!(!player.snapshot().flashlight().enabled);
    }

    #[test]
    fn health_clamps_at_zero() {
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        assert!(!player.take_damage(8.0));
        assert!(player.take_damage(500.0));
        assert_eq!(player.health, 0.0);
    }
}
