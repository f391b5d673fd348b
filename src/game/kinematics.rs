//! Fixed-timestep kinematics shared by the player, enemies and projectiles

use serde::{Deserialize, Serialize};

use crate::util::time::tick_delta;

/// Arena width in world units
pub const ARENA_WIDTH: f32 = 800.0;
/// Arena height in world units
pub const ARENA_HEIGHT: f32 = 600.0;
/// Actors are kept this far inside the arena edges
pub const WALL_MARGIN: f32 = 10.0;

/// 2D point or vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(&self, other: Vec2) -> f32 {
        (other - *self).length()
    }

    pub fn scale(&self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    /// Vector of length `speed` pointing from `self` to `target`.
    /// Returns `None` when the two points coincide.
    pub fn toward(&self, target: Vec2, speed: f32) -> Option<Vec2> {
        let delta = target - *self;
        let dist = delta.length();
        if dist <= f32::EPSILON {
            return None;
        }
        Some(delta.scale(speed / dist))
    }

    /// Unit heading vector for an angle in radians, scaled by `speed`
    pub fn from_angle(angle: f32, speed: f32) -> Vec2 {
        Vec2::new(angle.cos() * speed, angle.sin() * speed)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Which walls an actor was pushed back from during clamping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    /// Left or right wall
    pub vertical: bool,
    /// Top or bottom wall
    pub horizontal: bool,
}

impl WallContact {
    pub fn any(&self) -> bool {
        self.vertical || self.horizontal
    }
}

/// Directional movement keys held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Kinematics system for integrating positions
pub struct KinematicsSystem;

impl KinematicsSystem {
    /// Advance `pos` by `vel * dt`.
    /// Non-finite velocities are rejected and leave the position unchanged.
    pub fn integrate(pos: Vec2, vel: Vec2, dt: f32) -> Vec2 {
        if !vel.is_finite() || !pos.is_finite() {
            return pos;
        }
        pos + vel.scale(dt)
    }

    /// Advance by one fixed simulation tick
    pub fn step(pos: Vec2, vel: Vec2) -> Vec2 {
        Self::integrate(pos, vel, tick_delta())
    }

    /// Clamp a position into `[10,790]×[10,590]`, reporting the walls touched
    pub fn clamp_to_walls(pos: Vec2) -> (Vec2, WallContact) {
        let mut contact = WallContact::default();
        let mut out = pos;

        let min_x = WALL_MARGIN;
        let max_x = ARENA_WIDTH - WALL_MARGIN;
        let min_y = WALL_MARGIN;
        let max_y = ARENA_HEIGHT - WALL_MARGIN;

        if out.x < min_x {
            out.x = min_x;
            contact.vertical = true;
        }
        if out.x > max_x {
            out.x = max_x;
            contact.vertical = true;
        }
        if out.y < min_y {
            out.y = min_y;
            contact.horizontal = true;
        }
        if out.y > max_y {
            out.y = max_y;
            contact.horizontal = true;
        }

        (out, contact)
    }

    /// Whether a point lies inside the full arena rectangle `[0,800]×[0,600]`
    pub fn in_arena(pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= ARENA_WIDTH && pos.y >= 0.0 && pos.y <= ARENA_HEIGHT
    }

    /// Axis-aligned player velocity.
    ///
    /// Each held key sets its axis to `±speed` independently, so diagonals run
    /// at `speed * √2`. When opposing keys are both held, down and right win.
    pub fn key_velocity(keys: MoveKeys, speed: f32) -> Vec2 {
        let mut vel = Vec2::ZERO;
        if keys.up {
            vel.y = -speed;
        }
        if keys.down {
            vel.y = speed;
        }
        if keys.left {
            vel.x = -speed;
        }
        if keys.right {
            vel.x = speed;
        }
        vel
    }
}
