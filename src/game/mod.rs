//! Game simulation modules

pub mod arena;
pub mod enemy;
pub mod kinematics;
pub mod perception;
pub mod player;
pub mod projectile;
pub mod session;
pub mod snapshot;

pub use arena::{Arena, ArenaConfig, ArenaEvent, ArenaPhase};
pub use session::{ArenaHandle, ArenaRegistry, ArenaSession};

use kinematics::{MoveKeys, Vec2};

/// Input state for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: MoveKeys,
    /// Pointer position to face toward
    pub aim: Option<Vec2>,
    pub shoot: bool,
    pub toggle_flashlight: bool,
}
