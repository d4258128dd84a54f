//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, entities removed by ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Hit, is_collision, resolve_collisions};
pub use state::{GameEvent, GameState, Projectile, Target};
pub use tick::{advance_projectiles, advance_targets, tick};
