//! Note Invaders - type the note to shoot the falling asteroid
//!
//! Core modules:
//! - `note`: Note parsing/normalization and the fixed note table
//! - `sim`: Deterministic simulation (entities, tick, collisions)
//! - `input`: Typed-note buffer, keypad and target matching
//! - `driver`: Fixed-rate frame gate for the game loop
//! - `session`: One play session tying the above together
//! - `settings`: Difficulty and loop configuration

pub mod driver;
pub mod input;
pub mod note;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Session, Snapshot};
pub use settings::{DifficultyPreset, Settings, SettingsError, TimestepMode};

use glam::Vec2;

/// Game configuration constants
///
/// All positions are field percentages: (0, 0) is bottom-left, (100, 100) top-right.
pub mod consts {
    use glam::Vec2;

    /// Nominal simulation rate (ticks per second)
    pub const DEFAULT_FPS: u32 = 144;
    /// Maximum substeps per frame in accumulator mode
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 100.0;
    pub const FIELD_HEIGHT: f32 = 100.0;

    /// Projectile travel per tick
    pub const PROJECTILE_SPEED: f32 = 3.0;
    /// Projectile is discarded once this close to its aim point
    pub const ARRIVAL_THRESHOLD: f32 = 1.0;
    /// Every shot leaves from the cannon at the bottom center
    pub const PROJECTILE_ORIGIN: Vec2 = Vec2::new(50.0, 0.0);

    /// Target descent per tick at difficulty 1
    pub const BASE_DESCENT_RATE: f32 = 0.1;
    /// Ticks between spawns at difficulty 1
    pub const SPAWN_PERIOD_BASE: f32 = 600.0;
    /// Spawn band: targets start inside the middle 80% of the field width
    pub const SPAWN_MARGIN: f32 = 0.1;

    /// Targets below this are gone from the field
    pub const TARGET_REMOVAL_FLOOR: f32 = -11.0;
    /// A target at or below this line ends the game
    pub const GAME_OVER_LINE: f32 = -10.0;
    /// Targets at or below this height show their answer
    pub const HINT_HEIGHT: f32 = 10.0;

    /// Per-axis hit distance (strict)
    pub const COLLISION_THRESHOLD: f32 = 5.0;

    /// How long "Missed!" stays on screen
    pub const MISS_MESSAGE_MS: f64 = 1000.0;
    pub const MISS_MESSAGE: &str = "Missed!";
}

/// Facing angle of the cannon, in degrees, when aiming at `aim`.
///
/// 0 points straight up, positive turns clockwise. Presentation only.
#[inline]
pub fn facing_angle(aim: Vec2) -> f32 {
    let offset = aim - consts::PROJECTILE_ORIGIN;
    90.0 - offset.y.atan2(offset.x).to_degrees()
}

/// True if `pos` lies inside the closed field rectangle
#[inline]
pub fn in_field(pos: Vec2) -> bool {
    (0.0..=consts::FIELD_WIDTH).contains(&pos.x) && (0.0..=consts::FIELD_HEIGHT).contains(&pos.y)
}
