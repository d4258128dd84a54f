//! Game state and core simulation types
//!
//! `GameState` is the entity store: it owns every live projectile and target.
//! Only the tick engine and the collision resolver remove entities; input may
//! only look targets up and ask for a new projectile.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::facing_angle;
use crate::note::NOTE_TABLE;

/// Discrete cues for the presentation layer (sound, flashes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    /// A matching target was found and a projectile launched at it
    ShotFired { target_id: u32, note: String },
    /// A projectile destroyed a target
    Explosion { target_id: u32, note: String },
    /// A completed note matched nothing
    Missed { typed: String },
    /// A target crossed the bottom line
    GameOver { score: u64 },
}

/// A player-fired shot flying toward a frozen aim point
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Captured at fire time, never updated
    aim: Vec2,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, aim: Vec2) -> Self {
        Self { id, pos, aim }
    }

    pub fn aim(&self) -> Vec2 {
        self.aim
    }
}

/// A falling asteroid carrying a note
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    note: String,
}

impl Target {
    pub fn new(id: u32, pos: Vec2, note: impl Into<String>) -> Self {
        Self {
            id,
            pos,
            note: note.into(),
        }
    }

    /// Canonical note token (immutable for the target's lifetime)
    pub fn note(&self) -> &str {
        &self.note
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Descent and spawn scale, always positive
    pub difficulty: f32,
    /// Targets destroyed so far
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// One-way latch: once set, ticks are no-ops
    pub game_over: bool,
    /// Cannon facing in degrees (presentation only)
    pub aim_angle: f32,
    /// Live projectiles, in fire order
    pub projectiles: Vec<Projectile>,
    /// Live targets, in spawn order
    pub targets: Vec<Target>,
    /// Cues not yet taken by the host
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh session state
    pub fn new(seed: u64, difficulty: f32) -> Self {
        debug_assert!(
            difficulty.is_finite() && difficulty > 0.0,
            "difficulty must be positive, got {difficulty}"
        );
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            difficulty,
            score: 0,
            time_ticks: 0,
            game_over: false,
            aim_angle: 0.0,
            projectiles: Vec::new(),
            targets: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Per-tick descent for the current difficulty
    #[inline]
    pub fn descent_rate(&self) -> f32 {
        BASE_DESCENT_RATE * self.difficulty
    }

    /// Ticks between spawns, rounded to a whole tick (at least 1)
    pub fn spawn_period(&self) -> u64 {
        ((SPAWN_PERIOD_BASE / self.difficulty).round() as u64).max(1)
    }

    /// Add a target at an explicit position
    pub fn spawn_target_at(&mut self, pos: Vec2, note: impl Into<String>) -> u32 {
        let id = self.next_entity_id();
        let target = Target::new(id, pos, note);
        log::debug!(
            "Spawned target {} '{}' at ({:.1}, {:.1})",
            id,
            target.note(),
            pos.x,
            pos.y
        );
        self.targets.push(target);
        id
    }

    /// Add a target at the top of the field with a random column and note
    pub fn spawn_random_target(&mut self) -> u32 {
        let x = self.rng.random::<f32>() * (1.0 - 2.0 * SPAWN_MARGIN) * FIELD_WIDTH
            + SPAWN_MARGIN * FIELD_WIDTH;
        let note = NOTE_TABLE[self.rng.random_range(0..NOTE_TABLE.len())];
        self.spawn_target_at(Vec2::new(x, FIELD_HEIGHT), note)
    }

    /// Look a live target up by ID
    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Launch a projectile from the cannon at a target's current position.
    ///
    /// The aim point is frozen; the target keeps falling. Returns the new
    /// projectile ID, or None if the target is gone or the game is over.
    pub fn fire_at(&mut self, target_id: u32) -> Option<u32> {
        if self.game_over {
            return None;
        }
        let (aim, note) = {
            let target = self.target(target_id)?;
            (target.pos, target.note().to_string())
        };
        let id = self.next_entity_id();
        self.projectiles
            .push(Projectile::new(id, PROJECTILE_ORIGIN, aim));
        self.aim_angle = facing_angle(aim);
        log::debug!("Shot {} fired at target {} '{}'", id, target_id, note);
        self.events.push(GameEvent::ShotFired { target_id, note });
        Some(id)
    }

    /// Remove a projectile by identity. Returns false if it was already gone.
    pub fn remove_projectile(&mut self, id: u32) -> bool {
        let before = self.projectiles.len();
        self.projectiles.retain(|p| p.id != id);
        self.projectiles.len() != before
    }

    /// Remove a target by identity. Returns false if it was already gone.
    pub fn remove_target(&mut self, id: u32) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.targets.len() != before
    }

    /// Hand pending cues to the caller
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = GameState::new(42, 1.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 0);
        assert!(!state.game_over);
        assert!(state.projectiles.is_empty());
        assert!(state.targets.is_empty());
    }

    #[test]
    fn test_spawn_random_target_in_band() {
        let mut state = GameState::new(7, 1.0);
        for _ in 0..200 {
            state.spawn_random_target();
        }
        for target in &state.targets {
            assert!(target.pos.x >= 10.0 && target.pos.x <= 90.0);
            assert_eq!(target.pos.y, FIELD_HEIGHT);
            assert!(NOTE_TABLE.contains(&target.note()));
        }
    }

    #[test]
    fn test_same_seed_same_targets() {
        let mut a = GameState::new(99999, 1.0);
        let mut b = GameState::new(99999, 1.0);
        for _ in 0..10 {
            a.spawn_random_target();
            b.spawn_random_target();
        }
        for (ta, tb) in a.targets.iter().zip(&b.targets) {
            assert_eq!(ta.pos, tb.pos);
            assert_eq!(ta.note(), tb.note());
        }
    }

    #[test]
    fn test_fire_at_freezes_aim() {
        let mut state = GameState::new(1, 1.0);
        let target_id = state.spawn_target_at(Vec2::new(70.0, 60.0), "a2");
        let shot = state.fire_at(target_id).unwrap();

        let projectile = &state.projectiles[0];
        assert_eq!(projectile.id, shot);
        assert_eq!(projectile.pos, PROJECTILE_ORIGIN);
        assert_eq!(projectile.aim(), Vec2::new(70.0, 60.0));
        assert_eq!(
            state.take_events(),
            vec![GameEvent::ShotFired {
                target_id,
                note: "a2".into()
            }]
        );

        // Moving the target afterwards does not re-aim the shot
        state.targets[0].pos.y = 10.0;
        assert_eq!(state.projectiles[0].aim(), Vec2::new(70.0, 60.0));
    }

    #[test]
    fn test_fire_at_missing_target() {
        let mut state = GameState::new(1, 1.0);
        assert!(state.fire_at(12).is_none());
    }

    #[test]
    fn test_fire_at_after_game_over() {
        let mut state = GameState::new(5, 1.0);
        let target_id = state.spawn_target_at(Vec2::new(20.0, 50.0), "g3");
        state.game_over = true;
        assert!(state.fire_at(target_id).is_none());
        assert!(state.projectiles.is_empty());
        assert!(state.take_events().is_empty());
        assert!(state.projectiles.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut state = GameState::new(1, 1.0);
        let a = state.spawn_target_at(Vec2::new(20.0, 50.0), "e2");
        let b = state.spawn_target_at(Vec2::new(40.0, 50.0), "f2");
        let c = state.spawn_target_at(Vec2::new(60.0, 50.0), "g2");

        assert!(state.remove_target(a));
        assert!(state.remove_target(c));
        assert!(!state.remove_target(a));
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].id, b);
    }

    #[test]
    fn test_spawn_period() {
        assert_eq!(GameState::new(1, 1.0).spawn_period(), 600);
        assert_eq!(GameState::new(1, 2.0).spawn_period(), 300);
        assert_eq!(GameState::new(1, 7.0).spawn_period(), 86);
        assert_eq!(GameState::new(1, 10_000.0).spawn_period(), 1);
    }
}
