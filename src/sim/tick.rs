//! Fixed timestep simulation tick
//!
//! One call advances the field by one step:
//! 1. bump the tick counter
//! 2. fly projectiles toward their aim points
//! 3. drop targets by the descent rate
//! 4. latch game over if a target reached the bottom line
//! 5. resolve hits
//! 6. spawn a target when the spawn period comes around

use super::collision::resolve_collisions;
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::in_field;

/// Advance the game state by one tick.
///
/// Returns the number of targets destroyed this tick. Calling this after game
/// over is a no-op.
pub fn tick(state: &mut GameState) -> u32 {
    if state.game_over {
        return 0;
    }

    // The spawn check uses the count from before this tick, so the very first
    // tick (count 0) always spawns.
    let spawn_tick = state.time_ticks;
    state.time_ticks += 1;

    advance_projectiles(state);
    let landed = advance_targets(state);
    debug_assert!(state.projectiles.iter().all(|p| in_field(p.pos)));
    debug_assert!(
        state
            .targets
            .iter()
            .all(|t| t.pos.y >= TARGET_REMOVAL_FLOOR)
    );

    if landed {
        state.game_over = true;
        log::info!(
            "Game over at tick {} with score {}",
            state.time_ticks,
            state.score
        );
        state.events.push(GameEvent::GameOver { score: state.score });
        return 0;
    }

    let hits = resolve_collisions(state).len() as u32;

    if spawn_tick % state.spawn_period() == 0 {
        state.spawn_random_target();
    }

    hits
}

/// Move every projectile one step toward its aim point.
///
/// A projectile that is already within the arrival threshold is discarded
/// without effect, as is one that leaves the field.
pub fn advance_projectiles(state: &mut GameState) {
    state.projectiles.retain_mut(|projectile| {
        let to_aim = projectile.aim() - projectile.pos;
        let distance = to_aim.length();
        if distance < ARRIVAL_THRESHOLD {
            return false;
        }
        projectile.pos += to_aim / distance * PROJECTILE_SPEED;
        in_field(projectile.pos)
    });
}

/// Drop every target by the descent rate and forget the ones past the floor.
///
/// Returns true if any target is at or below the game-over line. The check
/// runs before the floor removal, so a target falling fast enough to skip
/// the band between line and floor in one step still ends the game.
pub fn advance_targets(state: &mut GameState) -> bool {
    let descent = state.descent_rate();
    let mut landed = false;
    for target in &mut state.targets {
        target.pos.y -= descent;
        landed |= target.pos.y <= GAME_OVER_LINE;
    }
    state.targets.retain(|t| t.pos.y >= TARGET_REMOVAL_FLOOR);
    landed
}
