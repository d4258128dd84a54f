//! Projectile/target hit resolution
//!
//! Hits use an independent per-axis test (a square, not a circle): both
//! `|dx|` and `|dy|` must be strictly below the threshold.

use glam::Vec2;

use super::state::{GameEvent, GameState};
use crate::consts::COLLISION_THRESHOLD;

/// A resolved projectile/target pair
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub projectile_id: u32,
    pub target_id: u32,
}

/// Check whether a projectile at `shot` overlaps a target at `target`
#[inline]
pub fn is_collision(shot: Vec2, target: Vec2) -> bool {
    let d = (shot - target).abs();
    d.x < COLLISION_THRESHOLD && d.y < COLLISION_THRESHOLD
}

/// Resolve every live projectile against every live target.
///
/// Each projectile can destroy at most one target per pass. When it overlaps
/// several, the earliest-spawned target wins. Both sides of a hit are removed
/// by ID, the score goes up by one per hit and an `Explosion` is queued.
pub fn resolve_collisions(state: &mut GameState) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();

    for projectile in &state.projectiles {
        let found = state.targets.iter().find(|target| {
            !hits.iter().any(|h| h.target_id == target.id)
                && is_collision(projectile.pos, target.pos)
        });
        if let Some(target) = found {
            hits.push(Hit {
                projectile_id: projectile.id,
                target_id: target.id,
            });
        }
    }

    for hit in &hits {
        state.remove_projectile(hit.projectile_id);
        if let Some(target) = state.target(hit.target_id) {
            let note = target.note().to_string();
            log::debug!("Target {} '{}' destroyed", hit.target_id, note);
            state.events.push(GameEvent::Explosion {
                target_id: hit.target_id,
                note,
            });
        }
        state.remove_target(hit.target_id);
    }

    state.score += hits.len() as u64;
    hits
}
