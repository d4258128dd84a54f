//! A single play session
//!
//! `Session` owns the game state, the input buffer and the frame gate. Hosts
//! feed it input commands and animation frames, then read a [`Snapshot`] and
//! drain events. All mutation goes through `&mut Session`, so a host that
//! shares it between callbacks has to serialize access (the web host keeps it
//! in a `RefCell`).

use glam::Vec2;
use serde::Serialize;

use crate::consts::HINT_HEIGHT;
use crate::driver::FrameGate;
use crate::input::{InputCommand, InputController, MatchOutcome};
use crate::note;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, tick};

/// A projectile as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec2,
}

/// A target as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub id: u32,
    pub pos: Vec2,
    pub note: String,
    /// Answer label, shown once the target is close to the bottom
    pub hint: Option<String>,
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub projectiles: Vec<ProjectileView>,
    pub targets: Vec<TargetView>,
    pub score: u64,
    pub game_over: bool,
    /// Cannon facing in degrees
    pub angle: f32,
    /// Buffer in display form
    pub typed: String,
    pub message: Option<String>,
    pub difficulty: f32,
    pub time_ticks: u64,
}

impl Snapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("Snapshot serialization failed: {}", e);
            String::from("{}")
        })
    }
}

pub struct Session {
    settings: Settings,
    state: GameState,
    input: InputController,
    gate: FrameGate,
}

impl Session {
    /// Start a session at `now_ms`
    pub fn new(settings: Settings, seed: u64, now_ms: f64) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        log::info!(
            "Session starting (seed {}, difficulty {}, {} fps, {:?})",
            seed,
            settings.difficulty,
            settings.fps,
            settings.timestep
        );
        Self {
            state: GameState::new(seed, settings.difficulty),
            input: InputController::new(settings.miss_message_ms),
            gate: FrameGate::new(settings.fps, settings.timestep, now_ms),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    /// Apply one input event
    pub fn handle(&mut self, command: InputCommand, now_ms: f64) -> Option<MatchOutcome> {
        self.input.handle(command, &mut self.state, now_ms)
    }

    /// Called once per animation frame. Returns the number of ticks run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        self.input.expire_message(now_ms);
        let due = self.gate.poll(now_ms);
        let mut ran = 0;
        for _ in 0..due {
            if self.state.game_over {
                break;
            }
            tick(&mut self.state);
            ran += 1;
        }
        ran
    }

    /// Throw the session away and start over with the same settings
    pub fn reset(&mut self, seed: u64, now_ms: f64) {
        let seed = self.settings.seed.unwrap_or(seed);
        log::info!(
            "Session reset (seed {}, previous score {})",
            seed,
            self.state.score
        );
        self.state = GameState::new(seed, self.settings.difficulty);
        self.input = InputController::new(self.settings.miss_message_ms);
        self.gate.restart(now_ms);
    }

    /// Stop ticking. Safe to call more than once.
    pub fn stop(&mut self) {
        self.gate.stop();
    }

    /// Pending presentation cues, oldest first
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    pub fn snapshot(&self, now_ms: f64) -> Snapshot {
        let state = &self.state;
        Snapshot {
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView { id: p.id, pos: p.pos })
                .collect(),
            targets: state
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    pos: t.pos,
                    note: t.note().to_string(),
                    hint: (t.pos.y <= HINT_HEIGHT).then(|| note::display_label(t.note())),
                })
                .collect(),
            score: state.score,
            game_over: state.game_over,
            angle: state.aim_angle,
            typed: self.input.display(),
            message: self.input.message(now_ms).map(String::from),
            difficulty: state.difficulty,
            time_ticks: state.time_ticks,
        }
    }
}
