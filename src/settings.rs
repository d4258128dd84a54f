//! Game settings
//!
//! Chosen once at session start. The web host reads the difficulty from the
//! page query string (`?difficulty=2`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_FPS, MISS_MESSAGE_MS};

/// Settings parse/validation failures
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("difficulty '{0}' is not a number")]
    InvalidDifficulty(String),
    #[error("difficulty must be positive, got {0}")]
    NonPositiveDifficulty(f32),
    #[error("fps must be at least 1")]
    ZeroFps,
    #[error("malformed settings: {0}")]
    Json(String),
}

/// Named difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Medium => "Medium",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "medium" | "med" => Some(DifficultyPreset::Medium),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Difficulty factor for this preset
    pub fn factor(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 1.0,
            DifficultyPreset::Medium => 2.0,
            DifficultyPreset::Hard => 3.0,
        }
    }
}

/// How the game loop turns wall-clock time into ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimestepMode {
    /// At most one tick per frame, leftover time dropped
    #[default]
    FrameSkip,
    /// Leftover time carried over, several ticks per frame if needed
    Accumulator,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scales descent speed up and spawn period down
    pub difficulty: f32,
    /// Nominal ticks per second
    pub fps: u32,
    pub timestep: TimestepMode,
    /// Fixed run seed (None = seed from the clock)
    pub seed: Option<u64>,
    /// How long the "Missed!" message stays up
    pub miss_message_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Easy.factor(),
            fps: DEFAULT_FPS,
            timestep: TimestepMode::FrameSkip,
            seed: None,
            miss_message_ms: MISS_MESSAGE_MS,
        }
    }
}

impl Settings {
    /// Settings at a preset difficulty
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        Self {
            difficulty: preset.factor(),
            ..Self::default()
        }
    }

    /// Parse a difficulty value: a positive number or a preset name
    pub fn parse_difficulty(raw: &str) -> Result<f32, SettingsError> {
        let raw = raw.trim();
        if let Some(preset) = DifficultyPreset::from_str(raw) {
            return Ok(preset.factor());
        }
        let value: f32 = raw
            .parse()
            .map_err(|_| SettingsError::InvalidDifficulty(raw.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(SettingsError::NonPositiveDifficulty(value));
        }
        Ok(value)
    }

    /// Apply a difficulty value, keeping the current one if it is invalid
    pub fn set_difficulty(&mut self, raw: &str) -> Result<(), SettingsError> {
        match Self::parse_difficulty(raw) {
            Ok(value) => {
                self.difficulty = value;
                Ok(())
            }
            Err(e) => {
                log::warn!("{}; keeping difficulty {}", e, self.difficulty);
                Err(e)
            }
        }
    }

    /// Build settings from a page query string such as `?difficulty=2&fps=60`.
    ///
    /// Unknown keys are ignored; bad values are logged and left at default.
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "difficulty" => {
                    let _ = settings.set_difficulty(value);
                }
                "fps" => match value.parse::<u32>() {
                    Ok(fps) if fps > 0 => settings.fps = fps,
                    _ => log::warn!("Ignoring fps '{}'", value),
                },
                "seed" => match value.parse::<u64>() {
                    Ok(seed) => settings.seed = Some(seed),
                    Err(_) => log::warn!("Ignoring seed '{}'", value),
                },
                "timestep" => match value {
                    "accumulator" => settings.timestep = TimestepMode::Accumulator,
                    "frameskip" => settings.timestep = TimestepMode::FrameSkip,
                    _ => log::warn!("Ignoring timestep '{}'", value),
                },
                _ => {}
            }
        }
        settings
    }

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Json(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.difficulty.is_finite() || self.difficulty <= 0.0 {
            return Err(SettingsError::NonPositiveDifficulty(self.difficulty));
        }
        if self.fps == 0 {
            return Err(SettingsError::ZeroFps);
        }
        Ok(())
    }

    /// Milliseconds between ticks
    pub fn tick_interval_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }
}
