//! Typed-note input and target matching
//!
//! The player builds a note one character at a time, by typing or with the
//! on-screen keypad. When the octave digit lands the buffer is matched against
//! the live targets: a match fires a shot, anything else is a miss. Either way
//! the buffer is cleared.

use serde::{Deserialize, Serialize};

use crate::consts::MISS_MESSAGE;
use crate::note::{self, FLAT, LETTERS, MIDDLE_C, OCTAVES, SHARP};
use crate::sim::{GameEvent, GameState, Target};

/// On-screen keypad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeypadKey {
    Letter(char),
    Flat,
    Sharp,
    Octave(u8),
}

/// One external input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputCommand {
    /// New contents of the text box
    Text(String),
    Key(KeypadKey),
    /// The clear button
    Clear,
}

impl InputCommand {
    /// Command for a keypad button label (`c`..`b`, `flat`, `sharp`, `1`..`6`, `clear`)
    pub fn from_keypad_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let key = match label.as_str() {
            "clear" => return Some(InputCommand::Clear),
            "flat" | "♭" => KeypadKey::Flat,
            "sharp" | "♯" => KeypadKey::Sharp,
            other => {
                let mut chars = other.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                if LETTERS.contains(&c) {
                    KeypadKey::Letter(c)
                } else {
                    let n = c.to_digit(10)? as u8;
                    OCTAVES.contains(&n).then_some(KeypadKey::Octave(n))?
                }
            }
        };
        Some(InputCommand::Key(key))
    }
}

/// What a completed note did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Shot { target_id: u32, projectile_id: u32 },
    Missed,
}

#[derive(Debug, Clone)]
struct Message {
    text: &'static str,
    expires_at_ms: f64,
}

/// Find the target a completed token refers to.
///
/// Exact note match first, earliest target wins. Plain `c4` also matches the
/// two middle-C variants; if both are on screen the last one in spawn order
/// is taken.
pub fn find_match(targets: &[Target], token: &str) -> Option<u32> {
    let mut found = targets.iter().find(|t| t.note() == token).map(|t| t.id);
    if token == MIDDLE_C {
        for target in targets {
            if note::is_middle_c_variant(target.note()) {
                found = Some(target.id);
            }
        }
    }
    found
}

/// Typed-note buffer plus the transient "Missed!" message
#[derive(Debug, Clone)]
pub struct InputController {
    /// Normalized buffer contents
    typed: String,
    message: Option<Message>,
    message_ms: f64,
}

impl InputController {
    pub fn new(message_ms: f64) -> Self {
        Self {
            typed: String::new(),
            message: None,
            message_ms,
        }
    }

    /// Normalized buffer
    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Buffer as it should appear in the text box
    pub fn display(&self) -> String {
        note::denormalize(&self.typed)
    }

    /// Message to show at `now_ms`, if any
    pub fn message(&self, now_ms: f64) -> Option<&'static str> {
        self.message
            .as_ref()
            .filter(|m| now_ms < m.expires_at_ms)
            .map(|m| m.text)
    }

    /// Drop the message once its time is up
    pub fn expire_message(&mut self, now_ms: f64) {
        if self.message.as_ref().is_some_and(|m| now_ms >= m.expires_at_ms) {
            self.message = None;
        }
    }

    pub fn clear(&mut self) {
        self.typed.clear();
    }

    /// Apply one input command
    pub fn handle(
        &mut self,
        command: InputCommand,
        state: &mut GameState,
        now_ms: f64,
    ) -> Option<MatchOutcome> {
        match command {
            InputCommand::Text(raw) => self.on_input_change(&raw, state, now_ms),
            InputCommand::Key(key) => self.press(key, state, now_ms),
            InputCommand::Clear => {
                self.clear();
                None
            }
        }
    }

    /// The text box changed to `raw`.
    ///
    /// The buffer only takes the new text when its last character differs from
    /// the buffer's last character. This swallows repeated trailing characters
    /// so one keystroke cannot trigger two matches.
    pub fn on_input_change(
        &mut self,
        raw: &str,
        state: &mut GameState,
        now_ms: f64,
    ) -> Option<MatchOutcome> {
        if state.game_over {
            return None;
        }
        let normalized = note::normalize(raw);
        if normalized.chars().last() == self.typed.chars().last() {
            return None;
        }
        self.typed = normalized;
        self.submit_if_complete(state, now_ms)
    }

    /// A keypad button was pressed.
    ///
    /// Letters only start a note, accidentals only follow a letter, and the
    /// octave follows a letter or a letter plus accidental. Other presses are
    /// ignored.
    pub fn press(
        &mut self,
        key: KeypadKey,
        state: &mut GameState,
        now_ms: f64,
    ) -> Option<MatchOutcome> {
        if state.game_over {
            return None;
        }
        let len = self.typed.chars().count();
        let next = match key {
            KeypadKey::Letter(c) => {
                let c = c.to_ascii_lowercase();
                (len == 0 && LETTERS.contains(&c)).then_some(c)
            }
            KeypadKey::Flat => (len == 1).then_some(FLAT),
            KeypadKey::Sharp => (len == 1).then_some(SHARP),
            KeypadKey::Octave(n) => ((len == 1 || len == 2) && OCTAVES.contains(&n))
                .then(|| char::from(b'0' + n)),
        };
        let c = next?;
        self.typed.push(c);
        self.submit_if_complete(state, now_ms)
    }

    fn submit_if_complete(&mut self, state: &mut GameState, now_ms: f64) -> Option<MatchOutcome> {
        if !note::is_complete(&self.typed) {
            return None;
        }

        let token = std::mem::take(&mut self.typed);
        let outcome = find_match(&state.targets, &token)
            .and_then(|target_id| {
                state.fire_at(target_id).map(|projectile_id| MatchOutcome::Shot {
                    target_id,
                    projectile_id,
                })
            })
            .unwrap_or(MatchOutcome::Missed);

        if outcome == MatchOutcome::Missed {
            log::debug!("No target for '{}'", token);
            self.message = Some(Message {
                text: MISS_MESSAGE,
                expires_at_ms: now_ms + self.message_ms,
            });
            state.events.push(GameEvent::Missed { typed: token });
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn setup(notes: &[&str]) -> (InputController, GameState) {
        let mut state = GameState::new(5, 1.0);
        for (i, n) in notes.iter().enumerate() {
            state.spawn_target_at(Vec2::new(20.0 + i as f32 * 10.0, 70.0), *n);
        }
        (InputController::new(1000.0), state)
    }

    #[test]
    fn test_typing_fires_on_octave() {
        let (mut input, mut state) = setup(&["fs2"]);
        assert_eq!(input.on_input_change("F", &mut state, 0.0), None);
        assert_eq!(input.on_input_change("F#", &mut state, 0.0), None);
        assert_eq!(input.display(), "F♯");

        let outcome = input.on_input_change("F♯2", &mut state, 0.0);
        assert!(matches!(outcome, Some(MatchOutcome::Shot { .. })));
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(input.typed(), "");
    }

    #[test]
    fn test_repeated_last_char_is_ignored() {
        let (mut input, mut state) = setup(&["e2"]);
        input.on_input_change("e", &mut state, 0.0);
        // Same trailing character: buffer untouched
        input.on_input_change("ee", &mut state, 0.0);
        assert_eq!(input.typed(), "e");
        // Empty text after empty buffer does nothing either
        input.clear();
        input.on_input_change("", &mut state, 0.0);
        assert_eq!(input.typed(), "");
    }

    #[test]
    fn test_miss_sets_message() {
        let (mut input, mut state) = setup(&["d4"]);
        let outcome = input.on_input_change("e4", &mut state, 100.0);
        assert_eq!(outcome, Some(MatchOutcome::Missed));
        assert_eq!(input.typed(), "");
        assert_eq!(input.message(500.0), Some("Missed!"));
        assert_eq!(input.message(1100.0), None);
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Missed { typed: "e4".into() }]
        );

        input.expire_message(1100.0);
        assert!(input.message.is_none());
    }

    #[test]
    fn test_middle_c_alias() {
        let (_, state) = setup(&["d4", "c4left"]);
        assert_eq!(find_match(&state.targets, "c4"), Some(state.targets[1].id));
        assert_eq!(find_match(&state.targets, "d4"), Some(state.targets[0].id));

        let (_, state) = setup(&["d4"]);
        assert_eq!(find_match(&state.targets, "c4"), None);
    }

    #[test]
    fn test_middle_c_last_variant_wins() {
        let (_, state) = setup(&["c4right", "c4left", "c4right"]);
        assert_eq!(find_match(&state.targets, "c4"), Some(state.targets[2].id));
        // Exact variant spelling goes by earliest
        assert_eq!(
            find_match(&state.targets, "c4right"),
            Some(state.targets[0].id)
        );
    }

    #[test]
    fn test_keypad_sequence() {
        let (mut input, mut state) = setup(&["b[4"]);
        // Accidental and octave need a letter first
        assert_eq!(input.press(KeypadKey::Flat, &mut state, 0.0), None);
        assert_eq!(input.press(KeypadKey::Octave(4), &mut state, 0.0), None);
        assert_eq!(input.typed(), "");

        input.press(KeypadKey::Letter('B'), &mut state, 0.0);
        // A second letter is rejected
        input.press(KeypadKey::Letter('c'), &mut state, 0.0);
        input.press(KeypadKey::Flat, &mut state, 0.0);
        assert_eq!(input.display(), "B♭");

        let outcome = input.press(KeypadKey::Octave(4), &mut state, 0.0);
        assert!(matches!(outcome, Some(MatchOutcome::Shot { .. })));
    }

    #[test]
    fn test_keypad_rejects_out_of_range() {
        let (mut input, mut state) = setup(&[]);
        input.press(KeypadKey::Letter('h'), &mut state, 0.0);
        assert_eq!(input.typed(), "");
        input.press(KeypadKey::Letter('a'), &mut state, 0.0);
        input.press(KeypadKey::Octave(9), &mut state, 0.0);
        assert_eq!(input.typed(), "a");
    }

    #[test]
    fn test_clear_command() {
        let (mut input, mut state) = setup(&[]);
        input.handle(InputCommand::Key(KeypadKey::Letter('g')), &mut state, 0.0);
        assert_eq!(input.typed(), "g");
        input.handle(InputCommand::Clear, &mut state, 0.0);
        assert_eq!(input.typed(), "");
    }

    #[test]
    fn test_keypad_labels() {
        assert_eq!(
            InputCommand::from_keypad_label("C"),
            Some(InputCommand::Key(KeypadKey::Letter('c')))
        );
        assert_eq!(
            InputCommand::from_keypad_label("♭"),
            Some(InputCommand::Key(KeypadKey::Flat))
        );
        assert_eq!(
            InputCommand::from_keypad_label("sharp"),
            Some(InputCommand::Key(KeypadKey::Sharp))
        );
        assert_eq!(
            InputCommand::from_keypad_label("6"),
            Some(InputCommand::Key(KeypadKey::Octave(6)))
        );
        assert_eq!(
            InputCommand::from_keypad_label("clear"),
            Some(InputCommand::Clear)
        );
        assert_eq!(InputCommand::from_keypad_label("7"), None);
        assert_eq!(InputCommand::from_keypad_label("h"), None);
        assert_eq!(InputCommand::from_keypad_label("c4"), None);
    }

    #[test]
    fn test_input_ignored_after_game_over() {
        let (mut input, mut state) = setup(&["a2"]);
        state.game_over = true;
        assert_eq!(input.on_input_change("a2", &mut state, 0.0), None);
        assert_eq!(input.press(KeypadKey::Letter('a'), &mut state, 0.0), None);
        assert!(state.projectiles.is_empty());
    }
}
