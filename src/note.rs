//! Note tokens
//!
//! A note token is the canonical lowercase spelling of a pitch: letter, optional
//! accidental marker, octave digit. Sharps are spelled `s` and flats `[`, so
//! F♯2 is `fs2` and B♭2 is `b[2`.
//!
//! Middle C appears twice in the table (`c4left`, `c4right`, one per staff).
//! Typing plain `c4` matches either.

/// Canonical sharp marker
pub const SHARP: char = 's';
/// Canonical flat marker
pub const FLAT: char = '[';

pub const SHARP_GLYPH: char = '♯';
pub const FLAT_GLYPH: char = '♭';

/// What the player types to hit either middle C
pub const MIDDLE_C: &str = "c4";
pub const MIDDLE_C_LEFT: &str = "c4left";
pub const MIDDLE_C_RIGHT: &str = "c4right";

/// Every note a target can carry
pub const NOTE_TABLE: [&str; 32] = [
    "e2", "f2", "fs2", "g2", "a2", "b[2", "b2", "c3", "d3", "e3", "f3", "fs3", "g3", "a3", "b3",
    MIDDLE_C_LEFT, MIDDLE_C_RIGHT, "d4", "e4", "f4", "fs4", "g4", "a4", "b[4", "b4", "c5", "d5",
    "e5", "f5", "fs5", "g5", "a5",
];

/// Canonicalize typed text into a matchable token.
///
/// `#`, `/`, `♯` and the keyboard stand-in `]` all become `s`; `♭` becomes `[`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '#' | '/' | ']' | SHARP_GLYPH => SHARP,
            FLAT_GLYPH => FLAT,
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Display form of a token: accidental glyphs, upper case.
///
/// Accepts raw text too; it is normalized first.
pub fn denormalize(token: &str) -> String {
    normalize(token)
        .chars()
        .map(|c| match c {
            FLAT => FLAT_GLYPH,
            SHARP => SHARP_GLYPH,
            c => c,
        })
        .collect::<String>()
        .to_uppercase()
}

/// A token is complete once its octave digit is in
#[inline]
pub fn is_complete(token: &str) -> bool {
    token.chars().last().is_some_and(|c| c.is_ascii_digit())
}

/// True for the two middle-C staff variants
#[inline]
pub fn is_middle_c_variant(note: &str) -> bool {
    note == MIDDLE_C_LEFT || note == MIDDLE_C_RIGHT
}

/// Label shown on a target when the answer is revealed
pub fn display_label(note: &str) -> String {
    if is_middle_c_variant(note) {
        denormalize(MIDDLE_C)
    } else {
        denormalize(note)
    }
}

/// Letter names in keypad order
pub const LETTERS: [char; 7] = ['c', 'd', 'e', 'f', 'g', 'a', 'b'];
/// Octave range offered by the keypad
pub const OCTAVES: std::ops::RangeInclusive<u8> = 1..=6;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_accidentals() {
        assert_eq!(normalize("F#2"), "fs2");
        assert_eq!(normalize("f/2"), "fs2");
        assert_eq!(normalize("F♯2"), "fs2");
        assert_eq!(normalize("f]2"), "fs2");
        assert_eq!(normalize("B♭4"), "b[4");
        assert_eq!(normalize("b[4"), "b[4");
        assert_eq!(normalize("A2"), "a2");
    }

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize("fs2"), "F♯2");
        assert_eq!(denormalize("b[2"), "B♭2");
        assert_eq!(denormalize("e"), "E");
        assert_eq!(denormalize(""), "");
        // Raw text goes through normalize first
        assert_eq!(denormalize("f#"), "F♯");
    }

    #[test]
    fn test_round_trip_note_table() {
        for note in NOTE_TABLE {
            let shown = display_label(note);
            let back = normalize(&shown);
            if is_middle_c_variant(note) {
                assert_eq!(back, MIDDLE_C);
            } else {
                assert_eq!(back, note, "round trip failed for {note}");
            }
            assert_eq!(denormalize(&back), shown);
        }
    }

    #[test]
    fn test_is_complete() {
        assert!(!is_complete(""));
        assert!(!is_complete("f"));
        assert!(!is_complete("fs"));
        assert!(is_complete("fs2"));
        assert!(is_complete("c4"));
    }

    #[test]
    fn test_table_tokens_are_canonical() {
        for note in NOTE_TABLE {
            assert_eq!(normalize(note), note);
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-gA-G][#/♯♭\\[\\]]?[1-6]") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert_eq!(normalize(&denormalize(&once)), once);
        }
    }
}
