//! # Tab Notation
//!
//! Compact text notation for lamellophone tabs, converted to and from notes.
//!
//! ## Grammar
//! Items are separated by whitespace (adjacent symbols are separate items
//! too). An item is a symbol or a chord of symbols in parentheses.
//!
//! - Symbol: a letter `A`-`G` or a scale degree `1`-`7` (1 = C … 7 = B),
//!   then an optional `#` or `b`, then any number of octave marks
//!   (`°`, `'` or `*`)
//! - Chord: `( symbol+ )`, not nested
//! - `|` bar lines and blank lines are ignored
//!
//! An unmarked symbol is the lowest pitch of its pitch class at or above the
//! tuning's lowest key; each octave mark raises it by twelve semitones.
//!
//! ## Timing
//! Each item lasts one beat (`60 / tempo` seconds) and items follow each
//! other without gaps. Chord notes share their item's interval.
//!
//! ## Writing
//! [`notes_to_tab`] groups notes whose onsets lie within `spacing` seconds
//! of each other into a chord and starts a new line after a silence longer
//! than `spacing`. Pitches below the tuning's lowest key are skipped.
//!
//! ```rust
//! use pianoroll::tab::{notes_to_tab, text_to_notes, SymbolMode};
//! use pianoroll::tuning::find_tuning;
//!
//! let kalimba = find_tuning("Kalimba", "17 C Major").unwrap();
//! let notes = text_to_notes("C E G (C° E°)", &kalimba, 120.0).unwrap();
//! assert_eq!(notes.len(), 5);
//! assert_eq!(notes[3].pitch, 72);
//! assert_eq!(notes[4].start, 1.5);
//!
//! assert_eq!(notes_to_tab(&notes, &kalimba, SymbolMode::Number, 0.1), "1 3 5 (1° 3°)");
//! ```

mod lexer;
mod parser;
mod writer;

pub use lexer::{Lexer, LocatedToken, Token};
pub use parser::{base_pitch, degree_to_letter, Parser};
pub use writer::{notes_to_html_tab, notes_to_tab, symbol};

use crate::error::RollError;
use crate::note::Note;
use crate::tuning::Tuning;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How pitches are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolMode {
    /// `C D E`
    #[default]
    Letter,
    /// `1 2 3`
    Number,
}

impl FromStr for SymbolMode {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "letter" => Ok(SymbolMode::Letter),
            "number" => Ok(SymbolMode::Number),
            other => Err(RollError::InvalidArgument(format!(
                "symbol mode must be 'letter' or 'number', got '{}'",
                other
            ))),
        }
    }
}

/// Parse tab text into notes, one beat per item at `tempo` BPM.
pub fn text_to_notes(text: &str, tuning: &Tuning, tempo: f64) -> Result<Vec<Note>, RollError> {
    if !(tempo > 0.0 && tempo.is_finite()) {
        return Err(RollError::InvalidArgument(format!(
            "tempo must be > 0, got {}",
            tempo
        )));
    }
    let tokens = Lexer::new(text).tokenize()?;
    Parser::new(&tokens, tuning).parse_notes(60.0 / tempo)
}

/// Rewrite scale degrees `1`-`7` as note letters, leaving everything else alone
pub fn convert_numbers_to_letters(text: &str) -> String {
    text.chars()
        .map(|c| {
            c.to_digit(10)
                .and_then(|d| degree_to_letter(d as u8))
                .unwrap_or(c)
        })
        .collect()
}
