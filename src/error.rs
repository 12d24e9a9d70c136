//! # Error Types
//!
//! This module defines all error types for the piano-roll engine.
//!
//! Errors carry enough context (line/column for tab text, the offending value
//! for arguments) to be shown to the user without further lookup.
//!
//! ## Error Types
//! - `InvalidArgument` - Rejected values such as a non-positive playback speed
//! - `TabParse` - Tab text errors with line and column information
//! - `MidiImport` - Malformed Standard MIDI Files
//! - `ShareLink` - Undecodable `notes` payloads in share links
//! - `Config` - Invalid YAML configuration
//! - `UnknownTuning` - A tuning name missing from the instrument catalogue
//!
//! ## Usage
//! ```rust
//! use pianoroll::{tab, tuning, RollError};
//!
//! let tunings = tuning::tunings_for("Kalimba");
//! let kalimba = &tunings["17 C Major"];
//! match tab::text_to_notes("C E (G", kalimba, 120.0) {
//!     Ok(notes) => println!("{} notes", notes.len()),
//!     Err(RollError::TabParse { line, column, message }) => {
//!         eprintln!("Tab error at {}:{}: {}", line, column, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollError {
    /// A caller-supplied value is out of its valid range.
    ///
    /// # Example
    /// ```
    /// # use pianoroll::RollError;
    /// let err = RollError::InvalidArgument("speed must be > 0, got -1".to_string());
    /// assert_eq!(err.to_string(), "Invalid argument: speed must be > 0, got -1");
    /// ```
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tab text could not be parsed.
    ///
    /// # Example
    /// ```
    /// # use pianoroll::RollError;
    /// let err = RollError::TabParse {
    ///     line: 2,
    ///     column: 7,
    ///     message: "Unexpected character 'X'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Tab parse error at line 2, column 7: Unexpected character 'X'");
    /// ```
    #[error("Tab parse error at line {line}, column {column}: {message}")]
    TabParse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("MIDI import failed: {0}")]
    MidiImport(String),

    #[error("Invalid share link: {0}")]
    ShareLink(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown tuning '{name}' for instrument '{instrument}'")]
    UnknownTuning { instrument: String, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
