//! # pianoroll
//!
//! A time-scrolling piano roll for lamellophone tabs and MIDI files, kept in
//! step with a playback transport.
//!
//! ## Pipeline
//! Notes + tuning → [`render::LayerRenderer`] background (keys and overview,
//! on change only) → [`scroll::ScrollController`] (per transport tick) →
//! foreground (detail notes and window band).
//!
//! ## Modules
//! - [`transform`] - linear domain → pixel mappings
//! - [`render`] - layered surfaces and draw commands
//! - [`scroll`] - detail window and domain bookkeeping
//! - [`transport`] - play/pause/stop state machine and time subscriptions
//! - [`view`] - view host tying the above together
//! - [`tab`], [`midi`], [`share`] - note inputs and outputs
//! - [`session`] - screen-level owner of inputs, transport and view
//!
//! ## Example
//! ```rust
//! use pianoroll::config::RollConfig;
//! use pianoroll::session::Session;
//! use pianoroll::transport::ManualClock;
//!
//! let clock = ManualClock::new();
//! let mut session = Session::with_clock(RollConfig::default(), clock.clone()).unwrap();
//! session.set_tab_text("C E G (C° E°)").unwrap();
//! session.play().unwrap();
//!
//! clock.advance(1.0);
//! assert_eq!(session.frame(), Some(1.0));
//! // E (ending at 1.0), G and both chord notes
//! assert_eq!(session.view().notes_in_window(), 4);
//! ```

pub mod config;
pub mod error;
pub mod midi;
pub mod note;
pub mod pitch;
pub mod render;
pub mod scroll;
pub mod session;
pub mod share;
pub mod tab;
pub mod transform;
pub mod transport;
pub mod tuning;
pub mod view;
pub mod viewport;

pub use error::RollError;
pub use note::{Generation, Note, NoteSet};
pub use tuning::Tuning;
