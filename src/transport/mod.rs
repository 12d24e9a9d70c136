//! # Playback Transport
//!
//! The playback clock and its state machine, independent of rendering.
//!
//! ## States
//! - `Idle` - nothing played yet
//! - `Playing` - score time advances with the wall clock, scaled by speed
//! - `Paused` - score time frozen; sounding notes released
//! - `Stopped` - time reset to 0; sounding notes released
//!
//! ## Transitions
//! - [`Transport::play`] starts from 0 in any state, restarting if already
//!   playing. A speed that is not a positive finite number is rejected with
//!   [`RollError::InvalidArgument`](crate::RollError::InvalidArgument) and
//!   nothing changes.
//! - [`Transport::pause_or_resume`] toggles `Playing ⇄ Paused`.
//! - [`Transport::stop`] goes to `Stopped` from anywhere.
//! - Playback past the end of the last note finishes into `Stopped`.
//!
//! ## Driving
//! There is no thread. The host calls [`Transport::tick`] from its frame
//! loop; each tick dispatches note events to the [`NoteSink`] and publishes
//! the new time to every [`Subscription`]. Subscriptions hold at most one
//! pending value, so a consumer that falls behind sees only the latest time.
//!
//! ## Example
//! ```rust
//! use pianoroll::transport::{ManualClock, Transport, TransportStatus};
//! use pianoroll::{Note, NoteSet};
//!
//! let clock = ManualClock::new();
//! let mut transport = Transport::with_clock(clock.clone());
//! let subscription = transport.subscribe();
//!
//! transport.play(NoteSet::new(vec![Note::new(60, 0.0, 4.0, 0)]), 2.0).unwrap();
//! clock.advance(0.5);
//! transport.tick();
//! clock.advance(0.5);
//! transport.tick();
//!
//! assert_eq!(subscription.latest(), Some(2.0));
//! assert_eq!(transport.status(), TransportStatus::Playing);
//! ```

mod clock;
mod engine;
mod subscription;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Transport;
pub use subscription::Subscription;
pub use types::{LogSink, NoteSink, TransportState, TransportStatus};
