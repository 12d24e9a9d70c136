//! Transport state and the audio seam

use crate::note::Note;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportStatus {
    /// Nothing played yet
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// Snapshot of the transport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportState {
    pub status: TransportStatus,
    /// Seconds of score time
    pub current_time: f64,
    pub speed: f64,
}

/// Receives note events as playback crosses onsets and releases.
///
/// Every `note_on` is eventually matched by a `note_off`, including when
/// playback is paused, stopped, restarted or finishes.
pub trait NoteSink {
    fn note_on(&mut self, note: &Note);
    fn note_off(&mut self, note: &Note);
}

/// Sink that logs events at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NoteSink for LogSink {
    fn note_on(&mut self, note: &Note) {
        log::trace!("note on  {} ch{} @ {:.3}s", note.pitch, note.channel, note.start);
    }

    fn note_off(&mut self, note: &Note) {
        log::trace!("note off {} ch{} @ {:.3}s", note.pitch, note.channel, note.end);
    }
}
