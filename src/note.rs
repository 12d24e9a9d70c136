//! # Notes and Note Sets
//!
//! A [`Note`] is a single pitch held over a time interval in seconds. Notes are
//! immutable once produced by an input (tab text, MIDI import, share link).
//!
//! ## Change Detection
//! A [`NoteSet`] is the unit handed to the views. Every newly constructed set
//! is stamped with a fresh [`Generation`]; clones share the stamp. Views
//! compare generations instead of contents, so replacing the note data always
//! means building a new set:
//!
//! ```rust
//! use pianoroll::{Note, NoteSet};
//!
//! let a = NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0)]);
//! let b = a.clone();
//! let c = NoteSet::new(a.notes().to_vec());
//!
//! assert_eq!(a.generation(), b.generation());
//! assert_ne!(a.generation(), c.generation());
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A note event: pitch held from `start` to `end` (seconds, `end >= start`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch (0-127)
    pub pitch: u8,
    /// Onset in seconds
    pub start: f64,
    /// Release in seconds
    pub end: f64,
    /// Source channel, used to pick the fill colour
    pub channel: u8,
}

impl Note {
    /// Create a note; a reversed interval is swapped so `end >= start` holds.
    pub fn new(pitch: u8, start: f64, end: f64, channel: u8) -> Self {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        Self {
            pitch,
            start,
            end,
            channel,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when `[start, end]` overlaps the closed window `[from, to]`
    pub fn intersects(&self, from: f64, to: f64) -> bool {
        self.start <= to && self.end >= from
    }

    /// True when the note satisfies the data-model invariants
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }
}

/// Identity stamp of a note set or tuning, unique per construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Draw the next stamp from the process-wide counter
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Generation(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Immutable, cheaply clonable collection of notes with a generation stamp
#[derive(Debug, Clone)]
pub struct NoteSet {
    notes: Arc<[Note]>,
    generation: Generation,
}

impl NoteSet {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes: notes.into(),
            generation: Generation::next(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Latest release time, `None` for an empty set
    pub fn max_end(&self) -> Option<f64> {
        self.notes.iter().map(|n| n.end).reduce(f64::max)
    }

    /// New set with every pitch shifted; notes leaving the MIDI range are dropped.
    pub fn transposed(&self, semitones: i8) -> NoteSet {
        let notes = self
            .notes
            .iter()
            .filter_map(|n| {
                let pitch = n.pitch as i16 + semitones as i16;
                u8::try_from(pitch)
                    .ok()
                    .filter(|&p| p <= 127)
                    .map(|pitch| Note { pitch, ..*n })
            })
            .collect();
        NoteSet::new(notes)
    }
}

impl From<Vec<Note>> for NoteSet {
    fn from(notes: Vec<Note>) -> Self {
        NoteSet::new(notes)
    }
}

impl<'a> IntoIterator for &'a NoteSet {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}
