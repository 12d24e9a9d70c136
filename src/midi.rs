//! # MIDI Import
//!
//! Reads Standard MIDI Files into timed notes, one [`MidiPart`] per track
//! that contains notes.
//!
//! - Tick times are converted to seconds through the full tempo map. In
//!   format 0 and 1 files tempo events from any track apply to every track;
//!   format 2 tracks each carry their own tempo.
//! - SMPTE timecode timing uses a fixed tick length of
//!   `1 / (frames per second × ticks per frame)`.
//! - A note-on with velocity 0 is a note-off. Overlapping notes on the same
//!   key and channel are closed first-in, first-out.
//! - Notes still sounding at the end of a track end there.
//!
//! Malformed input fails with [`RollError::MidiImport`]; nothing is partially
//! returned.

use crate::error::RollError;
use crate::note::Note;
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Default tempo when a file sets none: 120 BPM
const DEFAULT_MICROS_PER_BEAT: f64 = 500_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiPart {
    /// Track name, or `Track N` when the track has none
    pub name: String,
    /// Index of the source track
    pub track: usize,
    /// Ordered by onset
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiFile {
    pub parts: Vec<MidiPart>,
}

impl MidiFile {
    /// First part with any notes
    pub fn first_part(&self) -> Option<&MidiPart> {
        self.parts.first()
    }

    /// Latest release over all parts
    pub fn duration(&self) -> f64 {
        self.parts
            .iter()
            .flat_map(|p| p.notes.iter())
            .map(|n| n.end)
            .fold(0.0, f64::max)
    }
}

/// Parse a Standard MIDI File.
pub fn parse(bytes: &[u8]) -> Result<MidiFile, RollError> {
    let smf = Smf::parse(bytes).map_err(|e| RollError::MidiImport(e.to_string()))?;

    let shared_tempo = match smf.header.format {
        Format::Sequential => None,
        Format::SingleTrack | Format::Parallel => Some(TempoMap::from_tracks(smf.tracks.iter())),
    };

    let mut parts = Vec::new();
    for (index, track) in smf.tracks.iter().enumerate() {
        let own_tempo;
        let tempo = match &shared_tempo {
            Some(map) => map,
            None => {
                own_tempo = TempoMap::from_tracks(std::iter::once(track));
                &own_tempo
            }
        };
        let clock = TickClock::new(smf.header.timing, tempo);
        let (name, notes) = read_track(track, &clock);
        if notes.is_empty() {
            continue;
        }
        parts.push(MidiPart {
            name: name.unwrap_or_else(|| format!("Track {}", index + 1)),
            track: index,
            notes,
        });
    }

    log::debug!(
        "Imported {} parts ({} tracks) from MIDI file",
        parts.len(),
        smf.tracks.len()
    );
    Ok(MidiFile { parts })
}

/// Tempo changes as `(tick, microseconds per beat)`, ordered by tick
#[derive(Debug, Clone)]
struct TempoMap {
    changes: Vec<(u64, f64)>,
}

impl TempoMap {
    fn from_tracks<'t, 'a: 't, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'t Track<'a>>,
    {
        let mut changes = Vec::new();
        for track in tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;
                if let TrackEventKind::Meta(MetaMessage::Tempo(micros)) = event.kind {
                    changes.push((tick, micros.as_int() as f64));
                }
            }
        }
        // Stable: for equal ticks the later event wins
        changes.sort_by_key(|&(tick, _)| tick);
        Self { changes }
    }
}

/// Tick to seconds conversion with precomputed segment offsets
struct TickClock {
    /// `(start tick, seconds at start, seconds per tick)`
    segments: Vec<(u64, f64, f64)>,
}

impl TickClock {
    fn new(timing: Timing, tempo: &TempoMap) -> Self {
        match timing {
            Timing::Timecode(fps, ticks_per_frame) => {
                let per_tick = 1.0 / (fps.as_f32() as f64 * ticks_per_frame.max(1) as f64);
                Self {
                    segments: vec![(0, 0.0, per_tick)],
                }
            }
            Timing::Metrical(ticks_per_beat) => {
                let ticks_per_beat = ticks_per_beat.as_int().max(1) as f64;
                let per_tick = |micros: f64| micros / 1_000_000.0 / ticks_per_beat;

                let mut segments = vec![(0u64, 0.0, per_tick(DEFAULT_MICROS_PER_BEAT))];
                for &(tick, micros) in &tempo.changes {
                    let (start, seconds, rate) = segments[segments.len() - 1];
                    let at = seconds + (tick - start) as f64 * rate;
                    if tick == start {
                        segments.pop();
                    }
                    segments.push((tick, at, per_tick(micros)));
                }
                Self { segments }
            }
        }
    }

    fn seconds(&self, tick: u64) -> f64 {
        let i = self.segments.partition_point(|&(start, _, _)| start <= tick);
        let (start, seconds, rate) = self.segments[i.saturating_sub(1)];
        seconds + (tick - start) as f64 * rate
    }
}

fn read_track(track: &[TrackEvent<'_>], clock: &TickClock) -> (Option<String>, Vec<Note>) {
    let mut name = None;
    let mut notes = Vec::new();
    let mut sounding: HashMap<(u8, u8), VecDeque<f64>> = HashMap::new();
    let mut tick = 0u64;

    for event in track {
        tick += event.delta.as_int() as u64;
        match event.kind {
            TrackEventKind::Meta(MetaMessage::TrackName(bytes)) if name.is_none() => {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                if !text.is_empty() {
                    name = Some(text);
                }
            }
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        sounding
                            .entry((channel, key.as_int()))
                            .or_default()
                            .push_back(clock.seconds(tick));
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let key = key.as_int();
                        if let Some(start) = sounding
                            .get_mut(&(channel, key))
                            .and_then(|starts| starts.pop_front())
                        {
                            notes.push(Note::new(key, start, clock.seconds(tick), channel));
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    let end = clock.seconds(tick);
    let mut unterminated = 0;
    for ((channel, key), starts) in sounding {
        for start in starts {
            notes.push(Note::new(key, start, end, channel));
            unterminated += 1;
        }
    }
    if unterminated > 0 {
        log::debug!("Closed {} unterminated notes at track end", unterminated);
    }

    notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
    (name, notes)
}
