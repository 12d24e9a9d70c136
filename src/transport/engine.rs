//! Transport state machine
//!
//! Score time while playing is derived from an anchor pair
//! `(wall clock, score time)` captured at the last play, resume or speed
//! change: `time = anchor_time + (now - anchor_wall) × speed`.

use super::clock::{Clock, SystemClock};
use super::subscription::{channel, Publisher, Subscription};
use super::types::{NoteSink, TransportState, TransportStatus};
use crate::error::RollError;
use crate::note::NoteSet;

pub struct Transport<C: Clock = SystemClock> {
    clock: C,
    notes: NoteSet,
    /// Note indices ordered by onset
    onset_order: Vec<usize>,
    /// Position in `onset_order` of the next note to start
    cursor: usize,
    /// Indices of notes that received `note_on` but no `note_off` yet
    sounding: Vec<usize>,
    end_time: f64,
    status: TransportStatus,
    speed: f64,
    anchor_wall: f64,
    anchor_time: f64,
    /// Score time while not playing
    held_time: f64,
    subscribers: Vec<Publisher>,
    sink: Option<Box<dyn NoteSink + Send>>,
}

impl Transport<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for Transport<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Transport<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            notes: NoteSet::empty(),
            onset_order: Vec::new(),
            cursor: 0,
            sounding: Vec::new(),
            end_time: 0.0,
            status: TransportStatus::Idle,
            speed: 1.0,
            anchor_wall: 0.0,
            anchor_time: 0.0,
            held_time: 0.0,
            subscribers: Vec::new(),
            sink: None,
        }
    }

    /// Route note events to an audio backend
    pub fn set_sink(&mut self, sink: Box<dyn NoteSink + Send>) {
        self.release_all();
        self.sink = Some(sink);
    }

    pub fn notes(&self) -> &NoteSet {
        &self.notes
    }

    pub fn status(&self) -> TransportStatus {
        self.status
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Score time in seconds
    pub fn current_time(&self) -> f64 {
        match self.status {
            TransportStatus::Playing => {
                let elapsed = (self.clock.now() - self.anchor_wall).max(0.0);
                self.anchor_time + elapsed * self.speed
            }
            _ => self.held_time,
        }
    }

    pub fn state(&self) -> TransportState {
        TransportState {
            status: self.status,
            current_time: self.current_time(),
            speed: self.speed,
        }
    }

    /// Start playing `notes` from time 0. Restarts when already playing.
    pub fn play(&mut self, notes: NoteSet, speed: f64) -> Result<(), RollError> {
        validate_speed(speed)?;
        self.release_all();

        let mut onset_order: Vec<usize> = (0..notes.len()).collect();
        onset_order.sort_by(|&a, &b| notes.notes()[a].start.total_cmp(&notes.notes()[b].start));
        self.end_time = notes.max_end().unwrap_or(0.0);
        self.onset_order = onset_order;
        self.notes = notes;
        self.cursor = 0;
        self.speed = speed;
        self.anchor_wall = self.clock.now();
        self.anchor_time = 0.0;
        self.held_time = 0.0;
        self.set_status(TransportStatus::Playing);
        self.publish(0.0);
        Ok(())
    }

    /// Toggle between playing and paused; no-op otherwise.
    pub fn pause_or_resume(&mut self) {
        match self.status {
            TransportStatus::Playing => {
                let t = self.current_time();
                self.held_time = t;
                self.release_all();
                self.set_status(TransportStatus::Paused);
                self.publish(t);
            }
            TransportStatus::Paused => {
                self.anchor_wall = self.clock.now();
                self.anchor_time = self.held_time;
                self.set_status(TransportStatus::Playing);
                self.publish(self.held_time);
            }
            TransportStatus::Idle | TransportStatus::Stopped => {}
        }
    }

    /// Stop from any state, releasing every sounding note and rewinding to 0.
    pub fn stop(&mut self) {
        self.release_all();
        self.cursor = 0;
        self.held_time = 0.0;
        self.set_status(TransportStatus::Stopped);
        self.publish(0.0);
    }

    /// Change speed. While playing the clock is re-anchored so time stays continuous.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), RollError> {
        validate_speed(speed)?;
        if self.status == TransportStatus::Playing {
            self.anchor_time = self.current_time();
            self.anchor_wall = self.clock.now();
        }
        log::debug!("Transport speed {} -> {}", self.speed, speed);
        self.speed = speed;
        Ok(())
    }

    /// Advance playback: dispatch note events up to now and notify subscribers.
    ///
    /// Returns the published time, or `None` when not playing. Reaching the
    /// end of the last note finishes playback (stopped, time 0).
    pub fn tick(&mut self) -> Option<f64> {
        if self.status != TransportStatus::Playing {
            return None;
        }
        let t = self.current_time();
        self.dispatch(t);

        if t >= self.end_time {
            log::debug!("Playback finished at {:.3}s", t);
            self.stop();
            return Some(0.0);
        }
        self.publish(t);
        Some(t)
    }

    /// New subscription to time changes
    pub fn subscribe(&mut self) -> Subscription {
        let (publisher, subscription) = channel();
        self.subscribers.push(publisher);
        subscription
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|p| p.is_active()).count()
    }

    fn dispatch(&mut self, t: f64) {
        let notes = self.notes.notes();
        let sink = &mut self.sink;

        self.sounding.retain(|&i| {
            let done = notes[i].end <= t;
            if done {
                if let Some(sink) = sink.as_mut() {
                    sink.note_off(&notes[i]);
                }
            }
            !done
        });

        while let Some(&i) = self.onset_order.get(self.cursor) {
            let note = &notes[i];
            if note.start > t {
                break;
            }
            self.cursor += 1;
            if let Some(sink) = sink.as_mut() {
                sink.note_on(note);
                if note.end <= t {
                    sink.note_off(note);
                    continue;
                }
            }
            if note.end > t {
                self.sounding.push(i);
            }
        }
    }

    fn release_all(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            for &i in &self.sounding {
                sink.note_off(&self.notes.notes()[i]);
            }
        }
        if !self.sounding.is_empty() {
            log::debug!("Released {} sounding notes", self.sounding.len());
        }
        self.sounding.clear();
    }

    fn set_status(&mut self, status: TransportStatus) {
        if self.status != status {
            log::debug!("Transport {:?} -> {:?}", self.status, status);
        }
        self.status = status;
    }

    fn publish(&mut self, time: f64) {
        self.subscribers.retain(|p| p.publish(time));
    }
}

impl<C: Clock> Drop for Transport<C> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn validate_speed(speed: f64) -> Result<(), RollError> {
    if speed > 0.0 && speed.is_finite() {
        Ok(())
    } else {
        Err(RollError::InvalidArgument(format!(
            "speed must be > 0, got {}",
            speed
        )))
    }
}
