//! # Session
//!
//! Screen-level owner of everything one roll needs: the configuration, the
//! tuning catalogue, the current input, the transpose amount, one
//! [`Transport`] and one [`RollView`] attached to it.
//!
//! Every input change (tab text, MIDI file or track, shared link, transpose,
//! tuning) builds a new [`NoteSet`] and hands it to the view, which is the
//! only path that rebuilds the static layers. Failed MIDI imports leave the
//! notes and the transport untouched and raise a notice for the user.

use crate::config::RollConfig;
use crate::error::RollError;
use crate::midi::{self, MidiFile};
use crate::note::{Note, NoteSet};
use crate::share;
use crate::tab;
use crate::transport::{Clock, NoteSink, SystemClock, Transport, TransportState};
use crate::tuning::{tunings_for, Tuning};
use crate::view::RollView;
use crate::viewport::{Drawable, Resizable, Viewport};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where the current notes come from
#[derive(Debug, Clone)]
pub enum Input {
    Empty,
    Tab(String),
    Midi { file: MidiFile, part: usize },
    Link(Vec<Note>),
}

pub struct Session<C: Clock = SystemClock> {
    config: RollConfig,
    tunings: BTreeMap<String, Arc<Tuning>>,
    tuning: Arc<Tuning>,
    input: Input,
    transpose: i8,
    notes: NoteSet,
    transport: Transport<C>,
    view: RollView,
    notice: Option<String>,
}

impl Session<SystemClock> {
    pub fn new(config: RollConfig) -> Result<Self, RollError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(config: RollConfig, clock: C) -> Result<Self, RollError> {
        config.validate()?;
        let tunings = tunings_for(&config.instrument);
        let tuning = tunings
            .get(&config.tuning)
            .cloned()
            .ok_or_else(|| RollError::UnknownTuning {
                instrument: config.instrument.clone(),
                name: config.tuning.clone(),
            })?;

        let mut transport = Transport::with_clock(clock);
        let mut view = RollView::new(
            config.viewport()?,
            Arc::clone(&tuning),
            config.row_span,
            config.overview_width,
        );
        view.attach(&mut transport);

        Ok(Self {
            config,
            tunings,
            tuning,
            input: Input::Empty,
            transpose: 0,
            notes: NoteSet::empty(),
            transport,
            view,
            notice: None,
        })
    }

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    /// Tuning names of the configured instrument
    pub fn tuning_names(&self) -> impl Iterator<Item = &str> {
        self.tunings.keys().map(String::as_str)
    }

    pub fn tuning(&self) -> &Arc<Tuning> {
        &self.tuning
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn notes(&self) -> &NoteSet {
        &self.notes
    }

    pub fn transpose(&self) -> i8 {
        self.transpose
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn view(&self) -> &RollView {
        &self.view
    }

    /// Pending user-facing message, cleared on read
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Replace the input with tab text. Parse errors keep the current notes.
    pub fn set_tab_text(&mut self, text: &str) -> Result<(), RollError> {
        let letters = tab::convert_numbers_to_letters(text);
        tab::text_to_notes(&letters, &self.tuning, self.config.tempo)?;
        self.input = Input::Tab(text.to_string());
        self.rebuild()
    }

    /// Import a MIDI file and show its first part.
    pub fn load_midi(&mut self, bytes: &[u8]) -> Result<(), RollError> {
        let file = match midi::parse(bytes) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("MIDI import failed: {}", e);
                self.notice = Some(format!("Could not open this MIDI file: {}", e));
                return Err(e);
            }
        };
        match file.first_part() {
            Some(part) => log::info!(
                "MIDI file with {} parts ({:.1}s), showing '{}'",
                file.parts.len(),
                file.duration(),
                part.name
            ),
            None => {
                log::warn!("MIDI file has no notes");
                self.notice = Some("This MIDI file contains no notes".to_string());
            }
        }
        self.input = Input::Midi { file, part: 0 };
        self.rebuild()
    }

    /// Switch to another part of the loaded MIDI file
    pub fn select_part(&mut self, part: usize) -> Result<(), RollError> {
        let Input::Midi { file, part: current } = &mut self.input else {
            return Err(RollError::InvalidArgument("no MIDI file loaded".to_string()));
        };
        if part >= file.parts.len() {
            return Err(RollError::InvalidArgument(format!(
                "part {} out of range (file has {})",
                part,
                file.parts.len()
            )));
        }
        *current = part;
        self.rebuild()
    }

    /// Take the notes from a share link; undecodable links give no notes.
    pub fn load_link(&mut self, url: &str) -> Result<(), RollError> {
        self.input = Input::Link(share::notes_from_link(url));
        self.rebuild()
    }

    pub fn set_transpose(&mut self, semitones: i8) -> Result<(), RollError> {
        if self.transpose == semitones {
            return Ok(());
        }
        self.transpose = semitones;
        self.rebuild()
    }

    pub fn set_tuning(&mut self, name: &str) -> Result<(), RollError> {
        let tuning = self
            .tunings
            .get(name)
            .cloned()
            .ok_or_else(|| RollError::UnknownTuning {
                instrument: self.config.instrument.clone(),
                name: name.to_string(),
            })?;
        log::debug!("Tuning changed to '{}'", name);
        self.tuning = tuning;
        self.config.tuning = name.to_string();
        self.rebuild()
    }

    /// Route note events to an audio backend
    pub fn set_sink(&mut self, sink: Box<dyn NoteSink + Send>) {
        self.transport.set_sink(sink);
    }

    pub fn play(&mut self) -> Result<(), RollError> {
        self.transport.play(self.notes.clone(), self.config.speed)
    }

    pub fn pause_or_resume(&mut self) {
        self.transport.pause_or_resume();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        self.view.pump();
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), RollError> {
        self.transport.set_speed(speed)?;
        self.config.speed = speed;
        Ok(())
    }

    /// One frame: advance the transport and redraw the view if time moved.
    pub fn frame(&mut self) -> Option<f64> {
        let time = self.transport.tick();
        self.view.pump();
        time
    }

    /// Resize the view. A size that leaves no detail area is rejected.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), RollError> {
        let mut config = self.config.clone();
        config.width = viewport.outer_width();
        config.height = viewport.outer_height();
        config.margin = viewport.margin;
        config.device_pixel_ratio = viewport.device_pixel_ratio;
        config.validate()?;
        self.config = config;
        self.view.resize(viewport);
        Ok(())
    }

    /// Redraw the view at an arbitrary time without touching the transport
    pub fn seek_view(&mut self, time: f64) {
        self.view.redraw_frame(time);
    }

    /// The current notes as tab text
    pub fn tab_text(&self) -> String {
        tab::notes_to_tab(
            self.notes.notes(),
            &self.tuning,
            self.config.symbol_mode,
            self.config.spacing,
        )
    }

    /// The current notes as coloured markup
    pub fn tab_html(&self) -> String {
        tab::notes_to_html_tab(
            self.notes.notes(),
            &self.tuning,
            self.config.symbol_mode,
            self.config.spacing,
        )
    }

    pub fn share_link(&self, location: &str) -> Result<String, RollError> {
        share::share_link(location, self.notes.notes())
    }

    fn source_notes(&self) -> Result<Vec<Note>, RollError> {
        match &self.input {
            Input::Empty => Ok(Vec::new()),
            Input::Tab(text) => {
                let letters = tab::convert_numbers_to_letters(text);
                tab::text_to_notes(&letters, &self.tuning, self.config.tempo)
            }
            Input::Midi { file, part } => {
                Ok(file.parts.get(*part).map(|p| p.notes.clone()).unwrap_or_default())
            }
            Input::Link(notes) => Ok(notes.clone()),
        }
    }

    fn rebuild(&mut self) -> Result<(), RollError> {
        let base = NoteSet::new(self.source_notes()?);
        self.notes = if self.transpose == 0 {
            base
        } else {
            base.transposed(self.transpose)
        };
        log::debug!(
            "Note set {} with {} notes (transpose {})",
            self.notes.generation().value(),
            self.notes.len(),
            self.transpose
        );
        self.view
            .set_data(self.notes.clone(), Arc::clone(&self.tuning));
        Ok(())
    }
}

impl<C: Clock> Drop for Session<C> {
    fn drop(&mut self) {
        self.view.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ManualClock, TransportStatus};

    fn session() -> (ManualClock, Session<ManualClock>) {
        let clock = ManualClock::new();
        let session = Session::with_clock(RollConfig::default(), clock.clone()).unwrap();
        (clock, session)
    }

    #[test]
    fn test_tab_input_builds_notes() {
        let (_, mut s) = session();
        s.set_tab_text("1 3 5 (1° 3°)").unwrap();
        assert_eq!(s.notes().len(), 5);
        assert_eq!(s.tab_text(), "C E G (C° E°)");
        assert_eq!(s.view().renderer().background().note_indices().len(), 5);
    }

    #[derive(Clone, Default)]
    struct Balance(Arc<std::sync::Mutex<i32>>);

    impl NoteSink for Balance {
        fn note_on(&mut self, _: &Note) {
            *self.0.lock().unwrap() += 1;
        }
        fn note_off(&mut self, _: &Note) {
            *self.0.lock().unwrap() -= 1;
        }
    }

    #[test]
    fn test_sink_released_on_stop() {
        let (clock, mut s) = session();
        let balance = Balance::default();
        s.set_sink(Box::new(balance.clone()));
        s.set_tab_text("(C E G) D").unwrap();
        s.play().unwrap();
        clock.advance(0.25);
        s.frame();
        assert_eq!(*balance.0.lock().unwrap(), 3);
        s.stop();
        assert_eq!(*balance.0.lock().unwrap(), 0);
    }

    #[test]
    fn test_resize_rejects_layout_without_detail_area() {
        let (_, mut s) = session();
        let narrow = Viewport::from_outer(120.0, 300.0, s.config().margin, 1.0).unwrap();
        assert!(matches!(s.resize(narrow), Err(RollError::Config(_))));
        assert_eq!(s.config().width, 800.0);

        let wide = Viewport::from_outer(1024.0, 300.0, s.config().margin, 2.0).unwrap();
        s.resize(wide).unwrap();
        assert_eq!(s.config().width, 1024.0);
        assert_eq!(s.view().renderer().background().width(), 2048);
    }

    #[test]
    fn test_bad_tab_keeps_notes() {
        let (_, mut s) = session();
        s.set_tab_text("C D").unwrap();
        let generation = s.notes().generation();
        assert!(s.set_tab_text("C (D").is_err());
        assert_eq!(s.notes().generation(), generation);
    }

    #[test]
    fn test_bad_midi_keeps_state_and_raises_notice() {
        let (_, mut s) = session();
        s.set_tab_text("C D E").unwrap();
        s.play().unwrap();
        let generation = s.notes().generation();

        assert!(matches!(s.load_midi(b"garbage"), Err(RollError::MidiImport(_))));
        assert_eq!(s.notes().generation(), generation);
        assert_eq!(s.transport_state().status, TransportStatus::Playing);
        assert!(s.take_notice().is_some());
        assert!(s.take_notice().is_none());
    }

    #[test]
    fn test_transpose_makes_new_generation() {
        let (_, mut s) = session();
        s.set_tab_text("C D").unwrap();
        let before = s.notes().generation();
        s.set_transpose(2).unwrap();
        assert_ne!(s.notes().generation(), before);
        assert_eq!(s.notes().notes()[0].pitch, 62);
        assert_eq!(s.tab_text(), "D E");
    }

    #[test]
    fn test_tuning_switch() {
        let (_, mut s) = session();
        s.set_tab_text("C").unwrap();
        s.set_tuning("8 C Major").unwrap();
        assert_eq!(s.tuning().key_count(), 8);
        assert_eq!(s.view().tuning().key_count(), 8);
        assert!(matches!(
            s.set_tuning("Nope"),
            Err(RollError::UnknownTuning { .. })
        ));
        assert_eq!(s.tuning_names().count(), 4);
    }

    #[test]
    fn test_link_input() {
        let (_, mut s) = session();
        let notes = vec![Note::new(64, 0.0, 1.0, 0)];
        let link = share::share_link("http://host/", &notes).unwrap();
        s.load_link(&link).unwrap();
        assert_eq!(s.notes().notes(), notes.as_slice());
        assert_eq!(s.share_link("http://host/?old=1").unwrap(), link);

        s.load_link("http://host/?notes=broken").unwrap();
        assert!(s.notes().is_empty());
    }

    #[test]
    fn test_frames_follow_the_clock() {
        let (clock, mut s) = session();
        s.set_tab_text("C D E F G A B").unwrap();
        s.play().unwrap();
        clock.advance(1.0);
        assert_eq!(s.frame(), Some(1.0));
        assert_eq!(s.view().current_time(), 1.0);
        assert_eq!(s.view().window().map(|w| w.start), Some(1.0));

        s.pause_or_resume();
        clock.advance(1.0);
        assert_eq!(s.frame(), None);
        s.stop();
        assert_eq!(s.view().current_time(), 0.0);
    }

    #[test]
    fn test_speed_is_remembered() {
        let (clock, mut s) = session();
        s.set_tab_text("C D E F").unwrap();
        s.set_speed(2.0).unwrap();
        assert!(s.set_speed(0.0).is_err());
        s.play().unwrap();
        clock.advance(0.5);
        assert_eq!(s.frame(), Some(1.0));
    }
}
