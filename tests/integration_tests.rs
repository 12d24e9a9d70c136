//! Integration tests for the piano roll
//!
//! Exercise the public API end to end: inputs → session → transport → view.

use pianoroll::config::RollConfig;
use pianoroll::render::{LayerRenderer, Scene};
use pianoroll::scroll::ScrollController;
use pianoroll::session::Session;
use pianoroll::share::{notes_from_link, share_link};
use pianoroll::tab::{notes_to_tab, text_to_notes, SymbolMode};
use pianoroll::transport::{ManualClock, Transport, TransportStatus};
use pianoroll::tuning::{find_tuning, tunings_for};
use pianoroll::view::RollView;
use pianoroll::viewport::{Drawable, Margin, Viewport};
use pianoroll::{Note, NoteSet, RollError};

fn viewport() -> Viewport {
    Viewport::from_outer(800.0, 600.0, Margin::default(), 1.0).unwrap()
}

#[test]
fn test_single_note_scenario() {
    let tuning = find_tuning("Kalimba", "17 C Major").unwrap();
    assert_eq!(tuning.key_count(), 17);
    let notes = NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0)]);

    let mut view = RollView::new(viewport(), tuning.clone(), 2.0, 80.0);
    assert_eq!(view.scroll().visible_span(), 4.0);
    view.set_data(notes, tuning);

    view.redraw_frame(0.0);
    assert_eq!(view.renderer().foreground().note_indices(), vec![0]);

    view.redraw_frame(10.0);
    assert!(view.renderer().foreground().note_indices().is_empty());
    assert_eq!(view.renderer().background().note_indices(), vec![0]);
}

#[test]
fn test_overview_grows_with_longer_note_but_detail_waits_for_tick() {
    let vp = viewport();
    let tuning = find_tuning("Kalimba", "17 C Major").unwrap();
    let mut scroll = ScrollController::new(&vp, 2.0, 80.0);

    let first = NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0), Note::new(64, 1.0, 2.0, 0)]);
    scroll.sync_data(&first, &tuning);
    scroll.on_time(0.5);
    let detail_before = scroll.transforms().unwrap().detail.time.domain();

    let longer = NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0), Note::new(64, 1.0, 9.0, 0)]);
    scroll.sync_data(&longer, &tuning);
    let transforms = scroll.transforms().unwrap();
    assert_eq!(transforms.overview.time.domain(), (0.0, 9.0));
    assert_eq!(transforms.detail.time.domain(), detail_before);
}

#[test]
fn test_foreground_matches_intersection_for_many_times() {
    let vp = viewport();
    let tuning = find_tuning("Kalimba", "17 C Major").unwrap();
    let notes = NoteSet::new(
        text_to_notes("C D E (F A) G | A B C° (D° F°) E°\nC D", &tuning, 90.0).unwrap(),
    );
    let mut scroll = ScrollController::new(&vp, 1.5, 80.0);
    scroll.sync_data(&notes, &tuning);
    let mut renderer = LayerRenderer::new(&vp);

    for step in 0..40 {
        let window = scroll.on_time(step as f64 * 0.2).unwrap();
        let scene = Scene {
            notes: &notes,
            tuning: &tuning,
            transforms: scroll.transforms().unwrap(),
            layout: scroll.layout(),
            viewport: &vp,
        };
        renderer.draw_foreground(&scene, window);
        let expected: Vec<usize> = notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.intersects(window.start, window.end))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(renderer.foreground().note_indices(), expected);
    }
}

#[test]
fn test_tab_round_trip_across_tunings() {
    for (name, tuning) in tunings_for("Kalimba") {
        let source = "C D E | (C E G) A° | B C°";
        let notes = text_to_notes(source, &tuning, 100.0).unwrap();
        let tab = notes_to_tab(&notes, &tuning, SymbolMode::Number, 0.1);
        let again = text_to_notes(&tab, &tuning, 100.0).unwrap();

        let key = |n: &Note| (n.start.to_bits(), n.pitch);
        let mut a: Vec<_> = notes.iter().map(key).collect();
        let mut b: Vec<_> = again.iter().map(key).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b, "tuning {}", name);
    }
}

#[test]
fn test_share_link_round_trip() {
    let tuning = find_tuning("Kalimba", "21 F Major").unwrap();
    let notes = text_to_notes("F A C (F° A°)", &tuning, 133.0).unwrap();
    let link = share_link("https://kalimba.example/app?x=1", &notes).unwrap();
    assert_eq!(notes_from_link(&link), notes);
    assert_eq!(notes_from_link(&share_link("https://a/", &[]).unwrap()), vec![]);
}

#[test]
fn test_transport_pause_and_stop() {
    let clock = ManualClock::new();
    let mut transport = Transport::with_clock(clock.clone());
    let notes = NoteSet::new(vec![Note::new(60, 0.0, 5.0, 0)]);

    transport.play(notes.clone(), 1.0).unwrap();
    transport.pause_or_resume();
    clock.advance(2.0);
    transport.tick();
    assert_eq!(transport.current_time(), 0.0);
    transport.pause_or_resume();
    clock.advance(2.0);
    assert_eq!(transport.tick(), Some(2.0));

    transport.stop();
    assert_eq!(transport.state().current_time, 0.0);
    assert_eq!(transport.state().status, TransportStatus::Stopped);

    let before = transport.state();
    assert!(matches!(
        transport.play(notes, -1.0),
        Err(RollError::InvalidArgument(_))
    ));
    assert_eq!(transport.state(), before);
}

#[test]
fn test_session_plays_to_the_end() {
    let clock = ManualClock::new();
    let config = RollConfig::from_yaml_str("tempo: 240\nrow_span: 1.0\n").unwrap();
    let mut session = Session::with_clock(config, clock.clone()).unwrap();
    session.set_tab_text("C D E F").unwrap();
    assert_eq!(session.notes().max_end(), Some(1.0));

    session.play().unwrap();
    let mut frames = 0;
    while session.transport_state().status == TransportStatus::Playing {
        clock.advance(0.016);
        session.frame();
        frames += 1;
        assert!(frames < 1000);
    }
    assert_eq!(session.transport_state().status, TransportStatus::Stopped);
    assert_eq!(session.view().current_time(), 0.0);
}

#[test]
fn test_session_survives_bad_inputs() {
    let clock = ManualClock::new();
    let mut session = Session::with_clock(RollConfig::default(), clock).unwrap();
    session.set_tab_text("(C E G)").unwrap();
    let generation = session.notes().generation();

    assert!(session.load_midi(&[0x4d, 0x54, 0x68, 0x64, 0, 0]).is_err());
    assert!(session.take_notice().is_some());
    assert!(session.set_tab_text("C X").is_err());
    assert_eq!(session.notes().generation(), generation);

    session.load_link("https://a/?notes=%7Bbroken").unwrap();
    assert!(session.notes().is_empty());
    assert_eq!(session.view().renderer().background().note_indices().len(), 0);
}
