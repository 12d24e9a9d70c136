use super::*;
use crate::note::{Note, NoteSet};
use crate::scroll::{DetailWindow, ScrollController};
use crate::tuning::{find_tuning, Tuning, KALIMBA};
use crate::viewport::{Margin, Viewport};
use std::sync::Arc;

struct Fixture {
    viewport: Viewport,
    tuning: Arc<Tuning>,
    scroll: ScrollController,
    renderer: LayerRenderer,
}

impl Fixture {
    fn new(notes: &NoteSet) -> Self {
        let viewport = Viewport::from_outer(800.0, 600.0, Margin::default(), 1.0).unwrap();
        let tuning = find_tuning(KALIMBA, "17 C Major").unwrap();
        let mut scroll = ScrollController::new(&viewport, 2.0, 80.0);
        scroll.sync_data(notes, &tuning);
        Self {
            renderer: LayerRenderer::new(&viewport),
            viewport,
            tuning,
            scroll,
        }
    }

    fn background(&mut self, notes: &NoteSet) -> usize {
        let scene = Scene {
            notes,
            tuning: &self.tuning,
            transforms: self.scroll.transforms().unwrap(),
            layout: self.scroll.layout(),
            viewport: &self.viewport,
        };
        self.renderer.draw_background(&scene)
    }

    fn foreground_at(&mut self, notes: &NoteSet, t: f64) -> DetailWindow {
        let window = self.scroll.on_time(t).unwrap();
        let scene = Scene {
            notes,
            tuning: &self.tuning,
            transforms: self.scroll.transforms().unwrap(),
            layout: self.scroll.layout(),
            viewport: &self.viewport,
        };
        self.renderer.draw_foreground(&scene, window);
        window
    }
}

fn single_note() -> NoteSet {
    NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0)])
}

#[test]
fn test_single_note_scrolls_out_of_detail_but_stays_in_overview() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    assert_eq!(f.scroll.visible_span(), 4.0);
    assert_eq!(f.background(&notes), 1);

    f.foreground_at(&notes, 0.0);
    assert_eq!(f.renderer.foreground().note_indices(), vec![0]);

    f.foreground_at(&notes, 10.0);
    assert!(f.renderer.foreground().note_indices().is_empty());
    assert_eq!(f.renderer.background().note_indices(), vec![0]);
}

#[test]
fn test_every_intersecting_note_drawn_exactly_once() {
    let notes = NoteSet::new(vec![
        Note::new(60, 0.0, 1.0, 0),
        Note::new(62, 0.5, 0.5, 1),
        Note::new(64, 2.0, 6.0, 2),
        Note::new(67, 4.0, 4.5, 0),
        Note::new(72, 7.9, 9.0, 3),
        Note::new(76, 12.0, 12.25, 1),
        Note::new(60, 3.0, 11.0, 0),
    ]);
    let mut f = Fixture::new(&notes);
    f.background(&notes);

    for step in 0..30 {
        let t = step as f64 * 0.5;
        let window = f.foreground_at(&notes, t);
        let expected: Vec<usize> = notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.intersects(window.start, window.end))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(f.renderer.foreground().note_indices(), expected, "t = {}", t);
    }
}

#[test]
fn test_background_draws_one_lane_per_key() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    f.background(&notes);

    let commands = f.renderer.background().commands();
    let lanes = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    let labels: Vec<&str> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(lanes, 17);
    assert_eq!(labels.len(), 17);
    assert_eq!(labels[8], "C4");
    assert_eq!(labels[9], "E");
}

#[test]
fn test_lower_keys_are_longer() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    f.background(&notes);

    let key_heights: Vec<f64> = f
        .renderer
        .background()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { rect, .. } => Some(rect.height),
            _ => None,
        })
        .collect();
    // Display index 8 is the lowest tine, 16 the highest
    assert_eq!(key_heights[8], 560.0);
    assert_eq!(key_heights[16], 140.0);
    assert!(key_heights[9] < key_heights[8]);
}

#[test]
fn test_already_sounding_notes_are_gray() {
    let notes = NoteSet::new(vec![Note::new(60, 0.0, 3.0, 4), Note::new(64, 1.5, 2.0, 4)]);
    let mut f = Fixture::new(&notes);
    f.foreground_at(&notes, 1.0);

    let colors: Vec<Rgba> = f
        .renderer
        .foreground()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Note { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec![Rgba::GRAY, CATEGORY10[4]]);
}

#[test]
fn test_zero_length_note_is_one_pixel_tall() {
    let notes = NoteSet::new(vec![Note::new(60, 1.0, 1.0, 0)]);
    let mut f = Fixture::new(&notes);
    f.foreground_at(&notes, 0.0);

    let glyph = f
        .renderer
        .foreground()
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Note { glyph, .. } => Some(*glyph),
            _ => None,
        })
        .unwrap();
    assert_eq!(glyph.height, 1.0);
    assert_eq!(glyph.narrow_width, glyph.width / 2.0);
}

#[test]
fn test_window_band_tracks_detail_window() {
    let notes = NoteSet::new(vec![Note::new(60, 0.0, 8.0, 0)]);
    let mut f = Fixture::new(&notes);
    f.foreground_at(&notes, 0.0);

    let band = f
        .renderer
        .foreground()
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .unwrap();
    assert_eq!(band, Rect::new(700.0, 300.0, 80.0, 280.0));
}

#[test]
fn test_top_margin_is_cleared_after_foreground() {
    let notes = NoteSet::new(vec![Note::new(60, 0.0, 10.0, 0)]);
    let mut f = Fixture::new(&notes);
    f.foreground_at(&notes, 0.0);

    let fg = f.renderer.foreground();
    assert_eq!(fg.pixel(350, 10), Some(Rgba::TRANSPARENT));
    assert!(fg.pixel(350, 100).unwrap().a > 0);
}

#[test]
fn test_composite_puts_foreground_on_top() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    f.background(&notes);
    f.foreground_at(&notes, 0.0);

    let pixels = f.renderer.composite();
    assert_eq!(pixels.len(), 800 * 600 * 4);
    let i = (500 * 800 + 350) * 4;
    let c = CATEGORY10[0];
    assert_eq!(&pixels[i..i + 4], &[c.r, c.g, c.b, 255]);
}

#[test]
fn test_empty_notes_draw_nothing() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    f.background(&notes);
    f.foreground_at(&notes, 0.0);

    let empty = NoteSet::empty();
    assert_eq!(f.background(&empty), 0);
    f.foreground_at(&empty, 0.0);
    assert!(f.renderer.background().commands().is_empty());
    assert!(f.renderer.foreground().commands().is_empty());
    assert!(f.renderer.background().pixels().iter().all(|&b| b == 0));
}

#[test]
fn test_notes_outside_the_tuning_are_skipped() {
    let notes = NoteSet::new(vec![Note::new(61, 0.0, 1.0, 0), Note::new(62, 0.0, 1.0, 0)]);
    let mut f = Fixture::new(&notes);
    assert_eq!(f.background(&notes), 1);
    assert_eq!(f.renderer.background().note_indices(), vec![1]);
}

#[test]
fn test_resize_follows_pixel_ratio() {
    let notes = single_note();
    let mut f = Fixture::new(&notes);
    let hi_dpi = Viewport::from_outer(800.0, 600.0, Margin::default(), 2.0).unwrap();
    f.renderer.resize(&hi_dpi);
    assert_eq!(f.renderer.background().width(), 1600);
    assert_eq!(f.renderer.foreground().height(), 1200);
}
