//! # Roll View
//!
//! The view host: owns one viewport, one scroll controller and one layer
//! renderer, and decides between a full re-initialisation (data, tuning or
//! size changed) and a lightweight foreground redraw (time changed).
//!
//! A view observes a [`Transport`] through exactly one [`Subscription`].
//! [`RollView::pump`] takes the latest published time, if any, and redraws
//! once; intermediate times are never queued. [`RollView::dispose`] cancels
//! the subscription so a discarded view stops receiving notifications.

use crate::note::NoteSet;
use crate::render::{LayerRenderer, Scene};
use crate::scroll::{DataChange, DetailWindow, ScrollController};
use crate::transport::{Clock, Subscription, Transport};
use crate::tuning::Tuning;
use crate::viewport::{Drawable, Resizable, Viewport};
use std::sync::Arc;

pub struct RollView {
    viewport: Viewport,
    scroll: ScrollController,
    renderer: LayerRenderer,
    notes: NoteSet,
    tuning: Arc<Tuning>,
    subscription: Option<Subscription>,
    current_time: f64,
    notes_in_window: usize,
}

impl RollView {
    pub fn new(viewport: Viewport, tuning: Arc<Tuning>, row_span: f64, overview_width: f64) -> Self {
        Self {
            scroll: ScrollController::new(&viewport, row_span, overview_width),
            renderer: LayerRenderer::new(&viewport),
            viewport,
            notes: NoteSet::empty(),
            tuning,
            subscription: None,
            current_time: 0.0,
            notes_in_window: 0,
        }
    }

    pub fn renderer(&self) -> &LayerRenderer {
        &self.renderer
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn notes(&self) -> &NoteSet {
        &self.notes
    }

    pub fn tuning(&self) -> &Arc<Tuning> {
        &self.tuning
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Notes drawn in the detail view by the last foreground pass
    pub fn notes_in_window(&self) -> usize {
        self.notes_in_window
    }

    pub fn window(&self) -> Option<DetailWindow> {
        self.scroll.window()
    }

    /// Replace notes and tuning; repaints everything when either changed.
    pub fn set_data(&mut self, notes: NoteSet, tuning: Arc<Tuning>) {
        self.notes = notes;
        self.tuning = tuning;
        self.draw();
    }

    /// Observe a transport, replacing any previous subscription
    pub fn attach<C: Clock>(&mut self, transport: &mut Transport<C>) {
        self.subscription = Some(transport.subscribe());
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active())
    }

    /// Redraw for the most recent published time. Returns false when nothing was pending.
    pub fn pump(&mut self) -> bool {
        let Some(time) = self.subscription.as_ref().and_then(|s| s.latest()) else {
            return false;
        };
        self.redraw_frame(time);
        true
    }

    /// Stop observing the transport
    pub fn dispose(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            log::debug!("Roll view detached from transport");
        }
    }

    /// Bring domains in line with the current data; true if layers must be rebuilt
    fn sync(&mut self) -> bool {
        match self.scroll.sync_data(&self.notes, &self.tuning) {
            DataChange::Unchanged => false,
            DataChange::Rebuilt | DataChange::Emptied => true,
        }
    }

    fn draw_background(&mut self) {
        let Some(transforms) = self.scroll.transforms() else {
            self.renderer.clear();
            return;
        };
        let scene = Scene {
            notes: &self.notes,
            tuning: &self.tuning,
            transforms,
            layout: self.scroll.layout(),
            viewport: &self.viewport,
        };
        self.renderer.draw_background(&scene);
    }

    fn draw_foreground(&mut self) {
        let Some(window) = self.scroll.on_time(self.current_time) else {
            self.notes_in_window = 0;
            return;
        };
        let Some(transforms) = self.scroll.transforms() else {
            return;
        };
        let scene = Scene {
            notes: &self.notes,
            tuning: &self.tuning,
            transforms,
            layout: self.scroll.layout(),
            viewport: &self.viewport,
        };
        self.notes_in_window = self.renderer.draw_foreground(&scene, window);
    }
}

impl Resizable for RollView {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll.resize(&viewport);
        self.renderer.resize(&viewport);
        self.draw();
    }

    fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl Drawable for RollView {
    fn draw(&mut self) {
        self.sync();
        self.draw_background();
        self.draw_foreground();
    }

    fn redraw_frame(&mut self, current_time: f64) {
        self.current_time = current_time;
        if self.sync() {
            self.draw_background();
        }
        self.draw_foreground();
    }
}

impl Drop for RollView {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;
    use crate::transport::ManualClock;
    use crate::tuning::{find_tuning, KALIMBA};
    use crate::viewport::Margin;

    fn view() -> RollView {
        let viewport = Viewport::from_outer(800.0, 600.0, Margin::default(), 1.0).unwrap();
        let tuning = find_tuning(KALIMBA, "17 C Major").unwrap();
        RollView::new(viewport, tuning, 2.0, 80.0)
    }

    fn notes() -> NoteSet {
        NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0), Note::new(64, 5.0, 6.0, 1)])
    }

    #[test]
    fn test_set_data_draws_both_layers() {
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), tuning);
        assert_eq!(v.renderer().background().note_indices(), vec![0, 1]);
        assert_eq!(v.renderer().foreground().note_indices(), vec![0]);
        assert_eq!(v.notes_in_window(), 1);
    }

    #[test]
    fn test_redraw_frame_leaves_background_alone() {
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), tuning);
        let background = v.renderer().background().commands().to_vec();

        v.redraw_frame(4.5);
        assert_eq!(v.renderer().background().commands(), background.as_slice());
        assert_eq!(v.renderer().foreground().note_indices(), vec![1]);
        assert_eq!(v.window(), Some(DetailWindow { start: 4.5, end: 8.5 }));
    }

    #[test]
    fn test_tuning_change_rebuilds_lanes() {
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), tuning);
        let small = find_tuning(KALIMBA, "8 C Major").unwrap();
        v.set_data(v.notes().clone(), small);
        let lanes = v
            .renderer()
            .background()
            .commands()
            .iter()
            .filter(|c| matches!(c, crate::render::DrawCommand::Text { .. }))
            .count();
        assert_eq!(lanes, 8);
    }

    #[test]
    fn test_empty_data_clears_layers() {
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), Arc::clone(&tuning));
        v.set_data(NoteSet::empty(), tuning);
        assert!(v.renderer().background().commands().is_empty());
        assert!(v.renderer().foreground().commands().is_empty());
        v.redraw_frame(1.0);
        assert_eq!(v.notes_in_window(), 0);
    }

    #[test]
    fn test_pump_follows_transport() {
        let clock = ManualClock::new();
        let mut transport = Transport::with_clock(clock.clone());
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), tuning);
        v.attach(&mut transport);
        assert!(!v.pump());

        transport.play(v.notes().clone(), 1.0).unwrap();
        clock.advance(2.0);
        transport.tick();
        clock.advance(2.0);
        transport.tick();
        assert!(v.pump());
        assert_eq!(v.current_time(), 4.0);
        assert!(!v.pump());
    }

    #[test]
    fn test_dispose_stops_notifications() {
        let clock = ManualClock::new();
        let mut transport = Transport::with_clock(clock.clone());
        let mut v = view();
        v.attach(&mut transport);
        assert!(v.is_attached());
        v.dispose();
        assert!(!v.is_attached());
        transport.play(notes(), 1.0).unwrap();
        assert!(!v.pump());
        assert_eq!(transport.subscriber_count(), 0);
    }

    #[test]
    fn test_resize_rederives_backing_store() {
        let mut v = view();
        let tuning = Arc::clone(v.tuning());
        v.set_data(notes(), tuning);
        let hi_dpi = Viewport::from_outer(400.0, 300.0, Margin::default(), 2.0).unwrap();
        v.resize(hi_dpi);
        assert_eq!(v.renderer().background().width(), 800);
        assert_eq!(v.renderer().background().note_indices(), vec![0, 1]);
        assert_eq!(v.viewport().outer_width(), 400.0);
    }
}
