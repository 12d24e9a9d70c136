//! # Scroll/Window Controller
//!
//! Derives the domains of both views:
//!
//! - On every playback time change only the detail time domain moves:
//!   `[currentTime, currentTime + visibleSpan]`, `visibleSpan = 2 × rowSpan`.
//! - When the note set or the tuning is replaced (detected by comparing their
//!   [`Generation`] stamps, never their contents) every domain is recomputed
//!   and the tuning used for pitch → lane lookups is swapped in before any
//!   draw that depends on it.
//! - On resize only the pixel ranges change.
//!
//! An empty note set leaves the controller without transforms; callers treat
//! that as "nothing to draw".

use crate::note::{Generation, NoteSet};
use crate::transform::{
    detail_pitch_domain, detail_time_domain, overview_pitch_domain, overview_time_domain,
    AxisPair, LinearScale, Transforms,
};
use crate::tuning::Tuning;
use crate::viewport::{RollLayout, Viewport};
use std::sync::Arc;

/// Visible slice of the timeline in the detail view, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailWindow {
    pub start: f64,
    pub end: f64,
}

impl DetailWindow {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// What a data sync changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChange {
    Unchanged,
    /// Domains recomputed; static layers must be redrawn
    Rebuilt,
    /// New data is empty; nothing can be drawn
    Emptied,
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    row_span: f64,
    overview_width: f64,
    layout: RollLayout,
    data_key: Option<(Generation, Generation)>,
    tuning: Option<Arc<Tuning>>,
    transforms: Option<Transforms>,
    window: Option<DetailWindow>,
}

impl ScrollController {
    pub fn new(viewport: &Viewport, row_span: f64, overview_width: f64) -> Self {
        Self {
            row_span,
            overview_width,
            layout: RollLayout::new(viewport, overview_width),
            data_key: None,
            tuning: None,
            transforms: None,
            window: None,
        }
    }

    /// Seconds of timeline visible in the detail view
    pub fn visible_span(&self) -> f64 {
        2.0 * self.row_span
    }

    pub fn layout(&self) -> &RollLayout {
        &self.layout
    }

    pub fn transforms(&self) -> Option<&Transforms> {
        self.transforms.as_ref()
    }

    pub fn window(&self) -> Option<DetailWindow> {
        self.window
    }

    /// Tuning the current transforms were built for
    pub fn tuning(&self) -> Option<&Arc<Tuning>> {
        self.tuning.as_ref()
    }

    /// Recompute all domains if the note set or tuning was replaced.
    pub fn sync_data(&mut self, notes: &NoteSet, tuning: &Arc<Tuning>) -> DataChange {
        let key = (notes.generation(), tuning.generation());
        if self.data_key == Some(key) {
            return DataChange::Unchanged;
        }
        self.data_key = Some(key);
        self.tuning = Some(Arc::clone(tuning));

        let Some(overview_time) = overview_time_domain(notes.max_end()) else {
            log::debug!("Note set {} is empty, clearing transforms", notes.generation().value());
            self.transforms = None;
            self.window = None;
            return DataChange::Emptied;
        };

        let key_count = tuning.key_count();
        let current = self.window.map(|w| w.start).unwrap_or(0.0);
        let detail_time = detail_time_domain(current, self.visible_span());
        let layout = self.layout;

        self.transforms = Some(Transforms {
            overview: AxisPair {
                pitch: LinearScale::new(overview_pitch_domain(key_count), layout.overview_x),
                time: LinearScale::new(overview_time, layout.y),
            },
            detail: AxisPair {
                pitch: LinearScale::new(
                    detail_pitch_domain(0, key_count.saturating_sub(1)),
                    layout.detail_x,
                ),
                time: LinearScale::new(detail_time, layout.y),
            },
        });
        self.window = Some(DetailWindow {
            start: detail_time.0,
            end: detail_time.1,
        });
        log::debug!(
            "Rebuilt transforms for {} notes on '{}' (overview 0..{:.3}s)",
            notes.len(),
            tuning.name(),
            overview_time.1
        );
        DataChange::Rebuilt
    }

    /// Move the detail window to a new playback time.
    ///
    /// Returns `None` when there is no data to scroll.
    pub fn on_time(&mut self, current_time: f64) -> Option<DetailWindow> {
        let visible_span = self.visible_span();
        let transforms = self.transforms.as_mut()?;
        let t = if current_time.is_finite() { current_time.max(0.0) } else { 0.0 };
        let domain = detail_time_domain(t, visible_span);
        transforms.detail.time.set_domain(domain);
        let window = DetailWindow {
            start: domain.0,
            end: domain.1,
        };
        self.window = Some(window);
        Some(window)
    }

    /// Re-derive pixel ranges; domains are kept.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.layout = RollLayout::new(viewport, self.overview_width);
        let layout = self.layout;
        if let Some(t) = self.transforms.as_mut() {
            t.overview.pitch.set_range(layout.overview_x);
            t.overview.time.set_range(layout.y);
            t.detail.pitch.set_range(layout.detail_x);
            t.detail.time.set_range(layout.y);
        }
    }

    /// Forget the synced data so the next sync always rebuilds
    pub fn invalidate(&mut self) {
        self.data_key = None;
    }
}
