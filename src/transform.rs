//! # Coordinate Transforms
//!
//! Monotonic linear mappings from domain values (display index, seconds) to
//! pixels, one pair per view:
//!
//! - **Overview**: pitch domain `[0, keyCount]`, time domain `[0, maxNoteEnd]`,
//!   fixed per data set.
//! - **Detail**: pitch domain `[minIndex - 1, maxIndex + 2]` (one lane of
//!   padding so glyphs at the edges are not clipped), time domain
//!   `[currentTime, currentTime + visibleSpan]`, recomputed every frame.
//!
//! Both time axes are inverted: the domain start maps to the bottom of the
//! plot and later times rise toward the top.
//!
//! ```rust
//! use pianoroll::transform::LinearScale;
//!
//! let y = LinearScale::new((10.0, 14.0), (400.0, 0.0));
//! assert_eq!(y.map(10.0), 400.0);
//! assert_eq!(y.map(12.0), 200.0);
//! assert_eq!(y.invert(100.0), 13.0);
//! ```

/// `f(v) = r0 + (v - d0) / (d1 - d0) * (r1 - r0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    /// Domain value to pixel. A collapsed domain maps everything to the range midpoint.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Pixel back to domain value. A collapsed range maps to the domain midpoint.
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 || !span.is_finite() {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / span * (d1 - d0)
    }

    /// Pixel distance covered by one domain unit
    pub fn unit(&self) -> f64 {
        self.map(1.0) - self.map(0.0)
    }
}

/// Pitch (x) and time (y) scales of one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPair {
    pub pitch: LinearScale,
    pub time: LinearScale,
}

/// Independent transforms of the overview and the detail view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub overview: AxisPair,
    pub detail: AxisPair,
}

/// Detail pitch domain with one lane of padding on either side
pub fn detail_pitch_domain(min_index: usize, max_index: usize) -> (f64, f64) {
    (min_index as f64 - 1.0, max_index as f64 + 2.0)
}

/// Overview pitch domain covering every lane of the tuning
pub fn overview_pitch_domain(key_count: usize) -> (f64, f64) {
    (0.0, key_count as f64)
}

/// Overview time domain; `None` when there is no note to bound it
pub fn overview_time_domain(max_note_end: Option<f64>) -> Option<(f64, f64)> {
    max_note_end.map(|end| (0.0, end))
}

/// Detail time domain starting at the playback position
pub fn detail_time_domain(current_time: f64, visible_span: f64) -> (f64, f64) {
    (current_time, current_time + visible_span)
}
