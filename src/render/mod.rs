//! # Layer Renderer
//!
//! Converts notes and transforms into drawing commands on two surfaces:
//!
//! - **Background**: key lanes with labels, then every note once through the
//!   overview transform. Redrawn only when the notes, the tuning or the
//!   viewport change.
//! - **Foreground**: redrawn on every transport tick. Only notes intersecting
//!   the detail window are drawn, followed by a translucent band on the
//!   overview showing where the window sits in the whole piece.
//!
//! Notes are vertical trapezoids, wide at the release and narrowing toward
//! the onset, at least one pixel tall. Fill colour comes from the palette by
//! `channel mod paletteSize`. An empty note set clears both layers and draws
//! nothing.
//!
//! ```rust
//! use pianoroll::render::{LayerRenderer, Scene};
//! use pianoroll::scroll::ScrollController;
//! use pianoroll::tuning::find_tuning;
//! use pianoroll::viewport::{Margin, Viewport};
//! use pianoroll::{Note, NoteSet};
//!
//! let viewport = Viewport::from_outer(800.0, 600.0, Margin::default(), 1.0).unwrap();
//! let tuning = find_tuning("Kalimba", "17 C Major").unwrap();
//! let notes = NoteSet::new(vec![Note::new(60, 0.0, 1.0, 0)]);
//!
//! let mut scroll = ScrollController::new(&viewport, 2.0, 80.0);
//! scroll.sync_data(&notes, &tuning);
//! let window = scroll.on_time(0.0).unwrap();
//!
//! let mut renderer = LayerRenderer::new(&viewport);
//! let scene = Scene {
//!     notes: &notes,
//!     tuning: &tuning,
//!     transforms: scroll.transforms().unwrap(),
//!     layout: scroll.layout(),
//!     viewport: &viewport,
//! };
//! assert_eq!(renderer.draw_background(&scene), 1);
//! assert_eq!(renderer.draw_foreground(&scene, window), 1);
//! ```

mod color;
mod layers;
mod surface;

pub use color::{channel_color, pitch_class_color, Rgba, CATEGORY10};
pub use layers::{LayerRenderer, RollStyle, Scene};
pub use surface::{DrawCommand, NoteGlyph, Rect, Surface};

#[cfg(test)]
mod tests;
