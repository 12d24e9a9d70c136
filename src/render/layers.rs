//! Background and foreground layers of a roll.
//!
//! The background holds everything that only changes with the data, the
//! tuning or the viewport: one lane per key and the overview minimap. The
//! foreground is cleared and repainted on every playback tick with the notes
//! in the detail window and the overview band marking that window.

use super::color::{channel_color, Rgba, CATEGORY10};
use super::surface::{NoteGlyph, Rect, Surface};
use crate::note::{Note, NoteSet};
use crate::pitch::lane_label;
use crate::scroll::DetailWindow;
use crate::transform::{AxisPair, LinearScale, Transforms};
use crate::tuning::Tuning;
use crate::viewport::{RollLayout, Viewport};

#[derive(Debug, Clone)]
pub struct RollStyle {
    pub palette: Vec<Rgba>,
    /// Fill for detail notes that were already sounding when the window opened
    pub sounding: Rgba,
    pub key_fill: Rgba,
    pub label: Rgba,
    pub window_band: Rgba,
    /// Horizontal gap on each side of a key
    pub key_inset: f64,
    /// Distance of the label baseline above the key's far end
    pub label_offset: f64,
}

impl Default for RollStyle {
    fn default() -> Self {
        Self {
            palette: CATEGORY10.to_vec(),
            sounding: Rgba::GRAY,
            key_fill: Rgba::rgb(255, 255, 255).with_opacity(0.5),
            label: Rgba::BLACK,
            window_band: Rgba::rgb(70, 130, 180).with_opacity(0.4),
            key_inset: 2.0,
            label_offset: 10.0,
        }
    }
}

/// Everything a draw pass reads
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub notes: &'a NoteSet,
    pub tuning: &'a Tuning,
    pub transforms: &'a Transforms,
    pub layout: &'a RollLayout,
    pub viewport: &'a Viewport,
}

#[derive(Debug, Clone)]
pub struct LayerRenderer {
    background: Surface,
    foreground: Surface,
    style: RollStyle,
}

impl LayerRenderer {
    pub fn new(viewport: &Viewport) -> Self {
        Self::with_style(viewport, RollStyle::default())
    }

    pub fn with_style(viewport: &Viewport, style: RollStyle) -> Self {
        Self {
            background: Surface::new(viewport),
            foreground: Surface::new(viewport),
            style,
        }
    }

    pub fn style(&self) -> &RollStyle {
        &self.style
    }

    /// Re-derive both backing stores; callers redraw afterwards.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.background.resize(viewport);
        self.foreground.resize(viewport);
    }

    pub fn background(&self) -> &Surface {
        &self.background
    }

    pub fn foreground(&self) -> &Surface {
        &self.foreground
    }

    /// Wipe both layers
    pub fn clear(&mut self) {
        self.background.clear();
        self.foreground.clear();
    }

    /// Paint keys and the overview minimap. Returns the number of notes drawn.
    pub fn draw_background(&mut self, scene: &Scene<'_>) -> usize {
        self.background.clear();
        if scene.notes.is_empty() {
            return 0;
        }
        draw_keys(&mut self.background, scene, &self.style);
        let overview = &scene.transforms.overview;
        let (t0, t1) = overview.time.domain();
        draw_notes(
            &mut self.background,
            scene,
            overview,
            DetailWindow { start: t0, end: t1 },
            &self.style,
        )
    }

    /// Paint the detail notes inside `window` and the overview band.
    ///
    /// Returns the number of notes drawn.
    pub fn draw_foreground(&mut self, scene: &Scene<'_>, window: DetailWindow) -> usize {
        self.foreground.clear();
        if scene.notes.is_empty() {
            return 0;
        }
        let drawn = draw_notes(
            &mut self.foreground,
            scene,
            &scene.transforms.detail,
            window,
            &self.style,
        );
        draw_window_band(&mut self.foreground, scene, window, &self.style);

        // Glyphs reaching past the window end spill into the top margin
        let strip = Rect::new(0.0, 0.0, scene.viewport.outer_width(), scene.viewport.margin.top);
        self.foreground.clear_rect(strip);
        drawn
    }

    /// Foreground over background, RGBA8 in device pixels
    pub fn composite(&self) -> Vec<u8> {
        let mut out = self.background.pixels().to_vec();
        for (dst, src) in out
            .chunks_exact_mut(4)
            .zip(self.foreground.pixels().chunks_exact(4))
        {
            if src[3] > 0 {
                super::surface::blend(dst, Rgba::new(src[0], src[1], src[2], src[3]));
            }
        }
        out
    }
}

/// One lane per key, its length following the physical tine length
fn draw_keys(surface: &mut Surface, scene: &Scene<'_>, style: &RollStyle) {
    let x = &scene.transforms.detail.pitch;
    let height = scene.viewport.height;
    let top = scene.viewport.margin.top;
    let (low, high) = scene.tuning.extent();
    let key_length = LinearScale::new((low as f64, high as f64), (height, height / 4.0));
    let width = x.unit() - 2.0 * style.key_inset;

    for (index, &pitch) in scene.tuning.pitches_in_display_order().iter().enumerate() {
        let x_pos = x.map(index as f64);
        let key_height = key_length.map(pitch as f64);
        surface.fill_rect(
            Rect::new(x_pos + style.key_inset, top, width, key_height),
            style.key_fill,
        );
        surface.fill_text(
            x_pos + width / 2.0 + style.key_inset,
            top + key_height - style.label_offset,
            lane_label(pitch),
            style.label,
        );
    }
}

/// Draw every note intersecting `window` with the given axes.
fn draw_notes(
    surface: &mut Surface,
    scene: &Scene<'_>,
    axes: &AxisPair,
    window: DetailWindow,
    style: &RollStyle,
) -> usize {
    let lane_width = axes.pitch.unit();
    let top = scene.viewport.margin.top;
    let mut drawn = 0;

    for (index, note) in scene.notes.iter().enumerate() {
        if !note.intersects(window.start, window.end) {
            continue;
        }
        let Some(lane) = scene.tuning.index_of(note.pitch) else {
            continue;
        };
        let glyph = note_glyph(note, lane, axes, lane_width, top);
        let color = if note.start >= window.start {
            channel_color(&style.palette, note.channel)
        } else {
            style.sounding
        };
        surface.fill_note(index, glyph, color);
        drawn += 1;
    }
    drawn
}

fn note_glyph(note: &Note, lane: usize, axes: &AxisPair, lane_width: f64, top: f64) -> NoteGlyph {
    let start_pos = axes.time.map(note.start);
    let end_pos = axes.time.map(note.end);
    NoteGlyph {
        x: axes.pitch.map(lane as f64),
        y: top + end_pos,
        width: lane_width,
        height: (start_pos - end_pos).max(1.0),
        narrow_width: lane_width / 2.0,
    }
}

/// Translucent band on the overview covering the detail window
fn draw_window_band(
    surface: &mut Surface,
    scene: &Scene<'_>,
    window: DetailWindow,
    style: &RollStyle,
) {
    let y = &scene.transforms.overview.time;
    let upper = y.map(window.end);
    let lower = y.map(window.start);
    surface.fill_rect(
        Rect::new(
            scene.layout.overview_x.0,
            scene.viewport.margin.top + upper,
            scene.layout.overview_width,
            lower - upper,
        ),
        style.window_band,
    );
}
