//! Drawing surfaces.
//!
//! A [`Surface`] is an RGBA8 backing store sized from the viewport in device
//! pixels. Drawing calls take CSS-pixel coordinates and are scaled by the
//! device pixel ratio. Every call is also appended to a command list, cleared
//! together with the pixels, so callers can inspect exactly what the last
//! redraw produced. Text is only recorded; glyph rasterisation is left to the
//! host.

use super::color::Rgba;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same rectangle with non-negative width and height
    fn normalized(&self) -> Rect {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Rect::new(x, y, width, height)
    }
}

/// Vertical trapezoid for one note.
///
/// The wide edge (`width`) sits at `y`, the release end of the note; the
/// narrow edge (`narrow_width`) sits at `y + height`, the onset. Both edges
/// share the same centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteGlyph {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub narrow_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect(Rect),
    FillRect { rect: Rect, color: Rgba },
    /// `index` is the note's position in the drawn note set
    Note { index: usize, glyph: NoteGlyph, color: Rgba },
    Text { x: f64, y: f64, text: String, color: Rgba },
}

#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<u8>,
    commands: Vec<DrawCommand>,
}

impl Surface {
    pub fn new(viewport: &Viewport) -> Self {
        let (width, height) = viewport.backing_size();
        Self {
            width,
            height,
            scale: viewport.device_pixel_ratio,
            pixels: vec![0; width as usize * height as usize * 4],
            commands: Vec::new(),
        }
    }

    /// Re-derive the backing store from the viewport; contents are discarded.
    pub fn resize(&mut self, viewport: &Viewport) {
        *self = Surface::new(viewport);
    }

    /// Width in device pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in device pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Row-major RGBA8
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Indices of every note drawn since the last clear, in draw order
    pub fn note_indices(&self) -> Vec<usize> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Note { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Colour of a device pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    /// Clear every pixel and forget recorded commands
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.commands.clear();
    }

    pub fn clear_rect(&mut self, rect: Rect) {
        let (x0, x1, y0, y1) = self.device_bounds(&rect.normalized());
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            let from = (row + x0 as usize) * 4;
            let to = (row + x1 as usize) * 4;
            self.pixels[from..to].fill(0);
        }
        self.commands.push(DrawCommand::ClearRect(rect));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let (x0, x1, y0, y1) = self.device_bounds(&rect.normalized());
        for y in y0..y1 {
            self.fill_span(y, x0, x1, color);
        }
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    pub fn fill_note(&mut self, index: usize, glyph: NoteGlyph, color: Rgba) {
        self.rasterize_trapezoid(&glyph, color);
        self.commands.push(DrawCommand::Note {
            index,
            glyph,
            color,
        });
    }

    pub fn fill_text(&mut self, x: f64, y: f64, text: impl Into<String>, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.into(),
            color,
        });
    }

    /// Device-pixel bounds `(x0, x1, y0, y1)`, clipped to the surface
    fn device_bounds(&self, rect: &Rect) -> (u32, u32, u32, u32) {
        let clip = |v: f64, max: u32| -> u32 {
            if v.is_nan() {
                0
            } else {
                v.round().clamp(0.0, max as f64) as u32
            }
        };
        (
            clip(rect.x * self.scale, self.width),
            clip((rect.x + rect.width) * self.scale, self.width),
            clip(rect.y * self.scale, self.height),
            clip((rect.y + rect.height) * self.scale, self.height),
        )
    }

    fn rasterize_trapezoid(&mut self, glyph: &NoteGlyph, color: Rgba) {
        if !(glyph.height > 0.0) {
            return;
        }
        let top = (glyph.y * self.scale).round();
        let bottom = ((glyph.y + glyph.height) * self.scale).round().max(top + 1.0);
        let center = glyph.x + glyph.width / 2.0;

        let first = top.max(0.0);
        let last = bottom.min(self.height as f64);
        let mut row = first;
        while row < last {
            // Position of the row centre along the glyph, 0 at the wide edge
            let t = (((row + 0.5) / self.scale - glyph.y) / glyph.height).clamp(0.0, 1.0);
            let half = (glyph.width + (glyph.narrow_width - glyph.width) * t) / 2.0;
            let x0 = ((center - half) * self.scale).round().clamp(0.0, self.width as f64) as u32;
            let x1 = ((center + half) * self.scale).round().clamp(0.0, self.width as f64) as u32;
            self.fill_span(row as u32, x0, x1, color);
            row += 1.0;
        }
    }

    fn fill_span(&mut self, y: u32, x0: u32, x1: u32, color: Rgba) {
        if color.a == 0 || y >= self.height {
            return;
        }
        let row = y as usize * self.width as usize;
        for x in x0..x1.min(self.width) {
            let i = (row + x as usize) * 4;
            blend(&mut self.pixels[i..i + 4], color);
        }
    }
}

/// Source-over compositing of a straight-alpha colour onto a pixel
pub(crate) fn blend(dst: &mut [u8], src: Rgba) {
    if src.a == 255 {
        dst.copy_from_slice(&[src.r, src.g, src.b, 255]);
        return;
    }
    let sa = src.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mix = |s: u8, d: u8| -> u8 {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    dst[0] = mix(src.r, dst[0]);
    dst[1] = mix(src.g, dst[1]);
    dst[2] = mix(src.b, dst[2]);
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Margin;

    fn surface(dpr: f64) -> Surface {
        let vp = Viewport::from_outer(100.0, 50.0, Margin::default(), dpr).unwrap();
        Surface::new(&vp)
    }

    #[test]
    fn test_size_follows_pixel_ratio() {
        let s = surface(2.0);
        assert_eq!((s.width(), s.height()), (200, 100));
        assert_eq!(s.pixels().len(), 200 * 100 * 4);
    }

    #[test]
    fn test_fill_rect_and_clear_rect() {
        let mut s = surface(1.0);
        s.fill_rect(Rect::new(10.0, 10.0, 5.0, 5.0), Rgba::rgb(255, 0, 0));
        assert_eq!(s.pixel(12, 12), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(s.pixel(16, 12), Some(Rgba::TRANSPARENT));
        s.clear_rect(Rect::new(0.0, 0.0, 100.0, 12.0));
        assert_eq!(s.pixel(12, 11), Some(Rgba::TRANSPARENT));
        assert_eq!(s.pixel(12, 12), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(s.commands().len(), 2);
    }

    #[test]
    fn test_rect_is_clipped_and_normalized() {
        let mut s = surface(1.0);
        s.fill_rect(Rect::new(95.0, 45.0, 20.0, -10.0), Rgba::BLACK);
        assert_eq!(s.pixel(99, 40), Some(Rgba::BLACK));
        assert_eq!(s.pixel(99, 46), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_trapezoid_narrows_toward_onset() {
        let mut s = surface(1.0);
        let glyph = NoteGlyph {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
            narrow_width: 10.0,
        };
        s.fill_note(7, glyph, Rgba::BLACK);
        let row_width = |y: u32| (0..100).filter(|&x| s.pixel(x, y).unwrap().a > 0).count();
        assert!(row_width(10) > row_width(29));
        assert!(row_width(29) >= 10);
        assert_eq!(s.note_indices(), vec![7]);
    }

    #[test]
    fn test_thin_note_still_covers_a_row() {
        let mut s = surface(1.0);
        let glyph = NoteGlyph {
            x: 0.0,
            y: 5.2,
            width: 4.0,
            height: 0.1,
            narrow_width: 2.0,
        };
        s.fill_note(0, glyph, Rgba::BLACK);
        assert!(s.pixels().iter().skip(3).step_by(4).any(|&a| a > 0));
    }

    #[test]
    fn test_blend_half_white_over_transparent() {
        let mut px = [0u8, 0, 0, 0];
        blend(&mut px, Rgba::rgb(255, 255, 255).with_opacity(0.5));
        assert_eq!(px, [255, 255, 255, 128]);
    }

    #[test]
    fn test_clear_forgets_commands() {
        let mut s = surface(1.0);
        s.fill_text(1.0, 1.0, "C4", Rgba::BLACK);
        assert_eq!(s.commands().len(), 1);
        s.clear();
        assert!(s.commands().is_empty());
    }
}
