//! Colours and the qualitative note palette

/// Straight (non-premultiplied) RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Colour with a fractional opacity (0.0-1.0)
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ten-colour qualitative palette (category10)
pub const CATEGORY10: [Rgba; 10] = [
    Rgba::rgb(0x1f, 0x77, 0xb4),
    Rgba::rgb(0xff, 0x7f, 0x0e),
    Rgba::rgb(0x2c, 0xa0, 0x2c),
    Rgba::rgb(0xd6, 0x27, 0x28),
    Rgba::rgb(0x94, 0x67, 0xbd),
    Rgba::rgb(0x8c, 0x56, 0x4b),
    Rgba::rgb(0xe3, 0x77, 0xc2),
    Rgba::rgb(0x7f, 0x7f, 0x7f),
    Rgba::rgb(0xbc, 0xbd, 0x22),
    Rgba::rgb(0x17, 0xbe, 0xcf),
];

/// Colour for a channel, cycling through the palette
pub fn channel_color(palette: &[Rgba], channel: u8) -> Rgba {
    if palette.is_empty() {
        return Rgba::GRAY;
    }
    palette[channel as usize % palette.len()]
}

/// Hue wheel over the twelve pitch classes, C = red
pub fn pitch_class_color(pitch: u8) -> Rgba {
    let hue = (pitch % 12) as f64 / 12.0 * 360.0;
    hsl_to_rgb(hue, 0.75, 0.45)
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgba {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba::rgb(to_u8(r), to_u8(g), to_u8(b))
}
