//! MIDI pitch naming.
//!
//! MIDI 60 is `C4`. Names use sharps; parsing accepts both `#` and `b`.

/// Pitch-class names, indexed by `pitch % 12`
pub const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch-class name without octave (e.g., "F#")
pub fn note_name(pitch: u8) -> &'static str {
    PITCH_NAMES[(pitch % 12) as usize]
}

/// Octave number, with MIDI 60 in octave 4
pub fn octave(pitch: u8) -> i8 {
    (pitch / 12) as i8 - 1
}

/// Full label with octave (e.g., "C4", "F#3")
pub fn note_label(pitch: u8) -> String {
    format!("{}{}", note_name(pitch), octave(pitch))
}

/// Label shown on a key lane: the full label on C, the bare name elsewhere,
/// so each octave is anchored once.
pub fn lane_label(pitch: u8) -> String {
    if pitch % 12 == 0 {
        note_label(pitch)
    } else {
        note_name(pitch).to_string()
    }
}

/// Semitone offset from C for a natural note letter
pub fn letter_to_semitone(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse a label such as "C4", "F#3" or "Bb5" back into a MIDI number.
pub fn parse_note_label(label: &str) -> Option<u8> {
    let mut chars = label.trim().chars().peekable();
    let base = letter_to_semitone(chars.next()?)? as i16;
    let accidental = match chars.peek() {
        Some('#') => {
            chars.next();
            1
        }
        Some('b') => {
            chars.next();
            -1
        }
        _ => 0,
    };
    let octave: i16 = chars.collect::<String>().parse().ok()?;
    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi).ok().filter(|&m| m <= 127)
}
