//! Notes back to tab text

use super::parser::base_pitch;
use super::SymbolMode;
use crate::note::Note;
use crate::pitch::PITCH_NAMES;
use crate::render::pitch_class_color;
use crate::tuning::Tuning;

const OCTAVE_MARK: char = '°';

/// Notes grouped into lines of chords
type Lines = Vec<Vec<Vec<u8>>>;

/// Group notes by onset. Notes starting within `spacing` of a group's first
/// onset join it; a silence longer than `spacing` starts a new line.
fn group(notes: &[Note], tuning: &Tuning, spacing: f64) -> Lines {
    let lowest = tuning.extent().0;
    let mut sorted: Vec<&Note> = notes
        .iter()
        .filter(|n| {
            if n.pitch < lowest {
                log::warn!("Skipping pitch {} below the tuning's lowest key {}", n.pitch, lowest);
                false
            } else {
                true
            }
        })
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));

    let mut lines: Lines = Vec::new();
    let mut line: Vec<Vec<u8>> = Vec::new();
    let mut chord: Vec<u8> = Vec::new();
    let mut chord_start = f64::NEG_INFINITY;
    let mut last_end = f64::NEG_INFINITY;

    for note in sorted {
        if !chord.is_empty() && note.start - chord_start <= spacing {
            chord.push(note.pitch);
            last_end = last_end.max(note.end);
            continue;
        }
        if !chord.is_empty() {
            line.push(std::mem::take(&mut chord));
        }
        if !line.is_empty() && note.start - last_end > spacing {
            lines.push(std::mem::take(&mut line));
        }
        chord_start = note.start;
        last_end = last_end.max(note.end);
        chord.push(note.pitch);
    }
    if !chord.is_empty() {
        line.push(chord);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Symbol for one pitch. Octave marks count up from the lowest key of the
/// symbol's letter, so sharps read back to the same pitch.
pub fn symbol(pitch: u8, tuning: &Tuning, mode: SymbolMode) -> String {
    let pitch_class = pitch % 12;
    let name = PITCH_NAMES[pitch_class as usize];
    let natural = if name.ends_with('#') { pitch.saturating_sub(1) } else { pitch };
    let base = base_pitch(tuning.extent().0, natural % 12);
    let octaves = natural.saturating_sub(base) / 12;

    let mut out = match mode {
        SymbolMode::Letter => name.to_string(),
        SymbolMode::Number => {
            let degree = match &name[..1] {
                "C" => '1',
                "D" => '2',
                "E" => '3',
                "F" => '4',
                "G" => '5',
                "A" => '6',
                _ => '7',
            };
            format!("{}{}", degree, &name[1..])
        }
    };
    out.extend(std::iter::repeat(OCTAVE_MARK).take(octaves as usize));
    out
}

pub fn notes_to_tab(notes: &[Note], tuning: &Tuning, mode: SymbolMode, spacing: f64) -> String {
    group(notes, tuning, spacing)
        .iter()
        .map(|line| {
            line.iter()
                .map(|chord| {
                    let symbols: Vec<String> =
                        chord.iter().map(|&p| symbol(p, tuning, mode)).collect();
                    if symbols.len() == 1 {
                        symbols.join("")
                    } else {
                        format!("({})", symbols.join(" "))
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`notes_to_tab`], with every symbol coloured by pitch class
pub fn notes_to_html_tab(notes: &[Note], tuning: &Tuning, mode: SymbolMode, spacing: f64) -> String {
    let span = |pitch: u8| {
        format!(
            "<span class=\"note\" style=\"color: {}\">{}</span>",
            pitch_class_color(pitch).to_hex(),
            symbol(pitch, tuning, mode)
        )
    };

    group(notes, tuning, spacing)
        .iter()
        .map(|line| {
            line.iter()
                .map(|chord| {
                    let symbols: Vec<String> = chord.iter().map(|&p| span(p)).collect();
                    if symbols.len() == 1 {
                        symbols.join("")
                    } else {
                        format!("<span class=\"chord\">({})</span>", symbols.join(" "))
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("<br/>\n")
}
