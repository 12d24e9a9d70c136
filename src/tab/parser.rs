//! Tokens to timed notes

use super::lexer::{LocatedToken, Token};
use crate::error::RollError;
use crate::note::Note;
use crate::pitch::letter_to_semitone;
use crate::tuning::Tuning;

/// One symbol resolved to a pitch
#[derive(Debug, Clone, Copy, PartialEq)]
struct Symbol {
    pitch: u8,
}

/// One beat of the tab: a single symbol or a chord
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Single(Symbol),
    Chord(Vec<Symbol>),
}

pub struct Parser<'a> {
    tokens: &'a [LocatedToken],
    position: usize,
    lowest: u8,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [LocatedToken], tuning: &Tuning) -> Self {
        Self {
            tokens,
            position: 0,
            lowest: tuning.extent().0,
        }
    }

    fn peek(&self) -> Option<&'a LocatedToken> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a LocatedToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Parse every item; each lasts `beat` seconds, back to back.
    pub fn parse_notes(&mut self, beat: f64) -> Result<Vec<Note>, RollError> {
        let mut notes = Vec::new();
        let mut index = 0usize;

        while let Some(item) = self.parse_item()? {
            let start = index as f64 * beat;
            let end = start + beat;
            match item {
                Item::Single(symbol) => notes.push(Note::new(symbol.pitch, start, end, 0)),
                Item::Chord(symbols) => {
                    notes.extend(symbols.iter().map(|s| Note::new(s.pitch, start, end, 0)))
                }
            }
            index += 1;
        }

        Ok(notes)
    }

    fn parse_item(&mut self) -> Result<Option<Item>, RollError> {
        while let Some(located) = self.peek() {
            match located.token {
                Token::Newline => {
                    self.position += 1;
                }
                Token::LeftParen => {
                    self.position += 1;
                    return self.parse_chord(located).map(Some);
                }
                Token::Letter(_) | Token::Degree(_) => {
                    return self.parse_symbol().map(|s| Some(Item::Single(s)));
                }
                Token::RightParen => return Err(error_at(located, "Unmatched ')'")),
                Token::Sharp | Token::Flat | Token::OctaveUp => {
                    return Err(error_at(located, "Modifier without a note"))
                }
            }
        }
        Ok(None)
    }

    fn parse_chord(&mut self, open: &LocatedToken) -> Result<Item, RollError> {
        let mut symbols = Vec::new();
        loop {
            let Some(located) = self.peek() else {
                return Err(error_at(open, "Unclosed chord"));
            };
            match located.token {
                Token::RightParen => {
                    self.position += 1;
                    if symbols.is_empty() {
                        return Err(error_at(open, "Empty chord"));
                    }
                    return Ok(Item::Chord(symbols));
                }
                Token::LeftParen => return Err(error_at(located, "Nested chord")),
                Token::Newline => self.position += 1,
                _ => symbols.push(self.parse_symbol()?),
            }
        }
    }

    fn parse_symbol(&mut self) -> Result<Symbol, RollError> {
        let Some(located) = self.next() else {
            return Err(RollError::TabParse {
                line: 0,
                column: 0,
                message: "Unexpected end of input".to_string(),
            });
        };
        let letter = match located.token {
            Token::Letter(letter) => letter_to_semitone(letter),
            Token::Degree(degree) => degree_to_letter(degree).and_then(letter_to_semitone),
            _ => None,
        }
        .ok_or_else(|| error_at(located, "Expected a note"))?;

        let mut accidental = 0i16;
        let mut octaves = 0i16;
        while let Some(modifier) = self.peek() {
            match modifier.token {
                Token::Sharp => accidental += 1,
                Token::Flat => accidental -= 1,
                Token::OctaveUp => octaves += 1,
                _ => break,
            }
            self.position += 1;
        }

        // The letter picks the octave; accidentals shift from there
        let pitch = base_pitch(self.lowest, letter) as i16 + accidental + 12 * octaves;
        let pitch = u8::try_from(pitch)
            .ok()
            .filter(|&p| p <= 127)
            .ok_or_else(|| error_at(located, "Note above the MIDI range"))?;
        Ok(Symbol { pitch })
    }
}

/// Scale degree (1 = C … 7 = B) to its note letter
pub fn degree_to_letter(degree: u8) -> Option<char> {
    match degree {
        1 => Some('C'),
        2 => Some('D'),
        3 => Some('E'),
        4 => Some('F'),
        5 => Some('G'),
        6 => Some('A'),
        7 => Some('B'),
        _ => None,
    }
}

/// Lowest pitch of `pitch_class` at or above `lowest`
pub fn base_pitch(lowest: u8, pitch_class: u8) -> u8 {
    let offset = (pitch_class as i16 - (lowest % 12) as i16).rem_euclid(12);
    lowest.saturating_add(offset as u8)
}

fn error_at(located: &LocatedToken, message: &str) -> RollError {
    RollError::TabParse {
        line: located.line,
        column: located.column,
        message: message.to_string(),
    }
}
