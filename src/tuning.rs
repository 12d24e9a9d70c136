//! # Tunings
//!
//! A [`Tuning`] is the ordered set of pitches an instrument can play. Besides
//! the ascending pitch list it keeps the *display order* (left to right on
//! screen) and a precomputed pitch → display index map, so lane lookups during
//! drawing are O(1).
//!
//! ## Kalimba Layout
//! Kalimba tines are laid out with the lowest tine in the middle, alternating
//! outward: the 2nd lowest goes left of centre, the 3rd right, and so on. For
//! the 17-key C major instrument this gives
//!
//! ```text
//! D6 B5 G5 E5 C5 A4 F4 D4 C4 E4 G4 B4 D5 F5 A5 C6 E6
//! ```
//!
//! ## Catalogue
//! [`tunings_for`] returns every built-in tuning of an instrument keyed by
//! name. Tunings are shared as `Arc<Tuning>`; each construction gets its own
//! [`Generation`], which the views use to notice tuning changes.

use crate::error::RollError;
use crate::note::Generation;
use crate::pitch::parse_note_label;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Instrument whose tunings ship with the crate
pub const KALIMBA: &str = "Kalimba";

/// How a tuning's pitches map to screen order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Ascending from left to right
    Linear,
    /// Lowest in the middle, alternating outward
    Lamellophone,
}

#[derive(Debug, Clone)]
pub struct Tuning {
    instrument: String,
    name: String,
    /// Ascending
    pitches: Vec<u8>,
    display_order: Vec<u8>,
    order_index: HashMap<u8, usize>,
    generation: Generation,
}

impl Tuning {
    /// Build a tuning from its pitches (any order, no duplicates).
    pub fn new(
        instrument: &str,
        name: &str,
        pitches: &[u8],
        layout: Layout,
    ) -> Result<Self, RollError> {
        if pitches.is_empty() {
            return Err(RollError::InvalidArgument(format!(
                "tuning '{}' has no pitches",
                name
            )));
        }
        let mut sorted = pitches.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(RollError::InvalidArgument(format!(
                "tuning '{}' lists a pitch twice",
                name
            )));
        }

        let display_order = match layout {
            Layout::Linear => sorted.clone(),
            Layout::Lamellophone => lamellophone_order(&sorted),
        };
        let order_index = display_order
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i))
            .collect();

        Ok(Self {
            instrument: instrument.to_string(),
            name: name.to_string(),
            pitches: sorted,
            display_order,
            order_index,
            generation: Generation::next(),
        })
    }

    /// Build a tuning from note labels such as `["C4", "D4", "E4"]`.
    pub fn from_labels(
        instrument: &str,
        name: &str,
        labels: &[&str],
        layout: Layout,
    ) -> Result<Self, RollError> {
        let pitches = labels
            .iter()
            .map(|label| {
                parse_note_label(label).ok_or_else(|| {
                    RollError::InvalidArgument(format!("invalid note label '{}'", label))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(instrument, name, &pitches, layout)
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pitches in ascending order
    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    /// Pitches in screen order, left to right
    pub fn pitches_in_display_order(&self) -> &[u8] {
        &self.display_order
    }

    pub fn key_count(&self) -> usize {
        self.pitches.len()
    }

    /// Display index of a pitch, `None` when the instrument cannot play it
    pub fn index_of(&self, pitch: u8) -> Option<usize> {
        self.order_index.get(&pitch).copied()
    }

    /// Lowest and highest pitch
    pub fn extent(&self) -> (u8, u8) {
        // Constructor guarantees at least one pitch
        (self.pitches[0], self.pitches[self.pitches.len() - 1])
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Lowest pitch in the centre; odd ranks fan out to the left, even ranks to the right.
fn lamellophone_order(ascending: &[u8]) -> Vec<u8> {
    let left = ascending.iter().skip(1).step_by(2).rev();
    let right = ascending.iter().step_by(2);
    left.chain(right).copied().collect()
}

const KALIMBA_TUNINGS: &[(&str, &[&str])] = &[
    (
        "17 C Major",
        &[
            "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5",
            "C6", "D6", "E6",
        ],
    ),
    (
        "17 G Major",
        &[
            "G3", "A3", "B3", "C4", "D4", "E4", "F#4", "G4", "A4", "B4", "C5", "D5", "E5", "F#5",
            "G5", "A5", "B5",
        ],
    ),
    ("8 C Major", &["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"]),
    (
        "21 F Major",
        &[
            "F3", "G3", "A3", "Bb3", "C4", "D4", "E4", "F4", "G4", "A4", "Bb4", "C5", "D5", "E5",
            "F5", "G5", "A5", "Bb5", "C6", "D6", "E6",
        ],
    ),
];

/// All built-in tunings for an instrument, keyed by tuning name.
///
/// Unknown instruments give an empty map.
pub fn tunings_for(instrument: &str) -> BTreeMap<String, Arc<Tuning>> {
    let table = match instrument {
        KALIMBA => KALIMBA_TUNINGS,
        _ => {
            log::debug!("No built-in tunings for instrument '{}'", instrument);
            return BTreeMap::new();
        }
    };

    table
        .iter()
        .filter_map(|(name, labels)| {
            match Tuning::from_labels(instrument, name, labels, Layout::Lamellophone) {
                Ok(tuning) => Some((name.to_string(), Arc::new(tuning))),
                Err(e) => {
                    log::warn!("Skipping built-in tuning '{}': {}", name, e);
                    None
                }
            }
        })
        .collect()
}

/// Look up a single tuning by instrument and name
pub fn find_tuning(instrument: &str, name: &str) -> Result<Arc<Tuning>, RollError> {
    tunings_for(instrument)
        .remove(name)
        .ok_or_else(|| RollError::UnknownTuning {
            instrument: instrument.to_string(),
            name: name.to_string(),
        })
}
