//! # Note Mapping Module
//!
//! Converts frequencies to equal-tempered note names using the MIDI note
//! numbering, with A4 = 440 Hz mapped to MIDI note 69.
//!
//! ## Features
//! - Frequency to MIDI number conversion
//! - MIDI number to note name and octave (MIDI 60 is "C4")
//! - Explicit out-of-range result for frequencies outside MIDI 0-127

use serde::{Serialize, Serializer};
use std::fmt;

/// Reference pitch for A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// Highest valid MIDI note number.
pub const MAX_MIDI: i32 = 127;

/// Label used when a frequency maps outside the MIDI range.
pub const OUT_OF_RANGE_LABEL: &str = "Out of Range";

/// The 12 pitch classes of the chromatic scale, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single equal-tempered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// MIDI note number (0-127)
    pub midi: u8,
    /// Pitch class name (e.g. "C#")
    pub name: &'static str,
    /// Scientific pitch octave (MIDI 60 is octave 4)
    pub octave: i32,
}

impl Note {
    /// Builds the note for a MIDI number, or `None` outside 0-127.
    pub fn from_midi(midi: i32) -> Option<Self> {
        if !(0..=MAX_MIDI).contains(&midi) {
            return None;
        }
        Some(Self {
            midi: midi as u8,
            name: NOTE_NAMES[(midi % 12) as usize],
            octave: midi.div_euclid(12) - 1,
        })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Result of mapping a frequency to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteReading {
    /// The frequency rounds to a valid MIDI note
    Note(Note),
    /// The frequency rounds outside MIDI 0-127, or was not a positive number
    OutOfRange,
}

impl NoteReading {
    pub fn note(&self) -> Option<&Note> {
        match self {
            NoteReading::Note(note) => Some(note),
            NoteReading::OutOfRange => None,
        }
    }
}

impl fmt::Display for NoteReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteReading::Note(note) => note.fmt(f),
            NoteReading::OutOfRange => f.write_str(OUT_OF_RANGE_LABEL),
        }
    }
}

// Serialized as its label, e.g. "A4" or "Out of Range".
impl Serialize for NoteReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Converts a frequency to a fractional MIDI note number.
///
/// `midi = 69 + 12 * log2(freq / 440)`
pub fn frequency_to_midi(freq: f32) -> f32 {
    A4_MIDI as f32 + 12.0 * (freq / A4_FREQUENCY).log2()
}

/// Finds the nearest equal-tempered note to a frequency.
///
/// # Arguments
/// * `freq` - Frequency in Hz
///
/// # Returns
/// * `NoteReading::Note` - Nearest note, e.g. "A4" for 440 Hz
/// * `NoteReading::OutOfRange` - The nearest MIDI number is outside 0-127,
///   or `freq` is zero, negative or not finite
pub fn frequency_to_note(freq: f32) -> NoteReading {
    if !freq.is_finite() || freq <= 0.0 {
        return NoteReading::OutOfRange;
    }
    let midi = frequency_to_midi(freq).round();
    if !(0.0..=MAX_MIDI as f32).contains(&midi) {
        return NoteReading::OutOfRange;
    }
    Note::from_midi(midi as i32).map_or(NoteReading::OutOfRange, NoteReading::Note)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(freq: f32) -> String {
        frequency_to_note(freq).to_string()
    }

    #[test]
    fn reference_pitches() {
        assert_eq!(label(440.0), "A4");
        assert_eq!(label(261.63), "C4");
        assert_eq!(label(880.0), "A5");
        assert_eq!(label(27.5), "A0");
        assert_eq!(label(4186.01), "C8");
    }

    #[test]
    fn rounds_to_nearest_semitone() {
        // A quarter tone below A#4 (466.16 Hz) still reads as A#4.
        assert_eq!(label(460.0), "A#4");
        assert_eq!(label(452.0), "A4");
    }

    #[test]
    fn midi_60_is_c4() {
        let note = Note::from_midi(60).unwrap();
        assert_eq!(note.to_string(), "C4");
        assert_eq!(Note::from_midi(0).unwrap().to_string(), "C-1");
        assert_eq!(Note::from_midi(127).unwrap().to_string(), "G9");
        assert!(Note::from_midi(128).is_none());
        assert!(Note::from_midi(-1).is_none());
    }

    #[test]
    fn doubling_frequency_adds_an_octave() {
        for freq in [32.7_f32, 55.0, 196.0, 311.13, 1000.0, 2093.0] {
            let low = frequency_to_note(freq);
            let high = frequency_to_note(freq * 2.0);
            let (low, high) = (low.note().unwrap(), high.note().unwrap());
            assert_eq!(high.midi, low.midi + 12, "freq {freq}");
            assert_eq!(high.name, low.name);
            assert_eq!(high.octave, low.octave + 1);
        }
    }

    #[test]
    fn out_of_midi_range() {
        // MIDI 127 is ~12543.85 Hz; an octave above rounds to 139.
        assert_eq!(frequency_to_note(25_000.0), NoteReading::OutOfRange);
        // MIDI 0 is ~8.18 Hz.
        assert_eq!(frequency_to_note(4.0), NoteReading::OutOfRange);
        assert_eq!(label(25_000.0), OUT_OF_RANGE_LABEL);
    }

    #[test]
    fn non_positive_input_is_guarded() {
        assert_eq!(frequency_to_note(0.0), NoteReading::OutOfRange);
        assert_eq!(frequency_to_note(-440.0), NoteReading::OutOfRange);
        assert_eq!(frequency_to_note(f32::NAN), NoteReading::OutOfRange);
        assert_eq!(frequency_to_note(f32::INFINITY), NoteReading::OutOfRange);
    }

    #[test]
    fn fractional_midi_numbers() {
        assert!((frequency_to_midi(440.0) - 69.0).abs() < 1e-4);
        assert!((frequency_to_midi(261.6256) - 60.0).abs() < 1e-3);
        assert!((frequency_to_midi(452.9) - 69.5).abs() < 1e-2);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&frequency_to_note(440.0)).unwrap();
        assert_eq!(json, "\"A4\"");
        let json = serde_json::to_string(&NoteReading::OutOfRange).unwrap();
        assert_eq!(json, "\"Out of Range\"");
    }
}
