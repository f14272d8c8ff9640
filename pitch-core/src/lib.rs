// pitch-core/src/lib.rs

//! The core logic for the pitchscope microphone pitch monitor.
//! This crate is responsible for audio capture, spectrum analysis,
//! dominant-frequency and note detection, and offline analysis of
//! recordings. It is completely headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub mod fft;
pub mod note;
pub mod offline;
pub mod recording;
pub mod session;
pub mod source;
pub mod spectrum;

use note::NoteReading;

/// Represents the result of a single live analysis frame.
#[derive(Debug, Clone, Default)]
pub struct LiveReading {
    /// Root-mean-square of the snapshot magnitudes (0-255 scale).
    pub volume_intensity: f32,
    /// Volume meter reading, 0-100.
    pub volume_percent: f32,
    /// Dominant frequency in Hz, when inside the reporting band.
    pub detected_frequency: Option<f32>,
    /// Nearest note to `detected_frequency`.
    pub note: Option<NoteReading>,
    /// Snapshot the reading was derived from, for visualization.
    pub spectrum: Vec<u8>,
}

impl LiveReading {
    /// Text for the note display, e.g. `Detected Note: A4 (440.0 Hz)`.
    ///
    /// `None` when no pitch was detected this frame; the display keeps
    /// showing the previous note in that case.
    pub fn note_text(&self) -> Option<String> {
        let frequency = self.detected_frequency?;
        let note = self.note?;
        Some(format!("Detected Note: {} ({:.1} Hz)", note, frequency))
    }

    /// Text for the volume display, e.g. `Volume Intensity: 12.34%`.
    pub fn volume_text(&self) -> String {
        format!("Volume Intensity: {:.2}%", self.volume_percent)
    }
}
