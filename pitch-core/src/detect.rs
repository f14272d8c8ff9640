//! Per-frame pitch detection for the live view.

use crate::LiveReading;
use crate::note::frequency_to_note;
use crate::source::SpectrumSource;
use crate::spectrum::{
    dominant_frequency_in, volume_intensity, volume_percentage, FrequencyRange,
    DEFAULT_VOLUME_SENSITIVITY,
};

/// Knobs that shape a live reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSettings {
    /// Band a dominant frequency must fall in to be reported
    pub range: FrequencyRange,
    /// Multiplier for the volume meter
    pub volume_sensitivity: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            range: FrequencyRange::default(),
            volume_sensitivity: DEFAULT_VOLUME_SENSITIVITY,
        }
    }
}

/// Pulls one snapshot from `source` and derives a reading from it.
pub fn detect<S>(source: &mut S, settings: &DetectionSettings) -> LiveReading
where
    S: SpectrumSource + ?Sized,
{
    let spectrum = source.snapshot();
    reading_from_snapshot(spectrum, source.sample_rate(), source.fft_size(), settings)
}

/// Derives volume, dominant frequency and note from a snapshot.
pub fn reading_from_snapshot(
    spectrum: Vec<u8>,
    sample_rate: u32,
    fft_size: usize,
    settings: &DetectionSettings,
) -> LiveReading {
    let intensity = volume_intensity(&spectrum);
    let frequency = dominant_frequency_in(&spectrum, sample_rate, fft_size, settings.range);

    LiveReading {
        volume_intensity: intensity,
        volume_percent: volume_percentage(intensity, settings.volume_sensitivity),
        detected_frequency: frequency,
        note: frequency.map(frequency_to_note),
        spectrum,
    }
}
