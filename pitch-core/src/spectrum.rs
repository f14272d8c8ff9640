//! # Spectrum Module
//!
//! Operations on byte spectrum snapshots: the bin-to-frequency mapping,
//! dominant frequency extraction and volume intensity.
//!
//! A snapshot holds `fft_size / 2` magnitudes in `[0, 255]`, one per
//! frequency bin, as produced by [`crate::fft::FrequencyAnalyser`].

use serde::Deserialize;

/// Lower bound of the reportable pitch band in Hz (exclusive).
pub const MIN_AUDIBLE_HZ: f32 = 20.0;

/// Upper bound of the reportable pitch band in Hz (exclusive).
pub const MAX_AUDIBLE_HZ: f32 = 8000.0;

/// An open frequency interval `(min_hz, max_hz)`.
///
/// Dominant frequencies on or outside either bound are not reported,
/// which keeps sub-audible rumble and high-frequency hiss out of the
/// detected pitch.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrequencyRange {
    pub min_hz: f32,
    pub max_hz: f32,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self {
            min_hz: MIN_AUDIBLE_HZ,
            max_hz: MAX_AUDIBLE_HZ,
        }
    }
}

impl FrequencyRange {
    /// Returns true when `freq` lies strictly between the bounds.
    pub fn contains(&self, freq: f32) -> bool {
        freq > self.min_hz && freq < self.max_hz
    }
}

/// Converts a bin index to its centre frequency in Hz.
///
/// `freq = index * sample_rate / fft_size`
pub fn bin_to_frequency(index: usize, sample_rate: u32, fft_size: usize) -> f32 {
    (index as f64 * sample_rate as f64 / fft_size as f64) as f32
}

/// Finds the loudest bin of a snapshot and returns its frequency, if it
/// falls inside the default reporting band of (20 Hz, 8000 Hz).
///
/// # Arguments
/// * `spectrum` - Byte magnitudes, one per bin (`fft_size / 2` of them)
/// * `sample_rate` - Sample rate of the analysed signal in Hz
/// * `fft_size` - Transform size the snapshot was computed with
///
/// # Returns
/// * `Some(frequency)` - Frequency of the loudest bin in Hz
/// * `None` - Empty snapshot, or the loudest bin lies outside the band
pub fn dominant_frequency(spectrum: &[u8], sample_rate: u32, fft_size: usize) -> Option<f32> {
    dominant_frequency_in(spectrum, sample_rate, fft_size, FrequencyRange::default())
}

/// Same as [`dominant_frequency`] with an explicit reporting band.
///
/// Ties are resolved in favour of the first (lowest) bin. A silent
/// snapshot therefore selects bin 0, which maps to 0 Hz and is filtered.
pub fn dominant_frequency_in(
    spectrum: &[u8],
    sample_rate: u32,
    fft_size: usize,
    range: FrequencyRange,
) -> Option<f32> {
    if fft_size == 0 || sample_rate == 0 {
        return None;
    }

    let peak_bin = loudest_bin(spectrum)?;
    let frequency = bin_to_frequency(peak_bin, sample_rate, fft_size);

    range.contains(frequency).then_some(frequency)
}

/// Index of the first bin holding the maximum magnitude.
fn loudest_bin(spectrum: &[u8]) -> Option<usize> {
    let mut peak: Option<(usize, u8)> = None;
    for (i, &magnitude) in spectrum.iter().enumerate() {
        // Strictly greater keeps the earliest bin on ties.
        if peak.is_none_or(|(_, best)| magnitude > best) {
            peak = Some((i, magnitude));
        }
    }
    peak.map(|(i, _)| i)
}

/// Root-mean-square of the snapshot magnitudes, in byte units (0-255).
pub fn volume_intensity(spectrum: &[u8]) -> f32 {
    if spectrum.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = spectrum.iter().map(|&v| (v as f64) * (v as f64)).sum();
    (sum_squares / spectrum.len() as f64).sqrt() as f32
}

/// Default multiplier from volume intensity to meter percent.
pub const DEFAULT_VOLUME_SENSITIVITY: f32 = 1000.0;

/// Maps a volume intensity onto a 0-100 meter reading:
/// `min(intensity * sensitivity, 100)`.
///
/// With the default sensitivity any audible snapshot pegs the meter.
pub fn volume_percentage(intensity: f32, sensitivity: f32) -> f32 {
    (intensity * sensitivity).clamp(0.0, 100.0)
}
