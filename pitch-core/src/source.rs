//! # Spectrum Sources
//!
//! Detection code never talks to an audio device directly. It asks a
//! source for snapshots instead:
//! - [`SpectrumSource`] yields the spectrum of "now" (live capture)
//! - [`SeekableSpectrumSource`] yields the spectrum at a time offset
//!   within a finite clip (offline analysis)

use std::collections::VecDeque;

use crate::config::AnalyserConfig;
use crate::fft::FrequencyAnalyser;
use crate::recording::Recording;

/// Supplies the current spectrum of a running signal.
pub trait SpectrumSource {
    fn sample_rate(&self) -> u32;

    /// Transform size the snapshots are computed with.
    fn fft_size(&self) -> usize;

    /// Returns a fresh snapshot of `fft_size / 2` byte magnitudes.
    fn snapshot(&mut self) -> Vec<u8>;
}

/// Supplies spectra at arbitrary offsets within a clip of known length.
pub trait SeekableSpectrumSource {
    fn sample_rate(&self) -> u32;

    fn fft_size(&self) -> usize;

    /// Length of the clip in seconds.
    fn duration_secs(&self) -> f64;

    /// Snapshot of the audio around `offset_secs`.
    fn snapshot_at(&mut self, offset_secs: f64) -> Vec<u8>;
}

/// Live source backed by a rolling window of the newest samples.
///
/// Samples are amplified by `gain` on the way into the window; the
/// caller's buffers are left untouched.
pub struct LiveSpectrumSource {
    analyser: FrequencyAnalyser,
    window: VecDeque<f32>,
    sample_rate: u32,
    gain: f32,
}

impl LiveSpectrumSource {
    pub fn new(config: AnalyserConfig, sample_rate: u32) -> Self {
        Self {
            window: VecDeque::with_capacity(config.fft_size),
            analyser: FrequencyAnalyser::new(config),
            sample_rate,
            gain: 1.0,
        }
    }

    /// Sets the linear gain applied to pushed samples.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Appends captured samples, discarding the oldest beyond `fft_size`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let capacity = self.analyser.fft_size();
        let skip = samples.len().saturating_sub(capacity);
        let gain = self.gain;
        self.window.extend(samples[skip..].iter().map(|&s| s * gain));
        let excess = self.window.len().saturating_sub(capacity);
        self.window.drain(..excess);
    }

    /// Number of buffered samples (at most `fft_size`).
    pub fn buffered(&self) -> usize {
        self.window.len()
    }
}

impl SpectrumSource for LiveSpectrumSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn fft_size(&self) -> usize {
        self.analyser.fft_size()
    }

    fn snapshot(&mut self) -> Vec<u8> {
        let window = self.window.make_contiguous();
        self.analyser.byte_frequency_data(window)
    }
}

/// Offline source over a finished recording.
///
/// Each snapshot is computed from `fft_size` samples centred on the
/// requested offset, zero-filled past either end of the clip. The
/// analyser's smoothing carries over between increasing offsets and is
/// cleared when seeking backwards.
pub struct RecordingSpectrumSource<'a> {
    recording: &'a Recording,
    analyser: FrequencyAnalyser,
    frame: Vec<f32>,
    last_offset: Option<f64>,
}

impl<'a> RecordingSpectrumSource<'a> {
    pub fn new(recording: &'a Recording, config: AnalyserConfig) -> Self {
        Self {
            recording,
            frame: vec![0.0; config.fft_size],
            analyser: FrequencyAnalyser::new(config),
            last_offset: None,
        }
    }
}

impl SeekableSpectrumSource for RecordingSpectrumSource<'_> {
    fn sample_rate(&self) -> u32 {
        self.recording.sample_rate
    }

    fn fft_size(&self) -> usize {
        self.analyser.fft_size()
    }

    fn duration_secs(&self) -> f64 {
        self.recording.duration_secs()
    }

    fn snapshot_at(&mut self, offset_secs: f64) -> Vec<u8> {
        if self.last_offset.is_some_and(|last| offset_secs < last) {
            self.analyser.reset();
        }
        self.last_offset = Some(offset_secs);

        let size = self.frame.len();
        let samples = &self.recording.samples;
        let center = (offset_secs.max(0.0) * self.recording.sample_rate as f64).round() as i64;
        let start = center - (size / 2) as i64;

        for (i, slot) in self.frame.iter_mut().enumerate() {
            let index = start + i as i64;
            *slot = if index >= 0 && (index as usize) < samples.len() {
                samples[index as usize]
            } else {
                0.0
            };
        }
        self.analyser.byte_frequency_data(&self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fft_size: usize) -> AnalyserConfig {
        AnalyserConfig {
            fft_size,
            min_db: -100.0,
            max_db: -30.0,
            smoothing: 0.0,
        }
    }

    #[test]
    fn live_window_keeps_newest_samples() {
        let mut source = LiveSpectrumSource::new(config(32), 8000);
        source.push_samples(&[1.0; 20]);
        assert_eq!(source.buffered(), 20);
        source.push_samples(&[2.0; 20]);
        assert_eq!(source.buffered(), 32);
        assert_eq!(source.window.front(), Some(&1.0));
        source.push_samples(&(0..100).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(source.buffered(), 32);
        assert_eq!(source.window.front(), Some(&68.0));
        assert_eq!(source.window.back(), Some(&99.0));
    }

    #[test]
    fn live_window_applies_gain() {
        let mut source = LiveSpectrumSource::new(config(32), 8000).with_gain(5.0);
        let chunk = vec![0.1, -0.2];
        source.push_samples(&chunk);
        assert_eq!(chunk, vec![0.1, -0.2]);
        assert!((source.window[0] - 0.5).abs() < 1e-6);
        assert!((source.window[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn live_snapshot_has_bin_count_length() {
        let mut source = LiveSpectrumSource::new(config(64), 8000);
        assert_eq!(source.snapshot().len(), 32);
        source.push_samples(&[0.5; 10]);
        assert_eq!(source.snapshot().len(), 32);
    }

    #[test]
    fn recording_source_reports_clip_metadata() {
        let clip = Recording::new(vec![0.0; 4000], 8000);
        let source = RecordingSpectrumSource::new(&clip, config(256));
        assert_eq!(source.sample_rate(), 8000);
        assert_eq!(source.fft_size(), 256);
        assert!((source.duration_secs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn seeking_backwards_clears_smoothing() {
        let mut samples = vec![0.0; 4000];
        samples.extend((0..4000).map(|i| 0.5 * (i as f32 * 0.3).sin()));
        let clip = Recording::new(samples, 8000);
        let smoothed = AnalyserConfig { smoothing: 0.9, ..config(256) };

        let mut fresh = RecordingSpectrumSource::new(&clip, smoothed);
        let silent = fresh.snapshot_at(0.1);
        assert!(silent.iter().all(|&v| v == 0));

        let mut seeking = RecordingSpectrumSource::new(&clip, smoothed);
        assert!(seeking.snapshot_at(0.75).iter().any(|&v| v > 0));
        assert_eq!(seeking.snapshot_at(0.1), silent);
    }

    #[test]
    fn offsets_past_the_end_are_silent() {
        let clip = Recording::new(vec![0.3; 800], 8000);
        let mut source = RecordingSpectrumSource::new(&clip, config(256));
        assert!(source.snapshot_at(0.05).iter().any(|&v| v > 0));
        assert!(source.snapshot_at(10.0).iter().all(|&v| v == 0));
    }
}
