//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns blocks of time-domain audio into byte spectrum
//! snapshots, the same representation a browser analyser node hands out.
//!
//! ## Pipeline
//! 1. Blackman window over the newest `fft_size` samples
//! 2. Forward FFT using RustFFT
//! 3. Magnitude normalised by the transform size
//! 4. Exponential smoothing against the previous frame
//! 5. Decibel conversion and linear mapping of `[min_db, max_db]` to `[0, 255]`

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::config::AnalyserConfig;

/// Floor applied before taking the logarithm of a magnitude.
const EPSILON: f32 = 1e-12;

/// Generates Blackman window coefficients (alpha = 0.16).
fn blackman_window(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let alpha = 0.16_f32;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    let n_f = n as f32;
    (0..n)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n_f;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}

/// Stateful byte-spectrum analyser.
///
/// Holds a planned FFT, the window and the smoothing memory, so each
/// instance should analyse one continuous signal.
pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl FrequencyAnalyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Self {
            config,
            fft,
            window: blackman_window(size),
            smoothed: vec![0.0; size / 2],
            scratch: vec![Complex::new(0.0, 0.0); size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Clears the smoothing memory.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Analyses the newest `fft_size` samples of `signal`.
    ///
    /// Shorter signals are right-aligned and zero-padded at the front,
    /// so the most recent audio always sits at the end of the window.
    ///
    /// # Arguments
    /// * `signal` - Time-domain samples, oldest first
    ///
    /// # Returns
    /// * `Vec<u8>` - Byte magnitudes, `fft_size / 2` bins
    pub fn byte_frequency_data(&mut self, signal: &[f32]) -> Vec<u8> {
        let size = self.config.fft_size;
        let take = signal.len().min(size);
        let pad = size - take;
        let recent = &signal[signal.len() - take..];

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing.clamp(0.0, 1.0);
        let scale = 1.0 / size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(self.scratch.iter()) {
            let magnitude = bin.norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }

        let min_db = self.config.min_db;
        let range_db = self.config.max_db - self.config.min_db;
        self.smoothed
            .iter()
            .map(|&magnitude| {
                let db = 20.0 * (magnitude + EPSILON).log10();
                let scaled = u8::MAX as f32 * (db - min_db) / range_db;
                scaled.clamp(0.0, u8::MAX as f32) as u8
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    fn config(fft_size: usize, smoothing: f32) -> AnalyserConfig {
        AnalyserConfig {
            fft_size,
            min_db: -90.0,
            max_db: -10.0,
            smoothing,
        }
    }

    #[test]
    fn blackman_window_shape() {
        let w = blackman_window(64);
        assert_eq!(w.len(), 64);
        assert!(w[0].abs() < 1e-6);
        assert!((w[32] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn snapshot_has_half_spectrum_length() {
        let mut analyser = FrequencyAnalyser::new(config(2048, 0.0));
        let data = analyser.byte_frequency_data(&[0.0; 2048]);
        assert_eq!(data.len(), 1024);
    }

    #[test]
    fn silence_maps_to_zero() {
        let mut analyser = FrequencyAnalyser::new(config(1024, 0.0));
        let data = analyser.byte_frequency_data(&[0.0; 1024]);
        assert!(data.iter().all(|&v| v == 0));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let sample_rate = 44100;
        let fft_size = 4096;
        // Exactly on bin 41 (~441.4 Hz).
        let freq = 41.0 * sample_rate as f32 / fft_size as f32;
        let signal = sine(freq, sample_rate, fft_size, 0.5);

        let mut analyser = FrequencyAnalyser::new(config(fft_size, 0.0));
        let data = analyser.byte_frequency_data(&signal);

        let peak = data
            .iter()
            .enumerate()
            .max_by_key(|&(i, &v)| (v, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 41);
        assert!(data[41] > 200);
    }

    #[test]
    fn short_input_is_zero_padded() {
        let sample_rate = 44100;
        let freq = 50.0 * sample_rate as f32 / 1024.0;
        let signal = sine(freq, sample_rate, 700, 0.5);

        let mut analyser = FrequencyAnalyser::new(config(1024, 0.0));
        let data = analyser.byte_frequency_data(&signal);
        assert_eq!(data.len(), 512);
        assert!(data[50] > 0);
    }

    #[test]
    fn smoothing_carries_previous_frames() {
        let sample_rate = 44100;
        let fft_size = 2048;
        let freq = 100.0 * sample_rate as f32 / fft_size as f32;
        let signal = sine(freq, sample_rate, fft_size, 0.5);

        let mut smoothed = FrequencyAnalyser::new(config(fft_size, 0.9));
        let loud = smoothed.byte_frequency_data(&signal)[100];
        let decayed = smoothed.byte_frequency_data(&vec![0.0; fft_size])[100];
        assert!(decayed > 0, "smoothing should keep energy after silence");
        assert!(decayed < loud);

        smoothed.reset();
        let cleared = smoothed.byte_frequency_data(&vec![0.0; fft_size])[100];
        assert_eq!(cleared, 0);
    }
}
