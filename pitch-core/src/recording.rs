//! Captured audio kept for offline analysis and export.

use anyhow::{Context, Result};
use std::path::Path;

/// Mono audio clip with its sample rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Recording {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the clip in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn extend(&mut self, chunk: &[f32]) {
        self.samples.extend_from_slice(chunk);
    }

    /// Writes the clip as a 32-bit float mono WAV file.
    pub fn save_wav(&self, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .with_context(|| format!("Failed to finalize {}", path.display()))?;

        log::info!(
            "Saved recording: {} ({:.2}s at {} Hz)",
            path.display(),
            self.duration_secs(),
            self.sample_rate
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_sample_count() {
        let clip = Recording::new(vec![0.0; 22050], 44100);
        assert!((clip.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(Recording::default().duration_secs(), 0.0);
    }

    #[test]
    fn extend_appends_in_order() {
        let mut clip = Recording::new(Vec::new(), 8000);
        clip.extend(&[0.1, 0.2]);
        clip.extend(&[0.3]);
        assert_eq!(clip.samples, vec![0.1, 0.2, 0.3]);
        assert!(!clip.is_empty());
    }
}
