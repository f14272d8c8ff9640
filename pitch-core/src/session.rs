//! # Capture Session
//!
//! Owns everything a running capture needs: the audio worker, the chunk
//! channel, the live spectrum source, the recording buffer and the
//! capturing flag. The host drives [`CaptureSession::poll`] once per
//! display frame; nothing runs between polls.

use crossbeam_channel::Receiver;

use crate::audio::CaptureWorker;
use crate::config::LiveConfig;
use crate::detect::{detect, DetectionSettings};
use crate::error::CaptureError;
use crate::recording::Recording;
use crate::source::LiveSpectrumSource;
use crate::spectrum::FrequencyRange;
use crate::LiveReading;

pub struct CaptureSession {
    worker: Option<CaptureWorker>,
    chunks: Receiver<Vec<f32>>,
    source: LiveSpectrumSource,
    recording: Recording,
    settings: DetectionSettings,
    capturing: bool,
}

impl CaptureSession {
    /// Opens the default microphone and starts recording.
    ///
    /// # Returns
    /// * `Ok(session)` - Capture is running
    /// * `Err(e)` - The microphone could not be acquired
    pub fn start(config: &LiveConfig, range: FrequencyRange) -> Result<Self, CaptureError> {
        let (worker, chunks) = CaptureWorker::spawn()?;
        let sample_rate = worker.sample_rate();
        log::info!("Capture started at {} Hz", sample_rate);

        let mut session = Self::from_receiver(chunks, sample_rate, config, range);
        session.worker = Some(worker);
        Ok(session)
    }

    /// Builds a session around an existing chunk stream.
    ///
    /// Chunks must be raw mono samples at `sample_rate`. The configured
    /// input gain is applied to the analysis window only; the recording
    /// keeps the samples as captured.
    pub fn from_receiver(
        chunks: Receiver<Vec<f32>>,
        sample_rate: u32,
        config: &LiveConfig,
        range: FrequencyRange,
    ) -> Self {
        Self {
            worker: None,
            chunks,
            source: LiveSpectrumSource::new(config.analyser(), sample_rate)
                .with_gain(config.input_gain),
            recording: Recording::new(Vec::new(), sample_rate),
            settings: DetectionSettings {
                range,
                volume_sensitivity: config.volume_sensitivity,
            },
            capturing: true,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn sample_rate(&self) -> u32 {
        self.recording.sample_rate
    }

    /// Seconds of audio recorded so far.
    pub fn recorded_secs(&self) -> f64 {
        self.recording.duration_secs()
    }

    /// Runs one frame of live detection.
    ///
    /// Drains the audio captured since the previous poll into the
    /// analysis window and the recording, then analyses the window.
    ///
    /// # Returns
    /// * `Some(reading)` - Reading for this frame
    /// * `None` - The session has been stopped
    pub fn poll(&mut self) -> Option<LiveReading> {
        if !self.capturing {
            return None;
        }
        self.drain_chunks();
        Some(detect(&mut self.source, &self.settings))
    }

    /// Stops capture and hands over everything recorded.
    ///
    /// Calling `stop` again returns an empty recording.
    pub fn stop(&mut self) -> Recording {
        if self.capturing {
            self.capturing = false;
            if let Some(mut worker) = self.worker.take() {
                worker.shutdown();
            }
            // Chunks delivered before the stream stopped still belong to the clip.
            self.drain_chunks();
            log::info!("Capture stopped after {:.2}s", self.recording.duration_secs());
        }
        let sample_rate = self.recording.sample_rate;
        std::mem::replace(&mut self.recording, Recording::new(Vec::new(), sample_rate))
    }

    fn drain_chunks(&mut self) {
        while let Ok(chunk) = self.chunks.try_recv() {
            self.source.push_samples(&chunk);
            self.recording.extend(&chunk);
        }
    }
}
