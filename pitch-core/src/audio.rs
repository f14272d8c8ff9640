//! # Audio Capture Module
//!
//! This module handles microphone capture using CPAL (Cross-Platform Audio Library).
//! It selects an input device and format, downmixes the incoming samples and
//! forwards them in chunks to whoever owns the receiving channel.
//!
//! ## Features
//! - Automatic audio device selection
//! - Closest-match sample rate selection, preferring mono f32 formats
//! - Dedicated worker thread that owns the stream until shutdown

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::CaptureError;

/// Preferred capture sample rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks an f32 configuration as close to 44.1 kHz as the device allows
/// 3. Sets up a callback that downmixes to mono and sends each callback's
///    samples over `sender`, unamplified
///
/// # Arguments
/// * `sender` - Channel sender for streaming audio chunks to the session
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running audio stream handle and sample rate
/// * `Err(e)` - Error if audio setup fails
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32), CaptureError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(CaptureError::NoInputDevice)?;

    log::info!("Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config =
        find_supported_config(configs, TARGET_SAMPLE_RATE).ok_or(CaptureError::NoSupportedConfig)?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!("Selected sample rate: {} Hz, {} channel(s)", sample_rate, channels);

    let err_fn = |err| log::error!("An error occurred on the audio stream: {}", err);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let chunk = downmix(data, channels);
            // The session drains every tick; a closed channel just means it stopped.
            let _ = sender.try_send(chunk);
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Averages interleaved frames to mono.
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only 32-bit float formats are considered. Among those, configurations
/// whose rate range is closest to `target_rate` win, with fewer channels
/// breaking ties.
///
/// # Returns
/// * `Some(config)` - Best matching configuration
/// * `None` - No f32 configuration available
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let distance = if target_rate < c.min_sample_rate().0 {
                c.min_sample_rate().0 - target_rate
            } else {
                target_rate.saturating_sub(c.max_sample_rate().0)
            };
            (distance, c.channels())
        })
}

/// Owns the capture stream on a dedicated thread.
///
/// CPAL streams are not `Send` on every platform, so the stream is created
/// and dropped on the worker thread; only sample chunks cross threads.
#[derive(Debug)]
pub struct CaptureWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
    sample_rate: u32,
}

impl CaptureWorker {
    /// Spawns the worker and waits until the stream is running.
    ///
    /// # Returns
    /// * `Ok((worker, receiver))` - Worker handle and the chunk receiver
    /// * `Err(e)` - Device or stream setup failed on the worker thread
    pub fn spawn() -> Result<(Self, Receiver<Vec<f32>>), CaptureError> {
        let (chunk_tx, chunk_rx) = crossbeam_channel::unbounded::<Vec<f32>>();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32, CaptureError>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let thread_handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                log::debug!(target: "audio-thread", "Attempting to start audio capture...");
                let (stream, sample_rate) = match start_audio_capture(chunk_tx) {
                    Ok(tuple) => tuple,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(sample_rate));

                // Park until told to stop; a dropped sender counts as a stop too.
                let _ = shutdown_rx.recv();

                log::debug!(target: "audio-thread", "Stopping stream and exiting...");
                if let Err(e) = stream.pause() {
                    log::warn!(target: "audio-thread", "Error pausing stream: {}", e);
                }
                drop(stream);
            })
            .map_err(|_| CaptureError::WorkerExited)?;

        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                return Err(e);
            }
            Err(_) => return Err(CaptureError::WorkerExited),
        };

        let worker = Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
            sample_rate,
        };
        Ok((worker, chunk_rx))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Signals the worker to stop the stream and waits for it to exit.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = self.shutdown_tx.try_send(());
            if handle.join().is_err() {
                log::error!("Audio capture thread panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_mono_passes_samples_through() {
        assert_eq!(downmix(&[0.1, -0.2], 1), vec![0.1, -0.2]);
    }

    #[test]
    fn downmix_averages_frames() {
        let mixed = downmix(&[0.2, 0.4, -0.2, -0.6], 2);
        assert_eq!(mixed.len(), 2);
        assert!((mixed[0] - 0.3).abs() < 1e-6);
        assert!((mixed[1] + 0.4).abs() < 1e-6);
    }
}
