//! # Offline Analysis Module
//!
//! Walks a finished clip on a virtual clock, one fixed step at a time,
//! and records the note heard at each step.
//!
//! The walk is paced by a [`Ticker`]: [`ImmediateTicker`] runs the steps
//! back to back, [`IntervalTicker`] waits one real step between them.
//! Once started, an analysis always runs to the end of the clip.

use crossbeam_channel::Receiver;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::OfflineConfig;
use crate::note::{frequency_to_note, NoteReading};
use crate::recording::Recording;
use crate::source::{RecordingSpectrumSource, SeekableSpectrumSource};
use crate::spectrum::{dominant_frequency_in, FrequencyRange};

/// Note heard at one step of an offline analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedNote {
    /// Offset into the clip in seconds
    pub time: f64,
    /// `None` when no dominant pitch was found at this step
    pub note: Option<NoteReading>,
}

impl fmt::Display for DetectedNote {
    /// `1.25s  A4`, or `1.25s  -` when nothing was heard.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.note {
            Some(note) => write!(f, "{:.2}s  {}", self.time, note),
            None => write!(f, "{:.2}s  -", self.time),
        }
    }
}

/// Paces the steps of an offline analysis.
pub trait Ticker {
    /// Blocks until the next step may run.
    fn wait(&mut self);
}

/// Runs steps without delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateTicker;

impl Ticker for ImmediateTicker {
    fn wait(&mut self) {}
}

/// Runs steps at a fixed wall-clock interval.
pub struct IntervalTicker {
    ticks: Receiver<Instant>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            ticks: crossbeam_channel::tick(period),
        }
    }
}

impl Ticker for IntervalTicker {
    fn wait(&mut self) {
        let _ = self.ticks.recv();
    }
}

/// Number of steps taken over a clip: every `i` with `i * step < duration`.
pub fn step_count(duration_secs: f64, step_secs: f64) -> usize {
    if step_secs <= 0.0 || duration_secs <= 0.0 {
        return 0;
    }
    (0usize..)
        .take_while(|&i| (i as f64) * step_secs < duration_secs)
        .count()
}

/// Analyses a clip one step at a time.
///
/// At each step the virtual clock `i * step_secs` selects a snapshot,
/// the loudest bin inside `range` becomes the step's frequency, and that
/// frequency is mapped to a note. One record is appended per step, in
/// chronological order, whether or not a note was found.
///
/// # Arguments
/// * `source` - Clip to analyse
/// * `step_secs` - Virtual clock increment, in seconds
/// * `range` - Band a dominant frequency must fall in
/// * `ticker` - Paces the steps; waited on before every step but the first
pub fn analyze_clip<S, T>(
    source: &mut S,
    step_secs: f64,
    range: FrequencyRange,
    ticker: &mut T,
) -> Vec<DetectedNote>
where
    S: SeekableSpectrumSource + ?Sized,
    T: Ticker + ?Sized,
{
    let duration = source.duration_secs();
    let sample_rate = source.sample_rate();
    let fft_size = source.fft_size();
    let steps = step_count(duration, step_secs);

    let mut notes = Vec::with_capacity(steps);
    for step in 0..steps {
        if step > 0 {
            ticker.wait();
        }
        // Derived from the index so the clock never drifts.
        let time = step as f64 * step_secs;
        let spectrum = source.snapshot_at(time);
        let frequency = dominant_frequency_in(&spectrum, sample_rate, fft_size, range);
        notes.push(DetectedNote {
            time,
            note: frequency.map(frequency_to_note),
        });
    }

    log::debug!("Offline analysis: {} steps over {:.2}s", notes.len(), duration);
    notes
}

/// Analyses a recording with the offline analyser settings.
///
/// Uses an [`IntervalTicker`] when `config.paced` is set, otherwise runs
/// the steps back to back.
pub fn analyze_recording(
    recording: &Recording,
    config: &OfflineConfig,
    range: FrequencyRange,
) -> Vec<DetectedNote> {
    let mut source = RecordingSpectrumSource::new(recording, config.analyser());
    let step_secs = config.step_secs();
    if config.paced {
        let mut ticker = IntervalTicker::new(Duration::from_millis(config.step_ms));
        analyze_clip(&mut source, step_secs, range, &mut ticker)
    } else {
        analyze_clip(&mut source, step_secs, range, &mut ImmediateTicker)
    }
}
