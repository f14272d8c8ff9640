//! # pitchscope - Microphone Pitch Monitor
//!
//! Desktop front end for `pitch-core`. Shows the dominant note and volume
//! of the microphone signal with a live spectrum, records what was heard,
//! and lists the notes found in the recording once capture stops.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application; a 16 ms tick drives one live
//!   detection frame per display frame
//! - **Audio Thread**: Owns the cpal stream (inside `CaptureSession`)
//! - **Analysis Thread**: One offline pass at a time; later recordings queue
//! - **Communication**: Crossbeam channels between the threads

mod cli;
mod ui;

use clap::Parser;
use crossbeam_channel::{Receiver, TryRecvError};
use iced::{Element, Subscription, Task, Theme};
use pitch_core::config::{resolve_config, Config};
use pitch_core::offline::{analyze_recording, DetectedNote};
use pitch_core::recording::Recording;
use pitch_core::session::CaptureSession;
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;
use ui::main_display::create_main_view;

const NOTE_PLACEHOLDER: &str = "Detected Note: -";
const VOLUME_PLACEHOLDER: &str = "Volume Intensity: -";
const MIC_DENIED: &str = "Microphone access denied.";

pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = cli::Cli::parse();
    let config = resolve_config(cli.config.as_deref());

    match cli.command {
        Some(cli::Command::Analyze { input, json, paced }) => {
            cli::run_analyze(&input, config, json, paced)
        }
        None => run_gui(config),
    }
}

fn run_gui(config: Config) -> anyhow::Result<()> {
    log::info!(target: "main", "Starting pitchscope...");
    iced::application("pitchscope", PitchApp::update, PitchApp::view)
        .subscription(PitchApp::subscription)
        .theme(PitchApp::theme)
        .run_with(move || (PitchApp::new(config), Task::none()))?;
    log::info!(target: "main", "Application finished");
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Message {
    /// Start/stop button pressed
    ToggleCapture,
    /// Timer tick for real-time updates
    Tick,
}

/// Data the UI components need to render.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub capturing: bool,
    pub note_text: String,
    pub volume_text: String,
    pub spectrum: Vec<u8>,
    /// Last status line (saved file, errors)
    pub status: Option<String>,
    pub analyzing: bool,
    /// Notes found in the last recording
    pub detected_notes: Vec<DetectedNote>,
}

impl Default for AppDisplayData {
    fn default() -> Self {
        Self {
            capturing: false,
            note_text: NOTE_PLACEHOLDER.to_string(),
            volume_text: VOLUME_PLACEHOLDER.to_string(),
            spectrum: Vec::new(),
            status: None,
            analyzing: false,
            detected_notes: Vec::new(),
        }
    }
}

struct PitchApp {
    config: Config,
    session: Option<CaptureSession>,
    analysis_receiver: Option<Receiver<Vec<DetectedNote>>>,
    /// Recordings stopped while a pass was still running
    pending_analysis: VecDeque<Recording>,
    display_data: AppDisplayData,
}

impl PitchApp {
    fn new(config: Config) -> Self {
        Self {
            config,
            session: None,
            analysis_receiver: None,
            pending_analysis: VecDeque::new(),
            display_data: AppDisplayData::default(),
        }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::ToggleCapture => {
                if self.session.as_ref().is_some_and(CaptureSession::is_capturing) {
                    self.stop_capture();
                } else {
                    self.start_capture();
                }
            }
            Message::Tick => {
                if let Some(session) = self.session.as_mut() {
                    if let Some(reading) = session.poll() {
                        // Without a pitch the previous note stays on screen.
                        if let Some(note_text) = reading.note_text() {
                            self.display_data.note_text = note_text;
                        }
                        self.display_data.volume_text = reading.volume_text();
                        self.display_data.spectrum = reading.spectrum;
                        self.display_data.status = Some(format!(
                            "Recording {:.1}s at {} Hz",
                            session.recorded_secs(),
                            session.sample_rate()
                        ));
                    }
                }
                self.poll_analysis();
            }
        }
    }

    fn start_capture(&mut self) {
        match CaptureSession::start(&self.config.live, self.config.detection) {
            Ok(session) => {
                log::info!(target: "main", "Capture started");
                self.session = Some(session);
                self.display_data.capturing = true;
                self.display_data.note_text = NOTE_PLACEHOLDER.to_string();
                self.display_data.volume_text = VOLUME_PLACEHOLDER.to_string();
                self.display_data.status = None;
            }
            Err(e) => {
                log::error!(target: "main", "Error accessing microphone: {}", e);
                self.display_data.note_text = MIC_DENIED.to_string();
                self.display_data.status = Some(e.to_string());
            }
        }
    }

    fn stop_capture(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let recording = session.stop();

        self.display_data.capturing = false;
        self.display_data.note_text = NOTE_PLACEHOLDER.to_string();
        self.display_data.volume_text = VOLUME_PLACEHOLDER.to_string();
        self.display_data.spectrum.clear();

        if recording.is_empty() {
            self.display_data.status = Some("Nothing was recorded.".to_string());
            return;
        }

        self.display_data.status = self.save_recording(&recording);
        self.start_analysis(recording);
    }

    /// Writes the recording to the configured path, if any.
    fn save_recording(&self, recording: &Recording) -> Option<String> {
        let path = self.config.recording.path.as_path();
        if path.as_os_str().is_empty() {
            return None;
        }
        match recording.save_wav(path) {
            Ok(()) => Some(format!("Recording saved to {}", path.display())),
            Err(e) => {
                log::error!(target: "main", "{:#}", e);
                Some(format!("Could not save recording: {}", e))
            }
        }
    }

    /// Runs offline analysis of `recording` on a background thread, or
    /// queues it behind the pass already running.
    fn start_analysis(&mut self, recording: Recording) {
        if self.analysis_receiver.is_some() {
            log::info!(target: "main", "Offline analysis busy; queued recording");
            self.pending_analysis.push_back(recording);
            return;
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let offline = self.config.offline.clone();
        let range = self.config.detection;
        let spawned = thread::Builder::new()
            .name("offline-analysis".to_string())
            .spawn(move || {
                let notes = analyze_recording(&recording, &offline, range);
                let _ = tx.send(notes);
            });

        match spawned {
            Ok(_) => {
                self.analysis_receiver = Some(rx);
                self.display_data.analyzing = true;
            }
            Err(e) => log::error!(target: "main", "Failed to spawn analysis thread: {}", e),
        }
    }

    fn poll_analysis(&mut self) {
        let Some(receiver) = &self.analysis_receiver else {
            return;
        };
        match receiver.try_recv() {
            Ok(notes) => {
                log_detected_notes(&notes);
                self.display_data.detected_notes = notes;
            }
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                log::error!(target: "main", "Offline analysis thread exited without a result");
            }
        }
        self.analysis_receiver = None;
        self.display_data.analyzing = false;

        if let Some(next) = self.pending_analysis.pop_front() {
            self.start_analysis(next);
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data, Message::ToggleCapture)
    }

    /// Fires every 16ms (~60 FPS) to drive live detection.
    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(Duration::from_millis(16)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn log_detected_notes(notes: &[DetectedNote]) {
    match serde_json::to_string(notes) {
        Ok(json) => log::info!(target: "main", "Detected Notes: {}", json),
        Err(e) => log::warn!(target: "main", "Could not serialize detected notes: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_starts_with_placeholders() {
        let app = PitchApp::new(Config::default());
        assert_eq!(app.display_data.note_text, "Detected Note: -");
        assert_eq!(app.display_data.volume_text, "Volume Intensity: -");
        assert!(!app.display_data.capturing);
    }

    #[test]
    fn stop_without_session_is_a_no_op() {
        let mut app = PitchApp::new(Config::default());
        app.stop_capture();
        assert!(app.display_data.status.is_none());
        assert!(app.analysis_receiver.is_none());
    }

    #[test]
    fn finished_analysis_is_displayed() {
        let mut app = PitchApp::new(Config::default());
        let (tx, rx) = crossbeam_channel::bounded(1);
        app.analysis_receiver = Some(rx);
        app.display_data.analyzing = true;

        app.update(Message::Tick);
        assert!(app.display_data.analyzing);

        tx.send(vec![DetectedNote { time: 0.0, note: None }]).unwrap();
        app.update(Message::Tick);
        assert!(!app.display_data.analyzing);
        assert!(app.analysis_receiver.is_none());
        assert_eq!(app.display_data.detected_notes.len(), 1);
    }

    #[test]
    fn analysis_of_recording_runs_in_background() {
        let mut config = Config::default();
        config.recording.path = std::path::PathBuf::new();
        let mut app = PitchApp::new(config);

        let recording = Recording::new(vec![0.0; 4500], 44100);
        assert_eq!(app.save_recording(&recording), None);
        app.start_analysis(recording);
        assert!(app.display_data.analyzing);

        let receiver = app.analysis_receiver.clone().unwrap();
        let notes = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn recordings_stopped_during_a_pass_are_queued() {
        let mut app = PitchApp::new(Config::default());
        let (tx, rx) = crossbeam_channel::bounded(1);
        app.analysis_receiver = Some(rx);
        app.display_data.analyzing = true;

        app.start_analysis(Recording::new(vec![0.0; 4500], 44100));
        assert_eq!(app.pending_analysis.len(), 1);

        tx.send(vec![DetectedNote { time: 0.0, note: None }]).unwrap();
        app.update(Message::Tick);

        // The first result is shown and the queued recording is now running.
        assert_eq!(app.display_data.detected_notes.len(), 1);
        assert!(app.pending_analysis.is_empty());
        assert!(app.display_data.analyzing);
        let receiver = app.analysis_receiver.clone().unwrap();
        let notes = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(notes.len(), 3);
    }
}
