//! Runtime configuration, loaded from TOML.
//!
//! Live capture and offline analysis keep separate analyser settings:
//! the live view uses a 4096-point transform while recordings are
//! analysed with 2048 points.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::spectrum::{FrequencyRange, DEFAULT_VOLUME_SENSITIVITY};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pitchscope.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub offline: OfflineConfig,
    #[serde(default)]
    pub detection: FrequencyRange,
    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Parameters of a byte-spectrum analyser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserConfig {
    pub fft_size: usize,
    pub min_db: f32,
    pub max_db: f32,
    /// Weight of the previous frame in `[0, 1]`
    pub smoothing: f32,
}

impl AnalyserConfig {
    fn validate(&self, section: &str) -> Result<()> {
        if self.fft_size < 32 || !self.fft_size.is_power_of_two() {
            bail!("[{section}] fft_size must be a power of two >= 32, got {}", self.fft_size);
        }
        if !self.min_db.is_finite() || !self.max_db.is_finite() {
            bail!("[{section}] min_db and max_db must be finite");
        }
        if self.max_db <= self.min_db {
            bail!("[{section}] max_db ({}) must be above min_db ({})", self.max_db, self.min_db);
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            bail!("[{section}] smoothing must be within 0.0-1.0, got {}", self.smoothing);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_live_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_live_min_db")]
    pub min_db: f32,
    #[serde(default = "default_live_max_db")]
    pub max_db: f32,
    #[serde(default = "default_live_smoothing")]
    pub smoothing: f32,
    /// Linear gain applied to microphone samples
    #[serde(default = "default_input_gain")]
    pub input_gain: f32,
    /// Multiplier for the volume meter
    #[serde(default = "default_volume_sensitivity")]
    pub volume_sensitivity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfflineConfig {
    #[serde(default = "default_offline_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_offline_min_db")]
    pub min_db: f32,
    #[serde(default = "default_offline_max_db")]
    pub max_db: f32,
    #[serde(default = "default_offline_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Wait one step of wall-clock time between analysis steps
    #[serde(default)]
    pub paced: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// Where the GUI saves the last recording; empty disables saving
    #[serde(default = "default_recording_path")]
    pub path: PathBuf,
}

impl LiveConfig {
    pub fn analyser(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            min_db: self.min_db,
            max_db: self.max_db,
            smoothing: self.smoothing,
        }
    }
}

impl OfflineConfig {
    pub fn analyser(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            min_db: self.min_db,
            max_db: self.max_db,
            smoothing: self.smoothing,
        }
    }

    pub fn step_secs(&self) -> f64 {
        self.step_ms as f64 / 1000.0
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            fft_size: default_live_fft_size(),
            min_db: default_live_min_db(),
            max_db: default_live_max_db(),
            smoothing: default_live_smoothing(),
            input_gain: default_input_gain(),
            volume_sensitivity: default_volume_sensitivity(),
        }
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            fft_size: default_offline_fft_size(),
            min_db: default_offline_min_db(),
            max_db: default_offline_max_db(),
            smoothing: default_offline_smoothing(),
            step_ms: default_step_ms(),
            paced: false,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            path: default_recording_path(),
        }
    }
}

fn default_live_fft_size() -> usize { 4096 }
fn default_live_min_db() -> f32 { -90.0 }
fn default_live_max_db() -> f32 { -10.0 }
fn default_live_smoothing() -> f32 { 0.85 }
fn default_input_gain() -> f32 { 5.0 }
fn default_volume_sensitivity() -> f32 { DEFAULT_VOLUME_SENSITIVITY }
fn default_offline_fft_size() -> usize { 2048 }
fn default_offline_min_db() -> f32 { -100.0 }
fn default_offline_max_db() -> f32 { -30.0 }
fn default_offline_smoothing() -> f32 { 0.8 }
fn default_step_ms() -> u64 { 50 }
fn default_recording_path() -> PathBuf { PathBuf::from("recording.wav") }

impl Config {
    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.live.analyser().validate("live")?;
        self.offline.analyser().validate("offline")?;
        if self.offline.step_ms == 0 {
            bail!("[offline] step_ms must be positive");
        }
        for (name, value) in [
            ("input_gain", self.live.input_gain),
            ("volume_sensitivity", self.live.volume_sensitivity),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("[live] {name} must be a finite non-negative number, got {value}");
            }
        }
        if !self.detection.min_hz.is_finite() || !self.detection.max_hz.is_finite() {
            bail!("[detection] min_hz and max_hz must be finite");
        }
        if self.detection.min_hz >= self.detection.max_hz {
            bail!(
                "[detection] min_hz ({}) must be below max_hz ({})",
                self.detection.min_hz,
                self.detection.max_hz
            );
        }
        Ok(())
    }
}

/// Parses and validates a TOML configuration string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Invalid configuration")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("In config file: {}", path.display()))
}

/// Finds the configuration file to use.
///
/// An explicit path wins; otherwise `./pitchscope.toml`, then
/// `<config_dir>/pitchscope/config.toml`.
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("pitchscope").join("config.toml"))
        .filter(|path| path.exists())
}

/// Loads the configuration, falling back to defaults when no file is
/// found or the file is invalid.
pub fn resolve_config(explicit: Option<&Path>) -> Config {
    match find_config_path(explicit) {
        Some(path) => match load_config(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Config::default()
            }
        },
        None => Config::default(),
    }
}
