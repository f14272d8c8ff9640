//! Errors raised while acquiring the microphone.

use thiserror::Error;

/// Failure to start or keep a capture session.
///
/// All variants end the session; the caller is expected to report the
/// failure and wait for the user to try again.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio input device available")]
    NoInputDevice,

    #[error("no suitable f32 input format found")]
    NoSupportedConfig,

    #[error("failed to query input device: {0}")]
    DeviceQuery(String),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("capture worker exited before reporting readiness")]
    WorkerExited,
}

impl From<cpal::SupportedStreamConfigsError> for CaptureError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        CaptureError::DeviceQuery(err.to_string())
    }
}

impl From<cpal::DeviceNameError> for CaptureError {
    fn from(err: cpal::DeviceNameError) -> Self {
        CaptureError::DeviceQuery(err.to_string())
    }
}
