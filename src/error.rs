//! Error types for the overlay pipeline.

use thiserror::Error;

use crate::scheduler::SessionState;

/// Failures while acquiring or reading a media source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),
    #[error("No file selected")]
    NoFileSelected,
    #[error("Failed to decode media: {0}")]
    Decode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by the landmark detector capability.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Detector has not been configured")]
    NotReady,
    #[error("Detector worker has stopped")]
    WorkerStopped,
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Replay data error: {0}")]
    Replay(String),
}

/// Failures while drawing onto the destination surface.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing surface has zero size")]
    EmptySurface,
}

/// Failures while loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Confidence threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),
}

/// Top-level error surfaced by a session.
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

impl SourceError {
    /// Status text shown to the user for this failure
    pub fn status_message(&self) -> String {
        match self {
            SourceError::PermissionDenied => {
                "Camera access denied. Allow camera access and try again.".to_string()
            }
            SourceError::UnsupportedMediaType(_) => {
                "Unsupported file type. Use JPEG, PNG, MP4, or WebM.".to_string()
            }
            SourceError::NoFileSelected => "No file selected.".to_string(),
            other => format!("Could not open source: {}", other),
        }
    }
}
