//! Replays recorded detections
//!
//! Reads a JSON array of per-frame `DetectionResult`s and serves entry
//! `frame_number` for each frame, holding the last entry once the recording
//! runs out. Used by the CLI and by tests that need deterministic output.

use std::fs;
use std::path::Path;
use std::time::Duration;

use super::{DetectionResult, DetectorOptions, LandmarkDetector};
use crate::error::DetectorError;
use crate::source::Frame;

pub struct ReplayDetector {
    recording: Vec<DetectionResult>,
    options: Option<DetectorOptions>,
}

impl ReplayDetector {
    pub fn new(recording: Vec<DetectionResult>) -> Self {
        Self {
            recording,
            options: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DetectorError> {
        let recording: Vec<DetectionResult> =
            serde_json::from_str(json).map_err(|e| DetectorError::Replay(e.to_string()))?;
        Ok(Self::new(recording))
    }

    pub fn from_path(path: &Path) -> Result<Self, DetectorError> {
        let json = fs::read_to_string(path)
            .map_err(|e| DetectorError::Replay(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Recorded frames available
    pub fn len(&self) -> usize {
        self.recording.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }

    /// Options from the last successful `configure`
    pub fn options(&self) -> Option<&DetectorOptions> {
        self.options.as_ref()
    }
}

impl LandmarkDetector for ReplayDetector {
    async fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        if self.recording.is_empty() {
            return Err(DetectorError::Replay("recording contains no frames".to_string()));
        }
        tracing::info!(
            tier = options.tier.display_name(),
            max_subjects = options.max_subjects,
            frames = self.recording.len(),
            "Replay detector configured"
        );
        self.options = Some(options.clone());
        Ok(())
    }

    async fn detect(
        &mut self,
        frame: &Frame,
        _timestamp: Option<Duration>,
    ) -> Result<DetectionResult, DetectorError> {
        let options = self.options.as_ref().ok_or(DetectorError::NotReady)?;
        let last = self.recording.len().saturating_sub(1);
        let idx = (frame.frame_number as usize).min(last);

        let mut result = self
            .recording
            .get(idx)
            .cloned()
            .ok_or_else(|| DetectorError::Replay("recording contains no frames".to_string()))?;
        result.truncate_subjects(options.max_subjects);
        if !options.model.enable_segmentation {
            result.segmentation = None;
        }
        Ok(result)
    }

    fn close(&mut self) {
        self.options = None;
    }
}
