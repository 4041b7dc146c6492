//! Landmark detector capability
//!
//! The detector itself is external: given a frame it returns zero or more
//! landmark sets per category. Each category is an explicit `Option`, where
//! `None` means the detector produced nothing for it this frame.

pub mod replay;
pub mod worker;

pub use replay::ReplayDetector;
pub use worker::{BlockingDetector, WorkerDetector};

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelTier};
use crate::error::DetectorError;
use crate::landmarks::LandmarkSet;
use crate::source::Frame;

/// Detector operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunningMode {
    /// Independent single-shot detections
    Image,
    /// Continuous stream with temporal tracking
    Video,
}

/// Hardware acceleration preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delegate {
    Cpu,
    Gpu,
}

/// Options handed to the detector when a session starts
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    pub tier: ModelTier,
    pub model: ModelConfig,
    pub max_subjects: usize,
    pub running_mode: RunningMode,
    pub delegate: Delegate,
}

impl DetectorOptions {
    pub fn new(tier: ModelTier, max_subjects: usize, running_mode: RunningMode, prefer_gpu: bool) -> Self {
        Self {
            tier,
            model: tier.config(),
            max_subjects: max_subjects.max(1),
            running_mode,
            delegate: if prefer_gpu { Delegate::Gpu } else { Delegate::Cpu },
        }
    }
}

/// Person segmentation mask (0.0 = background, 1.0 = person)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationMask {
    pub mask: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl SegmentationMask {
    /// Mask value at normalized coordinates
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let px = ((x * self.width as f32) as u32).min(self.width - 1);
        let py = ((y * self.height as f32) as u32).min(self.height - 1);
        let idx = (py * self.width + px) as usize;
        self.mask.get(idx).copied().unwrap_or(0.0)
    }
}

/// Landmarks for one frame, per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionResult {
    pub poses: Option<Vec<LandmarkSet>>,
    pub faces: Option<Vec<LandmarkSet>>,
    pub left_hands: Option<Vec<LandmarkSet>>,
    pub right_hands: Option<Vec<LandmarkSet>>,
    pub segmentation: Option<SegmentationMask>,
}

impl DetectionResult {
    /// True when no category produced a landmark set
    pub fn is_empty(&self) -> bool {
        [&self.poses, &self.faces, &self.left_hands, &self.right_hands]
            .iter()
            .all(|c| c.as_ref().map_or(true, Vec::is_empty))
    }

    /// Keep at most `max` subjects per category
    pub fn truncate_subjects(&mut self, max: usize) {
        for sets in [
            &mut self.poses,
            &mut self.faces,
            &mut self.left_hands,
            &mut self.right_hands,
        ]
        .into_iter()
        .flatten()
        {
            sets.truncate(max);
        }
    }
}

/// Asynchronous landmark detection.
///
/// A session awaits each call before submitting the next frame, so an
/// implementation never sees two detections in flight.
pub trait LandmarkDetector {
    /// Load models and apply options; the session is running once this
    /// resolves successfully.
    fn configure(&mut self, options: &DetectorOptions) -> impl Future<Output = Result<(), DetectorError>>;

    /// Detect landmarks in `frame`. `timestamp` is `None` for still images.
    fn detect(
        &mut self,
        frame: &Frame,
        timestamp: Option<Duration>,
    ) -> impl Future<Output = Result<DetectionResult, DetectorError>>;

    /// Release per-session state. `configure` may be called again later.
    fn close(&mut self) {}
}
