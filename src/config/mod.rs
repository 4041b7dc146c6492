//! Model tiers and overlay settings

pub mod settings;

pub use settings::{DensityProfile, OverlaySettings, Visibility};

use serde::{Deserialize, Serialize};

/// Accuracy/latency class of the landmark model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    #[default]
    Full,
    Upper,
    Lite,
}

impl ModelTier {
    pub const ALL: [ModelTier; 3] = [ModelTier::Full, ModelTier::Upper, ModelTier::Lite];

    /// Detector configuration for this tier
    pub fn config(&self) -> ModelConfig {
        match self {
            ModelTier::Full => ModelConfig {
                model_complexity: 2,
                smooth_landmarks: true,
                enable_segmentation: true,
                smooth_segmentation: true,
                refine_face_landmarks: true,
                min_detection_confidence: 0.5,
                min_tracking_confidence: 0.5,
            },
            ModelTier::Upper => ModelConfig {
                model_complexity: 1,
                smooth_landmarks: true,
                enable_segmentation: false,
                smooth_segmentation: false,
                refine_face_landmarks: true,
                min_detection_confidence: 0.6,
                min_tracking_confidence: 0.6,
            },
            ModelTier::Lite => ModelConfig {
                model_complexity: 0,
                smooth_landmarks: false,
                enable_segmentation: false,
                smooth_segmentation: false,
                refine_face_landmarks: false,
                min_detection_confidence: 0.7,
                min_tracking_confidence: 0.7,
            },
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelTier::Full => "Full body",
            ModelTier::Upper => "Upper body",
            ModelTier::Lite => "Lite",
        }
    }

    /// Parse a tier name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "full" => Some(ModelTier::Full),
            "upper" => Some(ModelTier::Upper),
            "lite" => Some(ModelTier::Lite),
            _ => None,
        }
    }
}

/// Per-tier detector options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    /// 0 (fastest) to 2 (most accurate)
    pub model_complexity: u8,
    pub smooth_landmarks: bool,
    pub enable_segmentation: bool,
    pub smooth_segmentation: bool,
    /// Adds iris landmarks to the face mesh
    pub refine_face_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_confidence_defaults() {
        assert_eq!(ModelTier::Full.config().min_detection_confidence, 0.5);
        assert_eq!(ModelTier::Upper.config().min_tracking_confidence, 0.6);
        assert_eq!(ModelTier::Lite.config().min_detection_confidence, 0.7);
    }

    #[test]
    fn test_only_full_tier_segments() {
        let segmenting: Vec<_> = ModelTier::ALL
            .iter()
            .filter(|t| t.config().enable_segmentation)
            .collect();
        assert_eq!(segmenting, vec![&ModelTier::Full]);
        assert!(!ModelTier::Lite.config().smooth_landmarks);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ModelTier::from_name("UPPER"), Some(ModelTier::Upper));
        assert_eq!(ModelTier::from_name("heavy"), None);
    }
}
