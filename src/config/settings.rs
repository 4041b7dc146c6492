//! Persistent overlay settings
//!
//! Stored as JSON under the platform config directory. Missing fields fall
//! back to their defaults so older files keep loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ModelTier;
use crate::error::ConfigError;
use crate::landmarks::Category;
use crate::smoothing::WindowSizes;

/// Minimum interval between render passes (~30 Hz)
pub const DEFAULT_THROTTLE_MS: u64 = 33;
/// Display refresh cadence driving the capture loop
pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// Which overlay layers are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub pose: bool,
    pub face: bool,
    pub hands: bool,
    /// Shaded mesh triangles
    pub mesh: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            pose: true,
            face: true,
            hands: true,
            mesh: false,
        }
    }
}

impl Visibility {
    pub fn is_visible(&self, category: Category) -> bool {
        match category {
            Category::Pose => self.pose,
            Category::Face => self.face,
            Category::Hands => self.hands,
        }
    }

    pub fn set(&mut self, category: Category, visible: bool) {
        match category {
            Category::Pose => self.pose = visible,
            Category::Face => self.face = visible,
            Category::Hands => self.hands = visible,
        }
    }

    pub fn toggle(&mut self, category: Category) {
        self.set(category, !self.is_visible(category));
    }
}

/// How many interpolated points are placed along each edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityProfile {
    /// 4 points per pose edge, 9 per face and hand edge
    #[default]
    Standard,
    /// 19 points per edge for every category
    Detailed,
}

impl DensityProfile {
    pub fn points_per_edge(&self, category: Category) -> usize {
        match (self, category) {
            (DensityProfile::Standard, Category::Pose) => 4,
            (DensityProfile::Standard, _) => 9,
            (DensityProfile::Detailed, _) => 19,
        }
    }
}

/// Smoothing window sizes per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub pose_window: usize,
    pub face_window: usize,
    pub hand_window: usize,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        let sizes = WindowSizes::default();
        Self {
            pose_window: sizes.pose,
            face_window: sizes.face,
            hand_window: sizes.hand,
        }
    }
}

/// All user-adjustable overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub model_tier: ModelTier,
    /// Track up to two subjects instead of one
    pub multi_subject: bool,
    pub visibility: Visibility,
    /// Landmarks must exceed this confidence to be drawn
    pub confidence_threshold: f32,
    pub throttle_ms: u64,
    pub refresh_rate_hz: u32,
    pub smoothing: SmoothingSettings,
    pub density: DensityProfile,
    /// Mirror self-facing webcam frames
    pub mirror_webcam: bool,
    pub webcam_width: u32,
    pub webcam_height: u32,
    /// Ask the detector for hardware acceleration
    pub prefer_gpu: bool,
    /// Scale markers by landmark depth
    pub depth_projection: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            model_tier: ModelTier::Full,
            multi_subject: false,
            visibility: Visibility::default(),
            confidence_threshold: 0.5,
            throttle_ms: DEFAULT_THROTTLE_MS,
            refresh_rate_hz: DEFAULT_REFRESH_HZ,
            smoothing: SmoothingSettings::default(),
            density: DensityProfile::Standard,
            mirror_webcam: true,
            webcam_width: 1280,
            webcam_height: 720,
            prefer_gpu: true,
            depth_projection: false,
        }
    }
}

impl OverlaySettings {
    const FILE_NAME: &'static str = "settings.json";

    /// `<config dir>/holistic-overlay/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("holistic-overlay").join(Self::FILE_NAME))
    }

    /// Load settings from `path`.
    ///
    /// A missing file gives defaults. A file that fails to parse is logged
    /// and also gives defaults; only I/O failures are returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<OverlaySettings>(&content) {
            Ok(mut settings) => {
                if settings.validate().is_err() {
                    tracing::warn!(
                        value = settings.confidence_threshold,
                        "Confidence threshold out of range, clamping"
                    );
                    settings.confidence_threshold = settings.confidence_threshold.clamp(0.0, 1.0);
                }
                tracing::info!(path = %path.display(), "Loaded settings");
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse settings, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.confidence_threshold)
    }

    /// Update the live confidence threshold
    pub fn set_confidence_threshold(&mut self, value: f32) -> Result<(), ConfigError> {
        validate_threshold(value)?;
        self.confidence_threshold = value;
        Ok(())
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_rate_hz.max(1) as f64)
    }

    pub fn window_sizes(&self) -> WindowSizes {
        WindowSizes {
            pose: self.smoothing.pose_window,
            face: self.smoothing.face_window,
            hand: self.smoothing.hand_window,
        }
    }

    /// Subjects requested from the detector
    pub fn max_subjects(&self) -> usize {
        if self.multi_subject {
            2
        } else {
            1
        }
    }
}

fn validate_threshold(value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("holistic-overlay-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.throttle_interval(), Duration::from_millis(33));
        assert_eq!(settings.window_sizes(), WindowSizes::default());
        assert_eq!(settings.max_subjects(), 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_threshold_validation() {
        let mut settings = OverlaySettings::default();
        assert!(settings.set_confidence_threshold(0.9).is_ok());
        assert_eq!(settings.confidence_threshold, 0.9);
        assert!(matches!(
            settings.set_confidence_threshold(1.5),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert_eq!(settings.confidence_threshold, 0.9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: OverlaySettings =
            serde_json::from_str(r#"{"model_tier":"lite","visibility":{"face":false}}"#).unwrap();
        assert_eq!(settings.model_tier, ModelTier::Lite);
        assert!(!settings.visibility.face);
        assert!(settings.visibility.pose);
        assert_eq!(settings.throttle_ms, DEFAULT_THROTTLE_MS);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/settings.json");
        let mut settings = OverlaySettings::default();
        settings.density = DensityProfile::Detailed;
        settings.multi_subject = true;

        settings.save(&path).unwrap();
        let loaded = OverlaySettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let missing = temp_path("does-not-exist.json");
        assert_eq!(OverlaySettings::load(&missing).unwrap(), OverlaySettings::default());

        let bad = temp_path("bad/settings.json");
        fs::create_dir_all(bad.parent().unwrap()).unwrap();
        fs::write(&bad, "{ not json").unwrap();
        assert_eq!(OverlaySettings::load(&bad).unwrap(), OverlaySettings::default());
        let _ = fs::remove_file(&bad);
    }

    #[test]
    fn test_density_profiles() {
        assert_eq!(DensityProfile::Standard.points_per_edge(Category::Pose), 4);
        assert_eq!(DensityProfile::Standard.points_per_edge(Category::Hands), 9);
        assert_eq!(DensityProfile::Detailed.points_per_edge(Category::Face), 19);
    }

    #[test]
    fn test_visibility_toggle() {
        let mut vis = Visibility::default();
        vis.toggle(Category::Face);
        assert!(!vis.is_visible(Category::Face));
        vis.toggle(Category::Face);
        assert!(vis.is_visible(Category::Face));
    }
}
