//! Geometry utilities
//!
//! Point interpolation and confidence-based color and filter mapping.

use serde::{Deserialize, Serialize};

use crate::landmarks::{Landmark, LandmarkSet};

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Confidence band used to color point markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_visibility(visibility: f32) -> Self {
        if visibility > 0.8 {
            ConfidenceTier::High
        } else if visibility > 0.5 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn color(&self) -> Color {
        match self {
            ConfidenceTier::High => Color::GREEN,
            ConfidenceTier::Medium => Color::YELLOW,
            ConfidenceTier::Low => Color::RED,
        }
    }
}

/// Linear interpolation between two landmarks.
///
/// `factor` is not clamped; values outside [0, 1] extrapolate along the
/// edge. The result carries the lower of the two confidences.
pub fn interpolate(start: &Landmark, end: &Landmark, factor: f32) -> Landmark {
    Landmark {
        x: start.x + (end.x - start.x) * factor,
        y: start.y + (end.y - start.y) * factor,
        z: start.z + (end.z - start.z) * factor,
        visibility: start.visibility.min(end.visibility),
    }
}

/// Marker color for a confidence value
pub fn confidence_color(visibility: f32) -> Color {
    ConfidenceTier::from_visibility(visibility).color()
}

/// Whether a landmark clears the threshold (strictly greater)
pub fn passes_confidence(landmark: &Landmark, min_confidence: f32) -> bool {
    landmark.visibility > min_confidence
}

/// Keep landmarks whose visibility is strictly greater than `min_confidence`.
///
/// The input is left untouched; the result is a dense set of survivors in
/// their original order.
pub fn filter_by_confidence(set: &LandmarkSet, min_confidence: f32) -> LandmarkSet {
    set.iter()
        .filter(|lm| passes_confidence(lm, min_confidence))
        .copied()
        .collect()
}

/// `count` factors evenly spaced strictly inside (0, 1).
///
/// 4 gives 0.2, 0.4, 0.6, 0.8; 9 gives 0.1 through 0.9.
pub fn evenly_spaced_factors(count: usize) -> Vec<f32> {
    let steps = (count + 1) as f32;
    (1..=count).map(|i| i as f32 / steps).collect()
}

/// Perspective-style projection used by the depth marker variant
pub fn project_depth(landmark: &Landmark) -> Landmark {
    let scale = 1.0 / (1.0 + landmark.z * 0.5);
    Landmark {
        x: landmark.x * scale,
        y: landmark.y * scale,
        ..*landmark
    }
}
