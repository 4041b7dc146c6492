//! Landmark data model
//!
//! A `LandmarkSet` is index-addressed: position `i` always names the same
//! anatomical point (for pose, 11/12 are the shoulders). Entries may be
//! absent, which every consumer treats as "not tracked this frame".

use serde::{Deserialize, Serialize};

/// Number of pose landmarks in the body topology
pub const POSE_LANDMARK_COUNT: usize = 33;
/// Number of landmarks per hand
pub const HAND_LANDMARK_COUNT: usize = 21;
/// Number of face mesh landmarks without iris refinement
pub const FACE_LANDMARK_COUNT: usize = 468;

fn default_visibility() -> f32 {
    1.0
}

/// A single tracked point
///
/// `x`/`y` are normalized to the source image, `z` is a relative depth and
/// `visibility` is the detector's confidence for this point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }
}

/// Ordered, possibly sparse collection of landmarks for one subject
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Option<Landmark>>,
}

impl LandmarkSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a set where every index is present
    pub fn from_dense(points: Vec<Landmark>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }

    /// Create a set that may contain holes
    pub fn from_sparse(points: Vec<Option<Landmark>>) -> Self {
        Self { points }
    }

    /// Create a set of `len` slots with only the given indices populated
    pub fn with_indices(len: usize, entries: impl IntoIterator<Item = (usize, Landmark)>) -> Self {
        let mut points = vec![None; len];
        for (idx, lm) in entries {
            if idx >= points.len() {
                points.resize(idx + 1, None);
            }
            points[idx] = Some(lm);
        }
        Self { points }
    }

    /// Landmark at `idx`, if present
    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.points.get(idx).and_then(Option::as_ref)
    }

    /// Both endpoints of a pair, only when both are present
    pub fn pair(&self, a: usize, b: usize) -> Option<(&Landmark, &Landmark)> {
        Some((self.get(a)?, self.get(b)?))
    }

    /// Number of slots, including absent ones
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of slots that hold a landmark
    pub fn present_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    /// Present landmarks in index order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter().filter_map(Option::as_ref)
    }

    /// Present landmarks with their indices
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &Landmark)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|lm| (i, lm)))
    }

    pub fn push(&mut self, landmark: Landmark) {
        self.points.push(Some(landmark));
    }
}

impl FromIterator<Landmark> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self::from_dense(iter.into_iter().collect())
    }
}

/// Topological edge between two landmark indices
pub type Connection = (usize, usize);

/// Mesh face resolved against a landmark set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Source indices of the three vertices
    pub indices: [usize; 3],
    /// Vertex positions at construction time
    pub vertices: [Landmark; 3],
}

impl Triangle {
    /// Lowest vertex confidence
    pub fn min_visibility(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.visibility)
            .fold(f32::INFINITY, f32::min)
    }
}

/// Landmark category, each with its own topology and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pose,
    Face,
    Hands,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Pose => "Pose",
            Category::Face => "Face",
            Category::Hands => "Hands",
        }
    }
}

/// Which hand a hand landmark set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandSide {
    Left,
    Right,
}

/// Pose landmark indices used by the derived generators
pub mod pose {
    pub const NOSE: usize = 0;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
    pub const LEFT_HEEL: usize = 29;
    pub const RIGHT_HEEL: usize = 30;
    pub const LEFT_FOOT_INDEX: usize = 31;
    pub const RIGHT_FOOT_INDEX: usize = 32;
}

/// Face mesh indices used by the contour generator
pub mod face {
    pub const NOSE_TIP: usize = 1;
    pub const CHIN: usize = 152;
    pub const LEFT_CHEEK: usize = 234;
    pub const RIGHT_CHEEK: usize = 454;
}

/// Hand indices
pub mod hand {
    pub const WRIST: usize = 0;
    /// Wrist followed by the base of each finger, thumb to pinky
    pub const FINGER_BASES: [usize; 5] = [0, 5, 9, 13, 17];
}
