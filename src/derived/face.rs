//! Face contour enhancement and face mesh

use crate::geometry::interpolate;
use crate::landmarks::face::{CHIN, LEFT_CHEEK, NOSE_TIP, RIGHT_CHEEK};
use crate::landmarks::{LandmarkSet, Triangle};
use crate::topology::{FaceContour, FACE_OVAL};

use super::{build_mesh, densify_edges};

/// Densify the oval, lips, eyes and eyebrows, then add the nose-to-chin and
/// cheek-to-cheek midpoints.
pub fn enhance_contours(face: &LandmarkSet, factors: &[f32]) -> LandmarkSet {
    let mut enhanced = LandmarkSet::new();
    for contour in FaceContour::ALL {
        for lm in densify_edges(face, contour.connections(), factors).iter() {
            enhanced.push(*lm);
        }
    }

    for (a, b) in [(NOSE_TIP, CHIN), (LEFT_CHEEK, RIGHT_CHEEK)] {
        if let Some((start, end)) = face.pair(a, b) {
            enhanced.push(interpolate(start, end, 0.5));
        }
    }

    enhanced
}

/// Fan from the nose tip across each face-oval edge
pub fn build_face_mesh(face: &LandmarkSet) -> Vec<Triangle> {
    let faces: Vec<[usize; 3]> = FACE_OVAL.iter().map(|&(a, b)| [NOSE_TIP, a, b]).collect();
    build_mesh(face, &faces)
}
