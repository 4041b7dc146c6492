//! Derived-landmark generators
//!
//! Pure functions of a (smoothed) landmark set that synthesize extra points
//! and mesh triangles. Missing source landmarks never fail a generator; the
//! affected outputs are simply skipped.

pub mod face;
pub mod hand;
pub mod pose;

pub use face::{build_face_mesh, enhance_contours};
pub use hand::{build_hand_mesh, densify_hand_joints};
pub use pose::{build_pose_mesh, synthesize_virtual_pose, VirtualPose};

use crate::geometry::interpolate;
use crate::landmarks::{Connection, LandmarkSet, Triangle};

/// Interpolate every connection at each factor.
///
/// Points are emitted connection by connection, factors in the given
/// order. Connections with a missing endpoint are skipped.
pub fn densify_edges(set: &LandmarkSet, connections: &[Connection], factors: &[f32]) -> LandmarkSet {
    let mut out = LandmarkSet::new();
    for &(a, b) in connections {
        if let Some((start, end)) = set.pair(a, b) {
            for &f in factors {
                out.push(interpolate(start, end, f));
            }
        }
    }
    out
}

/// Resolve index triples against a set, skipping any with an absent vertex
pub fn build_mesh(set: &LandmarkSet, faces: &[[usize; 3]]) -> Vec<Triangle> {
    faces
        .iter()
        .filter_map(|&indices| {
            let vertices = [
                *set.get(indices[0])?,
                *set.get(indices[1])?,
                *set.get(indices[2])?,
            ];
            Some(Triangle { indices, vertices })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn test_densify_skips_missing_endpoints() {
        let set = LandmarkSet::with_indices(
            3,
            [
                (0, Landmark::new(0.0, 0.0, 0.0, 1.0)),
                (1, Landmark::new(1.0, 0.0, 0.0, 0.5)),
            ],
        );
        let out = densify_edges(&set, &[(0, 1), (1, 2)], &[0.25, 0.5, 0.75]);

        assert_eq!(out.len(), 3);
        assert_eq!(out.get(1).unwrap().x, 0.5);
        assert!(out.iter().all(|lm| lm.visibility == 0.5));
    }

    #[test]
    fn test_build_mesh_skips_incomplete_faces() {
        let lm = Landmark::new(0.5, 0.5, 0.0, 1.0);
        let set = LandmarkSet::with_indices(4, [(0, lm), (1, lm), (2, lm)]);
        let mesh = build_mesh(&set, &[[0, 1, 2], [1, 2, 3]]);

        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh[0].indices, [0, 1, 2]);
    }
}
