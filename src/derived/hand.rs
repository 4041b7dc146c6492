//! Hand joint densification and hand mesh

use crate::geometry::interpolate;
use crate::landmarks::hand::FINGER_BASES;
use crate::landmarks::{LandmarkSet, Triangle};
use crate::topology::{HAND_CONNECTIONS, HAND_MESH};

use super::{build_mesh, densify_edges};

/// Densify every hand connection, then add the midpoints between
/// consecutive finger bases (palm spread).
pub fn densify_hand_joints(hand: &LandmarkSet, factors: &[f32]) -> LandmarkSet {
    let mut joints = densify_edges(hand, &HAND_CONNECTIONS, factors);
    for pair in FINGER_BASES.windows(2) {
        if let Some((start, end)) = hand.pair(pair[0], pair[1]) {
            joints.push(interpolate(start, end, 0.5));
        }
    }
    joints
}

/// Palm fan and finger webs
pub fn build_hand_mesh(hand: &LandmarkSet) -> Vec<Triangle> {
    build_mesh(hand, &HAND_MESH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, HAND_LANDMARK_COUNT};

    fn full_hand() -> LandmarkSet {
        (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 / 21.0, 0.5, 0.0, 0.95))
            .collect()
    }

    #[test]
    fn test_full_hand_joint_count() {
        let joints = densify_hand_joints(&full_hand(), &[0.25, 0.5, 0.75]);
        assert_eq!(joints.len(), HAND_CONNECTIONS.len() * 3 + 4);
    }

    #[test]
    fn test_palm_spread_without_edge_factors() {
        let full = full_hand();
        let hand = LandmarkSet::with_indices(
            HAND_LANDMARK_COUNT,
            FINGER_BASES.iter().map(|&i| (i, *full.get(i).unwrap())),
        );
        let joints = densify_hand_joints(&hand, &[]);
        assert_eq!(joints.len(), 4);
    }

    #[test]
    fn test_hand_mesh() {
        assert_eq!(build_hand_mesh(&full_hand()).len(), HAND_MESH.len());
        assert!(build_hand_mesh(&LandmarkSet::new()).is_empty());
    }
}
