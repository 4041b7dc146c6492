//! Virtual pose joints and pose mesh

use crate::geometry::interpolate;
use crate::landmarks::pose::*;
use crate::landmarks::{Landmark, LandmarkSet, Triangle};
use crate::topology::POSE_MESH;

use super::build_mesh;

/// Factors used for the forearm and shin samples, in emission order
const LIMB_SAMPLES: [f32; 3] = [0.5, 0.25, 0.75];
/// Factors used for spine points between the nose and the pelvis
const SPINE_SAMPLES: [f32; 2] = [0.33, 0.66];

/// Anatomical midpoints synthesized from a pose set.
///
/// Every field is computed independently and is `None` when one of its
/// sources is absent. Later derivations read earlier ones by name
/// (the spine uses `mid_hip`), never by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualPose {
    /// Chest center between the shoulders
    pub mid_shoulder: Option<Landmark>,
    /// Pelvis center between the hips
    pub mid_hip: Option<Landmark>,
    /// Midpoint of chest and pelvis centers
    pub torso_center: Option<Landmark>,
    pub left_upper_arm: Option<Landmark>,
    pub left_forearm: Option<[Landmark; 3]>,
    pub right_upper_arm: Option<Landmark>,
    pub right_forearm: Option<[Landmark; 3]>,
    pub left_thigh: Option<Landmark>,
    pub left_shin: Option<[Landmark; 3]>,
    pub right_thigh: Option<Landmark>,
    pub right_shin: Option<[Landmark; 3]>,
    /// Two points from the nose toward the pelvis center
    pub spine: Option<[Landmark; 2]>,
    /// Shoulder-to-hip midpoints, only when the torso center is unavailable
    pub left_flank: Option<Landmark>,
    pub right_flank: Option<Landmark>,
}

impl VirtualPose {
    /// Flatten into drawing order
    pub fn points(&self) -> Vec<Landmark> {
        let mut out = Vec::with_capacity(24);
        out.extend(self.mid_shoulder);
        out.extend(self.mid_hip);
        out.extend(self.torso_center);
        out.extend(self.left_upper_arm);
        out.extend(self.left_forearm.iter().flatten());
        out.extend(self.right_upper_arm);
        out.extend(self.right_forearm.iter().flatten());
        out.extend(self.left_thigh);
        out.extend(self.left_shin.iter().flatten());
        out.extend(self.right_thigh);
        out.extend(self.right_shin.iter().flatten());
        out.extend(self.spine.iter().flatten());
        out.extend(self.left_flank);
        out.extend(self.right_flank);
        out
    }

    pub fn len(&self) -> usize {
        self.points().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn midpoint(set: &LandmarkSet, a: usize, b: usize) -> Option<Landmark> {
    set.pair(a, b).map(|(s, e)| interpolate(s, e, 0.5))
}

fn samples<const N: usize>(start: &Landmark, end: &Landmark, factors: [f32; N]) -> [Landmark; N] {
    factors.map(|f| interpolate(start, end, f))
}

fn limb(set: &LandmarkSet, a: usize, b: usize) -> Option<[Landmark; 3]> {
    set.pair(a, b).map(|(s, e)| samples(s, e, LIMB_SAMPLES))
}

/// Derive virtual joints from a pose set
pub fn synthesize_virtual_pose(pose: &LandmarkSet) -> VirtualPose {
    let mid_shoulder = midpoint(pose, LEFT_SHOULDER, RIGHT_SHOULDER);
    let mid_hip = midpoint(pose, LEFT_HIP, RIGHT_HIP);
    let torso_center = match (&mid_shoulder, &mid_hip) {
        (Some(chest), Some(pelvis)) => Some(interpolate(chest, pelvis, 0.5)),
        _ => None,
    };

    let spine = match (pose.get(NOSE), &mid_hip) {
        (Some(nose), Some(pelvis)) => Some(samples(nose, pelvis, SPINE_SAMPLES)),
        _ => None,
    };

    let (left_flank, right_flank) = if torso_center.is_none() {
        (
            midpoint(pose, LEFT_SHOULDER, LEFT_HIP),
            midpoint(pose, RIGHT_SHOULDER, RIGHT_HIP),
        )
    } else {
        (None, None)
    };

    VirtualPose {
        mid_shoulder,
        mid_hip,
        torso_center,
        left_upper_arm: midpoint(pose, LEFT_SHOULDER, LEFT_ELBOW),
        left_forearm: limb(pose, LEFT_ELBOW, LEFT_WRIST),
        right_upper_arm: midpoint(pose, RIGHT_SHOULDER, RIGHT_ELBOW),
        right_forearm: limb(pose, RIGHT_ELBOW, RIGHT_WRIST),
        left_thigh: midpoint(pose, LEFT_HIP, LEFT_KNEE),
        left_shin: limb(pose, LEFT_KNEE, LEFT_ANKLE),
        right_thigh: midpoint(pose, RIGHT_HIP, RIGHT_KNEE),
        right_shin: limb(pose, RIGHT_KNEE, RIGHT_ANKLE),
        spine,
        left_flank,
        right_flank,
    }
}

/// Triangle fans over head, torso and limbs
pub fn build_pose_mesh(pose: &LandmarkSet) -> Vec<Triangle> {
    build_mesh(pose, &POSE_MESH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::POSE_LANDMARK_COUNT;

    fn full_pose() -> LandmarkSet {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 / 40.0, i as f32 / 50.0, 0.0, 0.9))
            .collect()
    }

    fn pose_with(indices: &[usize]) -> LandmarkSet {
        let full = full_pose();
        LandmarkSet::with_indices(
            POSE_LANDMARK_COUNT,
            indices.iter().map(|&i| (i, *full.get(i).unwrap())),
        )
    }

    #[test]
    fn test_shoulders_and_hips_only() {
        let pose = pose_with(&[LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP]);
        let virtual_pose = synthesize_virtual_pose(&pose);
        let points = virtual_pose.points();

        assert_eq!(points.len(), 3);
        let chest = virtual_pose.mid_shoulder.unwrap();
        let pelvis = virtual_pose.mid_hip.unwrap();
        assert_eq!(points[0], chest);
        assert_eq!(points[1], pelvis);
        assert_eq!(points[2], interpolate(&chest, &pelvis, 0.5));
    }

    #[test]
    fn test_spine_uses_pelvis_without_chest() {
        let pose = pose_with(&[NOSE, LEFT_HIP, RIGHT_HIP]);
        let virtual_pose = synthesize_virtual_pose(&pose);

        let pelvis = virtual_pose.mid_hip.unwrap();
        let spine = virtual_pose.spine.unwrap();
        let nose = pose.get(NOSE).unwrap();
        assert_eq!(spine[0], interpolate(nose, &pelvis, 0.33));
        assert_eq!(spine[1], interpolate(nose, &pelvis, 0.66));
        assert!(virtual_pose.mid_shoulder.is_none());
        assert!(virtual_pose.torso_center.is_none());
    }

    #[test]
    fn test_flanks_fill_partial_torso() {
        let pose = pose_with(&[LEFT_SHOULDER, LEFT_HIP, RIGHT_HIP]);
        let virtual_pose = synthesize_virtual_pose(&pose);

        assert!(virtual_pose.torso_center.is_none());
        assert!(virtual_pose.left_flank.is_some());
        assert!(virtual_pose.right_flank.is_none());
        // mid-hip plus left flank
        assert_eq!(virtual_pose.len(), 2);
    }

    #[test]
    fn test_full_pose_point_count() {
        let virtual_pose = synthesize_virtual_pose(&full_pose());
        // 3 torso + 2 arms * 4 + 2 legs * 4 + 2 spine
        assert_eq!(virtual_pose.len(), 21);
    }

    #[test]
    fn test_empty_pose_yields_nothing() {
        assert!(synthesize_virtual_pose(&LandmarkSet::new()).is_empty());
    }

    #[test]
    fn test_mesh_without_right_leg() {
        let full = full_pose();
        let right_leg = [RIGHT_KNEE, RIGHT_ANKLE, RIGHT_HEEL, RIGHT_FOOT_INDEX];
        let partial = LandmarkSet::from_sparse(
            (0..POSE_LANDMARK_COUNT)
                .map(|i| if right_leg.contains(&i) { None } else { full.get(i).copied() })
                .collect(),
        );

        let full_mesh = build_pose_mesh(&full);
        let partial_mesh = build_pose_mesh(&partial);

        let expected: Vec<Triangle> = full_mesh
            .iter()
            .filter(|t| !t.indices.iter().any(|i| right_leg.contains(i)))
            .copied()
            .collect();

        assert_eq!(full_mesh.len(), POSE_MESH.len());
        assert_eq!(partial_mesh, expected);
        assert_eq!(partial_mesh.len(), POSE_MESH.len() - 2);
    }
}
