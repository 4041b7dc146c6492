//! Landmark post-processing
//!
//! Turns a raw `DetectionResult` into everything the renderer draws:
//! smoothed landmark sets plus the derived points and mesh triangles of
//! each subject.

use crate::config::{DensityProfile, OverlaySettings};
use crate::derived::{
    build_face_mesh, build_hand_mesh, build_pose_mesh, densify_edges, densify_hand_joints,
    enhance_contours, synthesize_virtual_pose, VirtualPose,
};
use crate::detector::{DetectionResult, SegmentationMask};
use crate::geometry::evenly_spaced_factors;
use crate::landmarks::{Category, HandSide, LandmarkSet, Triangle};
use crate::smoothing::{LandmarkSmoother, SmoothingWindows, WindowSizes};
use crate::source::SourceKind;
use crate::topology::POSE_CONNECTIONS;

#[derive(Debug, Clone)]
pub struct PoseOverlay {
    pub landmarks: LandmarkSet,
    /// Points along each skeleton edge
    pub densified: LandmarkSet,
    pub virtual_pose: VirtualPose,
    pub mesh: Vec<Triangle>,
}

#[derive(Debug, Clone)]
pub struct FaceOverlay {
    pub landmarks: LandmarkSet,
    pub contours: LandmarkSet,
    pub mesh: Vec<Triangle>,
}

#[derive(Debug, Clone)]
pub struct HandOverlay {
    pub side: HandSide,
    pub landmarks: LandmarkSet,
    pub joints: LandmarkSet,
    pub mesh: Vec<Triangle>,
}

/// One frame's landmarks, ready to draw
#[derive(Debug, Clone, Default)]
pub struct ProcessedFrame {
    pub poses: Vec<PoseOverlay>,
    pub faces: Vec<FaceOverlay>,
    /// Left hands of every subject first, then right hands
    pub hands: Vec<HandOverlay>,
    pub segmentation: Option<SegmentationMask>,
}

impl ProcessedFrame {
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty() && self.faces.is_empty() && self.hands.is_empty()
    }
}

/// Per-pass processing switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessOptions {
    pub smooth: bool,
    pub density: DensityProfile,
    pub segmentation: bool,
}

impl ProcessOptions {
    /// Live sources are always smoothed; still images only when the model
    /// tier asks for it
    pub fn for_source(kind: SourceKind, settings: &OverlaySettings) -> Self {
        let model = settings.model_tier.config();
        Self {
            smooth: kind != SourceKind::Image || model.smooth_landmarks,
            density: settings.density,
            segmentation: model.enable_segmentation,
        }
    }
}

/// Smooths raw detections and builds derived landmarks
#[derive(Debug, Clone, Default)]
pub struct FrameProcessor {
    windows: SmoothingWindows,
}

impl FrameProcessor {
    pub fn new(sizes: WindowSizes) -> Self {
        Self {
            windows: SmoothingWindows::new(sizes),
        }
    }

    /// Drop smoothing history so the next session starts cold
    pub fn reset(&mut self) {
        self.windows.reset();
    }

    pub fn windows(&self) -> &SmoothingWindows {
        &self.windows
    }

    pub fn process(&mut self, result: DetectionResult, options: &ProcessOptions) -> ProcessedFrame {
        let pose_factors = evenly_spaced_factors(options.density.points_per_edge(Category::Pose));
        let face_factors = evenly_spaced_factors(options.density.points_per_edge(Category::Face));
        let hand_factors = evenly_spaced_factors(options.density.points_per_edge(Category::Hands));

        let mut frame = ProcessedFrame {
            segmentation: result.segmentation.filter(|_| options.segmentation),
            ..Default::default()
        };

        for (slot, raw) in result.poses.into_iter().flatten().enumerate() {
            let landmarks = smoothed(&mut self.windows.subject(slot).pose, raw, options.smooth);
            frame.poses.push(PoseOverlay {
                densified: densify_edges(&landmarks, &POSE_CONNECTIONS, &pose_factors),
                virtual_pose: synthesize_virtual_pose(&landmarks),
                mesh: build_pose_mesh(&landmarks),
                landmarks,
            });
        }

        for (slot, raw) in result.faces.into_iter().flatten().enumerate() {
            let landmarks = smoothed(&mut self.windows.subject(slot).face, raw, options.smooth);
            frame.faces.push(FaceOverlay {
                contours: enhance_contours(&landmarks, &face_factors),
                mesh: build_face_mesh(&landmarks),
                landmarks,
            });
        }

        let hands = [
            (HandSide::Left, result.left_hands),
            (HandSide::Right, result.right_hands),
        ];
        for (side, sets) in hands {
            for (slot, raw) in sets.into_iter().flatten().enumerate() {
                // Both hands of a subject share one window
                let landmarks = smoothed(&mut self.windows.subject(slot).hands, raw, options.smooth);
                frame.hands.push(HandOverlay {
                    side,
                    joints: densify_hand_joints(&landmarks, &hand_factors),
                    mesh: build_hand_mesh(&landmarks),
                    landmarks,
                });
            }
        }

        frame
    }
}

fn smoothed(smoother: &mut LandmarkSmoother, raw: LandmarkSet, enabled: bool) -> LandmarkSet {
    if enabled {
        smoother.smooth(&raw)
    } else {
        raw
    }
}
