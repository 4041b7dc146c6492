//! Skeleton topologies
//!
//! Fixed connection tables for the pose (33 points), hand (21 points) and
//! face mesh (468 points, 478 with iris refinement) conventions.

use crate::landmarks::Connection;

/// Body skeleton
pub const POSE_CONNECTIONS: [Connection; 35] = [
    // Face
    (0, 1), (1, 2), (2, 3), (3, 7),
    (0, 4), (4, 5), (5, 6), (6, 8),
    (9, 10),
    // Shoulders and arms
    (11, 12), (11, 13), (13, 15), (15, 17), (15, 19), (15, 21), (17, 19),
    (12, 14), (14, 16), (16, 18), (16, 20), (16, 22), (18, 20),
    // Torso
    (11, 23), (12, 24), (23, 24),
    // Legs and feet
    (23, 25), (24, 26), (25, 27), (26, 28),
    (27, 29), (28, 30), (29, 31), (30, 32), (27, 31), (28, 32),
];

/// Hand skeleton
pub const HAND_CONNECTIONS: [Connection; 21] = [
    // Palm
    (0, 1), (0, 5), (9, 13), (13, 17), (5, 9), (0, 17),
    // Thumb
    (1, 2), (2, 3), (3, 4),
    // Index
    (5, 6), (6, 7), (7, 8),
    // Middle
    (9, 10), (10, 11), (11, 12),
    // Ring
    (13, 14), (14, 15), (15, 16),
    // Pinky
    (17, 18), (18, 19), (19, 20),
];

pub const FACE_OVAL: [Connection; 36] = [
    (10, 338), (338, 297), (297, 332), (332, 284), (284, 251), (251, 389),
    (389, 356), (356, 454), (454, 323), (323, 361), (361, 288), (288, 397),
    (397, 365), (365, 379), (379, 378), (378, 400), (400, 377), (377, 152),
    (152, 148), (148, 176), (176, 149), (149, 150), (150, 136), (136, 172),
    (172, 58), (58, 132), (132, 93), (93, 234), (234, 127), (127, 162),
    (162, 21), (21, 54), (54, 103), (103, 67), (67, 109), (109, 10),
];

pub const LIPS: [Connection; 40] = [
    // Outer lower
    (61, 146), (146, 91), (91, 181), (181, 84), (84, 17),
    (17, 314), (314, 405), (405, 321), (321, 375), (375, 291),
    // Outer upper
    (61, 185), (185, 40), (40, 39), (39, 37), (37, 0),
    (0, 267), (267, 269), (269, 270), (270, 409), (409, 291),
    // Inner lower
    (78, 95), (95, 88), (88, 178), (178, 87), (87, 14),
    (14, 317), (317, 402), (402, 318), (318, 324), (324, 308),
    // Inner upper
    (78, 191), (191, 80), (80, 81), (81, 82), (82, 13),
    (13, 312), (312, 311), (311, 310), (310, 415), (415, 308),
];

pub const LEFT_EYE: [Connection; 16] = [
    (263, 249), (249, 390), (390, 373), (373, 374), (374, 380), (380, 381), (381, 382), (382, 362),
    (263, 466), (466, 388), (388, 387), (387, 386), (386, 385), (385, 384), (384, 398), (398, 362),
];

pub const RIGHT_EYE: [Connection; 16] = [
    (33, 7), (7, 163), (163, 144), (144, 145), (145, 153), (153, 154), (154, 155), (155, 133),
    (33, 246), (246, 161), (161, 160), (160, 159), (159, 158), (158, 157), (157, 173), (173, 133),
];

pub const LEFT_EYEBROW: [Connection; 8] = [
    (276, 283), (283, 282), (282, 295), (295, 285),
    (300, 293), (293, 334), (334, 296), (296, 336),
];

pub const RIGHT_EYEBROW: [Connection; 8] = [
    (46, 53), (53, 52), (52, 65), (65, 55),
    (70, 63), (63, 105), (105, 66), (66, 107),
];

/// Only present when the detector refines face landmarks
pub const LEFT_IRIS: [Connection; 4] = [(474, 475), (475, 476), (476, 477), (477, 474)];
pub const RIGHT_IRIS: [Connection; 4] = [(469, 470), (470, 471), (471, 472), (472, 469)];

/// Named face contour group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceContour {
    Oval,
    Lips,
    LeftEye,
    RightEye,
    LeftEyebrow,
    RightEyebrow,
}

impl FaceContour {
    /// Contours densified by the face enhancer, in drawing order
    pub const ALL: [FaceContour; 6] = [
        FaceContour::Oval,
        FaceContour::Lips,
        FaceContour::LeftEye,
        FaceContour::RightEye,
        FaceContour::LeftEyebrow,
        FaceContour::RightEyebrow,
    ];

    pub fn connections(&self) -> &'static [Connection] {
        match self {
            FaceContour::Oval => &FACE_OVAL,
            FaceContour::Lips => &LIPS,
            FaceContour::LeftEye => &LEFT_EYE,
            FaceContour::RightEye => &RIGHT_EYE,
            FaceContour::LeftEyebrow => &LEFT_EYEBROW,
            FaceContour::RightEyebrow => &RIGHT_EYEBROW,
        }
    }
}

/// Pose mesh faces, grouped by body region
pub const POSE_MESH: [[usize; 3]; 10] = [
    // Head
    [0, 7, 8],
    // Torso
    [11, 12, 24],
    [11, 24, 23],
    // Arms
    [11, 13, 15],
    [12, 14, 16],
    // Legs
    [23, 25, 27],
    [24, 26, 28],
    // Feet
    [27, 29, 31],
    [28, 30, 32],
    // Hips to knees
    [23, 24, 25],
];

/// Hand mesh: palm fan around the wrist plus the webs between fingers
pub const HAND_MESH: [[usize; 3]; 8] = [
    [0, 1, 5],
    [0, 5, 9],
    [0, 9, 13],
    [0, 13, 17],
    [1, 2, 5],
    [5, 6, 9],
    [9, 10, 13],
    [13, 14, 17],
];
