//! Per-layer drawing styles

use crate::geometry::Color;
use crate::landmarks::HandSide;

/// Connector style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Color,
    /// Full-confidence width; scaled by the weaker endpoint's confidence
    pub line_width: f32,
}

impl Style {
    pub const fn new(color: Color, line_width: f32) -> Self {
        Self { color, line_width }
    }
}

/// Filled point style for derived and virtual landmarks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub color: Color,
    pub radius: f32,
}

impl PointStyle {
    pub const fn new(color: Color, radius: f32) -> Self {
        Self { color, radius }
    }
}

/// Translucent mesh triangle style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStyle {
    pub fill: Color,
    pub outline: Style,
    /// Global alpha while the mesh layer is drawn
    pub opacity: f32,
}

impl MeshStyle {
    pub const fn new(color: Color, opacity: f32) -> Self {
        Self {
            fill: color,
            outline: Style::new(color, 1.0),
            opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseStyles {
    pub connectors: Style,
    /// Raw markers are colored by confidence tier
    pub marker_radius: f32,
    pub densified: PointStyle,
    pub virtual_points: PointStyle,
    pub mesh: MeshStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceStyles {
    /// Grey outline over the mesh fan edges
    pub outline: Style,
    pub right_eye: Style,
    pub left_eye: Style,
    pub oval: Style,
    pub lips: Style,
    pub marker_radius: f32,
    pub contour_points: PointStyle,
    pub mesh: MeshStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandStyles {
    pub left_connectors: Style,
    pub right_connectors: Style,
    pub marker_radius: f32,
    pub joints: PointStyle,
    pub mesh: MeshStyle,
}

impl HandStyles {
    pub fn connectors(&self, side: HandSide) -> Style {
        match side {
            HandSide::Left => self.left_connectors,
            HandSide::Right => self.right_connectors,
        }
    }
}

/// Every style the renderer uses
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub pose: PoseStyles,
    pub face: FaceStyles,
    pub hands: HandStyles,
    /// Person tint composited from the segmentation mask
    pub segmentation_tint: Color,
}

const MESH_OPACITY: f32 = 0.3;

impl Default for StyleSheet {
    fn default() -> Self {
        let right_face = Color::rgb(0xFF, 0x30, 0x30);
        let left_face = Color::rgb(0x30, 0xFF, 0x30);
        let contour = Color::rgb(0xE0, 0xE0, 0xE0);

        Self {
            pose: PoseStyles {
                connectors: Style::new(Color::GREEN, 4.0),
                marker_radius: 2.0,
                densified: PointStyle::new(Color::YELLOW, 1.0),
                virtual_points: PointStyle::new(Color::rgb(0x00, 0x00, 0xFF), 3.0),
                mesh: MeshStyle::new(Color::GREEN, MESH_OPACITY),
            },
            face: FaceStyles {
                outline: Style::new(Color::rgba(0xC0, 0xC0, 0xC0, 0x70), 1.0),
                right_eye: Style::new(right_face, 2.0),
                left_eye: Style::new(left_face, 2.0),
                oval: Style::new(contour, 2.0),
                lips: Style::new(contour, 2.0),
                marker_radius: 1.0,
                contour_points: PointStyle::new(Color::rgb(0x00, 0xFF, 0xFF), 1.0),
                mesh: MeshStyle::new(Color::rgb(0x00, 0xFF, 0xFF), MESH_OPACITY),
            },
            hands: HandStyles {
                left_connectors: Style::new(Color::rgb(0xCC, 0x00, 0x00), 5.0),
                right_connectors: Style::new(Color::rgb(0x00, 0xCC, 0x00), 5.0),
                marker_radius: 2.0,
                joints: PointStyle::new(Color::rgb(0xFF, 0x00, 0xFF), 1.0),
                mesh: MeshStyle::new(Color::rgb(0xFF, 0x00, 0xFF), MESH_OPACITY),
            },
            segmentation_tint: Color::rgba(0x00, 0xFF, 0x00, 51),
        }
    }
}
