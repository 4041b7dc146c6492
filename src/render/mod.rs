//! Overlay renderer
//!
//! Draws one processed frame onto a `Canvas` in fixed layer order:
//! 1. the base frame (optionally mirrored)
//! 2. the segmentation tint
//! 3. per category: connectors, confidence-colored markers, derived points,
//!    then mesh triangles when the mesh layer is on
//!
//! Every landmark, derived or raw, must clear the live confidence threshold
//! to be drawn. The returned point count covers exactly the points drawn.

mod style;

pub use style::{FaceStyles, HandStyles, MeshStyle, PointStyle, PoseStyles, Style, StyleSheet};

use image::{Rgba, RgbaImage};

use crate::canvas::{Canvas, Path2D};
use crate::config::OverlaySettings;
use crate::detector::SegmentationMask;
use crate::error::RenderError;
use crate::geometry::{confidence_color, passes_confidence, project_depth, Color};
use crate::landmarks::{Connection, Landmark, LandmarkSet, Triangle};
use crate::pipeline::{FaceOverlay, HandOverlay, PoseOverlay, ProcessedFrame};
use crate::topology::{FaceContour, HAND_CONNECTIONS, LEFT_IRIS, POSE_CONNECTIONS, RIGHT_IRIS};

/// Options for one render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub settings: &'a OverlaySettings,
    /// Flip the frame and landmarks horizontally
    pub mirrored: bool,
}

/// Maps normalized landmarks onto the surface
#[derive(Debug, Clone, Copy)]
struct Viewport {
    width: f32,
    height: f32,
    mirrored: bool,
    depth: bool,
}

impl Viewport {
    fn project(&self, lm: &Landmark) -> (f32, f32) {
        let lm = if self.depth { project_depth(lm) } else { *lm };
        let x = if self.mirrored { 1.0 - lm.x } else { lm.x };
        (x * self.width, lm.y * self.height)
    }

    fn radius(&self, lm: &Landmark, radius: f32) -> f32 {
        if self.depth {
            radius * (1.0 - lm.z)
        } else {
            radius
        }
    }
}

/// Draws processed frames with a fixed style sheet
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    styles: StyleSheet,
}

impl OverlayRenderer {
    pub fn new(styles: StyleSheet) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Render one pass and return the number of points drawn
    pub fn render<C: Canvas>(
        &self,
        canvas: &mut C,
        base: &RgbaImage,
        frame: &ProcessedFrame,
        options: RenderOptions<'_>,
    ) -> Result<usize, RenderError> {
        let (width, height) = canvas.size();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptySurface);
        }

        let settings = options.settings;
        let view = Viewport {
            width: width as f32,
            height: height as f32,
            mirrored: options.mirrored,
            depth: settings.depth_projection,
        };
        let threshold = settings.confidence_threshold;

        canvas.set_global_alpha(1.0);
        canvas.clear();
        canvas.draw_image(base, options.mirrored);

        if let Some(mask) = &frame.segmentation {
            canvas.draw_image(&tint_image(mask, self.styles.segmentation_tint), options.mirrored);
        }

        let mut layer = Layer {
            canvas,
            view,
            threshold,
            points: 0,
        };

        if settings.visibility.pose {
            for pose in &frame.poses {
                self.draw_pose(&mut layer, pose, settings.visibility.mesh);
            }
        }
        if settings.visibility.face {
            let irises = settings.model_tier.config().refine_face_landmarks;
            for face in &frame.faces {
                self.draw_face(&mut layer, face, irises, settings.visibility.mesh);
            }
        }
        if settings.visibility.hands {
            for hand in &frame.hands {
                self.draw_hand(&mut layer, hand, settings.visibility.mesh);
            }
        }

        Ok(layer.points)
    }

    fn draw_pose<C: Canvas>(&self, layer: &mut Layer<'_, C>, pose: &PoseOverlay, mesh: bool) {
        let styles = &self.styles.pose;
        layer.connectors(&pose.landmarks, &POSE_CONNECTIONS, styles.connectors);
        layer.markers(&pose.landmarks, styles.marker_radius);
        layer.points(pose.densified.iter(), styles.densified);
        layer.points(pose.virtual_pose.points().iter(), styles.virtual_points);
        if mesh {
            layer.mesh(&pose.mesh, styles.mesh);
        }
    }

    fn draw_face<C: Canvas>(&self, layer: &mut Layer<'_, C>, face: &FaceOverlay, irises: bool, mesh: bool) {
        let styles = &self.styles.face;

        for triangle in &face.mesh {
            layer.triangle_outline(triangle, styles.outline);
        }
        for contour in FaceContour::ALL {
            let style = match contour {
                FaceContour::RightEye | FaceContour::RightEyebrow => styles.right_eye,
                FaceContour::LeftEye | FaceContour::LeftEyebrow => styles.left_eye,
                FaceContour::Oval => styles.oval,
                FaceContour::Lips => styles.lips,
            };
            layer.connectors(&face.landmarks, contour.connections(), style);
        }
        if irises {
            layer.connectors(&face.landmarks, &RIGHT_IRIS, styles.right_eye);
            layer.connectors(&face.landmarks, &LEFT_IRIS, styles.left_eye);
        }

        layer.markers(&face.landmarks, styles.marker_radius);
        layer.points(face.contours.iter(), styles.contour_points);
        if mesh {
            layer.mesh(&face.mesh, styles.mesh);
        }
    }

    fn draw_hand<C: Canvas>(&self, layer: &mut Layer<'_, C>, hand: &HandOverlay, mesh: bool) {
        let styles = &self.styles.hands;
        layer.connectors(&hand.landmarks, &HAND_CONNECTIONS, styles.connectors(hand.side));
        layer.markers(&hand.landmarks, styles.marker_radius);
        layer.points(hand.joints.iter(), styles.joints);
        if mesh {
            layer.mesh(&hand.mesh, styles.mesh);
        }
    }
}

/// Drawing state for one pass
struct Layer<'a, C: Canvas> {
    canvas: &'a mut C,
    view: Viewport,
    threshold: f32,
    points: usize,
}

impl<C: Canvas> Layer<'_, C> {
    fn connectors(&mut self, set: &LandmarkSet, connections: &[Connection], style: Style) {
        for &(a, b) in connections {
            let Some((start, end)) = set.pair(a, b) else {
                continue;
            };
            if !passes_confidence(start, self.threshold) || !passes_confidence(end, self.threshold) {
                continue;
            }
            let width = style.line_width * start.visibility.min(end.visibility);
            let path = Path2D::line(self.view.project(start), self.view.project(end));
            self.canvas.stroke_path(&path, style.color, width);
        }
    }

    /// Raw landmarks, filled with their confidence tier color
    fn markers(&mut self, set: &LandmarkSet, radius: f32) {
        let threshold = self.threshold;
        for lm in set.iter().filter(|lm| passes_confidence(lm, threshold)) {
            self.dot(lm, confidence_color(lm.visibility), radius);
        }
    }

    /// Derived points in their layer color
    fn points<'l>(&mut self, points: impl Iterator<Item = &'l Landmark>, style: PointStyle) {
        let threshold = self.threshold;
        for lm in points.filter(|lm| passes_confidence(lm, threshold)) {
            self.dot(lm, style.color, style.radius);
        }
    }

    fn dot(&mut self, lm: &Landmark, color: Color, radius: f32) {
        // Depth scaling collapses markers at z >= 1; those are not drawn
        let radius = self.view.radius(lm, radius);
        if radius <= 0.0 {
            return;
        }
        let path = Path2D::circle(self.view.project(lm), radius);
        self.canvas.fill_path(&path, color);
        self.points += 1;
    }

    fn triangle_path(&self, triangle: &Triangle) -> Path2D {
        Path2D::Polygon(triangle.vertices.iter().map(|v| self.view.project(v)).collect())
    }

    fn triangle_outline(&mut self, triangle: &Triangle, style: Style) {
        if triangle.min_visibility() > self.threshold {
            let path = self.triangle_path(triangle);
            let width = style.line_width * triangle.min_visibility();
            self.canvas.stroke_path(&path, style.color, width);
        }
    }

    fn mesh(&mut self, triangles: &[Triangle], style: MeshStyle) {
        let threshold = self.threshold;
        self.canvas.set_global_alpha(style.opacity);
        for triangle in triangles.iter().filter(|t| t.min_visibility() > threshold) {
            let path = self.triangle_path(triangle);
            self.canvas.fill_path(&path, style.fill);
            self.canvas.stroke_path(&path, style.outline.color, style.outline.line_width);
        }
        self.canvas.set_global_alpha(1.0);
    }
}

/// Person-area tint: the tint color with alpha scaled by mask coverage
fn tint_image(mask: &SegmentationMask, tint: Color) -> RgbaImage {
    RgbaImage::from_fn(mask.width, mask.height, |x, y| {
        let coverage = mask
            .mask
            .get((y * mask.width + x) as usize)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let alpha = (tint.a as f32 * coverage).round() as u8;
        Rgba([tint.r, tint.g, tint.b, alpha])
    })
}
