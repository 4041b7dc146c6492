//! Software canvas backed by an `image::RgbaImage`

use image::{Rgba, RgbaImage};

use super::{Canvas, Path2D};
use crate::geometry::Color;

/// CPU rasterizer with source-over alpha blending
pub struct RasterCanvas {
    buffer: RgbaImage,
    global_alpha: f32,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbaImage::new(width, height),
            global_alpha: 1.0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.buffer.width() && y < self.buffer.height() {
            Some(self.buffer.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Source-over blend of `color` onto one pixel
    fn blend(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.buffer.width() as i64 || y >= self.buffer.height() as i64 {
            return;
        }
        let alpha = (color[3] as f32 / 255.0) * self.global_alpha;
        if alpha <= 0.0 {
            return;
        }

        let dst = self.buffer.get_pixel_mut(x as u32, y as u32);
        let dst_alpha = dst.0[3] as f32 / 255.0;
        let out_alpha = alpha + dst_alpha * (1.0 - alpha);
        for c in 0..3 {
            let src = color[c] as f32;
            let under = dst.0[c] as f32;
            let value = if out_alpha > 0.0 {
                (src * alpha + under * dst_alpha * (1.0 - alpha)) / out_alpha
            } else {
                0.0
            };
            dst.0[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Integer pixel bounds around a set of points, padded by `pad`
    fn bounds(&self, points: &[(f32, f32)], pad: f32) -> Option<(i64, i64, i64, i64)> {
        if points.is_empty() || self.buffer.width() == 0 || self.buffer.height() == 0 {
            return None;
        }
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }

        let x0 = ((min_x - pad).floor() as i64).max(0);
        let y0 = ((min_y - pad).floor() as i64).max(0);
        let x1 = ((max_x + pad).ceil() as i64).min(self.buffer.width() as i64 - 1);
        let y1 = ((max_y + pad).ceil() as i64).min(self.buffer.height() as i64 - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }

    /// Blend every pixel whose center satisfies `covered`
    fn cover(&mut self, bounds: (i64, i64, i64, i64), color: [u8; 4], covered: impl Fn(f32, f32) -> bool) {
        let (x0, y0, x1, y1) = bounds;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if covered(x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn stroke_segments(&mut self, points: &[(f32, f32)], closed: bool, color: [u8; 4], line_width: f32) {
        let half = (line_width / 2.0).max(0.5);
        let Some(bounds) = self.bounds(points, half) else {
            return;
        };

        let mut segments: Vec<((f32, f32), (f32, f32))> =
            points.windows(2).map(|w| (w[0], w[1])).collect();
        if closed && points.len() > 2 {
            segments.push((points[points.len() - 1], points[0]));
        }
        if segments.is_empty() {
            segments.push((points[0], points[0]));
        }

        // Each pixel is blended once even where segments overlap
        self.cover(bounds, color, |px, py| {
            segments
                .iter()
                .any(|&(a, b)| distance_to_segment((px, py), a, b) <= half)
        });
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.buffer = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, mirrored: bool) {
        let (width, height) = self.buffer.dimensions();
        if image.width() == 0 || image.height() == 0 {
            return;
        }

        // Nearest-neighbour scale to the surface size
        for y in 0..height {
            let sy = (y as u64 * image.height() as u64 / height as u64) as u32;
            for x in 0..width {
                let dx = if mirrored { width - 1 - x } else { x };
                let sx = (dx as u64 * image.width() as u64 / width as u64) as u32;
                let src = image.get_pixel(sx, sy).0;
                self.blend(x as i64, y as i64, src);
            }
        }
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn stroke_path(&mut self, path: &Path2D, color: Color, line_width: f32) {
        if line_width <= 0.0 {
            return;
        }
        let rgba = color.to_array();
        match path {
            Path2D::Polyline(points) => self.stroke_segments(points, false, rgba, line_width),
            Path2D::Polygon(points) => self.stroke_segments(points, true, rgba, line_width),
            Path2D::Circle { center, radius } => {
                let half = (line_width / 2.0).max(0.5);
                let Some(bounds) = self.bounds(&[*center], radius + half) else {
                    return;
                };
                let (cx, cy) = *center;
                let radius = *radius;
                self.cover(bounds, rgba, |px, py| {
                    let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                    (d - radius).abs() <= half
                });
            }
        }
    }

    fn fill_path(&mut self, path: &Path2D, color: Color) {
        let rgba = color.to_array();
        match path {
            Path2D::Polyline(points) | Path2D::Polygon(points) => {
                if points.len() < 3 {
                    return;
                }
                let Some(bounds) = self.bounds(points, 0.0) else {
                    return;
                };
                self.cover(bounds, rgba, |px, py| point_in_polygon((px, py), points));
            }
            Path2D::Circle { center, radius } => {
                if *radius <= 0.0 {
                    return;
                }
                let Some(bounds) = self.bounds(&[*center], *radius) else {
                    return;
                };
                let (cx, cy) = *center;
                // Tiny markers still cover the pixel they sit in
                let reach = radius.max(0.75);
                self.cover(bounds, rgba, |px, py| {
                    (px - cx).powi(2) + (py - cy).powi(2) <= reach * reach
                });
            }
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Even-odd rule
fn point_in_polygon(p: (f32, f32), polygon: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
