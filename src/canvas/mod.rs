//! Drawing surface
//!
//! The renderer only issues primitive operations against a fixed-size raster
//! matching the active source's resolution. Coordinates are in pixels.

mod raster;

pub use raster::RasterCanvas;

use image::RgbaImage;

use crate::geometry::Color;

/// Geometry passed to stroke and fill calls
#[derive(Debug, Clone, PartialEq)]
pub enum Path2D {
    /// Open chain of line segments
    Polyline(Vec<(f32, f32)>),
    /// Closed shape
    Polygon(Vec<(f32, f32)>),
    Circle { center: (f32, f32), radius: f32 },
}

impl Path2D {
    pub fn line(from: (f32, f32), to: (f32, f32)) -> Self {
        Path2D::Polyline(vec![from, to])
    }

    pub fn circle(center: (f32, f32), radius: f32) -> Self {
        Path2D::Circle { center, radius }
    }
}

/// 2D raster drawing surface
pub trait Canvas {
    /// Surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Resize the surface; contents are cleared
    fn resize(&mut self, width: u32, height: u32);

    /// Clear to fully transparent
    fn clear(&mut self);

    /// Draw `image` scaled to cover the whole surface
    fn draw_image(&mut self, image: &RgbaImage, mirrored: bool);

    /// Opacity multiplier applied to every following draw call
    fn set_global_alpha(&mut self, alpha: f32);

    fn stroke_path(&mut self, path: &Path2D, color: Color, line_width: f32);

    fn fill_path(&mut self, path: &Path2D, color: Color);
}
