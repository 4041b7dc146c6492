//! Holistic Overlay - landmark post-processing and overlay rendering
//!
//! Takes per-frame pose, face and hand landmarks from an external detector,
//! smooths them over a short window, derives extra points and mesh
//! triangles, and draws the result onto a raster surface at a throttled
//! cadence.

pub mod canvas;
pub mod config;
pub mod control;
pub mod derived;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod smoothing;
pub mod source;
pub mod telemetry;
pub mod topology;

pub use canvas::{Canvas, RasterCanvas};
pub use config::{ModelTier, OverlaySettings};
pub use detector::{DetectionResult, LandmarkDetector};
pub use error::OverlayError;
pub use landmarks::{Landmark, LandmarkSet};
pub use scheduler::{Session, SessionState};
