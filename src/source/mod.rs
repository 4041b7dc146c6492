//! Media sources
//!
//! A `FrameSource` yields frames for the detector: a live camera, a single
//! uploaded image, or an uploaded video played back frame by frame.

pub mod media;

#[cfg(feature = "camera")]
pub mod camera;

pub use media::{open_media, FrameSequenceSource, GifDecoder, MediaFile, MediaKind, StillImageSource, VideoDecoder, VideoFrame};

#[cfg(feature = "camera")]
pub use camera::CameraSource;

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use parking_lot::Mutex;

use crate::error::SourceError;

/// Kind of input driving a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Webcam,
    Image,
    Video,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Webcam => "webcam",
            SourceKind::Image => "image",
            SourceKind::Video => "video",
        }
    }

    /// Sources that keep producing frames until stopped or ended
    pub fn is_continuous(&self) -> bool {
        !matches!(self, SourceKind::Image)
    }
}

/// A captured frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGBA pixels, shared so detector workers can hold them cheaply
    pub image: Arc<RgbaImage>,
    pub frame_number: u64,
    /// Media time of this frame
    pub timestamp: Duration,
}

impl Frame {
    pub fn new(image: RgbaImage, frame_number: u64, timestamp: Duration) -> Self {
        Self {
            image: Arc::new(image),
            frame_number,
            timestamp,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Outcome of one capture attempt
#[derive(Debug, Clone)]
pub enum Capture {
    Frame(Frame),
    /// Nothing available yet (camera still warming up)
    Pending,
    /// Terminal media event; no more frames will come
    Ended,
}

/// Input that produces frames for detection
pub trait FrameSource {
    fn kind(&self) -> SourceKind;

    /// Native resolution, used to size the drawing surface
    fn resolution(&self) -> (u32, u32);

    /// Grab the current frame
    fn capture(&mut self) -> Result<Capture, SourceError>;

    /// Release the underlying device or rewind playback
    fn release(&mut self);
}

/// Latest-frame mailbox between a capture thread and the session.
///
/// The producer overwrites the slot; the consumer only sees each frame
/// once, so a tick that outruns the device gets nothing instead of a
/// repeat of the previous frame.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Frame>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held frame (producer side)
    pub fn publish(&self, frame: Frame) {
        *self.slot.lock() = Some(frame);
    }

    /// Take the held frame, leaving the slot empty (consumer side)
    pub fn take(&self) -> Option<Frame> {
        self.slot.lock().take()
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}
