//! Uploaded media: still images and decoded video frame sequences

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::GifDecoder as ImageGifDecoder;
use image::{AnimationDecoder, RgbaImage};
use tokio::time::Instant;

use super::{Capture, Frame, FrameSource, SourceKind};
use crate::error::SourceError;

/// An uploaded file with its declared media type
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Broad media class, from the top-level MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Ok(Self::new(name, mime_for_extension(&extension), bytes))
    }

    pub fn kind(&self) -> MediaKind {
        match self.mime_type.split('/').next() {
            Some("image") => MediaKind::Image,
            Some("video") => MediaKind::Video,
            _ => MediaKind::Unsupported,
        }
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// One decoded video frame and how long it stays on screen
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: RgbaImage,
    pub duration: Duration,
}

/// Decodes a video container into frames
pub trait VideoDecoder {
    fn supports(&self, mime_type: &str) -> bool;
    fn decode(&self, file: &MediaFile) -> Result<Vec<VideoFrame>, SourceError>;
}

/// Animated GIF decoding via the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GifDecoder;

impl VideoDecoder for GifDecoder {
    fn supports(&self, mime_type: &str) -> bool {
        mime_type == "image/gif" || mime_type == "video/gif"
    }

    fn decode(&self, file: &MediaFile) -> Result<Vec<VideoFrame>, SourceError> {
        let decoder = ImageGifDecoder::new(Cursor::new(file.bytes.as_slice()))?;
        let frames = decoder.into_frames().collect_frames()?;
        Ok(frames
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let ms = if denom == 0 { 0 } else { numer / denom };
                VideoFrame {
                    duration: Duration::from_millis(ms as u64),
                    image: frame.into_buffer(),
                }
            })
            .collect())
    }
}

/// Open an uploaded file as a frame source.
///
/// Images become a single-shot source. Videos, and GIFs with more than one
/// frame, are decoded with the first decoder that supports their type.
pub fn open_media(
    file: &MediaFile,
    decoders: &[Box<dyn VideoDecoder>],
) -> Result<Box<dyn FrameSource>, SourceError> {
    let decoder = decoders.iter().find(|d| d.supports(&file.mime_type));

    match file.kind() {
        MediaKind::Image => {
            if let Some(decoder) = decoder {
                let frames = decoder.decode(file)?;
                if frames.len() > 1 {
                    return Ok(Box::new(FrameSequenceSource::new(frames)));
                }
            }
            let image = image::load_from_memory(&file.bytes)?.to_rgba8();
            Ok(Box::new(StillImageSource::new(image)))
        }
        MediaKind::Video => match decoder {
            Some(decoder) => {
                let frames = decoder.decode(file)?;
                if frames.is_empty() {
                    return Err(SourceError::UnsupportedMediaType(format!(
                        "{} contains no frames",
                        file.name
                    )));
                }
                Ok(Box::new(FrameSequenceSource::new(frames)))
            }
            None => Err(SourceError::UnsupportedMediaType(file.mime_type.clone())),
        },
        MediaKind::Unsupported => Err(SourceError::UnsupportedMediaType(file.mime_type.clone())),
    }
}

/// Single uploaded image: one frame, then ended
pub struct StillImageSource {
    image: RgbaImage,
    delivered: bool,
}

impl StillImageSource {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            delivered: false,
        }
    }
}

impl FrameSource for StillImageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn capture(&mut self) -> Result<Capture, SourceError> {
        if self.delivered {
            return Ok(Capture::Ended);
        }
        self.delivered = true;
        Ok(Capture::Frame(Frame::new(self.image.clone(), 0, Duration::ZERO)))
    }

    fn release(&mut self) {
        self.delivered = false;
    }
}

/// Display time for frames that carry no delay of their own
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(100);

/// Decoded video played back against a media clock.
///
/// The clock starts on the first capture. Each capture returns the frame on
/// screen at the current media time, so playback keeps the clip's own speed
/// whatever the capture cadence.
pub struct FrameSequenceSource {
    frames: Vec<VideoFrame>,
    /// Media time at which each frame stops being shown
    frame_ends: Vec<Duration>,
    started: Option<Instant>,
}

impl FrameSequenceSource {
    pub fn new(mut frames: Vec<VideoFrame>) -> Self {
        let mut total = Duration::ZERO;
        let frame_ends = frames
            .iter_mut()
            .map(|frame| {
                if frame.duration.is_zero() {
                    frame.duration = DEFAULT_FRAME_DURATION;
                }
                total += frame.duration;
                total
            })
            .collect();

        Self {
            frames,
            frame_ends,
            started: None,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length of the whole clip
    pub fn duration(&self) -> Duration {
        self.frame_ends.last().copied().unwrap_or(Duration::ZERO)
    }

    /// Index of the frame shown at `position`, `None` past the end
    fn frame_at(&self, position: Duration) -> Option<usize> {
        let idx = self.frame_ends.partition_point(|end| *end <= position);
        (idx < self.frames.len()).then_some(idx)
    }
}

impl FrameSource for FrameSequenceSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Video
    }

    fn resolution(&self) -> (u32, u32) {
        self.frames
            .first()
            .map(|f| f.image.dimensions())
            .unwrap_or((0, 0))
    }

    fn capture(&mut self) -> Result<Capture, SourceError> {
        let now = Instant::now();
        let started = *self.started.get_or_insert(now);
        let position = now.saturating_duration_since(started);

        let Some(idx) = self.frame_at(position) else {
            return Ok(Capture::Ended);
        };
        let current = &self.frames[idx];
        Ok(Capture::Frame(Frame::new(current.image.clone(), idx as u64, position)))
    }

    fn release(&mut self) {
        // Pause and rewind
        self.started = None;
    }
}
