//! Webcam source
//!
//! Captures frames on a background thread using nokhwa. Each tick takes the
//! newest frame not yet handed out; ticks that outrun the camera get
//! `Capture::Pending`. Opening the device happens on the
//! capture thread; its outcome is reported back before `open` returns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;
use super::{Capture, Frame, FrameSource, LatestFrame, SourceKind};
use crate::error::SourceError;

/// Live camera capture
pub struct CameraSource {
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    resolution: (u32, u32),
}

impl CameraSource {
    /// Open camera `index`, requesting the closest format to `width`x`height`
    pub fn open(index: u32, width: u32, height: u32) -> Result<Self, SourceError> {
        let latest = LatestFrame::new();
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(u32, u32), SourceError>>(1);

        let latest_clone = latest.clone();
        let running_clone = running.clone();

        let thread_handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(index, width, height, latest_clone, running_clone, ready_tx);
            })?;

        let resolution = match ready_rx.recv() {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread_handle.join();
                return Err(SourceError::DeviceUnavailable(
                    "capture thread exited before opening the camera".to_string(),
                ));
            }
        };

        Ok(Self {
            latest,
            running,
            thread_handle: Some(thread_handle),
            resolution,
        })
    }

    fn open_camera(index: u32, width: u32, height: u32) -> Result<Camera, SourceError> {
        let index = CameraIndex::Index(index);
        let closest = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::HighestResolution(
            Resolution::new(width, height),
        ));

        let mut camera = match Camera::new(index.clone(), closest) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = ?e, "Failed to open camera at requested resolution, retrying");
                let any = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
                Camera::new(index, any).map_err(map_camera_error)?
            }
        };

        camera.open_stream().map_err(map_camera_error)?;
        Ok(camera)
    }

    fn capture_thread(
        index: u32,
        width: u32,
        height: u32,
        latest: LatestFrame,
        running: Arc<AtomicBool>,
        ready: crossbeam_channel::Sender<Result<(u32, u32), SourceError>>,
    ) {
        let mut camera = match Self::open_camera(index, width, height) {
            Ok(camera) => camera,
            Err(e) => {
                tracing::error!(camera = index, error = %e, "Failed to open camera");
                let _ = ready.send(Err(e));
                return;
            }
        };

        let resolution = (camera.resolution().width(), camera.resolution().height());
        tracing::info!(
            camera = index,
            name = %camera.info().human_name(),
            width = resolution.0,
            height = resolution.1,
            "Camera opened"
        );
        let _ = ready.send(Ok(resolution));

        let started = Instant::now();
        let frame_count = AtomicU64::new(0);

        while running.load(Ordering::Acquire) {
            match camera.frame() {
                Ok(buffer) => match buffer.decode_image::<RgbAFormat>() {
                    Ok(decoded) => {
                        let (w, h) = (decoded.width(), decoded.height());
                        let Some(image) = RgbaImage::from_raw(w, h, decoded.into_raw()) else {
                            continue;
                        };
                        let frame_number = frame_count.fetch_add(1, Ordering::Relaxed);
                        latest.publish(Frame::new(image, frame_number, started.elapsed()));
                    }
                    Err(e) => tracing::warn!(error = ?e, "Failed to decode camera frame"),
                },
                Err(e) => {
                    tracing::warn!(error = ?e, "Failed to capture frame");
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            }
        }

        if let Err(e) = camera.stop_stream() {
            tracing::warn!(error = ?e, "Failed to stop camera stream");
        }
        tracing::info!("Camera capture thread stopped");
    }
}

fn map_camera_error(e: nokhwa::NokhwaError) -> SourceError {
    let message = e.to_string();
    if message.to_ascii_lowercase().contains("permission") {
        SourceError::PermissionDenied
    } else {
        SourceError::DeviceUnavailable(message)
    }
}

impl FrameSource for CameraSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Webcam
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn capture(&mut self) -> Result<Capture, SourceError> {
        if !self.running.load(Ordering::Acquire) {
            return Ok(Capture::Ended);
        }
        Ok(match self.latest.take() {
            Some(frame) => Capture::Frame(frame),
            None => Capture::Pending,
        })
    }

    fn release(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        self.latest.clear();
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}
