//! Session Integration Tests
//!
//! Drive a full session through capture, detection, processing and drawing:
//! - Throttled completions and the FPS counter
//! - Stop and fail-stop cleanup
//! - Uploaded images, animated GIFs and unsupported files
//! - Model switches restarting the active input

use std::collections::VecDeque;
use std::io::Cursor;
use std::time::{Duration, Instant};

use holistic_overlay::canvas::{Canvas, RasterCanvas};
use holistic_overlay::config::{ModelTier, OverlaySettings};
use holistic_overlay::detector::{
    BlockingDetector, DetectionResult, DetectorOptions, LandmarkDetector, ReplayDetector,
    RunningMode, WorkerDetector,
};
use holistic_overlay::error::{DetectorError, OverlayError, SourceError};
use holistic_overlay::landmarks::{Landmark, LandmarkSet};
use holistic_overlay::scheduler::{Session, SessionState, StepOutcome, WebcamOpener};
use holistic_overlay::source::{Capture, Frame, FrameSource, MediaFile, SourceKind};
use image::{Rgba, RgbaImage};

// ============================================================================
// Helpers
// ============================================================================

const RED: [u8; 4] = [200, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 200, 255];

fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// 33 pose landmarks spread over the middle of the frame
fn pose(visibility: f32) -> LandmarkSet {
    LandmarkSet::from_dense(
        (0..33)
            .map(|i| {
                let x = 0.3 + 0.4 * (i % 6) as f32 / 5.0;
                let y = 0.2 + 0.6 * (i / 6) as f32 / 5.0;
                Landmark::new(x, y, 0.0, visibility)
            })
            .collect(),
    )
}

fn pose_result(visibility: f32) -> DetectionResult {
    DetectionResult {
        poses: Some(vec![pose(visibility)]),
        ..Default::default()
    }
}

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn gif_bytes(frames: &[[u8; 4]]) -> Vec<u8> {
    gif_bytes_with_delay(frames, 50)
}

fn gif_bytes_with_delay(frames: &[[u8; 4]], delay_ms: u32) -> Vec<u8> {
    use image::codecs::gif::GifEncoder;
    use image::Delay;

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        let frames = frames.iter().map(|color| {
            image::Frame::from_parts(
                solid(16, 12, *color),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
    }
    bytes
}

/// Detector that plays back a script, then repeats `fallback`
#[derive(Default)]
struct ScriptedDetector {
    script: VecDeque<Result<DetectionResult, DetectorError>>,
    fallback: DetectionResult,
    configured: Vec<DetectorOptions>,
    timestamps: Vec<Option<Duration>>,
    closed: usize,
}

impl ScriptedDetector {
    fn repeating(result: DetectionResult) -> Self {
        Self {
            fallback: result,
            ..Default::default()
        }
    }
}

impl LandmarkDetector for ScriptedDetector {
    async fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        self.configured.push(options.clone());
        Ok(())
    }

    async fn detect(
        &mut self,
        _frame: &Frame,
        timestamp: Option<Duration>,
    ) -> Result<DetectionResult, DetectorError> {
        self.timestamps.push(timestamp);
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// Live camera stand-in producing a solid frame every capture
struct SolidWebcam {
    image: RgbaImage,
    captured: u64,
}

impl FrameSource for SolidWebcam {
    fn kind(&self) -> SourceKind {
        SourceKind::Webcam
    }

    fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn capture(&mut self) -> Result<Capture, SourceError> {
        let frame = Frame::new(
            self.image.clone(),
            self.captured,
            Duration::from_millis(33 * self.captured),
        );
        self.captured += 1;
        Ok(Capture::Frame(frame))
    }

    fn release(&mut self) {}
}

fn webcam(color: [u8; 4]) -> WebcamOpener {
    webcam_sized(color, 16, 12)
}

fn webcam_sized(color: [u8; 4], width: u32, height: u32) -> WebcamOpener {
    Box::new(move |_settings: &OverlaySettings| {
        Ok::<_, SourceError>(Box::new(SolidWebcam {
            image: solid(width, height, color),
            captured: 0,
        }) as Box<dyn FrameSource>)
    })
}

fn session<D: LandmarkDetector>(detector: D) -> Session<D, RasterCanvas> {
    Session::new(detector, RasterCanvas::new(1, 1), OverlaySettings::default())
}

fn every_pixel_is(canvas: &RasterCanvas, color: [u8; 4]) -> bool {
    canvas.image().pixels().all(|p| p.0 == color)
}

// ============================================================================
// Throttle and FPS
// ============================================================================

#[tokio::test]
async fn test_completion_inside_throttle_window_is_dropped() {
    let mut session = session(ScriptedDetector::default()).with_webcam(webcam(RED));
    session.start().await.unwrap();

    let red = Frame::new(solid(16, 12, RED), 0, Duration::ZERO);
    let blue = Frame::new(solid(16, 12, BLUE), 1, Duration::from_millis(10));
    let t0 = Instant::now();

    let first = session.on_results(DetectionResult::default(), &red, t0).unwrap();
    assert_eq!(first, StepOutcome::Rendered { points: 0 });

    let second = session
        .on_results(DetectionResult::default(), &blue, t0 + Duration::from_millis(10))
        .unwrap();
    assert_eq!(second, StepOutcome::Dropped);
    assert!(every_pixel_is(session.canvas(), RED));
    assert_eq!(session.frame_stats().sample_count, 1);

    // Exactly one interval later is still inside the window
    let at_interval = session
        .on_results(DetectionResult::default(), &blue, t0 + Duration::from_millis(33))
        .unwrap();
    assert_eq!(at_interval, StepOutcome::Dropped);

    let later = session
        .on_results(DetectionResult::default(), &blue, t0 + Duration::from_millis(34))
        .unwrap();
    assert_eq!(later, StepOutcome::Rendered { points: 0 });
    assert!(every_pixel_is(session.canvas(), BLUE));
    assert_eq!(session.frame_stats().sample_count, 2);
}

#[tokio::test]
async fn test_fps_counts_only_admitted_passes() {
    let mut session = session(ScriptedDetector::default()).with_webcam(webcam(RED));
    session.start().await.unwrap();

    let frame = Frame::new(solid(16, 12, RED), 0, Duration::ZERO);
    let t0 = Instant::now();
    let offsets = [0u64, 10, 500, 510, 1000];
    let outcomes: Vec<_> = offsets
        .iter()
        .map(|ms| {
            session
                .on_results(DetectionResult::default(), &frame, t0 + Duration::from_millis(*ms))
                .unwrap()
        })
        .collect();

    let dropped = outcomes.iter().filter(|o| **o == StepOutcome::Dropped).count();
    assert_eq!(dropped, 2);
    assert_eq!(session.metrics().snapshot().fps, 3);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_stop_clears_surface_and_metrics() {
    let detector = ScriptedDetector::repeating(pose_result(0.9));
    let mut session = session(detector).with_webcam(webcam(RED));
    session.start().await.unwrap();

    let outcome = session.step().await.unwrap();
    let StepOutcome::Rendered { points } = outcome else {
        panic!("expected a render pass, got {:?}", outcome);
    };
    assert!(points > 0);
    assert_eq!(session.metrics().snapshot().total_points_drawn, points);
    assert_eq!(session.canvas().size(), (16, 12));

    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.status(), "Processing stopped.");
    assert!(every_pixel_is(session.canvas(), [0, 0, 0, 0]));
    assert_eq!(session.metrics().snapshot().total_points_drawn, 0);
    assert_eq!(session.detector().closed, 1);
    assert_eq!(session.step().await.unwrap(), StepOutcome::Inactive);

    session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(session.detector().configured.len(), 2);
}

/// Pose with only the nose present
fn nose_at(x: f32) -> DetectionResult {
    DetectionResult {
        poses: Some(vec![LandmarkSet::with_indices(
            33,
            [(0, Landmark::new(x, 0.5, 0.0, 0.9))],
        )]),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_restart_starts_with_cold_smoothing() {
    const MARKER: [u8; 4] = [0, 255, 0, 255];
    let mut detector = ScriptedDetector::default();
    for x in [0.10, 0.15, 0.20, 0.25, 0.30] {
        detector.script.push_back(Ok(nose_at(x)));
    }
    detector.script.push_back(Ok(nose_at(0.9)));

    let mut session = session(detector).with_webcam(webcam_sized(BLUE, 100, 20));
    session.start().await.unwrap();
    for _ in 0..5 {
        let outcome = session.step().await.unwrap();
        assert_eq!(outcome, StepOutcome::Rendered { points: 1 });
        tokio::time::advance(Duration::from_millis(40)).await;
    }

    session.stop();
    session.start().await.unwrap();
    assert_eq!(session.step().await.unwrap(), StepOutcome::Rendered { points: 1 });

    // Webcam frames are mirrored: x = 0.9 lands at column 10. A warm window
    // would have drawn the mean (0.36) at column 64 instead.
    assert_eq!(session.canvas().pixel(10, 10), Some(MARKER));
    assert_eq!(session.canvas().pixel(64, 10), Some(BLUE));
}

#[tokio::test]
async fn test_detector_failure_stops_session() {
    let mut detector = ScriptedDetector::default();
    detector
        .script
        .push_back(Err(DetectorError::Inference("model crashed".to_string())));
    let mut session = session(detector).with_webcam(webcam(RED));
    session.start().await.unwrap();

    let result = session.step().await;
    assert!(matches!(
        result,
        Err(OverlayError::Detector(DetectorError::Inference(_)))
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.status(), "Error occurred. Restart tracking.");
    assert!(every_pixel_is(session.canvas(), [0, 0, 0, 0]));

    // A failed session can be restarted
    session.start().await.unwrap();
    assert!(matches!(session.step().await.unwrap(), StepOutcome::Rendered { .. }));
}

#[tokio::test]
async fn test_detector_configured_from_settings() {
    let mut session = session(ScriptedDetector::default()).with_webcam(webcam(RED));
    session.set_multi_subject(true);
    session.start().await.unwrap();

    let options = &session.detector().configured[0];
    assert_eq!(options.tier, ModelTier::Full);
    assert_eq!(options.max_subjects, 2);
    assert_eq!(options.running_mode, RunningMode::Video);
}

// ============================================================================
// Confidence threshold
// ============================================================================

#[tokio::test]
async fn test_threshold_above_every_landmark_draws_nothing() {
    let detector = ReplayDetector::new(vec![pose_result(0.5)]);
    let mut session = session(detector).with_webcam(webcam(RED));
    session.set_confidence_threshold(0.9).unwrap();
    session.start().await.unwrap();

    assert_eq!(session.step().await.unwrap(), StepOutcome::Rendered { points: 0 });
    assert_eq!(session.metrics().snapshot().total_points_drawn, 0);
    assert!(every_pixel_is(session.canvas(), RED));
}

#[tokio::test]
async fn test_threshold_is_strict() {
    let detector = ScriptedDetector::repeating(pose_result(0.5));
    let mut session = session(detector).with_webcam(webcam(RED));
    session.start().await.unwrap();
    assert_eq!(session.step().await.unwrap(), StepOutcome::Rendered { points: 0 });

    session.stop();
    session.set_confidence_threshold(0.4).unwrap();
    session.start().await.unwrap();
    let outcome = session.step().await.unwrap();
    assert!(matches!(outcome, StepOutcome::Rendered { points } if points >= 33));
}

// ============================================================================
// Uploaded files
// ============================================================================

#[tokio::test]
async fn test_image_is_processed_once() {
    let base = solid(40, 30, [10, 20, 30, 255]);
    let file = MediaFile::new("still.png", "image/png", png_bytes(&base));
    let mut session = session(ScriptedDetector::repeating(pose_result(0.9)));

    session.load_file(Some(file)).await.unwrap();
    assert_eq!(session.status(), "Processing image...");
    assert_eq!(session.source_kind(), Some(SourceKind::Image));
    assert_eq!(session.detector().configured[0].running_mode, RunningMode::Image);

    assert_eq!(session.step().await.unwrap(), StepOutcome::Completed);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.status(), "Image processed.");
    assert_eq!(session.detector().timestamps, vec![None]);
    assert!(session.metrics().snapshot().total_points_drawn > 0);

    // The rendered image stays on the surface
    assert_eq!(session.canvas().size(), (40, 30));
    assert_eq!(session.canvas().pixel(0, 0), Some([10, 20, 30, 255]));
    assert_eq!(session.step().await.unwrap(), StepOutcome::Inactive);
}

#[tokio::test]
async fn test_model_switch_reprocesses_image() {
    let base = solid(40, 30, [10, 20, 30, 255]);
    let file = MediaFile::new("still.png", "image/png", png_bytes(&base));
    let mut session = session(ScriptedDetector::repeating(pose_result(0.9)));
    session.load_file(Some(file)).await.unwrap();
    assert_eq!(session.step().await.unwrap(), StepOutcome::Completed);

    session.set_model(ModelTier::Lite).await.unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(session.detector().configured.len(), 2);
    assert_eq!(session.detector().configured[1].tier, ModelTier::Lite);
    assert_eq!(session.step().await.unwrap(), StepOutcome::Completed);
}

#[tokio::test]
async fn test_unsupported_file_is_rejected() {
    let file = MediaFile::new("notes.txt", "text/plain", b"hello".to_vec());
    let mut session = session(ScriptedDetector::default());

    let result = session.load_file(Some(file)).await;
    assert!(matches!(
        result,
        Err(OverlayError::Source(SourceError::UnsupportedMediaType(_)))
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.status(), "Unsupported file type. Use JPEG, PNG, MP4, or WebM.");
    assert!(session.detector().configured.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_animation_plays_to_the_end() {
    let file = MediaFile::new("clip.gif", "image/gif", gif_bytes(&[RED, BLUE, RED]));
    let mut session = session(ScriptedDetector::default());

    session.load_file(Some(file)).await.unwrap();
    assert_eq!(session.status(), "Processing video...");
    assert_eq!(session.source_kind(), Some(SourceKind::Video));

    let mut rendered = 0;
    loop {
        match session.step().await.unwrap() {
            StepOutcome::Rendered { .. } => rendered += 1,
            StepOutcome::Ended => break,
            other => panic!("unexpected outcome {:?}", other),
        }
        tokio::time::advance(Duration::from_millis(50)).await;
    }

    assert_eq!(rendered, 3);
    assert_eq!(session.state(), SessionState::Idle);
    let timestamps = &session.detector().timestamps;
    assert_eq!(timestamps.len(), 3);
    assert!(timestamps.iter().all(Option::is_some));
}

#[tokio::test(start_paused = true)]
async fn test_animation_keeps_its_own_speed_at_display_refresh() {
    use tokio::time::Instant as ClockInstant;

    let file = MediaFile::new("clip.gif", "image/gif", gif_bytes_with_delay(&[RED, BLUE, RED], 100));
    let mut session = session(ScriptedDetector::default());
    session.load_file(Some(file)).await.unwrap();

    let started = ClockInstant::now();
    let tick = Duration::from_micros(16_667);
    let mut rendered_colors = Vec::new();
    let ended_at = loop {
        match session.step().await.unwrap() {
            StepOutcome::Rendered { .. } => {
                let [r, _, b, _] = session.canvas().pixel(0, 0).unwrap();
                rendered_colors.push(if b > r { "blue" } else { "red" });
            }
            StepOutcome::Dropped => {}
            StepOutcome::Ended => break started.elapsed(),
            other => panic!("unexpected outcome {:?}", other),
        }
        tokio::time::advance(tick).await;
    };

    assert!(ended_at >= Duration::from_millis(300), "clip ended after {:?}", ended_at);
    assert!(ended_at < Duration::from_millis(320), "clip ended after {:?}", ended_at);
    assert!(rendered_colors.contains(&"blue"));
    // The throttle admits roughly every other tick: about 3 passes per frame
    let blue = rendered_colors.iter().filter(|c| **c == "blue").count();
    assert!((2..=4).contains(&blue), "blue rendered {} times", blue);
    assert_eq!(rendered_colors.first(), Some(&"red"));
    assert_eq!(rendered_colors.last(), Some(&"red"));
}

// ============================================================================
// Worker-backed detector
// ============================================================================

struct FixedBackend;

impl BlockingDetector for FixedBackend {
    fn configure(&mut self, _options: &DetectorOptions) -> Result<(), DetectorError> {
        Ok(())
    }

    fn detect(
        &mut self,
        _frame: &Frame,
        _timestamp: Option<Duration>,
    ) -> Result<DetectionResult, DetectorError> {
        Ok(pose_result(0.9))
    }
}

#[tokio::test]
async fn test_session_with_worker_detector() {
    let detector = WorkerDetector::spawn(FixedBackend).unwrap();
    let mut session = session(detector).with_webcam(webcam(RED));
    session.start().await.unwrap();
    assert!(session.detector().is_ready());

    let outcome = session.step().await.unwrap();
    assert!(matches!(outcome, StepOutcome::Rendered { points } if points > 0));

    session.stop();
    assert!(!session.detector().is_ready());
}
