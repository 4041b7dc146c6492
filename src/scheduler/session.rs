//! Session: one source, one detector, one drawing surface
//!
//! Everything runs on a single task. The only suspension point per frame is
//! the detector call, so a frame's render (or drop) always completes before
//! the next capture begins.

use std::time::Instant;

use tokio::time::MissedTickBehavior;

use super::{SessionState, Throttle};
use crate::canvas::Canvas;
use crate::config::{ModelTier, OverlaySettings};
use crate::detector::{DetectionResult, DetectorOptions, LandmarkDetector, RunningMode};
use crate::error::{OverlayError, SourceError};
use crate::landmarks::Category;
use crate::pipeline::{FrameProcessor, ProcessOptions};
use crate::render::{OverlayRenderer, RenderOptions};
use crate::source::{open_media, Capture, Frame, FrameSource, GifDecoder, MediaFile, SourceKind, VideoDecoder};
use crate::telemetry::{FpsCounter, FrameProfiler, FrameStats, MetricsHandle};

const STATUS_READY: &str = "Ready. Select model and start tracking or upload a file.";
const STATUS_TRACKING: &str = "Tracking started...";
const STATUS_STOPPED: &str = "Processing stopped.";
const STATUS_IMAGE_DONE: &str = "Image processed.";
const STATUS_ERROR: &str = "Error occurred. Restart tracking.";

/// Opens the live camera with the current settings
pub type WebcamOpener = Box<dyn FnMut(&OverlaySettings) -> Result<Box<dyn FrameSource>, SourceError>>;

/// What one scheduling step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Session is not running
    Inactive,
    /// Source has no frame yet
    Waiting,
    /// Result arrived inside the throttle window
    Dropped,
    Rendered { points: usize },
    /// Still image rendered; the session is idle again
    Completed,
    /// Media ended; the session stopped
    Ended,
}

/// Input a session was last started with, kept for restarts
#[derive(Clone)]
enum Input {
    Webcam,
    File(MediaFile),
}

pub struct Session<D: LandmarkDetector, C: Canvas> {
    detector: D,
    canvas: C,
    settings: OverlaySettings,
    state: SessionState,
    status: String,

    webcam: Option<WebcamOpener>,
    decoders: Vec<Box<dyn VideoDecoder>>,
    input: Option<Input>,
    source: Option<Box<dyn FrameSource>>,
    kind: Option<SourceKind>,
    /// A single-shot image result is on the surface
    showing_image: bool,

    processor: FrameProcessor,
    renderer: OverlayRenderer,
    throttle: Throttle,
    fps: FpsCounter,
    profiler: FrameProfiler,
    metrics: MetricsHandle,
}

impl<D: LandmarkDetector, C: Canvas> Session<D, C> {
    pub fn new(detector: D, mut canvas: C, settings: OverlaySettings) -> Self {
        canvas.resize(settings.webcam_width, settings.webcam_height);
        Self {
            detector,
            canvas,
            state: SessionState::Idle,
            status: STATUS_READY.to_string(),
            webcam: None,
            decoders: vec![Box::new(GifDecoder)],
            input: None,
            source: None,
            kind: None,
            showing_image: false,
            processor: FrameProcessor::new(settings.window_sizes()),
            renderer: OverlayRenderer::default(),
            throttle: Throttle::new(settings.throttle_interval()),
            fps: FpsCounter::new(),
            profiler: FrameProfiler::new(),
            metrics: MetricsHandle::new(),
            settings,
        }
    }

    /// Camera used by `start`
    pub fn with_webcam(mut self, opener: WebcamOpener) -> Self {
        self.webcam = Some(opener);
        self
    }

    /// Add a video decoder, tried before the built-in ones
    pub fn with_decoder(mut self, decoder: Box<dyn VideoDecoder>) -> Self {
        self.decoders.insert(0, decoder);
        self
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// User-facing status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Shared handle to the published metrics
    pub fn metrics(&self) -> MetricsHandle {
        self.metrics.clone()
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.profiler.stats()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Kind of the attached source, if any
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.kind
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    // ---- control surface ----

    /// Start tracking from the webcam
    pub async fn start(&mut self) -> Result<(), OverlayError> {
        self.ensure_inactive("start")?;

        let opened = match self.webcam.as_mut() {
            Some(open) => open(&self.settings),
            None => Err(SourceError::DeviceUnavailable("no camera configured".to_string())),
        };
        let source = match opened {
            Ok(source) => source,
            Err(e) => return Err(self.reject_source(e)),
        };

        self.input = Some(Input::Webcam);
        self.begin(source, STATUS_TRACKING.to_string()).await
    }

    /// Stop processing: halt the loop, release the source, clear the surface
    /// and start the next session cold
    pub fn stop(&mut self) {
        if self.state.is_active() {
            self.transition(SessionState::Stopping);
        }
        self.release();
        self.status = STATUS_STOPPED.to_string();
    }

    /// Switch model tier, restarting the active input
    pub async fn set_model(&mut self, tier: ModelTier) -> Result<(), OverlayError> {
        if self.settings.model_tier == tier {
            return Ok(());
        }
        self.settings.model_tier = tier;
        tracing::info!(tier = tier.display_name(), "Model tier changed");

        if !(self.state.is_active() || self.showing_image) {
            return Ok(());
        }
        self.stop();
        match self.input.clone() {
            Some(Input::Webcam) => self.start().await,
            Some(Input::File(file)) => self.load_file(Some(file)).await,
            None => Ok(()),
        }
    }

    /// Track two subjects instead of one; applies from the next start
    pub fn set_multi_subject(&mut self, enabled: bool) {
        self.settings.multi_subject = enabled;
        tracing::info!(enabled, "Multi-subject tracking changed");
    }

    pub fn set_visibility(&mut self, category: Category, visible: bool) {
        self.settings.visibility.set(category, visible);
    }

    /// Flip a category's visibility and return the new value
    pub fn toggle_visibility(&mut self, category: Category) -> bool {
        self.settings.visibility.toggle(category);
        self.settings.visibility.is_visible(category)
    }

    pub fn set_mesh_visible(&mut self, visible: bool) {
        self.settings.visibility.mesh = visible;
    }

    /// Live confidence threshold, in [0, 1]
    pub fn set_confidence_threshold(&mut self, value: f32) -> Result<(), OverlayError> {
        self.settings.set_confidence_threshold(value)?;
        Ok(())
    }

    /// Process an uploaded image or video
    pub async fn load_file(&mut self, file: Option<MediaFile>) -> Result<(), OverlayError> {
        let Some(file) = file else {
            let err = SourceError::NoFileSelected;
            self.status = err.status_message();
            return Err(err.into());
        };

        self.stop();
        let source = match open_media(&file, &self.decoders) {
            Ok(source) => source,
            Err(e) => return Err(self.reject_source(e)),
        };

        let status = format!("Processing {}...", source.kind().display_name());
        tracing::info!(file = %file.name, mime = %file.mime_type, "Loading media");
        self.input = Some(Input::File(file));
        self.begin(source, status).await
    }

    // ---- frame cycle ----

    /// Drive the session at the display refresh cadence until it stops
    pub async fn run(&mut self) -> Result<(), OverlayError> {
        let mut ticker = tokio::time::interval(self.settings.refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.state == SessionState::Running {
            ticker.tick().await;
            match self.step().await? {
                StepOutcome::Inactive | StepOutcome::Completed | StepOutcome::Ended => break,
                _ => {}
            }
        }
        Ok(())
    }

    /// Capture one frame, await its detection and hand the result on
    pub async fn step(&mut self) -> Result<StepOutcome, OverlayError> {
        if self.state != SessionState::Running {
            return Ok(StepOutcome::Inactive);
        }
        let Some(source) = self.source.as_mut() else {
            return Ok(StepOutcome::Inactive);
        };
        let kind = source.kind();

        let frame = match source.capture() {
            Ok(Capture::Frame(frame)) => frame,
            Ok(Capture::Pending) => return Ok(StepOutcome::Waiting),
            Ok(Capture::Ended) => {
                tracing::info!(kind = kind.display_name(), "Media ended");
                self.stop();
                return Ok(StepOutcome::Ended);
            }
            Err(e) => return Err(self.fail(e.into())),
        };

        let timestamp = (kind != SourceKind::Image).then_some(frame.timestamp);
        let result = match self.detector.detect(&frame, timestamp).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e.into())),
        };

        let now = tokio::time::Instant::now().into_std();
        let outcome = self.on_results(result, &frame, now)?;
        if kind == SourceKind::Image && matches!(outcome, StepOutcome::Rendered { .. }) {
            self.complete_single_shot();
            return Ok(StepOutcome::Completed);
        }
        Ok(outcome)
    }

    /// Handle a detection that completed at `now`.
    ///
    /// Results inside the throttle window are dropped without touching the
    /// surface or the FPS count.
    pub fn on_results(
        &mut self,
        result: DetectionResult,
        frame: &Frame,
        now: Instant,
    ) -> Result<StepOutcome, OverlayError> {
        if self.state != SessionState::Running {
            return Ok(StepOutcome::Inactive);
        }
        if !self.throttle.admit(now) {
            tracing::debug!(frame = frame.frame_number, "Result inside throttle window, dropped");
            return Ok(StepOutcome::Dropped);
        }

        let started = Instant::now();
        if let Some(fps) = self.fps.record(now) {
            self.metrics.publish_fps(fps);
        }

        let kind = self.kind.unwrap_or(SourceKind::Webcam);
        let processed = self
            .processor
            .process(result, &ProcessOptions::for_source(kind, &self.settings));
        let options = RenderOptions {
            settings: &self.settings,
            mirrored: kind == SourceKind::Webcam && self.settings.mirror_webcam,
        };
        let points = match self.renderer.render(&mut self.canvas, &frame.image, &processed, options) {
            Ok(points) => points,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.metrics.publish_points(points);
        self.profiler.record(started.elapsed());
        Ok(StepOutcome::Rendered { points })
    }

    // ---- internals ----

    fn ensure_inactive(&self, action: &'static str) -> Result<(), OverlayError> {
        if self.state.is_active() {
            return Err(OverlayError::InvalidTransition {
                from: self.state,
                action,
            });
        }
        Ok(())
    }

    async fn begin(&mut self, source: Box<dyn FrameSource>, status: String) -> Result<(), OverlayError> {
        let kind = source.kind();
        let (width, height) = source.resolution();
        self.transition(SessionState::Starting);
        self.status = status;

        if width > 0 && height > 0 {
            self.canvas.resize(width, height);
        }
        self.source = Some(source);
        self.kind = Some(kind);
        self.showing_image = false;

        self.processor = FrameProcessor::new(self.settings.window_sizes());
        self.throttle = Throttle::new(self.settings.throttle_interval());
        self.fps.reset();
        self.metrics.reset();

        let running_mode = match kind {
            SourceKind::Image => RunningMode::Image,
            SourceKind::Webcam | SourceKind::Video => RunningMode::Video,
        };
        let options = DetectorOptions::new(
            self.settings.model_tier,
            self.settings.max_subjects(),
            running_mode,
            self.settings.prefer_gpu,
        );
        if let Err(e) = self.detector.configure(&options).await {
            return Err(self.fail(e.into()));
        }

        tracing::info!(
            kind = kind.display_name(),
            tier = self.settings.model_tier.display_name(),
            width,
            height,
            "Session running"
        );
        self.transition(SessionState::Running);
        Ok(())
    }

    /// Source could not be acquired; nothing was started
    fn reject_source(&mut self, err: SourceError) -> OverlayError {
        tracing::warn!(error = %err, "Failed to acquire source");
        self.status = err.status_message();
        err.into()
    }

    /// Fail-stop: report, then clean up exactly as `stop` does
    fn fail(&mut self, err: OverlayError) -> OverlayError {
        tracing::error!(error = %err, state = %self.state, "Session failed");
        self.transition(SessionState::Error);
        self.release();
        self.status = STATUS_ERROR.to_string();
        err
    }

    /// Keep the rendered image on the surface and go idle
    fn complete_single_shot(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
        }
        self.detector.close();
        self.showing_image = true;
        self.status = STATUS_IMAGE_DONE.to_string();
        self.transition(SessionState::Idle);
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
        }
        self.detector.close();
        self.canvas.clear();
        self.processor.reset();
        self.throttle.reset();
        self.fps.reset();
        self.metrics.reset();
        self.showing_image = false;
        self.transition(SessionState::Idle);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "Session state changed");
            self.state = next;
        }
    }
}
