//! Holistic Overlay - command line entry point
//!
//! Replays recorded detections over an image, an animated GIF or the camera
//! and writes the rendered overlays as PNG files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tokio::time::MissedTickBehavior;

use holistic_overlay::canvas::RasterCanvas;
use holistic_overlay::config::{DensityProfile, ModelTier, OverlaySettings};
use holistic_overlay::detector::ReplayDetector;
use holistic_overlay::scheduler::{Session, StepOutcome};
use holistic_overlay::source::MediaFile;
use holistic_overlay::telemetry::init_logging;

mod args;

use args::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_guard = init_logging(&args.log_config()).context("Failed to initialize logging")?;

    let settings = load_settings(&args)?;
    tracing::info!(
        tier = settings.model_tier.display_name(),
        threshold = settings.confidence_threshold,
        "Holistic Overlay starting"
    );

    let detector = ReplayDetector::from_path(&args.detections)
        .with_context(|| format!("Failed to load detections from {}", args.detections.display()))?;
    let mut session = Session::new(detector, RasterCanvas::new(1, 1), settings);

    match &args.input {
        Some(path) => {
            let file = MediaFile::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            session.load_file(Some(file)).await?;
        }
        None => {
            session = attach_camera(session, args.camera)?;
            session.start().await?;
        }
    }
    println!("{}", session.status());

    let mut ticker = tokio::time::interval(session.settings().refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut passes = 0usize;

    loop {
        ticker.tick().await;
        match session.step().await? {
            StepOutcome::Rendered { points } => {
                let path = numbered_path(&args.output, passes);
                write_png(&session, &path)?;
                tracing::debug!(pass = passes, points, path = %path.display(), "Pass written");
                passes += 1;
                if args.input.is_none() && passes >= args.max_passes {
                    session.stop();
                    break;
                }
            }
            StepOutcome::Completed => {
                write_png(&session, &args.output)?;
                passes += 1;
                break;
            }
            StepOutcome::Ended | StepOutcome::Inactive => break,
            StepOutcome::Waiting | StepOutcome::Dropped => {}
        }
    }

    let metrics = session.metrics().snapshot();
    let stats = session.frame_stats();
    println!("{}", session.status());
    println!(
        "Passes: {}  FPS: {}  Points (last pass): {}  Avg pass: {:.2} ms  p95: {:.2} ms",
        passes, metrics.fps, metrics.total_points_drawn, stats.avg_ms, stats.p95_ms
    );
    Ok(())
}

fn load_settings(args: &Args) -> anyhow::Result<OverlaySettings> {
    let path = args.settings.clone().or_else(OverlaySettings::default_path);
    let mut settings = match &path {
        Some(path) => OverlaySettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => OverlaySettings::default(),
    };

    if let Some(name) = &args.model {
        settings.model_tier = match ModelTier::from_name(name) {
            Some(tier) => tier,
            None => bail!("Unknown model tier '{}' (expected full, upper or lite)", name),
        };
    }
    if let Some(threshold) = args.confidence {
        settings
            .set_confidence_threshold(threshold)
            .context("Invalid --confidence")?;
    }
    if args.hide_face {
        settings.visibility.face = false;
    }
    if args.hide_hands {
        settings.visibility.hands = false;
    }
    if args.hide_pose {
        settings.visibility.pose = false;
    }
    if args.mesh {
        settings.visibility.mesh = true;
    }
    if args.multi_subject {
        settings.multi_subject = true;
    }
    if args.detailed {
        settings.density = DensityProfile::Detailed;
    }
    Ok(settings)
}

#[cfg(feature = "camera")]
fn attach_camera(
    session: Session<ReplayDetector, RasterCanvas>,
    index: u32,
) -> anyhow::Result<Session<ReplayDetector, RasterCanvas>> {
    use holistic_overlay::source::{CameraSource, FrameSource};

    Ok(session.with_webcam(Box::new(move |settings: &OverlaySettings| {
        let camera = CameraSource::open(index, settings.webcam_width, settings.webcam_height)?;
        Ok(Box::new(camera) as Box<dyn FrameSource>)
    })))
}

#[cfg(not(feature = "camera"))]
fn attach_camera(
    _session: Session<ReplayDetector, RasterCanvas>,
    _index: u32,
) -> anyhow::Result<Session<ReplayDetector, RasterCanvas>> {
    bail!("No --input given and camera support is not compiled in (build with --features camera)")
}

/// `out.png` -> `out_00003.png`
fn numbered_path(base: &Path, pass: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    base.with_file_name(format!("{}_{:05}.{}", stem, pass, ext))
}

fn write_png(session: &Session<ReplayDetector, RasterCanvas>, path: &Path) -> anyhow::Result<()> {
    session
        .canvas()
        .image()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
