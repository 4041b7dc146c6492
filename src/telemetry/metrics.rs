//! Overlay metrics and frame timing
//!
//! FPS is the number of completed render passes in the previous one-second
//! window. The points counter is replaced after every pass.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Published metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameMetrics {
    /// Render passes completed in the last full second
    pub fps: u32,
    /// Landmark and derived points drawn in the most recent pass
    pub total_points_drawn: usize,
}

/// Shared, cloneable view of the latest metrics for UI glue
#[derive(Debug, Clone, Default)]
pub struct MetricsHandle {
    inner: Arc<Mutex<FrameMetrics>>,
}

impl MetricsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest published metrics
    pub fn snapshot(&self) -> FrameMetrics {
        *self.inner.lock()
    }

    pub fn publish_fps(&self, fps: u32) {
        self.inner.lock().fps = fps;
    }

    pub fn publish_points(&self, points: usize) {
        self.inner.lock().total_points_drawn = points;
    }

    pub fn reset(&self) {
        *self.inner.lock() = FrameMetrics::default();
    }
}

/// Counts render passes in rolling one-second windows
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Option<Instant>,
    frames: u32,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            window_start: None,
            frames: 0,
            fps: 0,
        }
    }

    /// Record a completed pass at `now`.
    ///
    /// Returns the new FPS value when a window closes.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        if now.duration_since(start) >= Self::WINDOW {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = Some(now);
            Some(self.fps)
        } else {
            None
        }
    }

    /// Last published value
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Passes counted in the currently open window
    pub fn pending(&self) -> u32 {
        self.frames
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Render pass timing statistics
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub sample_count: usize,
}

/// Collects how long each process-and-draw pass takes
pub struct FrameProfiler {
    pass_times: VecDeque<Duration>,
    /// Maximum samples to keep (10 seconds at 30 fps)
    max_samples: usize,
}

impl Default for FrameProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameProfiler {
    pub fn new() -> Self {
        Self {
            pass_times: VecDeque::with_capacity(300),
            max_samples: 300,
        }
    }

    pub fn record(&mut self, duration: Duration) {
        self.pass_times.push_back(duration);
        if self.pass_times.len() > self.max_samples {
            self.pass_times.pop_front();
        }
    }

    pub fn stats(&self) -> FrameStats {
        if self.pass_times.is_empty() {
            return FrameStats::default();
        }

        let mut times: Vec<f64> = self
            .pass_times
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let sum: f64 = times.iter().sum();
        FrameStats {
            avg_ms: sum / times.len() as f64,
            min_ms: times.first().copied().unwrap_or(0.0),
            max_ms: times.last().copied().unwrap_or(0.0),
            p50_ms: percentile(&times, 0.50),
            p95_ms: percentile(&times, 0.95),
            sample_count: times.len(),
        }
    }

    pub fn clear(&mut self) {
        self.pass_times.clear();
    }
}

/// Percentile from a sorted slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p) as usize;
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_publishes_after_one_second() {
        let t0 = Instant::now();
        let mut counter = FpsCounter::new();

        for i in 0..30 {
            assert_eq!(counter.record(t0 + Duration::from_millis(i * 33)), None);
        }
        assert_eq!(counter.pending(), 30);

        assert_eq!(counter.record(t0 + Duration::from_millis(1000)), Some(31));
        assert_eq!(counter.fps(), 31);
        assert_eq!(counter.pending(), 0);
    }

    #[test]
    fn test_metrics_handle_shared() {
        let handle = MetricsHandle::new();
        let view = handle.clone();
        handle.publish_points(42);
        handle.publish_fps(30);
        assert_eq!(
            view.snapshot(),
            FrameMetrics {
                fps: 30,
                total_points_drawn: 42
            }
        );
        handle.reset();
        assert_eq!(view.snapshot(), FrameMetrics::default());
    }

    #[test]
    fn test_profiler_stats() {
        let mut profiler = FrameProfiler::new();
        for ms in 1..=10 {
            profiler.record(Duration::from_millis(ms));
        }
        let stats = profiler.stats();
        assert_eq!(stats.sample_count, 10);
        assert!((stats.avg_ms - 5.5).abs() < 1e-9);
        assert!((stats.max_ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 0.5), 5.0);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 10.0);
    }
}
