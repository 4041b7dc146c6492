//! Telemetry and logging infrastructure
//!
//! Structured logging with tracing, FPS counting and the published
//! overlay metrics.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogConfig, LogFormat, LogGuard, LogInitError};
pub use metrics::{FpsCounter, FrameMetrics, FrameProfiler, FrameStats, MetricsHandle};
