//! Logging setup
//!
//! One global subscriber: an env-driven level filter, a console layer in
//! compact or JSON form, and an optional plain-text file layer written
//! off-thread by `tracing-appender`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, util::TryInitError};

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

/// Env var holding a filter directive, checked before `RUST_LOG`
pub const LOG_ENV: &str = "HOLISTIC_LOG";

/// Console output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per event, for log collectors
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directive used when neither env var is set, e.g. "info"
    pub level: String,
    pub format: LogFormat,
    /// Also append events to this file
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum LogInitError {
    #[error("Failed to open log file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Pick the filter directive: `HOLISTIC_LOG`, then `RUST_LOG`, then `level`
fn filter_directive(own: Option<String>, rust_log: Option<String>, level: &str) -> String {
    own.or(rust_log)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| level.to_string())
}

impl LogConfig {
    fn env_filter(&self) -> EnvFilter {
        let directive = filter_directive(
            std::env::var(LOG_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
            &self.level,
        );
        EnvFilter::try_new(&directive).unwrap_or_else(|e| {
            eprintln!("Ignoring log filter '{}': {}", directive, e);
            EnvFilter::new(&self.level)
        })
    }
}

fn open_log_file(path: &Path) -> Result<File, LogInitError> {
    let open = || -> std::io::Result<File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        File::options().create(true).append(true).open(path)
    };
    open().map_err(|source| LogInitError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; hold it for the
/// life of the program.
pub fn init_logging(config: &LogConfig) -> Result<Option<LogGuard>, LogInitError> {
    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let json = config.format == LogFormat::Json;
    let compact_layer = (!json).then(|| fmt::layer().with_target(false).compact());
    let json_layer = json.then(|| fmt::layer().json().with_current_span(false));

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(compact_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(
        format = ?config.format,
        file = ?config.file,
        "Logging initialized"
    );
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_precedence() {
        let own = Some("holistic_overlay=trace".to_string());
        let rust = Some("warn".to_string());

        assert_eq!(filter_directive(own.clone(), rust.clone(), "info"), "holistic_overlay=trace");
        assert_eq!(filter_directive(None, rust, "info"), "warn");
        assert_eq!(filter_directive(None, None, "debug"), "debug");
        assert_eq!(filter_directive(Some("  ".to_string()), None, "info"), "info");
    }

    #[test]
    fn test_log_file_created_with_parents() {
        let dir = std::env::temp_dir().join(format!("holistic-log-{}", std::process::id()));
        let path = dir.join("nested").join("overlay.log");

        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unwritable_log_file_fails_before_install() {
        let blocker = std::env::temp_dir().join(format!("holistic-log-blocker-{}", std::process::id()));
        fs::write(&blocker, b"not a directory").unwrap();

        let config = LogConfig {
            file: Some(blocker.join("overlay.log")),
            ..Default::default()
        };
        let result = init_logging(&config);
        assert!(matches!(result, Err(LogInitError::File { .. })));
        let _ = fs::remove_file(&blocker);
    }
}
