use std::path::PathBuf;

use clap::Parser;

use holistic_overlay::telemetry::{LogConfig, LogFormat};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image or animated GIF to process (omit to use the camera)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Recorded detections: JSON array with one entry per frame
    #[arg(short, long)]
    pub detections: PathBuf,

    /// Output PNG; sequences are written as <stem>_00000.png, ...
    #[arg(short, long, default_value = "overlay.png")]
    pub output: PathBuf,

    /// Model tier (full, upper, lite)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Minimum landmark confidence to draw, in [0, 1]
    #[arg(short, long)]
    pub confidence: Option<f32>,

    #[arg(long)]
    pub hide_face: bool,

    #[arg(long)]
    pub hide_hands: bool,

    #[arg(long)]
    pub hide_pose: bool,

    /// Draw shaded mesh triangles
    #[arg(long)]
    pub mesh: bool,

    /// Track up to two subjects
    #[arg(long)]
    pub multi_subject: bool,

    /// 19 interpolated points per edge instead of the standard density
    #[arg(long)]
    pub detailed: bool,

    /// Settings file (default: platform config dir)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Camera index when no input file is given
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Stop after this many rendered passes (camera only)
    #[arg(long, default_value_t = 300)]
    pub max_passes: usize,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log to the console as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log at debug level (HOLISTIC_LOG or RUST_LOG take precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: if self.verbose { "debug" } else { "info" }.to_string(),
            format: if self.log_json {
                LogFormat::Json
            } else {
                LogFormat::Compact
            },
            file: self.log_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_flags() {
        let args = Args::parse_from(["holistic-overlay", "-d", "rec.json"]);
        let config = args.log_config();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file.is_none());

        let args = Args::parse_from([
            "holistic-overlay",
            "-d",
            "rec.json",
            "--verbose",
            "--log-json",
            "--log-file",
            "logs/overlay.log",
        ]);
        let config = args.log_config();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("logs/overlay.log")));
    }
}
