// servelab-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use servelab_core::ImageFormat;
use servelab_core::config::{
    DEFAULT_FRAMES_DIR, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH, DEFAULT_TARGET_FPS,
    DEFAULT_VIDEOS_DIR,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Servelab: serve video frame extraction",
    long_about = "Samples tennis serve videos into numbered frames for labeling and pose analysis."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extracts frames from every video in a folder
    Extract(ExtractArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Input videos folder (.mp4, .mov, .avi, .mkv)
    #[arg(long = "videos", value_name = "DIR", env = "SERVELAB_VIDEOS", default_value = DEFAULT_VIDEOS_DIR)]
    pub videos_dir: PathBuf,

    /// Output frames root; each video gets OUT/<stem>/
    #[arg(long = "out", value_name = "DIR", env = "SERVELAB_FRAMES", default_value = DEFAULT_FRAMES_DIR)]
    pub output_root: PathBuf,

    /// Target frame rate for sampling
    #[arg(long, value_name = "FPS", default_value_t = DEFAULT_TARGET_FPS, value_parser = parse_fps)]
    pub fps: f64,

    /// Image extension
    #[arg(
        long,
        default_value = "jpg",
        value_parser = PossibleValuesParser::new(["jpg", "png"])
            .try_map(|s| s.parse::<ImageFormat>().map_err(|e| e.to_string()))
    )]
    pub ext: ImageFormat,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Max output width (0 disables downscaling)
    #[arg(long = "max-w", value_name = "PX", default_value_t = DEFAULT_MAX_WIDTH)]
    pub max_width: u32,

    /// Overwrite existing frames
    #[arg(long)]
    pub overwrite: bool,

    /// Decode in software only, skipping the hardware decoder attempt
    #[arg(long)]
    pub no_hwaccel: bool,

    /// Number of videos processed in parallel
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Optional: Directory for log files (defaults to OUT/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Disable the run log file
    #[arg(long)]
    pub no_log: bool,
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("frame rate must be greater than 0, got {value}"))
    }
}

/// Parses the process arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_core() {
        let cli = Cli::try_parse_from(["servelab", "extract"]).unwrap();
        let Commands::Extract(args) = cli.command;
        assert_eq!(args.fps, 10.0);
        assert_eq!(args.ext, ImageFormat::Jpg);
        assert_eq!(args.quality, 95);
        assert_eq!(args.max_width, 1280);
        assert_eq!(args.jobs, 1);
        assert!(!args.overwrite && !args.no_hwaccel && !args.no_log);
    }

    #[test]
    fn test_explicit_values() {
        let cli = Cli::try_parse_from([
            "servelab", "extract", "--videos", "in", "--out", "out", "--fps", "15", "--ext",
            "png", "--quality", "80", "--max-w", "0", "--overwrite", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Extract(args) = cli.command;
        assert_eq!(args.videos_dir, PathBuf::from("in"));
        assert_eq!(args.output_root, PathBuf::from("out"));
        assert_eq!(args.fps, 15.0);
        assert_eq!(args.ext, ImageFormat::Png);
        assert_eq!(args.quality, 80);
        assert_eq!(args.max_width, 0);
        assert!(args.overwrite);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        for bad in [
            ["servelab", "extract", "--quality", "0"],
            ["servelab", "extract", "--quality", "101"],
            ["servelab", "extract", "--ext", "gif"],
            ["servelab", "extract", "--ext", "PNG"],
            ["servelab", "extract", "--fps", "0"],
            ["servelab", "extract", "--fps", "-2"],
        ] {
            assert!(Cli::try_parse_from(bad).is_err(), "{bad:?}");
        }
    }
}
