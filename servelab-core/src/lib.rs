//! Core library for sampling serve videos into frames and measuring poses.
//!
//! This crate provides video discovery, ledger-guarded frame extraction through
//! ffmpeg, and joint-angle kinematics over pose keypoints.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use servelab_core::config::CoreConfigBuilder;
//! use servelab_core::external::FfmpegFrameSource;
//! use servelab_core::{find_processable_files, process_videos};
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .videos_dir(PathBuf::from("data/raw/videos"))
//!     .output_root(PathBuf::from("data/raw/frames"))
//!     .target_fps(10.0)
//!     .build()
//!     .unwrap();
//!
//! let files = find_processable_files(&config.videos_dir).unwrap();
//! let source = FfmpegFrameSource::new(config.decode);
//! let summary = process_videos(&source, &config, &files).unwrap();
//! println!("Total frames saved: {}", summary.total_frames_saved());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod hardware_decode;
pub mod kinematics;
pub mod ledger;
pub mod pose;
pub mod processing;
pub mod signature;
pub mod terminal_output;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, DecodeOptions, ExtractionSettings, ImageFormat};
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use external::{FfmpegFrameSource, FrameReader, FrameSource};
pub use ledger::{CacheDecision, ExtractionLedger, SkipReason};
pub use processing::{
    BatchSummary, ExtractOptions, ExtractOutcome, VideoReport, VideoStatus, extract_video,
    process_videos,
};
pub use signature::VideoSignature;
pub use utils::format_duration;
