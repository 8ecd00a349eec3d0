//! Configuration structures and constants for the servelab-core library.
//!
//! This module provides the extraction settings that form part of the cache
//! key, the decoder preferences handed to the frame source, and the batch
//! configuration consumed by `process_videos`.

mod builder;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Default target sampling rate in frames per second.
pub const DEFAULT_TARGET_FPS: f64 = 10.0;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Default maximum output width in pixels. 0 disables downscaling.
pub const DEFAULT_MAX_WIDTH: u32 = 1280;

/// Source frame rate assumed when the stream reports zero or an unreadable value.
pub const DEFAULT_FALLBACK_FPS: f64 = 30.0;

/// Default folder scanned for input videos.
pub const DEFAULT_VIDEOS_DIR: &str = "data/raw/videos";

/// Default root under which one frame directory per video is created.
pub const DEFAULT_FRAMES_DIR: &str = "data/raw/frames";

/// File extensions (case-insensitive) accepted as input videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Output image encoding for sampled frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy JPEG, written with the configured quality.
    #[default]
    Jpg,
    /// Lossless PNG with encoder defaults.
    Png,
}

impl ImageFormat {
    /// File extension used for frames of this format (without the dot).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            other => Err(CoreError::InvalidSettings(format!(
                "unsupported image extension '{other}' (expected jpg or png)"
            ))),
        }
    }
}

/// Settings that determine which frames are produced and how they are encoded.
///
/// Together with a `VideoSignature` these form the cache key recorded in the
/// extraction ledger, so changing any field invalidates previous output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    /// Target sampling rate in frames per second. Must be finite and > 0.
    pub target_fps: f64,

    /// Output image format.
    pub format: ImageFormat,

    /// JPEG quality in [1, 100]. Recorded for PNG too, but not applied.
    pub quality: u8,

    /// Maximum output width in pixels; 0 means no limit.
    pub max_width: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            format: ImageFormat::default(),
            quality: DEFAULT_JPEG_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl ExtractionSettings {
    /// Checks the value ranges the sampler relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(CoreError::InvalidSettings(format!(
                "target fps must be a positive number, got {}",
                self.target_fps
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(CoreError::InvalidSettings(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Decoder preferences passed explicitly to the frame source at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Try the hardware decoding backend before falling back to software.
    pub prefer_hardware: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            prefer_hardware: true,
        }
    }
}

/// Main configuration structure for a batch extraction run.
///
/// # Examples
///
/// ```rust
/// use servelab_core::config::{CoreConfigBuilder, ImageFormat};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .videos_dir(PathBuf::from("data/raw/videos"))
///     .output_root(PathBuf::from("data/raw/frames"))
///     .target_fps(15.0)
///     .format(ImageFormat::Png)
///     .max_width(0)
///     .build()
///     .unwrap();
/// assert_eq!(config.settings.format, ImageFormat::Png);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Folder scanned (top level only) for input videos
    pub videos_dir: PathBuf,

    /// Root folder; each video gets `{output_root}/{stem}/`
    pub output_root: PathBuf,

    /// Sampling and encoding settings shared by every video in the batch
    pub settings: ExtractionSettings,

    /// Re-extract even when the ledger matches, clearing old frames first
    pub overwrite: bool,

    /// Decoder backend preferences
    pub decode: DecodeOptions,

    /// Number of videos processed concurrently (1 = sequential)
    pub jobs: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from(DEFAULT_VIDEOS_DIR),
            output_root: PathBuf::from(DEFAULT_FRAMES_DIR),
            settings: ExtractionSettings::default(),
            overwrite: false,
            decode: DecodeOptions::default(),
            jobs: 1,
        }
    }
}

impl CoreConfig {
    /// Validates the configuration before a batch starts.
    pub fn validate(&self) -> CoreResult<()> {
        self.settings.validate()?;
        if self.jobs == 0 {
            return Err(CoreError::InvalidSettings(
                "jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Output directory for a given video: `{output_root}/{stem}`.
    #[must_use]
    pub fn output_dir_for(&self, video: &std::path::Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_root.join(stem)
    }
}
