// ============================================================================
// servelab-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Provides a fluent API for assembling a CoreConfig from CLI arguments or
// library callers, starting from the documented defaults and validating the
// result on `build`.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CoreConfig, DecodeOptions, ExtractionSettings, ImageFormat};
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder populated with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the folder scanned for input videos.
    pub fn videos_dir(mut self, videos_dir: PathBuf) -> Self {
        self.config.videos_dir = videos_dir;
        self
    }

    /// Sets the root folder for per-video frame directories.
    pub fn output_root(mut self, output_root: PathBuf) -> Self {
        self.config.output_root = output_root;
        self
    }

    /// Replaces all extraction settings at once.
    pub fn settings(mut self, settings: ExtractionSettings) -> Self {
        self.config.settings = settings;
        self
    }

    /// Sets the target sampling rate in frames per second.
    pub fn target_fps(mut self, fps: f64) -> Self {
        self.config.settings.target_fps = fps;
        self
    }

    /// Sets the output image format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.config.settings.format = format;
        self
    }

    /// Sets the JPEG quality (1-100).
    pub fn quality(mut self, quality: u8) -> Self {
        self.config.settings.quality = quality;
        self
    }

    /// Sets the maximum output width in pixels (0 disables downscaling).
    pub fn max_width(mut self, max_width: u32) -> Self {
        self.config.settings.max_width = max_width;
        self
    }

    /// Sets whether existing frames are cleared and re-extracted.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Sets whether the hardware decoder is tried first.
    pub fn prefer_hardware_decode(mut self, prefer: bool) -> Self {
        self.config.decode = DecodeOptions {
            prefer_hardware: prefer,
        };
        self
    }

    /// Sets how many videos are processed concurrently.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = CoreConfigBuilder::new()
            .videos_dir(PathBuf::from("in"))
            .output_root(PathBuf::from("out"))
            .target_fps(5.0)
            .format(ImageFormat::Png)
            .quality(80)
            .max_width(640)
            .overwrite(true)
            .prefer_hardware_decode(false)
            .jobs(2)
            .build()
            .unwrap();

        assert_eq!(config.videos_dir, PathBuf::from("in"));
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.settings.target_fps, 5.0);
        assert_eq!(config.settings.format, ImageFormat::Png);
        assert_eq!(config.settings.quality, 80);
        assert_eq!(config.settings.max_width, 640);
        assert!(config.overwrite);
        assert!(!config.decode.prefer_hardware);
        assert_eq!(config.jobs, 2);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(CoreConfigBuilder::new().target_fps(-1.0).build().is_err());
        assert!(CoreConfigBuilder::new().quality(0).build().is_err());
        assert!(CoreConfigBuilder::new().jobs(0).build().is_err());
    }
}
