//! Hardware decoding detection and configuration.
//!
//! Chooses the `-hwaccel` API handed to ffmpeg when the hardware decode
//! backend is attempted. `VideoToolbox` is used on macOS; elsewhere ffmpeg's
//! `auto` selection is used.
//!
//! **Important**: This module is ONLY for hardware DECODING. Frames are always
//! downloaded to system memory as RGB before sampling.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::env;

/// Decoding backend used to open a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeBackend {
    /// ffmpeg with a `-hwaccel` decoder.
    Hardware,
    /// ffmpeg's default software decoders.
    Software,
}

impl DecodeBackend {
    /// Backends to try, in order, for the given preference.
    #[must_use]
    pub fn candidates(prefer_hardware: bool) -> &'static [DecodeBackend] {
        if prefer_hardware {
            &[Self::Hardware, Self::Software]
        } else {
            &[Self::Software]
        }
    }
}

impl std::fmt::Display for DecodeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hardware => write!(f, "hardware ({})", hwaccel_api()),
            Self::Software => f.write_str("software"),
        }
    }
}

/// Checks if the current platform is macOS.
#[must_use]
pub fn is_macos() -> bool {
    env::consts::OS == "macos"
}

/// The `-hwaccel` value for the current platform.
#[must_use]
pub fn hwaccel_api() -> &'static str {
    if is_macos() { "videotoolbox" } else { "auto" }
}

/// Adds hardware decoding options to an `FFmpeg` command.
///
/// IMPORTANT: This must be called BEFORE adding the input file to the command.
///
/// # Returns
///
/// * `bool` - Whether hardware decoding was added
pub fn add_hardware_decoding_to_command(cmd: &mut FfmpegCommand, backend: DecodeBackend) -> bool {
    if backend == DecodeBackend::Hardware {
        cmd.arg("-hwaccel");
        cmd.arg(hwaccel_api());
        return true;
    }
    false
}
