// ============================================================================
// servelab-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the servelab-core library
//
// Every fallible operation in the core returns `CoreResult<T>`. Cache skips are
// deliberately absent from this enum: a skipped video is a successful no-op
// reported through `ledger::SkipReason`, never an error.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced by the frame extraction pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required input file or folder does not exist or cannot be accessed.
    #[error("Not found: {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The decoding backend could not open the video stream.
    #[error("Failed to open {path} for decoding: {reason}")]
    DecodeOpen { path: PathBuf, reason: String },

    /// Resizing, encoding or writing a sampled frame failed.
    #[error("Failed to write frame {path}: {reason}")]
    FrameWrite { path: PathBuf, reason: String },

    #[error("Invalid extraction settings: {0}")]
    InvalidSettings(String),

    /// Landmark and visibility sequences of a pose disagree.
    #[error("Invalid keypoints: {0}")]
    InvalidKeypoints(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("No video files found")]
    NoFilesFound,

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for servelab-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `NotFound` error for `path`.
pub fn not_found_error(path: impl AsRef<Path>, source: io::Error) -> CoreError {
    CoreError::NotFound {
        path: path.as_ref().to_path_buf(),
        source,
    }
}

/// Builds a `DecodeOpen` error for `path`.
pub fn decode_open_error(path: impl AsRef<Path>, reason: impl Into<String>) -> CoreError {
    CoreError::DecodeOpen {
        path: path.as_ref().to_path_buf(),
        reason: reason.into(),
    }
}

/// Builds a `FrameWrite` error for `path`.
pub fn frame_write_error(path: impl AsRef<Path>, reason: impl ToString) -> CoreError {
    CoreError::FrameWrite {
        path: path.as_ref().to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Builds a `CommandStart` error for an external tool that could not be spawned.
pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), source)
}

/// Builds a `CommandFailed` error for an external tool that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_open_message_names_video() {
        let err = decode_open_error("/videos/serve.mp4", "no video stream");
        assert_eq!(
            err.to_string(),
            "Failed to open /videos/serve.mp4 for decoding: no video stream"
        );
    }

    #[test]
    fn test_not_found_wraps_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = not_found_error("clip.mov", io_err);
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(err.to_string().contains("clip.mov"));
    }
}
