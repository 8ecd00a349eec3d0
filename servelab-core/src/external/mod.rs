// ============================================================================
// servelab-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Frame decoding through ffmpeg and ffprobe
//
// The extraction pipeline never talks to ffmpeg directly. It sees a
// `FrameSource`, which can probe a video's stream properties and open a
// sequential `FrameReader` yielding decoded RGB frames in presentation order.
// The default source drives ffmpeg-sidecar (decode) and the ffprobe crate
// (probe); tests substitute a synthetic source.
//
// KEY COMPONENTS:
// - VideoStreamInfo / DecodedFrame: what a source reports and yields
// - FrameSource / FrameReader: the decoding seam
// - FrameIter: iterator adapter over a reader
// - open_with_fallback: hardware-then-software backend selection

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::hardware_decode::DecodeBackend;

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg-sidecar backed frame source and reader
pub mod ffmpeg_executor;

/// ffprobe stream probing
pub mod ffprobe_executor;

#[cfg(feature = "test-mocks")]
pub mod mocks;

pub use ffmpeg_executor::{FfmpegFrameReader, FfmpegFrameSource};
pub use ffprobe_executor::{parse_frame_rate, probe_video_stream};

// ============================================================================
// DATA MODEL
// ============================================================================

/// Properties of the primary video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
    /// Native frame rate. Always positive; unknown rates are reported as the
    /// fallback rate.
    pub fps: f64,
    /// Container frame count, when the container reports one.
    pub total_frames: Option<u64>,
    /// Container duration, when reported.
    pub duration_secs: Option<f64>,
}

/// One decoded frame as packed 8-bit RGB (`width * height * 3` bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Zero-based position in presentation order.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

// ============================================================================
// TRAITS
// ============================================================================

/// Sequential access to the decoded frames of one video.
pub trait FrameReader {
    /// Returns the next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> CoreResult<Option<DecodedFrame>>;
}

/// Something that can probe and open videos for decoding.
pub trait FrameSource: Sync {
    type Reader: FrameReader;

    /// Reads stream properties without decoding frames.
    fn probe(&self, path: &Path) -> CoreResult<VideoStreamInfo>;

    /// Opens `path` with the given backend.
    ///
    /// Must fail with `CoreError::DecodeOpen` when the backend cannot decode
    /// the stream at all, so the caller can fall back to another backend.
    fn open(&self, path: &Path, backend: DecodeBackend) -> CoreResult<Self::Reader>;

    /// Backends to attempt, in order.
    fn backends(&self) -> &[DecodeBackend] {
        DecodeBackend::candidates(false)
    }
}

/// Iterator over the frames of a reader. Stops after the first error.
pub struct FrameIter<R> {
    reader: R,
    done: bool,
}

impl<R: FrameReader> FrameIter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: FrameReader> Iterator for FrameIter<R> {
    type Item = CoreResult<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Opens `path` with the first backend of `source` that succeeds.
///
/// Only `DecodeOpen` failures move on to the next backend; any other error is
/// returned immediately. When every backend fails, the last `DecodeOpen`
/// error is returned.
pub fn open_with_fallback<S: FrameSource>(
    source: &S,
    path: &Path,
) -> CoreResult<(S::Reader, DecodeBackend)> {
    let mut last_error = None;

    for &backend in source.backends() {
        match source.open(path, backend) {
            Ok(reader) => {
                log::debug!("Decoding {} with {} backend", path.display(), backend);
                return Ok((reader, backend));
            }
            Err(e @ CoreError::DecodeOpen { .. }) => {
                log::debug!("{} backend could not open {}: {}", backend, path.display(), e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        crate::error::decode_open_error(path, "no decode backend available")
    }))
}
