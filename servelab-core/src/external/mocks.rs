// servelab-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.

use super::{DecodedFrame, FrameReader, FrameSource, VideoStreamInfo};
use crate::error::{CoreError, CoreResult, decode_open_error};
use crate::hardware_decode::DecodeBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Description of a fake video served by `SyntheticFrameSource`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticVideo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
    /// Decoding fails when this frame index is reached.
    pub fail_at: Option<u64>,
}

impl SyntheticVideo {
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u64) -> Self {
        Self {
            width,
            height,
            fps,
            frame_count,
            fail_at: None,
        }
    }

    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }
}

/// In-memory `FrameSource`. Videos are looked up by file name, so callers can
/// pass relative or absolute paths.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFrameSource {
    videos: HashMap<String, SyntheticVideo>,
    failing_backends: Vec<DecodeBackend>,
    prefer_hardware: bool,
    opened: Arc<Mutex<Vec<(PathBuf, DecodeBackend)>>>,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, file_name: &str, video: SyntheticVideo) -> Self {
        self.videos.insert(file_name.to_string(), video);
        self
    }

    pub fn prefer_hardware(mut self, prefer: bool) -> Self {
        self.prefer_hardware = prefer;
        self
    }

    /// Makes `open` fail with `DecodeOpen` for `backend`.
    pub fn failing_backend(mut self, backend: DecodeBackend) -> Self {
        self.failing_backends.push(backend);
        self
    }

    /// Every successful `open`, in call order.
    pub fn opened(&self) -> Vec<(PathBuf, DecodeBackend)> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }

    fn lookup(&self, path: &Path) -> CoreResult<&SyntheticVideo> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.videos
            .get(&name)
            .ok_or_else(|| decode_open_error(path, "unknown synthetic video"))
    }
}

impl FrameSource for SyntheticFrameSource {
    type Reader = SyntheticFrameReader;

    fn probe(&self, path: &Path) -> CoreResult<VideoStreamInfo> {
        let video = self.lookup(path)?;
        Ok(VideoStreamInfo {
            width: video.width,
            height: video.height,
            fps: video.fps,
            total_frames: Some(video.frame_count),
            duration_secs: (video.fps > 0.0).then(|| video.frame_count as f64 / video.fps),
        })
    }

    fn open(&self, path: &Path, backend: DecodeBackend) -> CoreResult<Self::Reader> {
        if self.failing_backends.contains(&backend) {
            return Err(decode_open_error(path, format!("{backend} decoder unavailable")));
        }
        let video = self.lookup(path)?.clone();
        if let Ok(mut opened) = self.opened.lock() {
            opened.push((path.to_path_buf(), backend));
        }
        Ok(SyntheticFrameReader { video, next: 0 })
    }

    fn backends(&self) -> &[DecodeBackend] {
        DecodeBackend::candidates(self.prefer_hardware)
    }
}

/// Reader producing deterministic gradient frames.
#[derive(Debug)]
pub struct SyntheticFrameReader {
    video: SyntheticVideo,
    next: u64,
}

impl FrameReader for SyntheticFrameReader {
    fn next_frame(&mut self) -> CoreResult<Option<DecodedFrame>> {
        if self.next >= self.video.frame_count {
            return Ok(None);
        }
        if self.video.fail_at == Some(self.next) {
            return Err(CoreError::OperationFailed(format!(
                "synthetic decode error at frame {}",
                self.next
            )));
        }

        let index = self.next;
        self.next += 1;
        let (w, h) = (self.video.width, self.video.height);
        let mut data = Vec::with_capacity(w as usize * h as usize * 3);
        for y in 0..h {
            for x in 0..w {
                data.push((x % 256) as u8);
                data.push((y % 256) as u8);
                data.push((index % 256) as u8);
            }
        }

        Ok(Some(DecodedFrame {
            index,
            width: w,
            height: h,
            data,
        }))
    }
}
