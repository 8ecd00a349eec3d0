// ============================================================================
// servelab-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG FRAME SOURCE: Decoding videos to raw RGB through ffmpeg-sidecar
//
// Each reader owns one ffmpeg child writing `rgb24` rawvideo to stdout. The
// sidecar event iterator turns that stream into `OutputFrame` events, which
// are handed out one at a time in presentation order. `-fps_mode passthrough`
// keeps ffmpeg from duplicating or dropping frames, so the index of every
// frame matches the container's decode order.
//
// A backend that cannot decode the stream typically produces errors and no
// frames at all. The reader therefore pulls the first frame while opening: if
// none arrives and ffmpeg reported errors or a failed exit, opening fails with
// `DecodeOpen` and the next backend can be tried.

use std::path::Path;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel, OutputVideoFrame};
use ffmpeg_sidecar::iter::FfmpegIterator;

use super::{DecodedFrame, FrameReader, FrameSource, VideoStreamInfo, probe_video_stream};
use crate::config::DecodeOptions;
use crate::error::{CoreResult, command_start_error, decode_open_error};
use crate::hardware_decode::{DecodeBackend, add_hardware_decoding_to_command};

/// `FrameSource` backed by the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameSource {
    options: DecodeOptions,
}

impl FfmpegFrameSource {
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }
}

impl FrameSource for FfmpegFrameSource {
    type Reader = FfmpegFrameReader;

    fn probe(&self, path: &Path) -> CoreResult<VideoStreamInfo> {
        probe_video_stream(path)
    }

    fn open(&self, path: &Path, backend: DecodeBackend) -> CoreResult<Self::Reader> {
        FfmpegFrameReader::spawn(path, backend)
    }

    fn backends(&self) -> &[DecodeBackend] {
        DecodeBackend::candidates(self.options.prefer_hardware)
    }
}

/// Builds the decode command for `path`.
#[must_use]
pub fn build_decode_command(path: &Path, backend: DecodeBackend) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.arg("-hide_banner");
    // -hwaccel is an input option and must precede -i
    add_hardware_decoding_to_command(&mut cmd, backend);
    cmd.input(path.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0", "-an", "-sn", "-dn", "-fps_mode", "passthrough"]);
    cmd.rawvideo();
    cmd
}

/// A running ffmpeg decode of one video.
pub struct FfmpegFrameReader {
    child: FfmpegChild,
    events: FfmpegIterator,
    pending: Option<DecodedFrame>,
    next_index: u64,
    errors: Vec<String>,
    finished: bool,
}

impl FfmpegFrameReader {
    /// Spawns ffmpeg for `path` and waits for the first frame.
    pub fn spawn(path: &Path, backend: DecodeBackend) -> CoreResult<Self> {
        let mut cmd = build_decode_command(path, backend);
        log::debug!(
            "Spawning ffmpeg ({}) for {}",
            backend,
            path.display()
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))?;
        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(decode_open_error(path, e.to_string()));
            }
        };

        let mut reader = Self {
            child,
            events,
            pending: None,
            next_index: 0,
            errors: Vec::new(),
            finished: false,
        };

        reader.pending = reader.pull();
        if reader.pending.is_none() {
            let status = reader.child.wait();
            let exited_cleanly = status.as_ref().is_ok_and(|s| s.success());
            if !reader.errors.is_empty() || !exited_cleanly {
                let reason = reader.errors.last().cloned().unwrap_or_else(|| match status {
                    Ok(s) => format!("ffmpeg exited with {s}"),
                    Err(e) => e.to_string(),
                });
                return Err(decode_open_error(path, reason));
            }
            log::warn!("{} decoded to zero frames", path.display());
        }

        Ok(reader)
    }

    /// Drains events until the next frame or the end of the stream.
    fn pull(&mut self) -> Option<DecodedFrame> {
        if self.finished {
            return None;
        }

        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    return Some(to_decoded(index, frame));
                }
                FfmpegEvent::Error(msg) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                    log::debug!("ffmpeg: {}", msg);
                    self.errors.push(msg);
                }
                FfmpegEvent::Done => break,
                _ => {}
            }
        }

        self.finished = true;
        None
    }
}

fn to_decoded(index: u64, frame: OutputVideoFrame) -> DecodedFrame {
    DecodedFrame {
        index,
        width: frame.width,
        height: frame.height,
        data: frame.data,
    }
}

impl FrameReader for FfmpegFrameReader {
    fn next_frame(&mut self) -> CoreResult<Option<DecodedFrame>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }
        Ok(self.pull())
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_decode_command_outputs_rgb24_to_stdout() {
        let args = args_of(&build_decode_command(
            Path::new("serve.mp4"),
            DecodeBackend::Software,
        ));
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "serve.mp4"));
        assert!(args.windows(2).any(|w| w[0] == "-pix_fmt" && w[1] == "rgb24"));
        assert!(args.windows(2).any(|w| w[0] == "-fps_mode" && w[1] == "passthrough"));
        assert_eq!(args.last().map(String::as_str), Some("-"));
        assert!(!args.iter().any(|a| a == "-hwaccel"));
    }

    #[test]
    fn test_hwaccel_precedes_input() {
        let args = args_of(&build_decode_command(
            Path::new("serve.mp4"),
            DecodeBackend::Hardware,
        ));
        let hw = args.iter().position(|a| a == "-hwaccel").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(hw < input);
    }

    #[test]
    fn test_source_backends_follow_preference() {
        let hw = FfmpegFrameSource::new(DecodeOptions {
            prefer_hardware: true,
        });
        assert_eq!(hw.backends().first(), Some(&DecodeBackend::Hardware));

        let sw = FfmpegFrameSource::new(DecodeOptions {
            prefer_hardware: false,
        });
        assert_eq!(sw.backends(), &[DecodeBackend::Software]);
    }
}
