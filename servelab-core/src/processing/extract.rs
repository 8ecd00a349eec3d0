// ============================================================================
// servelab-core/src/processing/extract.rs
// ============================================================================
//
// FRAME EXTRACTION: Sampling one video into numbered image files
//
// WORKFLOW:
// 1. Validate settings and fingerprint the source video
// 2. Consult the ledger; a skip leaves the output directory untouched
// 3. Probe the stream and open it (hardware backend first when preferred)
// 4. With overwrite, drop the old ledger and clear old frames
// 5. Decode sequentially, keep frames chosen by the temporal sampler,
//    downscale and write each one
// 6. Commit the ledger once every frame is on disk
//
// Any error after step 4 leaves the directory without a ledger, so a partial
// run is never mistaken for a completed one.

use std::path::{Path, PathBuf};

use crate::config::ExtractionSettings;
use crate::error::{CoreError, CoreResult, decode_open_error, frame_write_error};
use crate::external::{FrameIter, FrameReader, FrameSource, VideoStreamInfo, open_with_fallback};
use crate::hardware_decode::DecodeBackend;
use crate::ledger::{self, CacheDecision, DesiredState, ExtractionLedger, LEDGER_FILE_NAME, SkipReason};
use crate::signature::VideoSignature;
use crate::terminal_output;
use crate::utils::{display_name, format_duration};

use super::sampler::TemporalSampler;
use super::scaling::{compute_output_size, downscale_rgb};
use super::writer::{clear_frames, frame_path, frames_present, write_frame};

/// Per-call switches for `extract_video`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Ignore the ledger and regenerate frames from scratch.
    pub overwrite: bool,
    /// Draw a progress bar while decoding (only on a terminal).
    pub show_progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            show_progress: true,
        }
    }
}

/// Result of extracting one video.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    /// Frames were decoded and written, and the ledger was committed.
    Extracted {
        frames: u64,
        output_dir: PathBuf,
        backend: DecodeBackend,
    },
    /// Nothing was done; the reason says why.
    Skipped(SkipReason),
}

impl ExtractOutcome {
    /// Number of frames written by this call (0 for skips).
    #[must_use]
    pub fn frames_saved(&self) -> u64 {
        match self {
            Self::Extracted { frames, .. } => *frames,
            Self::Skipped(_) => 0,
        }
    }
}

/// Samples `video` into `output_dir` according to `settings`.
///
/// Frames are named `{stem}_{index:06}.{ext}` with indices contiguous from 0.
///
/// # Errors
///
/// * `InvalidSettings` - target rate or quality out of range
/// * `NotFound` - the video does not exist
/// * `DecodeOpen` - no decode backend could open the video
/// * `FrameWrite` - a sampled frame could not be resized, encoded or written
pub fn extract_video<S: FrameSource>(
    source: &S,
    video: &Path,
    output_dir: &Path,
    settings: &ExtractionSettings,
    options: &ExtractOptions,
) -> CoreResult<ExtractOutcome> {
    settings.validate()?;

    let signature = VideoSignature::from_path(video)?;
    let desired = DesiredState::new(signature, settings);
    let name = display_name(video);
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| CoreError::PathError(format!("No file stem in {}", video.display())))?;

    std::fs::create_dir_all(output_dir)?;
    let ledger_path = output_dir.join(LEDGER_FILE_NAME);

    let previous = ledger::load(&ledger_path);
    let decision = CacheDecision::evaluate(
        previous.as_ref(),
        &desired,
        frames_present(output_dir, settings.format),
        options.overwrite,
    );
    if let CacheDecision::Skip(reason) = decision {
        log::debug!("Skipping {}: {}", name, reason);
        return Ok(ExtractOutcome::Skipped(reason));
    }

    let info = source.probe(video).map_err(|e| match e {
        e @ CoreError::DecodeOpen { .. } => e,
        other => decode_open_error(video, other.to_string()),
    })?;
    let (reader, backend) = open_with_fallback(source, video)?;

    let sampler = TemporalSampler::new(info.fps, settings.target_fps);
    let (out_w, out_h) = compute_output_size(info.width, info.height, settings.max_width);
    terminal_output::print_sub_item(&stream_line(
        &name,
        &info,
        sampler.source_fps(),
        (out_w, out_h),
        settings.target_fps,
        backend,
    ));

    if options.overwrite {
        match std::fs::remove_file(&ledger_path) {
            Ok(()) => log::debug!("Removed previous ledger {}", ledger_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let removed = clear_frames(output_dir, settings.format);
        log::debug!("Cleared {} existing frame(s) in {}", removed, output_dir.display());
    }

    let progress = terminal_output::frame_progress_bar(&stem, info.total_frames, options.show_progress);
    let sampled = sample_frames(reader, sampler, output_dir, &stem, settings, |_| progress.inc(1));
    progress.finish_and_clear();
    let frames = sampled?;

    ledger::save(&ledger_path, &ExtractionLedger::new(desired, frames))?;
    terminal_output::print_sub_item(&format!(
        "Saved {} frames to {}",
        frames,
        output_dir.display()
    ));

    Ok(ExtractOutcome::Extracted {
        frames,
        output_dir: output_dir.to_path_buf(),
        backend,
    })
}

/// Per-video info line: source rate, size and duration, then output geometry.
fn stream_line(
    name: &str,
    info: &VideoStreamInfo,
    source_fps: f64,
    (out_w, out_h): (u32, u32),
    target_fps: f64,
    backend: DecodeBackend,
) -> String {
    let duration = info
        .duration_secs
        .map_or_else(|| "unknown".to_string(), format_duration);
    format!(
        "[{}] src_fps={:.2} size={}x{} dur={} -> scale={:.3} out={}x{} @ {} fps ({})",
        name,
        source_fps,
        info.width,
        info.height,
        duration,
        f64::from(out_w) / f64::from(info.width.max(1)),
        out_w,
        out_h,
        target_fps,
        backend
    )
}

/// Runs the decode loop, returning the number of frames written.
fn sample_frames<R: FrameReader>(
    reader: R,
    mut sampler: TemporalSampler,
    output_dir: &Path,
    stem: &str,
    settings: &ExtractionSettings,
    mut on_decoded: impl FnMut(u64),
) -> CoreResult<u64> {
    let mut saved = 0u64;

    for frame in FrameIter::new(reader) {
        let frame = frame?;
        on_decoded(frame.index);
        if !sampler.should_sample(frame.index) {
            continue;
        }

        let path = frame_path(output_dir, stem, saved, settings.format);
        let (w, h) = compute_output_size(frame.width, frame.height, settings.max_width);
        let data = downscale_rgb(frame.data, frame.width, frame.height, w, h)
            .map_err(|e| frame_write_error(&path, e))?;
        write_frame(&path, &data, w, h, settings)?;
        saved += 1;
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(duration_secs: Option<f64>) -> VideoStreamInfo {
        VideoStreamInfo {
            width: 1920,
            height: 1080,
            fps: 59.94,
            total_frames: Some(600),
            duration_secs,
        }
    }

    #[test]
    fn test_stream_line_reports_duration_and_geometry() {
        let line = stream_line(
            "serve.mp4",
            &info(Some(125.4)),
            59.94,
            (1280, 720),
            10.0,
            DecodeBackend::Software,
        );
        assert_eq!(
            line,
            "[serve.mp4] src_fps=59.94 size=1920x1080 dur=00:02:05 -> scale=0.667 out=1280x720 @ 10 fps (software)"
        );
    }

    #[test]
    fn test_stream_line_without_container_duration() {
        let line = stream_line("serve.mov", &info(None), 30.0, (1920, 1080), 10.0, DecodeBackend::Software);
        assert!(line.contains("dur=unknown"), "{line}");
        assert!(line.contains("scale=1.000"), "{line}");
    }
}
