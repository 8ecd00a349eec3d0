//! FFprobe integration for reading video stream properties.
//!
//! Only the first video stream is inspected. The frame rate comes from
//! `avg_frame_rate`, then `r_frame_rate`; when neither yields a positive rate
//! the fallback rate from the config module is used.

use std::path::Path;

use ffprobe::{FfProbeError, ffprobe};

use super::VideoStreamInfo;
use crate::config::DEFAULT_FALLBACK_FPS;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};

/// Probes the primary video stream of `input_path`.
pub fn probe_video_stream(input_path: &Path) -> CoreResult<VideoStreamInfo> {
    log::debug!(
        "Running ffprobe (via crate) for stream info on: {}",
        input_path.display()
    );

    let metadata = ffprobe(input_path).map_err(|err| {
        log::debug!("ffprobe failed on {}: {:?}", input_path.display(), err);
        map_ffprobe_error(err, "stream info")
    })?;

    let stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!("No video stream found in {}", input_path.display()))
        })?;

    let dimension = |value: Option<i64>, name: &str| -> CoreResult<u32> {
        value
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "Video stream has no usable {name} in {}",
                    input_path.display()
                ))
            })
    };
    let width = dimension(stream.width, "width")?;
    let height = dimension(stream.height, "height")?;

    let fps = parse_frame_rate(&stream.avg_frame_rate)
        .or_else(|| parse_frame_rate(&stream.r_frame_rate))
        .unwrap_or_else(|| {
            log::warn!(
                "No frame rate reported for {}, assuming {} fps",
                input_path.display(),
                DEFAULT_FALLBACK_FPS
            );
            DEFAULT_FALLBACK_FPS
        });

    let total_frames = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok());
    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());

    Ok(VideoStreamInfo {
        width,
        height,
        fps,
        total_frames,
        duration_secs,
    })
}

/// Parses an ffprobe rate such as `"30000/1001"` or `"25"`.
///
/// Returns `None` for zero, negative, non-finite or malformed rates
/// (ffprobe reports unknown rates as `"0/0"`).
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
