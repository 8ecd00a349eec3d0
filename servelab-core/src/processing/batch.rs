// ============================================================================
// servelab-core/src/processing/batch.rs
// ============================================================================
//
// BATCH ORCHESTRATION: Extracting frames from a list of videos
//
// Each video goes to `{output_root}/{stem}/`. Failures are recorded per video
// and never abort the batch. With `jobs > 1` distinct videos are processed on
// a dedicated rayon pool. Videos that resolve to the same output directory run
// one after another in input order, and frames of a single video are always
// decoded and written sequentially, so every ledger has exactly one writer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::{CoreConfig, ExtractionSettings};
use crate::error::{CoreError, CoreResult};
use crate::external::FrameSource;
use crate::ledger::SkipReason;
use crate::terminal_output;
use crate::utils::{display_name, format_duration};

use super::extract::{ExtractOptions, ExtractOutcome, extract_video};

/// What happened to one video in a batch.
#[derive(Debug)]
pub enum VideoStatus {
    Extracted { frames: u64 },
    Skipped(SkipReason),
    Failed(CoreError),
}

/// Per-video entry of a `BatchSummary`.
#[derive(Debug)]
pub struct VideoReport {
    pub video: PathBuf,
    pub output_dir: PathBuf,
    pub status: VideoStatus,
    pub elapsed: Duration,
}

impl VideoReport {
    #[must_use]
    pub fn frames_saved(&self) -> u64 {
        match self.status {
            VideoStatus::Extracted { frames } => frames,
            _ => 0,
        }
    }

    /// One-line description naming the video and the outcome.
    #[must_use]
    pub fn message(&self, settings: &ExtractionSettings) -> String {
        let name = display_name(&self.video);
        match &self.status {
            VideoStatus::Extracted { frames } => format!(
                "{name}: saved {frames} frames to {} in {}",
                self.output_dir.display(),
                format_duration(self.elapsed.as_secs_f64())
            ),
            VideoStatus::Skipped(reason) => reason.message(&name, settings),
            VideoStatus::Failed(err) => format!("{name} failed: {err}"),
        }
    }
}

/// Outcome of a batch run, one report per input video in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<VideoReport>,
}

impl BatchSummary {
    /// Sum of frames written across the batch.
    #[must_use]
    pub fn total_frames_saved(&self) -> u64 {
        self.reports.iter().map(VideoReport::frames_saved).sum()
    }

    #[must_use]
    pub fn extracted_count(&self) -> usize {
        self.count(|s| matches!(s, VideoStatus::Extracted { .. }))
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, VideoStatus::Skipped(_)))
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, VideoStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&VideoStatus) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Extracts frames from every video in `files_to_process`.
///
/// Only an invalid `config` (or a failure to build the thread pool) is an
/// error; per-video problems are reported in the summary.
pub fn process_videos<S: FrameSource>(
    source: &S,
    config: &CoreConfig,
    files_to_process: &[PathBuf],
) -> CoreResult<BatchSummary> {
    config.validate()?;

    terminal_output::print_section("Frame extraction");
    terminal_output::print_status("Videos", &files_to_process.len().to_string(), true);
    terminal_output::print_status("Output", &config.output_root.display().to_string(), false);
    terminal_output::print_status(
        "Sampling",
        &format!(
            "{} fps, {} (quality {}), max width {}",
            config.settings.target_fps,
            config.settings.format,
            config.settings.quality,
            config.settings.max_width
        ),
        false,
    );

    let options = ExtractOptions {
        overwrite: config.overwrite,
        show_progress: config.jobs == 1,
    };
    let run_one = |video: &PathBuf| process_one(source, config, &options, video);

    let reports: Vec<VideoReport> = if config.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
            .map_err(|e| CoreError::OperationFailed(format!("Failed to build thread pool: {e}")))?;
        let groups = group_by_output_dir(config, files_to_process);
        let mut indexed: Vec<(usize, VideoReport)> = pool.install(|| {
            groups
                .par_iter()
                .flat_map_iter(|group| {
                    group
                        .iter()
                        .map(|&i| (i, run_one(&files_to_process[i])))
                        .collect::<Vec<_>>()
                })
                .collect()
        });
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, report)| report).collect()
    } else {
        files_to_process.iter().map(run_one).collect()
    };

    let summary = BatchSummary { reports };
    log::debug!(
        "Batch finished: {} extracted, {} skipped, {} failed",
        summary.extracted_count(),
        summary.skipped_count(),
        summary.failed_count()
    );
    Ok(summary)
}

/// Partitions input indices by output directory, keeping input order inside
/// each group and ordering groups by first appearance.
///
/// Videos sharing a stem (`serve.mp4`, `serve.mov`) share a directory and
/// must not run concurrently.
fn group_by_output_dir(config: &CoreConfig, files: &[PathBuf]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, video) in files.iter().enumerate() {
        let slot = *slots.entry(config.output_dir_for(video)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }
    groups
}

fn process_one<S: FrameSource>(
    source: &S,
    config: &CoreConfig,
    options: &ExtractOptions,
    video: &Path,
) -> VideoReport {
    let start = Instant::now();
    let output_dir = config.output_dir_for(video);
    terminal_output::print_processing(&display_name(video));

    let status = match extract_video(source, video, &output_dir, &config.settings, options) {
        Ok(ExtractOutcome::Extracted { frames, .. }) => VideoStatus::Extracted { frames },
        Ok(ExtractOutcome::Skipped(reason)) => VideoStatus::Skipped(reason),
        Err(e) => VideoStatus::Failed(e),
    };

    let report = VideoReport {
        video: video.to_path_buf(),
        output_dir,
        status,
        elapsed: start.elapsed(),
    };

    let message = report.message(&config.settings);
    match report.status {
        VideoStatus::Extracted { .. } => terminal_output::print_success(&message),
        VideoStatus::Skipped(_) => terminal_output::print_skip(&message),
        VideoStatus::Failed(_) => terminal_output::print_failure(&message),
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_stem_videos_share_a_group() {
        let config = CoreConfig {
            output_root: PathBuf::from("/frames"),
            ..CoreConfig::default()
        };
        let files: Vec<PathBuf> = ["/v/a.mp4", "/v/serve.mov", "/v/b.mkv", "/v/serve.mp4"]
            .iter()
            .map(PathBuf::from)
            .collect();

        assert_eq!(
            group_by_output_dir(&config, &files),
            vec![vec![0], vec![1, 3], vec![2]]
        );
    }
}
