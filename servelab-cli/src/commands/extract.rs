// ============================================================================
// servelab-cli/src/commands/extract.rs
// ============================================================================
//
// EXTRACT COMMAND: Batch frame extraction from a videos folder
//
// Maps the parsed arguments onto a core configuration, discovers videos,
// runs the batch through the ffmpeg frame source and prints the total.
// Per-video lines are emitted by the core as each video finishes.

use crate::cli::ExtractArgs;
use crate::error::CliResult;
use console::style;
use servelab_core::config::CoreConfigBuilder;
use servelab_core::{CoreConfig, CoreError, FfmpegFrameSource, find_processable_files, process_videos};
use std::path::PathBuf;

/// Builds the core configuration described by `args`.
pub fn build_config(args: &ExtractArgs) -> CliResult<CoreConfig> {
    CoreConfigBuilder::new()
        .videos_dir(args.videos_dir.clone())
        .output_root(args.output_root.clone())
        .target_fps(args.fps)
        .format(args.ext)
        .quality(args.quality)
        .max_width(args.max_width)
        .overwrite(args.overwrite)
        .prefer_hardware_decode(!args.no_hwaccel)
        .jobs(args.jobs)
        .build()
}

/// Discovers videos for `config`.
///
/// An existing folder without supported videos yields an empty list.
pub fn discover_videos(config: &CoreConfig) -> CliResult<Vec<PathBuf>> {
    match find_processable_files(&config.videos_dir) {
        Ok(files) => Ok(files),
        Err(CoreError::NoFilesFound) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Runs the `extract` command and returns the total number of frames saved.
pub fn run_extract(args: &ExtractArgs) -> CliResult<u64> {
    let config = build_config(args)?;
    let files = discover_videos(&config)?;

    if files.is_empty() {
        log::info!("No videos found in {}", config.videos_dir.display());
        return Ok(0);
    }

    let source = FfmpegFrameSource::new(config.decode);
    let summary = process_videos(&source, &config, &files)?;
    let total = summary.total_frames_saved();

    if summary.failed_count() > 0 {
        log::warn!(
            "{} of {} video(s) failed; see messages above",
            summary.failed_count(),
            summary.reports.len()
        );
    }
    log::info!("");
    log::info!("{} Total frames saved: {}", style("Done.").bold(), total);
    Ok(total)
}
