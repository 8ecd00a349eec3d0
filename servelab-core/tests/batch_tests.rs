// servelab-core/tests/batch_tests.rs

use servelab_core::config::CoreConfigBuilder;
use servelab_core::error::CoreError;
use servelab_core::external::mocks::{SyntheticFrameSource, SyntheticVideo};
use servelab_core::ledger::SkipReason;
use servelab_core::processing::{VideoStatus, process_videos};
use servelab_core::{CoreConfig, find_processable_files};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn create_videos(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"placeholder").expect("Failed to create video file");
    }
}

fn source() -> SyntheticFrameSource {
    SyntheticFrameSource::new()
        .with_video("a_serve.mp4", SyntheticVideo::new(32, 18, 30.0, 30))
        .with_video("c_serve.mov", SyntheticVideo::new(32, 18, 60.0, 120))
    // b_broken.avi is unknown to the source and cannot be opened
}

fn config(videos: &Path, out: &Path, jobs: usize) -> CoreConfig {
    CoreConfigBuilder::new()
        .videos_dir(videos.to_path_buf())
        .output_root(out.to_path_buf())
        .target_fps(10.0)
        .max_width(0)
        .jobs(jobs)
        .build()
        .expect("valid config")
}

#[test]
fn test_failure_is_isolated_per_video() -> Result<(), Box<dyn std::error::Error>> {
    let videos = tempdir()?;
    let out = tempdir()?;
    create_videos(videos.path(), &["c_serve.mov", "a_serve.mp4", "b_broken.avi"]);

    let config = config(videos.path(), out.path(), 1);
    let files = find_processable_files(&config.videos_dir)?;
    let summary = process_videos(&source(), &config, &files)?;

    assert_eq!(summary.reports.len(), 3);
    assert!(matches!(
        summary.reports[0].status,
        VideoStatus::Extracted { frames: 10 }
    ));
    assert!(matches!(
        summary.reports[1].status,
        VideoStatus::Failed(CoreError::DecodeOpen { .. })
    ));
    assert!(matches!(
        summary.reports[2].status,
        VideoStatus::Extracted { frames: 20 }
    ));
    assert_eq!(summary.total_frames_saved(), 30);
    assert_eq!(summary.failed_count(), 1);

    assert!(out.path().join("a_serve").join("_frames.meta.json").exists());
    assert!(out.path().join("c_serve").join("c_serve_000019.jpg").exists());
    assert!(!out.path().join("b_broken").join("_frames.meta.json").exists());

    let message = summary.reports[1].message(&config.settings);
    assert!(message.contains("b_broken.avi"), "{message}");
    Ok(())
}

#[test]
fn test_rerun_skips_everything_extracted() -> Result<(), Box<dyn std::error::Error>> {
    let videos = tempdir()?;
    let out = tempdir()?;
    create_videos(videos.path(), &["a_serve.mp4", "c_serve.mov"]);

    let config = config(videos.path(), out.path(), 1);
    let files = find_processable_files(&config.videos_dir)?;
    process_videos(&source(), &config, &files)?;
    let summary = process_videos(&source(), &config, &files)?;

    assert_eq!(summary.total_frames_saved(), 0);
    assert_eq!(summary.skipped_count(), 2);
    for report in &summary.reports {
        assert!(matches!(report.status, VideoStatus::Skipped(SkipReason::CacheHit)));
        assert!(report.message(&config.settings).starts_with("Skip "));
    }
    Ok(())
}

#[test]
fn test_parallel_jobs_keep_input_order() -> Result<(), Box<dyn std::error::Error>> {
    let videos = tempdir()?;
    let out = tempdir()?;
    create_videos(videos.path(), &["a_serve.mp4", "b_broken.avi", "c_serve.mov"]);

    let config = config(videos.path(), out.path(), 3);
    let files = find_processable_files(&config.videos_dir)?;
    let summary = process_videos(&source(), &config, &files)?;

    let order: Vec<_> = summary.reports.iter().map(|r| r.video.clone()).collect();
    assert_eq!(order, files);
    assert_eq!(summary.total_frames_saved(), 30);
    assert_eq!(summary.extracted_count(), 2);
    Ok(())
}

#[test]
fn test_same_stem_videos_never_share_a_writer() -> Result<(), Box<dyn std::error::Error>> {
    let source = SyntheticFrameSource::new()
        .with_video("serve.mov", SyntheticVideo::new(16, 16, 30.0, 30))
        .with_video("serve.mp4", SyntheticVideo::new(8, 8, 30.0, 600))
        .with_video("volley.mkv", SyntheticVideo::new(8, 8, 30.0, 60));

    for _ in 0..5 {
        let videos = tempdir()?;
        let out = tempdir()?;
        create_videos(videos.path(), &["serve.mp4", "serve.mov", "volley.mkv"]);

        let config = config(videos.path(), out.path(), 2);
        let files = find_processable_files(&config.videos_dir)?;
        let summary = process_videos(&source, &config, &files)?;

        // Sorted input: serve.mov, serve.mp4, volley.mkv
        assert!(matches!(
            summary.reports[0].status,
            VideoStatus::Extracted { frames: 10 }
        ));
        assert!(matches!(
            summary.reports[1].status,
            VideoStatus::Skipped(SkipReason::SettingsDrift)
        ));
        assert!(matches!(
            summary.reports[2].status,
            VideoStatus::Extracted { frames: 20 }
        ));

        let serve_dir = out.path().join("serve");
        let ledger = servelab_core::ledger::load(&serve_dir.join("_frames.meta.json"))
            .expect("ledger written");
        let on_disk = servelab_core::utils::list_files_with_extension(&serve_dir, "jpg").len();
        assert_eq!(ledger.frames, on_disk as u64);
    }
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = CoreConfig {
        jobs: 0,
        ..CoreConfig::default()
    };
    let result = process_videos(&source(), &config, &[]);
    assert!(matches!(result, Err(CoreError::InvalidSettings(_))));
}
