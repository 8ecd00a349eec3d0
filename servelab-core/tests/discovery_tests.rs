// servelab-core/tests/discovery_tests.rs

use servelab_core::discovery::find_processable_files;
use servelab_core::error::CoreError;
use std::fs::{self, File};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_find_processable_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let videos_dir = dir.path();

    File::create(videos_dir.join("serve_b.mp4"))?;
    File::create(videos_dir.join("serve_a.MOV"))?; // Test case insensitivity
    File::create(videos_dir.join("rally.avi"))?;
    File::create(videos_dir.join("match.mkv"))?;
    File::create(videos_dir.join("notes.txt"))?;
    File::create(videos_dir.join("clip.webm"))?;
    fs::create_dir(videos_dir.join("nested"))?;
    File::create(videos_dir.join("nested").join("deep.mp4"))?; // Top level only

    let files = find_processable_files(videos_dir)?;
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["match.mkv", "rally.avi", "serve_a.MOV", "serve_b.mp4"]);

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_processable_files_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("document.txt"))?;

    match find_processable_files(dir.path()) {
        Err(CoreError::NoFilesFound) => {}
        other => panic!("Unexpected result: {:?}", other),
    }

    dir.close()?;
    Ok(())
}

#[test]
fn test_find_processable_files_nonexistent_dir() {
    let missing = PathBuf::from("surely_this_does_not_exist_42_integration");
    let result = find_processable_files(&missing);
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}
