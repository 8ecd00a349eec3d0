//! File discovery module for finding videos to sample.
//!
//! Searches the top level of the videos folder for supported files
//! (`.mp4`, `.mov`, `.avi`, `.mkv`, case-insensitive) and returns them sorted
//! by path so batches are processed in a stable order.

use crate::error::{CoreError, CoreResult, not_found_error};
use crate::utils::is_valid_video_file;

use std::path::{Path, PathBuf};

/// Finds video files eligible for extraction in `videos_dir`.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Sorted paths of the discovered videos
/// * `Err(CoreError::NotFound)` - If the folder does not exist or cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no supported videos are present
///
/// # Examples
///
/// ```rust,no_run
/// use servelab_core::find_processable_files;
/// use std::path::Path;
///
/// match find_processable_files(Path::new("data/raw/videos")) {
///     Ok(files) => println!("Found {} videos", files.len()),
///     Err(e) => println!("Error finding videos: {}", e),
/// }
/// ```
pub fn find_processable_files(videos_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(videos_dir).map_err(|e| not_found_error(videos_dir, e))?;

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            is_valid_video_file(&path).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort();
    log::debug!(
        "Discovered {} video(s) in {}",
        files.len(),
        videos_dir.display()
    );
    Ok(files)
}
