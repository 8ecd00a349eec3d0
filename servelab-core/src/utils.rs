//! Utility functions for formatting and file operations.
//!
//! General-purpose helpers shared by the extraction pipeline and the CLI:
//! duration formatting, video-file recognition and frame-file listing.

use std::path::{Path, PathBuf};

use crate::config::VIDEO_EXTENSIONS;

/// Checks if the given path is a video file the pipeline accepts.
/// Supported extensions are matched case-insensitively.
#[must_use]
pub fn is_valid_video_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext_str| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|supported| ext_str.eq_ignore_ascii_case(supported))
            })
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Returns the file name of `path` as a lossy string, or the whole path when
/// it has no file name component.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Lists regular files in `dir` (top level only) whose extension equals `ext`.
///
/// The comparison is exact, matching a `*.{ext}` glob. A missing or
/// unreadable directory yields an empty list. Results are sorted.
#[must_use]
pub fn list_files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_is_valid_video_file() {
        let dir = tempdir().unwrap();
        for name in ["a.mp4", "b.MOV", "c.Avi", "d.mkv", "e.webm", "f.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }

        assert!(is_valid_video_file(&dir.path().join("a.mp4")));
        assert!(is_valid_video_file(&dir.path().join("b.MOV")));
        assert!(is_valid_video_file(&dir.path().join("c.Avi")));
        assert!(is_valid_video_file(&dir.path().join("d.mkv")));
        assert!(!is_valid_video_file(&dir.path().join("e.webm")));
        assert!(!is_valid_video_file(&dir.path().join("f.txt")));
        assert!(!is_valid_video_file(&dir.path().join("missing.mp4")));
        assert!(!is_valid_video_file(dir.path()));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.0), "00:00:59");
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_list_files_with_extension_is_exact_and_sorted() {
        let dir = tempdir().unwrap();
        for name in ["s_000001.jpg", "s_000000.jpg", "s_000002.JPG", "s.png", "_frames.meta.json"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let files = list_files_with_extension(dir.path(), "jpg");
        let names: Vec<_> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["s_000000.jpg", "s_000001.jpg"]);

        assert!(list_files_with_extension(&dir.path().join("absent"), "jpg").is_empty());
    }
}
