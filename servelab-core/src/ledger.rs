// ============================================================================
// servelab-core/src/ledger.rs
// ============================================================================
//
// EXTRACTION LEDGER: Per-directory record of how its frames were produced
//
// Each output directory carries one `_frames.meta.json` describing the source
// signature and extraction settings that produced the frames currently in it,
// plus the frame count and creation time. The ledger is the sole source of
// truth for "was this directory produced by this exact configuration".
//
// KEY COMPONENTS:
// - DesiredState: the cache key (signature + settings)
// - ExtractionLedger: the persisted record
// - load / save / matches: tolerant read, atomic replace, key comparison
// - CacheDecision::evaluate: the skip policy consulted before any decoding happens
//
// A ledger is only ever written after a complete extraction, so a directory
// holding a partial run never looks like a valid cache entry.

// ---- External crate imports ----
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::fmt;
use std::io::Write;
use std::path::Path;

// ---- Internal crate imports ----
use crate::config::{ExtractionSettings, ImageFormat};
use crate::error::CoreResult;
use crate::signature::VideoSignature;

/// File name of the ledger inside each output directory.
pub const LEDGER_FILE_NAME: &str = "_frames.meta.json";

// ============================================================================
// DATA MODEL
// ============================================================================

/// Source signature combined with the requested settings: the cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(flatten)]
    pub signature: VideoSignature,

    #[serde(rename = "fps_target")]
    pub target_fps: f64,

    #[serde(rename = "ext")]
    pub format: ImageFormat,

    pub quality: u8,

    #[serde(rename = "max_w")]
    pub max_width: u32,
}

impl DesiredState {
    /// Combines a video signature with extraction settings.
    #[must_use]
    pub fn new(signature: VideoSignature, settings: &ExtractionSettings) -> Self {
        Self {
            signature,
            target_fps: settings.target_fps,
            format: settings.format,
            quality: settings.quality,
            max_width: settings.max_width,
        }
    }
}

/// Persisted record of a completed extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionLedger {
    #[serde(flatten)]
    pub desired: DesiredState,

    /// Number of frames actually written by the run.
    pub frames: u64,

    /// UTC creation time, ISO-8601 with a `Z` suffix.
    pub created: String,
}

impl ExtractionLedger {
    /// Creates a ledger entry stamped with the current UTC time.
    #[must_use]
    pub fn new(desired: DesiredState, frames: u64) -> Self {
        Self {
            desired,
            frames,
            created: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        }
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

/// Reads the ledger at `path`.
///
/// Returns `None` when the file is missing or cannot be parsed; a corrupt
/// ledger only means there is no usable cache.
pub fn load(path: &Path) -> Option<ExtractionLedger> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("Ignoring unreadable ledger {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(ledger) => Some(ledger),
        Err(e) => {
            log::warn!("Ignoring malformed ledger {}: {}", path.display(), e);
            None
        }
    }
}

/// Writes `ledger` to `path`, fully replacing any existing file.
///
/// The record goes to a temporary file in the same directory which is synced
/// and then renamed over `path`, so readers see either the old or the new
/// ledger and never a partial write.
pub fn save(path: &Path, ledger: &ExtractionLedger) -> CoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let json = serde_json::to_string_pretty(ledger)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".frames.meta.")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(json.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    log::debug!(
        "Ledger written to {} ({} frames)",
        path.display(),
        ledger.frames
    );
    Ok(())
}

/// True iff every field of `desired` equals the ledger's recorded value.
///
/// `frames` and `created` are not part of the key and are ignored.
#[must_use]
pub fn matches(ledger: &ExtractionLedger, desired: &DesiredState) -> bool {
    ledger.desired == *desired
}

// ============================================================================
// SKIP POLICY
// ============================================================================

/// Why an extraction was skipped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The ledger matches the requested state exactly.
    CacheHit,
    /// A ledger exists but was produced with different settings or source.
    SettingsDrift,
    /// Frames with the target extension exist but no ledger describes them.
    UnledgeredFrames,
}

impl SkipReason {
    /// One-line operator message naming the video and the remedy.
    #[must_use]
    pub fn message(self, video_name: &str, settings: &ExtractionSettings) -> String {
        match self {
            Self::CacheHit => format!(
                "Skip {video_name} (already extracted @ {} fps, ext={}). Use --overwrite to redo.",
                settings.target_fps, settings.format
            ),
            Self::SettingsDrift => format!(
                "Found existing frames for {video_name} but settings differ. Use --overwrite to regenerate."
            ),
            Self::UnledgeredFrames => {
                format!("Skip {video_name} (frames exist). Use --overwrite to redo.")
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CacheHit => "already extracted",
            Self::SettingsDrift => "settings differ",
            Self::UnledgeredFrames => "frames exist without ledger",
        };
        f.write_str(text)
    }
}

/// Outcome of consulting the ledger before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Proceed,
    Skip(SkipReason),
}

impl CacheDecision {
    /// Applies the skip policy.
    ///
    /// With `overwrite` the answer is always `Proceed`. Otherwise any existing
    /// ledger causes a skip (hit or drift), and so do frames without a ledger.
    #[must_use]
    pub fn evaluate(
        previous: Option<&ExtractionLedger>,
        desired: &DesiredState,
        frames_present: bool,
        overwrite: bool,
    ) -> Self {
        if overwrite {
            return Self::Proceed;
        }

        match previous {
            Some(ledger) if matches(ledger, desired) => Self::Skip(SkipReason::CacheHit),
            Some(_) => Self::Skip(SkipReason::SettingsDrift),
            None if frames_present => Self::Skip(SkipReason::UnledgeredFrames),
            None => Self::Proceed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn desired() -> DesiredState {
        DesiredState {
            signature: VideoSignature {
                path: PathBuf::from("/videos/serve.mp4"),
                size_bytes: 1_048_576,
                modified_ns: 1_700_000_000_123_456_789,
            },
            target_fps: 10.0,
            format: ImageFormat::Jpg,
            quality: 95,
            max_width: 1280,
        }
    }

    #[test]
    fn test_save_then_load_uses_ledger_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);
        let ledger = ExtractionLedger::new(desired(), 42);

        save(&path, &ledger).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for key in [
            "src",
            "src_size",
            "src_mtime_ns",
            "fps_target",
            "ext",
            "quality",
            "max_w",
            "frames",
            "created",
        ] {
            assert!(raw.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(raw["ext"], "jpg");
        assert!(raw["created"].as_str().unwrap().ends_with('Z'));

        assert_eq!(load(&path), Some(ledger));
    }

    #[test]
    fn test_reloaded_ledger_matches_arbitrary_target_rates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);

        for fps in [13.648928992825693, 29.97002997002997, 0.1 + 0.2, 119.99999999999999] {
            let mut state = desired();
            state.target_fps = fps;
            save(&path, &ExtractionLedger::new(state.clone(), 3)).unwrap();

            let reloaded = load(&path).unwrap();
            assert_eq!(reloaded.desired.target_fps.to_bits(), fps.to_bits(), "{fps}");
            assert!(matches(&reloaded, &state), "{fps}");
        }
    }

    #[test]
    fn test_save_replaces_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);
        save(&path, &ExtractionLedger::new(desired(), 1)).unwrap();
        save(&path, &ExtractionLedger::new(desired(), 2)).unwrap();

        assert_eq!(load(&path).unwrap().frames, 2);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_load_treats_missing_and_corrupt_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LEDGER_FILE_NAME);
        assert!(load(&path).is_none());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_none());

        std::fs::write(&path, r#"{"src": "/x", "frames": 3}"#).unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_matches_ignores_frames_and_created() {
        let mut ledger = ExtractionLedger::new(desired(), 7);
        ledger.created = "2020-01-01T00:00:00Z".to_string();
        assert!(matches(&ledger, &desired()));

        let mut changed = desired();
        changed.quality = 90;
        assert!(!matches(&ledger, &changed));

        let mut touched = desired();
        touched.signature.modified_ns += 1;
        assert!(!matches(&ledger, &touched));
    }

    #[test]
    fn test_evaluate_policy() {
        let ledger = ExtractionLedger::new(desired(), 5);
        let mut other = desired();
        other.max_width = 0;

        assert_eq!(
            CacheDecision::evaluate(Some(&ledger), &desired(), true, false),
            CacheDecision::Skip(SkipReason::CacheHit)
        );
        assert_eq!(
            CacheDecision::evaluate(Some(&ledger), &other, true, false),
            CacheDecision::Skip(SkipReason::SettingsDrift)
        );
        assert_eq!(
            CacheDecision::evaluate(None, &desired(), true, false),
            CacheDecision::Skip(SkipReason::UnledgeredFrames)
        );
        assert_eq!(CacheDecision::evaluate(None, &desired(), false, false), CacheDecision::Proceed);
        assert_eq!(
            CacheDecision::evaluate(Some(&ledger), &desired(), true, true),
            CacheDecision::Proceed
        );
    }

    #[test]
    fn test_skip_messages_name_the_video() {
        let settings = ExtractionSettings::default();
        let msg = SkipReason::CacheHit.message("serve.mp4", &settings);
        assert_eq!(
            msg,
            "Skip serve.mp4 (already extracted @ 10 fps, ext=jpg). Use --overwrite to redo."
        );
        assert!(SkipReason::SettingsDrift
            .message("serve.mp4", &settings)
            .contains("settings differ"));
    }
}
