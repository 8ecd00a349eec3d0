//! Filesystem fingerprint of a source video.
//!
//! The signature is derived from metadata only (no decoding) and is compared
//! against the ledger to detect that a source file was replaced or touched
//! since its frames were extracted.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, not_found_error};

/// Identity of a source video: absolute path, byte size and modification time.
///
/// Two signatures are equal iff all three fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSignature {
    #[serde(rename = "src")]
    pub path: PathBuf,

    #[serde(rename = "src_size")]
    pub size_bytes: u64,

    /// Modification time in nanoseconds relative to the Unix epoch.
    #[serde(rename = "src_mtime_ns")]
    pub modified_ns: i64,
}

impl VideoSignature {
    /// Stats `path` and builds its signature.
    ///
    /// Fails with `CoreError::NotFound` when the file is missing or unreadable.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let absolute = path
            .canonicalize()
            .map_err(|e| not_found_error(path, e))?;
        let metadata = std::fs::metadata(&absolute).map_err(|e| not_found_error(path, e))?;
        let modified = metadata.modified().map_err(|e| not_found_error(path, e))?;

        Ok(Self {
            path: absolute,
            size_bytes: metadata.len(),
            modified_ns: system_time_to_ns(modified)?,
        })
    }
}

fn system_time_to_ns(time: SystemTime) -> CoreResult<i64> {
    let ns = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i128::try_from(after.as_nanos()).unwrap_or(i128::MAX),
        Err(before) => -i128::try_from(before.duration().as_nanos()).unwrap_or(i128::MAX),
    };
    i64::try_from(ns).map_err(|_| {
        CoreError::OperationFailed(format!("modification time out of range: {ns} ns"))
    })
}
