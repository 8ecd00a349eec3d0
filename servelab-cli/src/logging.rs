// ============================================================================
// servelab-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and run-log dispatch through fern
//
// Every message from the `log` facade goes to stdout unchanged. When a run
// log is requested the same messages are also appended to the file with a
// timestamp and level, ANSI styling removed.

use crate::error::{CliErrorContext, CliResult};
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// use servelab_cli::logging::get_timestamp;
/// let log_filename = format!("servelab_extract_run_{}.log", get_timestamp());
/// assert!(log_filename.ends_with(".log"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of a new run log inside `log_dir`.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("servelab_extract_run_{}.log", get_timestamp()))
}

/// Installs the global logger.
///
/// Can only succeed once per process.
pub fn setup_logging(level: LevelFilter, log_file: Option<&Path>) -> CliResult<()> {
    let console = fern::Dispatch::new()
        .format(|out, message, _record| out.finish(format_args!("{message}")))
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .cli_with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    let plain = strip_ansi_escapes::strip_str(message.to_string());
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        plain
                    ))
                })
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|e| servelab_core::CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
    }

    #[test]
    fn test_run_log_path_naming() {
        let path = run_log_path(Path::new("out/logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("servelab_extract_run_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("out/logs")));
    }
}
