//! Simple terminal output functions for servelab-core.
//!
//! Hierarchical status lines are emitted through `log::info!` so they reach
//! both the console and the run log. Per-video progress bars draw on stderr
//! only when it is a terminal.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a section header (Level 1 - Main sections with cyan color)
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a processing step (Level 2 - 2 spaces indentation and bold)
pub fn print_processing(message: &str) {
    if should_use_color() {
        info!("  {} {}", "»", style(message).bold());
    } else {
        info!("  » {}", message);
    }
}

/// Print a status line (Level 4 - Primary info with 6 spaces indentation)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let padding = status_padding(label);

    if should_use_color() && highlight {
        info!(
            "      {}:{} {}",
            label,
            " ".repeat(padding),
            style(value).bold()
        );
    } else {
        info!("      {}:{} {}", label, " ".repeat(padding), value);
    }
}

/// Spaces after `label:` so values line up in a 15-column field; at least one.
fn status_padding(label: &str) -> usize {
    let label_width: usize = 15;
    label_width.saturating_sub(label.len()).max(1)
}

/// Print a success message (Level 2 - 2 spaces indentation and green color)
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {}", message);
    }
}

/// Print a skip notice (Level 2 - 2 spaces indentation and yellow color)
pub fn print_skip(message: &str) {
    if should_use_color() {
        info!("  - {}", message.yellow());
    } else {
        info!("  - {}", message);
    }
}

/// Print a per-video failure (Level 2 - 2 spaces indentation and red color)
pub fn print_failure(message: &str) {
    if should_use_color() {
        log::error!("  ✗ {}", message.red());
    } else {
        log::error!("  ✗ {}", message);
    }
}

/// Print a sub-item (Level 3 - Operations with 4 spaces indentation)
pub fn print_sub_item(message: &str) {
    info!("    {}", message);
}

/// Creates a progress bar counting decoded frames of one video.
///
/// `total_frames` is the container's frame count when known; otherwise the
/// bar shows a running count. Hidden unless `visible` and stderr is a terminal.
#[must_use]
pub fn frame_progress_bar(label: &str, total_frames: Option<u64>, visible: bool) -> ProgressBar {
    let pb = match total_frames {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg}: {percent:>3}% [{bar:30}] {pos}/{len}f ({elapsed_precise} / {eta_precise})")
            {
                pb.set_style(style.progress_chars("##."));
            }
            pb
        }
        _ => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{msg}: {pos}f ({elapsed_precise})") {
                pb.set_style(style);
            }
            pb
        }
    };
    pb.set_message(format!("Extract {label}"));

    if !visible || !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}
