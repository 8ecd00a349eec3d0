//! Main entry point for the Servelab CLI application.
//!
//! This handles command-line argument parsing, logging setup, and dispatching
//! to the appropriate command handlers.

use servelab_cli::error::CliResult;
use servelab_cli::logging::{run_log_path, setup_logging};
use servelab_cli::{Commands, ExtractArgs, parse_cli, run_extract};

use log::LevelFilter;
use std::process;

fn main() {
    let cli_args = parse_cli();

    // Determine log level based on verbose flag
    let log_level = if cli_args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let result = match cli_args.command {
        Commands::Extract(args) => extract(&args, log_level),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn extract(args: &ExtractArgs, log_level: LevelFilter) -> CliResult<()> {
    let log_file = (!args.no_log).then(|| {
        let log_dir = args
            .log_dir
            .clone()
            .unwrap_or_else(|| args.output_root.join("logs"));
        run_log_path(&log_dir)
    });

    setup_logging(log_level, log_file.as_deref())?;
    if let Some(path) = &log_file {
        log::debug!("Run log: {}", path.display());
    }

    run_extract(args).map(|_| ())
}
