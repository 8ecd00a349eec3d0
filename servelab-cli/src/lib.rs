// servelab-cli/src/lib.rs
//
// Library portion of the Servelab CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ExtractArgs, parse_cli};
pub use commands::extract::run_extract;
