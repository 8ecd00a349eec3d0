//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `extract` command.
/// This command samples every video in a folder into numbered frames.
pub mod extract;
