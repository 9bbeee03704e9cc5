//! Command-line interface for flac-manager.
//!
//! Parses the flags and runs the requested steps over the loaded collection
//! in a fixed order, or hands the collection to the interactive shell.

mod commands;

pub use commands::{Cli, execute, run};
