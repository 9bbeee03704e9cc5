//! flac-manager - batch metadata editing for audio files.
//!
//! Loads a collection of audio files, optionally narrows it with a tag
//! filter, then rewrites tags, embeds cover art, renames or sorts files.
//! Every tag rewrite is previewed and confirmed before anything is written.
//! An interactive shell offers the same operations as commands.

pub mod cli;
pub mod config;
pub mod console;
pub mod cover;
pub mod error;
pub mod filter;
pub mod library;
pub mod metadata;
pub mod model;
pub mod modify;
pub mod organizer;
pub mod presets;
pub mod scanner;
pub mod shell;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("flac_manager=warn".parse()?))
        .init();

    cli::run(&args)
}
