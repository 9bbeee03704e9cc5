//! File organization steps.

use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::console::Console;
use crate::model::AudioFile;
use crate::organizer;

/// `--rename`
pub fn cmd_rename(files: &mut [AudioFile], console: &mut dyn Console) {
    organizer::rename_by_tags(files, console);
}

/// `--order`
pub fn cmd_order(files: &mut [AudioFile], console: &mut dyn Console) {
    let summary = organizer::order_by_track(files, console);
    info!(ordered = summary.changed, missing = summary.skipped, "Ordered collection");
}

/// `--sort [DEST]`
pub fn cmd_sort(
    files: &mut [AudioFile],
    destination: Option<&Path>,
    config: &Config,
    console: &mut dyn Console,
) -> anyhow::Result<()> {
    let base = organizer::sort_base(destination, config.organize.destination.as_deref())?;
    console.info(&format!("Sorting {} file(s) into {}", files.len(), base.display()));
    organizer::sort_into_folders(files, &base, console);
    Ok(())
}
