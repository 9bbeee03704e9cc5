//! Tag rewriting and cleanup steps.

use std::path::Path;
use tracing::info;

use crate::console::Console;
use crate::cover;
use crate::filter;
use crate::metadata::{self, TagStore};
use crate::model::{AudioFile, TagName};
use crate::modify::{self, Replacement, Rewrite};
use crate::presets::{self, Preset};

/// `--modify PATTERN REPLACEMENT` over the `--tags` targets.
pub fn cmd_modify(
    files: &mut [AudioFile],
    pattern: &str,
    replacement: &str,
    tags: Option<&str>,
    store: &dyn TagStore,
    console: &mut dyn Console,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let tags = TagName::parse_list(tags.unwrap_or(""))?;
    let tags = filter::resolve_tags(tags, console)?;
    if tags.is_empty() {
        console.warn("No tags selected, nothing to modify");
        return Ok(());
    }

    let rewrite = Rewrite::new(pattern, Replacement::Template(replacement.to_string()), tags)?;
    let outcome = modify::run(files, &rewrite, store, console, assume_yes)?;
    info!(?outcome, "Modify finished");
    Ok(())
}

/// `--set TAG VALUE`
pub fn cmd_set(
    files: &mut [AudioFile],
    tag: &str,
    value: &str,
    store: &dyn TagStore,
    console: &mut dyn Console,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let tag: TagName = tag.parse()?;
    let rewrite = Rewrite::set(tag, value)?;
    let outcome = modify::run(files, &rewrite, store, console, assume_yes)?;
    info!(%tag, ?outcome, "Set finished");
    Ok(())
}

/// `--format [PRESET,...]`; a bare flag runs every preset.
pub fn cmd_format(
    files: &mut [AudioFile],
    chosen: &[Preset],
    store: &dyn TagStore,
    console: &mut dyn Console,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let chosen = if chosen.is_empty() {
        &Preset::ALL[..]
    } else {
        chosen
    };
    presets::run(chosen, files, store, console, assume_yes)?;
    Ok(())
}

/// `--picture IMAGE`
pub fn cmd_picture(
    files: &mut [AudioFile],
    image: &Path,
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> anyhow::Result<()> {
    cover::add_picture(files, image, store, console)?;
    Ok(())
}

/// `--strip-lyrics`
pub fn cmd_strip_lyrics(files: &mut [AudioFile], store: &dyn TagStore, console: &mut dyn Console) {
    metadata::strip_lyrics(files, store, console);
}

/// `--delete`
pub fn cmd_delete(files: &mut [AudioFile], store: &dyn TagStore, console: &mut dyn Console) {
    metadata::delete_all(files, store, console);
}
