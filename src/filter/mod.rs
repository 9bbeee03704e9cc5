//! Regex selection over the collection.
//!
//! A file is selected when any of the target tags' first value contains a
//! match for the pattern (search, not full match). An absent tag is tested
//! as the empty string.
//!
//! An empty result is returned as empty; it never falls back to the
//! unfiltered collection.

use regex::Regex;
use tracing::debug;

use crate::console::Console;
use crate::error::Result;
use crate::model::{AudioFile, TagName};

/// Does any of `tags` on `file` match `pattern`?
pub fn matches(file: &AudioFile, pattern: &Regex, tags: &[TagName]) -> bool {
    tags.iter().any(|tag| {
        let first = file.tags.values(*tag).first().map(String::as_str).unwrap_or("");
        pattern.is_match(first)
    })
}

/// Indices of the selected files, in collection order.
pub fn select(files: &[AudioFile], pattern: &Regex, tags: &[TagName]) -> Vec<usize> {
    let selected: Vec<usize> = files
        .iter()
        .enumerate()
        .filter(|(_, file)| matches(file, pattern, tags))
        .map(|(i, _)| i)
        .collect();

    debug!(
        pattern = pattern.as_str(),
        candidates = files.len(),
        selected = selected.len(),
        "Filtered collection"
    );
    selected
}

/// Keep only the selected files. Warns when nothing is left.
pub fn retain(
    files: Vec<AudioFile>,
    pattern: &Regex,
    tags: &[TagName],
    console: &mut dyn Console,
) -> Vec<AudioFile> {
    let kept: Vec<AudioFile> = files
        .into_iter()
        .filter(|file| matches(file, pattern, tags))
        .collect();

    if kept.is_empty() {
        console.warn(&format!(
            "No files match '{}' in {}",
            pattern.as_str(),
            tag_list(tags)
        ));
    } else {
        console.info(&format!("{} file(s) match '{}'", kept.len(), pattern.as_str()));
    }
    kept
}

/// Use `tags` as given, or ask the user to pick from the vocabulary when empty.
pub fn resolve_tags(tags: Vec<TagName>, console: &mut dyn Console) -> Result<Vec<TagName>> {
    if !tags.is_empty() {
        return Ok(tags);
    }

    let options: Vec<&str> = TagName::ALL.iter().map(|t| t.as_str()).collect();
    let picked = console.choose_many("Which tags?", &options)?;
    Ok(picked.into_iter().map(|i| TagName::ALL[i]).collect())
}

pub(crate) fn tag_list(tags: &[TagName]) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}
