//! Regex search-and-replace over tags, with a confirm-before-write step.
//!
//! A run has three phases:
//! 1. **Select** the files whose target tags match the pattern.
//! 2. **Preview** every (file, tag) pair the substitution would change and
//!    show it. Nothing is mutated yet.
//! 3. **Commit** after an explicit "yes": reapply the substitution and
//!    persist each touched file once. Declining touches nothing.
//!
//! Only real changes are previewed, so running the same rewrite twice is a
//! no-op the second time.
//!
//! Multi-valued tags are rewritten value by value, so a value containing the
//! display separator stays one value. [`Scope::Joined`] rewrites see the
//! joined string instead and write back a single value.

use regex::{Captures, NoExpand, Regex};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::Result;
use crate::filter;
use crate::metadata::TagStore;
use crate::model::{AudioFile, BatchSummary, MULTI_VALUE_SEPARATOR, TagName};

/// Callback computing the replacement for one match.
pub type TransformFn = Box<dyn Fn(&Captures<'_>) -> String>;

/// What a match is replaced with.
pub enum Replacement {
    /// Inserted verbatim; `$` has no special meaning
    Literal(String),
    /// `$1` / `${name}` capture references are expanded
    Template(String),
    /// Computed per match
    Transform(TransformFn),
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Replacement::Template(s) => f.debug_tuple("Template").field(s).finish(),
            Replacement::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// How a rewrite sees the values of a multi-valued tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every value on its own; an absent tag is seen as one empty value
    #[default]
    EachValue,
    /// All values joined with `"; "`, written back as one value
    Joined,
}

/// A pattern, its replacement and the tags it applies to.
#[derive(Debug)]
pub struct Rewrite {
    pub pattern: Regex,
    pub replacement: Replacement,
    pub tags: Vec<TagName>,
    pub scope: Scope,
}

impl Rewrite {
    pub fn new(pattern: &str, replacement: Replacement, tags: Vec<TagName>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement,
            tags,
            scope: Scope::default(),
        })
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the whole value of `tag` with `value` (empty clears the tag).
    pub fn set(tag: TagName, value: &str) -> Result<Self> {
        Ok(Self::new(r"(?s)^.*$", Replacement::Literal(value.to_string()), vec![tag])?
            .with_scope(Scope::Joined))
    }

    /// Does the pattern match any value this rewrite looks at?
    pub fn matches(&self, values: &[String]) -> bool {
        match self.scope {
            Scope::Joined => self.pattern.is_match(&values.join(MULTI_VALUE_SEPARATOR)),
            Scope::EachValue if values.is_empty() => self.pattern.is_match(""),
            Scope::EachValue => values.iter().any(|v| self.pattern.is_match(v)),
        }
    }

    /// New values for a tag, or `None` when nothing would change.
    ///
    /// Values rewritten to the empty string are dropped.
    pub fn apply(&self, values: &[String]) -> Option<Vec<String>> {
        let new = match self.scope {
            Scope::Joined => {
                let new = self.rewrite(&values.join(MULTI_VALUE_SEPARATOR))?;
                if new.is_empty() { Vec::new() } else { vec![new] }
            }
            Scope::EachValue if values.is_empty() => vec![self.rewrite("")?],
            Scope::EachValue => {
                let mut changed = false;
                let mut new = Vec::with_capacity(values.len());
                for value in values {
                    match self.rewrite(value) {
                        Some(rewritten) => {
                            changed = true;
                            if !rewritten.is_empty() {
                                new.push(rewritten);
                            }
                        }
                        None => new.push(value.clone()),
                    }
                }
                if !changed {
                    return None;
                }
                new
            }
        };

        (new != values).then_some(new)
    }

    /// Substituted value, or `None` when the pattern does not match or the
    /// result equals the input.
    pub fn rewrite(&self, value: &str) -> Option<String> {
        if !self.pattern.is_match(value) {
            return None;
        }

        let new = match &self.replacement {
            Replacement::Literal(s) => self.pattern.replace_all(value, NoExpand(s)),
            Replacement::Template(s) => self.pattern.replace_all(value, s.as_str()),
            Replacement::Transform(f) => self.pattern.replace_all(value, |caps: &Captures<'_>| f(caps)),
        };

        (new != value).then(|| new.into_owned())
    }
}

/// One pending change, shown before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePreview {
    /// Position of the file in the collection
    pub index: usize,
    pub path: PathBuf,
    pub tag: TagName,
    pub old: String,
    pub new: String,
}

impl fmt::Display for ChangePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        let old = if self.old.is_empty() { "(empty)" } else { &self.old };
        let new = if self.new.is_empty() { "(empty)" } else { &self.new };
        write!(f, "  {} [{}] : {} → {}", name, self.tag, old, new)
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Preview was empty; nothing to ask about
    NoChanges,
    /// The user said no; no file was touched
    Declined,
    Applied(BatchSummary),
}

/// Indices of the files where `rewrite` matches at least one target tag.
pub fn select(files: &[AudioFile], rewrite: &Rewrite) -> Vec<usize> {
    files
        .iter()
        .enumerate()
        .filter(|(_, file)| rewrite.tags.iter().any(|tag| rewrite.matches(file.tags.values(*tag))))
        .map(|(i, _)| i)
        .collect()
}

/// Compute the changes `rewrite` would make to the `candidates`.
pub fn preview(files: &[AudioFile], candidates: &[usize], rewrite: &Rewrite) -> Vec<ChangePreview> {
    let mut changes = Vec::new();

    for &index in candidates {
        let file = &files[index];
        for &tag in &rewrite.tags {
            if let Some(new) = rewrite.apply(file.tags.values(tag)) {
                changes.push(ChangePreview {
                    index,
                    path: file.path.clone(),
                    tag,
                    old: file.tags.value(tag),
                    new: new.join(MULTI_VALUE_SEPARATOR),
                });
            }
        }
    }

    changes
}

/// Apply previewed changes and persist each touched file once.
///
/// The substitution is recomputed from the file's current value. A file's
/// in-memory tags are only updated once its persist succeeded.
pub fn commit(
    files: &mut [AudioFile],
    changes: &[ChangePreview],
    rewrite: &Rewrite,
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut touched: Vec<usize> = changes.iter().map(|c| c.index).collect();
    touched.dedup();

    for index in touched {
        let file = &mut files[index];
        let mut updated = file.tags.clone();

        for change in changes.iter().filter(|c| c.index == index) {
            if let Some(new) = rewrite.apply(updated.values(change.tag)) {
                updated.set(change.tag, new);
            }
        }

        if updated == file.tags {
            summary.skipped += 1;
            continue;
        }

        match store.persist(&file.path, &updated) {
            Ok(()) => {
                file.tags = updated;
                summary.changed += 1;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to save tags");
                console.error(&format!("{}: {}", file.path.display(), e));
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Select, preview, confirm and commit.
///
/// With `assume_yes` the confirmation prompt is skipped, the preview is
/// still shown.
pub fn run(
    files: &mut [AudioFile],
    rewrite: &Rewrite,
    store: &dyn TagStore,
    console: &mut dyn Console,
    assume_yes: bool,
) -> Result<Outcome> {
    let candidates = select(files, rewrite);
    let changes = preview(files, &candidates, rewrite);

    if changes.is_empty() {
        console.info(&format!(
            "No changes: '{}' changes nothing in {}",
            rewrite.pattern.as_str(),
            filter::tag_list(&rewrite.tags)
        ));
        return Ok(Outcome::NoChanges);
    }

    let mut file_count = changes.iter().map(|c| c.index).collect::<Vec<_>>();
    file_count.dedup();
    let file_count = file_count.len();

    console.info("Preview of changes:");
    for change in &changes {
        console.info(&change.to_string());
    }

    let question = format!("Apply {} change(s) to {} file(s)?", changes.len(), file_count);
    if !assume_yes && !console.confirm(&question)? {
        console.info("Aborted, no files were modified.");
        return Ok(Outcome::Declined);
    }

    let summary = commit(files, &changes, rewrite, store, console);
    info!(
        pattern = rewrite.pattern.as_str(),
        changed = summary.changed,
        failed = summary.failed,
        "Applied rewrite"
    );
    console.info(&summary.line("Modified"));
    Ok(Outcome::Applied(summary))
}
