//! Input path expansion.
//!
//! Turns the paths given on the command line into a sorted, deduplicated
//! list of candidate audio files. Directories are only entered when the
//! caller asked for it (one level, or the whole tree).

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::console::Console;

/// Default audio extensions taken from directories (lowercase).
pub const DEFAULT_EXTENSIONS: [&str; 9] =
    ["flac", "mp3", "ogg", "opus", "m4a", "wav", "aiff", "ape", "wv"];

/// How directory inputs are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Directories are skipped with a warning
    #[default]
    FilesOnly,
    /// Direct children only
    Shallow,
    /// Entire tree
    Recursive,
}

/// Check if a path has one of the given extensions (case-insensitive)
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Expand `inputs` into individual file paths, sorted and deduplicated.
///
/// Explicitly named files are always kept, whatever their extension: the
/// tag store decides whether they are readable. Files found inside
/// directories are filtered by `extensions`.
pub fn collect_paths(
    inputs: &[PathBuf],
    expansion: Expansion,
    extensions: &[String],
    console: &mut dyn Console,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }

        let max_depth = match expansion {
            Expansion::FilesOnly => {
                console.warn(&format!(
                    "{} is a directory (use --directory or --recursive)",
                    input.display()
                ));
                continue;
            }
            Expansion::Shallow => 1,
            Expansion::Recursive => usize::MAX,
        };

        let before = paths.len();
        paths.extend(
            WalkDir::new(input)
                .min_depth(1)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| is_audio_file(e.path(), extensions))
                .map(|e| e.path().to_path_buf()),
        );
        debug!(dir = %input.display(), found = paths.len() - before, "Expanded directory");
    }

    paths.sort();
    paths.dedup();
    paths
}
