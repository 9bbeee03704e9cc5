//! File renaming and sorting driven by tags.
//!
//! Provides two moves:
//! - **rename**: `<tracknumber> - <title>.<ext>` in the file's own directory
//! - **sort**: `<base>/<artist>/<album>/<original file name>`
//!
//! Both first stage every destination ([`Plan`]), drop collisions, then
//! move. Each successful move updates the in-memory path right away so later
//! operations in the same run see the new location. There is no rollback:
//! an I/O error partway through leaves the earlier files moved.
//!
//! [`order_by_track`] reorders the collection itself and touches no file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::{Error, Result};
use crate::model::{AudioFile, BatchSummary, TagName};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A staged move of one collection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub index: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Moves to perform and files left alone (with the reason).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub moves: Vec<PlannedMove>,
    pub skips: Vec<(usize, String)>,
    /// Files already at their destination
    pub unchanged: usize,
}

impl Plan {
    fn stage(&mut self, index: usize, source: &Path, destination: PathBuf) {
        if destination == source {
            self.unchanged += 1;
        } else {
            self.moves.push(PlannedMove {
                index,
                source: source.to_path_buf(),
                destination,
            });
        }
    }

    /// Drop moves that would collide: the same destination claimed twice
    /// (the first claimant wins) or a destination that already exists.
    pub fn reject_collisions(mut self) -> Self {
        let mut claimed = HashSet::new();
        let mut kept = Vec::with_capacity(self.moves.len());

        for planned in self.moves {
            if !claimed.insert(planned.destination.clone()) {
                self.skips.push((
                    planned.index,
                    format!("another file is already going to {}", planned.destination.display()),
                ));
            } else if planned.destination.exists() {
                self.skips.push((
                    planned.index,
                    format!("{} already exists", planned.destination.display()),
                ));
            } else {
                kept.push(planned);
            }
        }

        self.moves = kept;
        self
    }
}

/// Stage renames to `<tracknumber> - <title><.ext>`.
///
/// Files missing either tag are skipped. A `"5/12"` track number uses the
/// part before the slash.
pub fn plan_renames(files: &[AudioFile]) -> Plan {
    let mut plan = Plan::default();

    for (index, file) in files.iter().enumerate() {
        let track = file.tags.first(TagName::TrackNumber);
        let title = file.tags.first(TagName::Title);

        let (Some(track), Some(title)) = (track, title) else {
            let missing = match (track, title) {
                (None, None) => "tracknumber and title",
                (None, _) => "tracknumber",
                _ => "title",
            };
            plan.skips.push((index, format!("missing {}", missing)));
            continue;
        };

        let track = track.split('/').next().unwrap_or(track).trim();
        let ext = file
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let name = format!("{} - {}{}", sanitize_filename(track), sanitize_filename(title), ext);

        let destination = match file.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        };
        plan.stage(index, &file.path, destination);
    }

    plan.reject_collisions()
}

/// Stage moves into `<base>/<artist>/<album>/`.
pub fn plan_sort(files: &[AudioFile], base: &Path) -> Plan {
    let mut plan = Plan::default();

    for (index, file) in files.iter().enumerate() {
        let Some(file_name) = file.path.file_name() else {
            plan.skips.push((index, "path has no file name".to_string()));
            continue;
        };

        let artist = path_component(file.tags.get_or(TagName::Artist, UNKNOWN_ARTIST));
        let album = path_component(file.tags.get_or(TagName::Album, UNKNOWN_ALBUM));
        let destination = base.join(artist).join(album).join(file_name);

        plan.stage(index, &file.path, destination);
    }

    plan.reject_collisions()
}

/// Report skips, then perform the moves, updating paths as they succeed.
pub fn apply(
    files: &mut [AudioFile],
    plan: &Plan,
    console: &mut dyn Console,
    operation: &str,
) -> BatchSummary {
    let mut summary = BatchSummary {
        skipped: plan.skips.len() + plan.unchanged,
        ..BatchSummary::default()
    };

    for (index, reason) in &plan.skips {
        console.warn(&format!("Skipping {}: {}", files[*index].display_name(), reason));
    }

    for planned in &plan.moves {
        match move_file(&planned.source, &planned.destination) {
            Ok(()) => {
                debug!(from = %planned.source.display(), to = %planned.destination.display(), "Moved file");
                console.info(&format!(
                    "{} -> {}",
                    planned.source.display(),
                    planned.destination.display()
                ));
                files[planned.index].path = planned.destination.clone();
                summary.changed += 1;
            }
            Err(e) => {
                warn!(path = %planned.source.display(), error = %e, "Move failed");
                console.error(&e.to_string());
                summary.failed += 1;
            }
        }
    }

    info!(operation, changed = summary.changed, skipped = summary.skipped, failed = summary.failed, "Organized files");
    console.info(&summary.line(operation));
    summary
}

/// Rename every file with a track number and title.
pub fn rename_by_tags(files: &mut [AudioFile], console: &mut dyn Console) -> BatchSummary {
    let plan = plan_renames(files);
    apply(files, &plan, console, "Renamed")
}

/// Move every file into `<base>/<artist>/<album>/`.
pub fn sort_into_folders(
    files: &mut [AudioFile],
    base: &Path,
    console: &mut dyn Console,
) -> BatchSummary {
    let plan = plan_sort(files, base);
    apply(files, &plan, console, "Sorted")
}

/// Base directory for sorting: explicit, else configured, else the
/// working directory.
pub fn sort_base(explicit: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    match explicit.or(configured) {
        Some(base) => Ok(base.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Stable-sort the collection by numeric track number.
///
/// Files without a usable track number are reported once each and kept at
/// the end, in their original order.
pub fn order_by_track(files: &mut [AudioFile], console: &mut dyn Console) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for file in files.iter() {
        if track_number(file).is_none() {
            console.warn(&format!("Skipping {}: missing tracknumber", file.display_name()));
            summary.skipped += 1;
        }
    }

    files.sort_by_key(|file| track_number(file).unwrap_or(u32::MAX));
    summary.changed = files.len() - summary.skipped;
    summary
}

/// Leading digits of the track number tag ("05/12" -> 5).
pub fn track_number(file: &AudioFile) -> Option<u32> {
    let raw = file.tags.first(TagName::TrackNumber)?.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Sanitizes a filename by removing/replacing invalid characters
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// A directory name that stays where it is put: sanitized, and never `.` or `..`.
fn path_component(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if sanitized.chars().all(|c| c == '.') {
        sanitized.replace('.', "_")
    } else {
        sanitized
    }
}

/// Move a file, falling back to copy + delete across devices.
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    let wrap = |e: std::io::Error| Error::Move {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    if fs::rename(source, destination).is_err() {
        // If rename fails (cross-device), try copy + delete
        fs::copy(source, destination).map_err(wrap)?;
        fs::remove_file(source).map_err(wrap)?;
    }

    Ok(())
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_utils::mock_tagged_file;
    use proptest::prelude::*;

    /// Generate valid filename characters (excluding path separators and invalid chars)
    fn valid_filename_char() -> impl Strategy<Value = char> {
        prop::char::range('!', '~').prop_filter("no invalid chars", |c| {
            !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
        })
    }

    /// Generate a valid filename string
    fn valid_filename() -> impl Strategy<Value = String> {
        prop::collection::vec(valid_filename_char(), 1..50)
            .prop_map(|chars| chars.into_iter().collect())
    }

    /// Generate an arbitrary string that might contain invalid characters
    fn arbitrary_filename() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9 /:*?\"<>|_-]{1,50}")
            .unwrap()
            .prop_filter("non-empty", |s| !s.is_empty())
    }

    proptest! {
        /// Sanitized filenames should never contain path separators
        #[test]
        fn sanitize_removes_path_separators(input in arbitrary_filename()) {
            let sanitized = sanitize_filename(&input);
            prop_assert!(!sanitized.contains('/'), "Found / in: {}", sanitized);
            prop_assert!(!sanitized.contains('\\'), "Found \\ in: {}", sanitized);
        }

        /// Sanitized filename length should be same as input length
        #[test]
        fn sanitize_preserves_length(input in arbitrary_filename()) {
            let sanitized = sanitize_filename(&input);
            prop_assert_eq!(input.chars().count(), sanitized.chars().count());
        }

        /// Sort destinations always sit exactly three levels under the base
        #[test]
        fn sort_stays_under_base(
            artist in prop_oneof![arbitrary_filename(), Just("..".to_string()), Just(".".to_string())],
            album in prop_oneof![valid_filename(), Just("..".to_string())],
        ) {
            let files = vec![mock_tagged_file("/in/song.flac", &artist, &album, "1", "t")];
            let base = PathBuf::from("/music/library");

            let plan = plan_sort(&files, &base);
            let destination = &plan.moves[0].destination;

            prop_assert!(destination.starts_with(&base));
            prop_assert_eq!(destination.components().count(), base.components().count() + 3);
            prop_assert_eq!(destination.file_name().and_then(|n| n.to_str()), Some("song.flac"));
        }

        /// Rename keeps the file in its directory and keeps the extension
        #[test]
        fn rename_preserves_directory_and_extension(
            ext in prop::sample::select(vec!["mp3", "flac", "ogg", "wav", "m4a"]),
            title in arbitrary_filename(),
        ) {
            prop_assume!(!title.trim().is_empty());
            let source = format!("/music/in/source.{}", ext);
            let files = vec![crate::test_utils::mock_file(&source, &title, "3")];

            let plan = plan_renames(&files);
            let destination = &plan.moves[0].destination;

            prop_assert_eq!(destination.parent(), Some(Path::new("/music/in")));
            prop_assert_eq!(destination.extension().and_then(|e| e.to_str()), Some(ext));
        }
    }
}
