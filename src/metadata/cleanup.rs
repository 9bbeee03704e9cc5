//! Destructive tag cleanup: lyrics stripping and delete-all.
//!
//! Both persist file by file as they go. There is no batch transaction, so
//! a failure partway through leaves the earlier files already modified.

use tracing::{info, warn};

use super::TagStore;
use crate::console::Console;
use crate::model::{AudioFile, BatchSummary};

/// Key aliases containers use for lyrics, compared case-insensitively.
pub const LYRIC_KEYS: [&str; 9] = [
    "lyrics",
    "unsyncedlyrics",
    "unsynced lyrics",
    "unsynced_lyrics",
    "syncedlyrics",
    "uslt",
    "sylt",
    "©lyr",
    "lyr",
];

fn is_lyric_key(key: &str) -> bool {
    let key = key.to_lowercase();
    LYRIC_KEYS.contains(&key.as_str())
}

/// Remove every lyrics tag. Files without lyrics are not rewritten, and a
/// file whose write fails keeps its lyrics in memory.
pub fn strip_lyrics(
    files: &mut [AudioFile],
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for file in files.iter_mut() {
        let mut updated = file.tags.clone();
        let removed = updated.remove_extras_where(is_lyric_key);
        if removed == 0 {
            summary.skipped += 1;
            continue;
        }

        match store.persist(&file.path, &updated) {
            Ok(()) => {
                file.tags = updated;
                info!(path = %file.path.display(), removed, "Stripped lyrics");
                console.info(&format!("Removed lyrics from {}", file.display_name()));
                summary.changed += 1;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to strip lyrics");
                console.error(&format!("{}: {}", file.path.display(), e));
                summary.failed += 1;
            }
        }
    }

    console.info(&summary.line("Lyrics"));
    summary
}

/// Clear pictures and all tags, in memory and on disk.
pub fn delete_all(
    files: &mut [AudioFile],
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for file in files.iter_mut() {
        match store.erase(&file.path) {
            Ok(()) => {
                file.tags.clear();
                info!(path = %file.path.display(), "Deleted all tags");
                summary.changed += 1;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to delete tags");
                console.error(&format!("{}: {}", file.path.display(), e));
                summary.failed += 1;
            }
        }
    }

    console.info(&summary.line("Deleted tags"));
    summary
}
