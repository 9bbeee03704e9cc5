//! The working collection: loading it and printing it.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::{Error, Result};
use crate::metadata::TagStore;
use crate::model::{AudioFile, TagName};

const MAX_CELL_WIDTH: usize = 32;

/// Open every path through `store`, in the given order.
///
/// Unreadable files are reported and left out. No placeholder tags are
/// inserted for files missing the well-known tags. Fails with
/// [`Error::EmptyCollection`] when nothing could be read.
pub fn load(
    paths: &[PathBuf],
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> Result<Vec<AudioFile>> {
    let mut files = Vec::with_capacity(paths.len());
    let mut skipped = 0;

    for path in paths {
        match store.open(path) {
            Ok(tags) => files.push(AudioFile::new(path.clone(), tags)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                console.error(&format!("{}: {}", path.display(), e));
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        console.warn(&format!("Skipped {} unreadable file(s)", skipped));
    }
    if files.is_empty() {
        return Err(Error::EmptyCollection);
    }

    info!(loaded = files.len(), skipped, "Loaded collection");
    Ok(files)
}

/// Print the collection as a table.
pub fn list(files: &[AudioFile], console: &mut dyn Console) {
    let header = ["#", "Track", "Title", "Artist", "Album", "Genre", "File"];
    let rows: Vec<[String; 7]> = files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            [
                (i + 1).to_string(),
                cell(file.tags.get_or(TagName::TrackNumber, "")),
                cell(file.tags.get_or(TagName::Title, "")),
                cell(&file.tags.value(TagName::Artist)),
                cell(file.tags.get_or(TagName::Album, "")),
                cell(&file.tags.value(TagName::Genre)),
                cell(&file.display_name()),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    console.info(&format_row(&header.map(String::from), &widths));
    console.info(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        console.info(&format_row(row, &widths));
    }
    console.info(&format!("{} file(s)", files.len()));
}

fn format_row(row: &[String; 7], widths: &[usize; 7]) -> String {
    row.iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Truncate to the table's cell width.
fn cell(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagRecord;
    use crate::test_utils::{MemoryStore, ScriptedConsole, mock_tagged_file};

    #[test]
    fn test_load_skips_unreadable_and_keeps_order() {
        let store = MemoryStore::new()
            .with_file("/music/a.flac", TagRecord::default())
            .with_file("/music/c.flac", TagRecord::default());
        let mut console = ScriptedConsole::new();

        let paths = vec![
            PathBuf::from("/music/a.flac"),
            PathBuf::from("/music/b.txt"),
            PathBuf::from("/music/c.flac"),
        ];
        let files = load(&paths, &store, &mut console).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("/music/a.flac"));
        assert_eq!(files[1].path, PathBuf::from("/music/c.flac"));
        assert_eq!(console.errors().len(), 1);
        assert!(console.errors()[0].contains("b.txt"));
        assert!(console.warnings()[0].contains("Skipped 1"));
    }

    #[test]
    fn test_load_does_not_insert_placeholders() {
        let store = MemoryStore::new().with_file("/music/a.flac", TagRecord::default());
        let mut console = ScriptedConsole::new();

        let files = load(&[PathBuf::from("/music/a.flac")], &store, &mut console).unwrap();
        assert!(files[0].tags.is_empty());
    }

    #[test]
    fn test_load_empty_is_an_error() {
        let store = MemoryStore::new();
        let mut console = ScriptedConsole::new();

        let result = load(&[PathBuf::from("/music/a.txt")], &store, &mut console);
        assert!(matches!(result, Err(Error::EmptyCollection)));

        let result = load(&[], &store, &mut console);
        assert!(matches!(result, Err(Error::EmptyCollection)));
    }

    #[test]
    fn test_list_prints_one_row_per_file() {
        let mut console = ScriptedConsole::new();
        let files = vec![
            mock_tagged_file("/music/01.flac", "Daft Punk", "Discovery", "1", "One More Time"),
            mock_tagged_file("/music/02.flac", "Daft Punk", "Discovery", "2", "Aerodynamic"),
        ];

        list(&files, &mut console);

        let lines = console.lines();
        // header, separator, two rows, footer
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("#"));
        assert!(lines[2].contains("One More Time"));
        assert!(lines[3].contains("Aerodynamic"));
        assert_eq!(lines[4], "2 file(s)");
    }

    #[test]
    fn test_cell_truncates_long_values() {
        let long = "x".repeat(40);
        let truncated = cell(&long);
        assert_eq!(truncated.chars().count(), MAX_CELL_WIDTH);
        assert!(truncated.ends_with('…'));
        assert_eq!(cell("short"), "short");
    }
}
