//! Test utilities and fixtures for flac-manager tests.
//!
//! Provides an in-memory [`TagStore`] that counts writes, a scripted
//! [`Console`] that records everything shown to the user, and small
//! factories for [`AudioFile`] values.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MemoryStore, ScriptedConsole, mock_file};
//!
//! let store = MemoryStore::new();
//! let mut console = ScriptedConsole::new().with_confirmations([true]);
//! let mut files = vec![mock_file("/music/a.flac", "Intro", "1")];
//! // ... run an operation, then inspect store.persist_count()
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::console::Console;
use crate::error::{Error, Result};
use crate::metadata::TagStore;
use crate::model::{AudioFile, TagRecord};

/// In-memory tag store.
///
/// `open` serves records registered with [`MemoryStore::with_file`];
/// `persist` and `erase` overwrite them and bump counters. Paths registered
/// with [`MemoryStore::failing_on`] fail every call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<PathBuf, TagRecord>>,
    failing: Vec<PathBuf>,
    persists: Cell<usize>,
    erases: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, record: TagRecord) -> Self {
        self.records.borrow_mut().insert(path.into(), record);
        self
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.push(path.into());
        self
    }

    pub fn persist_count(&self) -> usize {
        self.persists.get()
    }

    pub fn erase_count(&self) -> usize {
        self.erases.get()
    }

    /// What the store currently holds for `path`.
    pub fn stored(&self, path: impl AsRef<Path>) -> Option<TagRecord> {
        self.records.borrow().get(path.as_ref()).cloned()
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.iter().any(|p| p == path) {
            return Err(Error::metadata(path, "simulated failure"));
        }
        Ok(())
    }
}

impl TagStore for MemoryStore {
    fn open(&self, path: &Path) -> Result<TagRecord> {
        self.check(path)?;
        self.records
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::metadata(path, "not an audio file"))
    }

    fn persist(&self, path: &Path, tags: &TagRecord) -> Result<()> {
        self.check(path)?;
        self.records
            .borrow_mut()
            .insert(path.to_path_buf(), tags.clone());
        self.persists.set(self.persists.get() + 1);
        Ok(())
    }

    fn erase(&self, path: &Path) -> Result<()> {
        self.check(path)?;
        self.records
            .borrow_mut()
            .insert(path.to_path_buf(), TagRecord::default());
        self.erases.set(self.erases.get() + 1);
        Ok(())
    }
}

/// Console that replays scripted answers and records all output.
///
/// Unscripted confirmations answer "no"; unscripted questions fail with
/// [`Error::Prompt`], which ends interactive loops.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    confirmations: VecDeque<bool>,
    lines: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    questions: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
        self
    }

    pub fn with_confirmations(mut self, confirmations: impl IntoIterator<Item = bool>) -> Self {
        self.confirmations.extend(confirmations);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Every prompt shown, confirmations included.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Everything printed, in order of kind (info, warnings, errors).
    pub fn output(&self) -> String {
        self.lines
            .iter()
            .chain(&self.warnings)
            .chain(&self.errors)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Console for ScriptedConsole {
    fn info(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.confirmations.pop_front().unwrap_or(false))
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::prompt("no scripted answer left"))
    }

    /// Answers are comma separated option indices, e.g. `"0,4"`.
    fn choose_many(&mut self, question: &str, options: &[&str]) -> Result<Vec<usize>> {
        let answer = self.ask(question)?;
        Ok(answer
            .split(',')
            .filter_map(|s| s.trim().parse::<usize>().ok())
            .filter(|i| *i < options.len())
            .collect())
    }
}

/// File with a title and track number, nothing else.
pub fn mock_file(path: &str, title: &str, track: &str) -> AudioFile {
    AudioFile::new(
        path,
        TagRecord {
            title: vec![title.to_string()],
            track_number: vec![track.to_string()],
            ..TagRecord::default()
        },
    )
}

/// File with the full set of well-known tags.
pub fn mock_tagged_file(path: &str, artist: &str, album: &str, track: &str, title: &str) -> AudioFile {
    AudioFile::new(
        path,
        TagRecord {
            artist: vec![artist.to_string()],
            album: vec![album.to_string()],
            genre: vec!["Electronic".to_string()],
            track_number: vec![track.to_string()],
            title: vec![title.to_string()],
            ..TagRecord::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagName;

    #[test]
    fn test_memory_store_counts_persists() {
        let store = MemoryStore::new().with_file("/a.flac", TagRecord::default());
        let mut record = store.open(Path::new("/a.flac")).unwrap();
        record.set(TagName::Title, vec!["Intro".to_string()]);

        store.persist(Path::new("/a.flac"), &record).unwrap();
        assert_eq!(store.persist_count(), 1);
        assert_eq!(
            store.stored("/a.flac").unwrap().first(TagName::Title),
            Some("Intro")
        );
    }

    #[test]
    fn test_memory_store_failures() {
        let store = MemoryStore::new()
            .with_file("/a.flac", TagRecord::default())
            .failing_on("/a.flac");
        assert!(store.open(Path::new("/a.flac")).is_err());
        assert!(store.open(Path::new("/missing.flac")).is_err());
        assert_eq!(store.persist_count(), 0);
    }

    #[test]
    fn test_scripted_console_defaults_to_no() {
        let mut console = ScriptedConsole::new().with_confirmations([true]);
        assert!(console.confirm("first?").unwrap());
        assert!(!console.confirm("second?").unwrap());
        assert!(console.ask("anything?").is_err());
        assert_eq!(console.questions().len(), 3);
    }

    #[test]
    fn test_scripted_choose_many_parses_indices() {
        let mut console = ScriptedConsole::new().with_answers(["0, 4, 9"]);
        let picked = console.choose_many("tags", &["a", "b", "c", "d", "e"]).unwrap();
        assert_eq!(picked, vec![0, 4]);
    }

    #[test]
    fn test_mock_file_defaults() {
        let file = mock_file("/music/song.flac", "Intro", "1");
        assert_eq!(file.tags.first(TagName::Title), Some("Intro"));
        assert_eq!(file.tags.first(TagName::TrackNumber), Some("1"));
        assert_eq!(file.tags.first(TagName::Artist), None);
    }
}
