//! Core data models for a batch tagging run.
//!
//! Defines the primary entities: [`TagName`], [`TagRecord`] and
//! [`AudioFile`]. A run loads a `Vec<AudioFile>` once, mutates the records
//! in place and persists them explicitly through a
//! [`TagStore`](crate::metadata::TagStore).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cover::CoverArt;
use crate::error::Error;

/// Separator used to present multi-valued tags as a single string.
pub const MULTI_VALUE_SEPARATOR: &str = "; ";

/// The well-known tags every operation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagName {
    Artist,
    Album,
    Genre,
    TrackNumber,
    Title,
}

impl TagName {
    /// Fixed vocabulary, in the order it is offered to the user.
    pub const ALL: [TagName; 5] = [
        TagName::Artist,
        TagName::Album,
        TagName::Genre,
        TagName::TrackNumber,
        TagName::Title,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagName::Artist => "artist",
            TagName::Album => "album",
            TagName::Genre => "genre",
            TagName::TrackNumber => "tracknumber",
            TagName::Title => "title",
        }
    }

    /// Parse a comma separated list such as `"artist,title"`.
    pub fn parse_list(input: &str) -> Result<Vec<TagName>, Error> {
        let mut tags = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let tag: TagName = part.parse()?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artist" => Ok(TagName::Artist),
            "album" => Ok(TagName::Album),
            "genre" => Ok(TagName::Genre),
            "tracknumber" | "track" => Ok(TagName::TrackNumber),
            "title" => Ok(TagName::Title),
            _ => Err(Error::UnknownTag(s.to_string())),
        }
    }
}

/// Whether the file's tag container stores picture blocks natively.
///
/// Every container lofty writes as a primary tag holds pictures, so files
/// opened through [`LoftyStore`](crate::metadata::LoftyStore) are always
/// `Native`. `Fallback` is set by stores backed by text-only containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PictureSupport {
    #[default]
    Native,
    /// Pictures have to be smuggled in as a base64 text tag
    Fallback,
}

/// In-memory tag state of one file.
///
/// Each well-known tag is an ordered list of values; an empty list means
/// the tag is absent and the first element is the canonical value.
/// Everything else the container holds as text lives in `extras`, keyed by
/// the native key name and looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRecord {
    pub artist: Vec<String>,
    pub album: Vec<String>,
    pub genre: Vec<String>,
    pub track_number: Vec<String>,
    pub title: Vec<String>,
    pub(crate) extras: Vec<(String, Vec<String>)>,
    pub pictures: Vec<CoverArt>,
    pub picture_support: PictureSupport,
}

impl TagRecord {
    pub fn values(&self, tag: TagName) -> &[String] {
        match tag {
            TagName::Artist => &self.artist,
            TagName::Album => &self.album,
            TagName::Genre => &self.genre,
            TagName::TrackNumber => &self.track_number,
            TagName::Title => &self.title,
        }
    }

    fn values_mut(&mut self, tag: TagName) -> &mut Vec<String> {
        match tag {
            TagName::Artist => &mut self.artist,
            TagName::Album => &mut self.album,
            TagName::Genre => &mut self.genre,
            TagName::TrackNumber => &mut self.track_number,
            TagName::Title => &mut self.title,
        }
    }

    /// Canonical value, `None` when absent or blank.
    pub fn first(&self, tag: TagName) -> Option<&str> {
        self.values(tag)
            .first()
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn get_or<'a>(&'a self, tag: TagName, default: &'a str) -> &'a str {
        self.first(tag).unwrap_or(default)
    }

    /// All values joined with [`MULTI_VALUE_SEPARATOR`]; empty when absent.
    pub fn value(&self, tag: TagName) -> String {
        self.values(tag).join(MULTI_VALUE_SEPARATOR)
    }

    pub fn set(&mut self, tag: TagName, values: Vec<String>) {
        *self.values_mut(tag) = values;
    }

    pub fn push(&mut self, tag: TagName, value: String) {
        self.values_mut(tag).push(value);
    }

    pub fn extra(&self, key: &str) -> Option<&[String]> {
        self.extras
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_slice())
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.extras.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Replace the values stored under `key` (matched case-insensitively).
    pub fn set_extra(&mut self, key: &str, values: Vec<String>) {
        match self
            .extras
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, existing)) => *existing = values,
            None => self.extras.push((key.to_string(), values)),
        }
    }

    /// Append a value under `key`, creating the entry if needed.
    pub fn push_extra(&mut self, key: &str, value: String) {
        match self
            .extras
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, existing)) => existing.push(value),
            None => self.extras.push((key.to_string(), vec![value])),
        }
    }

    /// Drop every extension tag whose key satisfies `pred`; returns how many went.
    pub fn remove_extras_where(&mut self, mut pred: impl FnMut(&str) -> bool) -> usize {
        let before = self.extras.len();
        self.extras.retain(|(k, _)| !pred(k));
        before - self.extras.len()
    }

    pub fn is_empty(&self) -> bool {
        TagName::ALL.iter().all(|t| self.values(*t).is_empty())
            && self.extras.is_empty()
            && self.pictures.is_empty()
    }

    /// Remove every tag and picture. Picture support is a property of the
    /// container and survives.
    pub fn clear(&mut self) {
        *self = TagRecord {
            picture_support: self.picture_support,
            ..TagRecord::default()
        };
    }
}

/// One on-disk audio file and its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFile {
    /// Current location; updated in place after rename/sort
    pub path: PathBuf,
    pub tags: TagRecord,
}

impl AudioFile {
    pub fn new(path: impl Into<PathBuf>, tags: TagRecord) -> Self {
        Self {
            path: path.into(),
            tags,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Outcome counts of a one-pass bulk operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub changed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// One line such as `"Renamed: 3 changed, 1 skipped, 0 failed"`.
    pub fn line(&self, operation: &str) -> String {
        format!(
            "{}: {} changed, {} skipped, {} failed",
            operation, self.changed, self.skipped, self.failed
        )
    }
}
