//! Audio file tag reading and writing.
//!
//! [`TagStore`] is the seam between the batch operations and the tag
//! container on disk. Production code uses [`LoftyStore`], which delegates
//! all decoding/encoding to the lofty crate (MP3, FLAC, OGG, M4A, WAV and
//! friends). Tests substitute an in-memory store.
//!
//! Stores never autosave: a [`TagRecord`] mutated in memory only reaches the
//! file when [`TagStore::persist`] is called for it.

mod cleanup;

pub use cleanup::{LYRIC_KEYS, delete_all, strip_lyrics};

use lofty::config::WriteOptions;
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use std::path::Path;
use tracing::{debug, warn};

use crate::cover::CoverArt;
use crate::error::{Error, Result};
use crate::model::{PictureSupport, TagName, TagRecord};

/// Reads and writes the tag container of a file.
///
/// Implement this trait to substitute the on-disk container in tests.
pub trait TagStore {
    /// Decode the file's tags.
    fn open(&self, path: &Path) -> Result<TagRecord>;

    /// Write `tags` back to the file, replacing what is stored there.
    fn persist(&self, path: &Path, tags: &TagRecord) -> Result<()>;

    /// Remove every tag container (and the pictures in it) from the file.
    fn erase(&self, path: &Path) -> Result<()>;
}

/// [`TagStore`] backed by lofty.
///
/// Reads the primary tag (falling back to the first tag present). On
/// persist, text items are rewritten from the record; binary items lofty
/// exposes but the record does not model are kept as they were.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyStore;

impl LoftyStore {
    pub fn new() -> Self {
        Self
    }
}

impl TagStore for LoftyStore {
    fn open(&self, path: &Path) -> Result<TagRecord> {
        let tagged_file = probe(path)?;

        let mut record = TagRecord {
            picture_support: picture_support(tagged_file.primary_tag_type()),
            ..TagRecord::default()
        };

        let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        else {
            debug!(path = %path.display(), "File has no tags");
            return Ok(record);
        };

        let tag_type = tag.tag_type();
        for item in tag.items() {
            let Some(text) = item.value().text() else {
                continue;
            };
            match tag_name_for(item.key()) {
                Some(name) => record.push(name, text.to_string()),
                None => {
                    if let Some(key) = item.key().map_key(tag_type, true) {
                        record.push_extra(key, text.to_string());
                    }
                }
            }
        }

        record.pictures = tag.pictures().iter().map(cover_from_picture).collect();

        debug!(
            path = %path.display(),
            tag_type = ?tag_type,
            items = tag.item_count(),
            pictures = record.pictures.len(),
            "Read tags"
        );
        Ok(record)
    }

    fn persist(&self, path: &Path, tags: &TagRecord) -> Result<()> {
        let tagged_file = probe(path)?;
        let tag_type = tagged_file.primary_tag_type();

        let mut tag = tagged_file
            .tag(tag_type)
            .cloned()
            .unwrap_or_else(|| Tag::new(tag_type));

        // Text items are owned by the record
        tag.retain(|item| item.value().text().is_none());

        for name in TagName::ALL {
            for value in tags.values(name) {
                tag.push(TagItem::new(item_key_for(name), ItemValue::Text(value.clone())));
            }
        }

        for (key, values) in tags.extras() {
            let item_key = ItemKey::from_key(tag_type, key);
            for value in values {
                if !tag.push(TagItem::new(item_key.clone(), ItemValue::Text(value.clone()))) {
                    warn!(path = %path.display(), key, ?tag_type, "Key not representable, dropped");
                }
            }
        }

        while tag.picture_count() > 0 {
            tag.remove_picture(0);
        }
        for cover in &tags.pictures {
            tag.push_picture(picture_from_cover(cover));
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::metadata(path, format!("Failed to write tags: {}", e)))?;

        debug!(path = %path.display(), ?tag_type, "Saved tags");
        Ok(())
    }

    fn erase(&self, path: &Path) -> Result<()> {
        let tagged_file = probe(path)?;

        for tag in tagged_file.tags() {
            tag.remove_from_path(path).map_err(|e| {
                Error::metadata(path, format!("Failed to remove {:?} tag: {}", tag.tag_type(), e))
            })?;
        }

        debug!(path = %path.display(), "Erased all tags");
        Ok(())
    }
}

fn probe(path: &Path) -> Result<TaggedFile> {
    Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("Failed to open file: {}", e)))?
        .read()
        .map_err(|e| Error::metadata(path, format!("Failed to read tags: {}", e)))
}

/// Containers lofty can hold picture blocks in.
///
/// Only secondary containers (ID3v1, RIFF INFO, AIFF text chunks) map to
/// `Fallback`, and those are never written as a file's primary tag.
fn picture_support(tag_type: TagType) -> PictureSupport {
    match tag_type {
        TagType::Id3v2 | TagType::VorbisComments | TagType::Mp4Ilst | TagType::Ape => {
            PictureSupport::Native
        }
        _ => PictureSupport::Fallback,
    }
}

fn tag_name_for(key: &ItemKey) -> Option<TagName> {
    match key {
        ItemKey::TrackArtist => Some(TagName::Artist),
        ItemKey::AlbumTitle => Some(TagName::Album),
        ItemKey::Genre => Some(TagName::Genre),
        ItemKey::TrackNumber => Some(TagName::TrackNumber),
        ItemKey::TrackTitle => Some(TagName::Title),
        _ => None,
    }
}

fn item_key_for(name: TagName) -> ItemKey {
    match name {
        TagName::Artist => ItemKey::TrackArtist,
        TagName::Album => ItemKey::AlbumTitle,
        TagName::Genre => ItemKey::Genre,
        TagName::TrackNumber => ItemKey::TrackNumber,
        TagName::Title => ItemKey::TrackTitle,
    }
}

fn cover_from_picture(picture: &Picture) -> CoverArt {
    CoverArt {
        data: picture.data().to_vec(),
        mime_type: picture
            .mime_type()
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        picture_type: picture.pic_type().as_u8(),
        description: picture.description().unwrap_or_default().to_string(),
        width: 0,
        height: 0,
        depth: 0,
    }
}

fn picture_from_cover(cover: &CoverArt) -> Picture {
    let mime_type = (!cover.mime_type.is_empty()).then(|| MimeType::from_str(&cover.mime_type));
    let description = (!cover.description.is_empty()).then(|| cover.description.clone());

    Picture::new_unchecked(
        PictureType::from_u8(cover.picture_type),
        mime_type,
        description,
        cover.data.clone(),
    )
}
