//! Cover art blobs.
//!
//! A [`CoverArt`] is built from an image file on disk and attached to audio
//! files by [`add_picture`]. The image is never decoded: its dimensions and
//! colour depth are fixed assumptions (500×500, 16 bit) that end up in the
//! picture block, not measurements.
//!
//! Containers without native picture support get the FLAC
//! `METADATA_BLOCK_PICTURE` structure, base64-encoded, as a text tag.

mod embedded;

pub use embedded::{FALLBACK_PICTURE_KEY, add_picture};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

use crate::error::{Error, Result};

/// Image extensions accepted for cover art (lowercase).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// ID3v2/FLAC picture type for a front cover.
pub const FRONT_COVER: u8 = 3;

const ASSUMED_WIDTH: u32 = 500;
const ASSUMED_HEIGHT: u32 = 500;
const ASSUMED_DEPTH: u32 = 16;

/// Picture data ready to be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    /// Raw image data (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type (image/jpeg, image/png)
    pub mime_type: String,
    /// ID3v2/FLAC picture type code
    pub picture_type: u8,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl CoverArt {
    /// Front cover with the fixed dimension assumptions.
    pub fn front_cover(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            picture_type: FRONT_COVER,
            description: String::new(),
            width: ASSUMED_WIDTH,
            height: ASSUMED_HEIGHT,
            depth: ASSUMED_DEPTH,
        }
    }

    /// Load an image file as a front cover.
    ///
    /// The extension is checked before the file is read, so an unsupported
    /// path never touches the disk.
    pub fn load(path: &Path) -> Result<Self> {
        let mime_type = mime_for_path(path).ok_or_else(|| {
            Error::invalid_image(
                path,
                format!("unsupported extension (expected one of: {})", IMAGE_EXTENSIONS.join(", ")),
            )
        })?;

        let data = std::fs::read(path).map_err(|e| Error::invalid_image(path, e.to_string()))?;
        if data.is_empty() {
            return Err(Error::invalid_image(path, "file is empty"));
        }

        Ok(Self::front_cover(data, mime_type))
    }

    /// Serialise as a FLAC `METADATA_BLOCK_PICTURE` body (all integers big-endian).
    pub fn to_picture_block(&self) -> Vec<u8> {
        let mime = self.mime_type.as_bytes();
        let desc = self.description.as_bytes();
        let mut block = Vec::with_capacity(32 + mime.len() + desc.len() + self.data.len());

        block.extend_from_slice(&u32::from(self.picture_type).to_be_bytes());
        block.extend_from_slice(&(mime.len() as u32).to_be_bytes());
        block.extend_from_slice(mime);
        block.extend_from_slice(&(desc.len() as u32).to_be_bytes());
        block.extend_from_slice(desc);
        block.extend_from_slice(&self.width.to_be_bytes());
        block.extend_from_slice(&self.height.to_be_bytes());
        block.extend_from_slice(&self.depth.to_be_bytes());
        // indexed colour count: 0 for non-palette images
        block.extend_from_slice(&0u32.to_be_bytes());
        block.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        block.extend_from_slice(&self.data);

        block
    }

    /// Base64 of [`CoverArt::to_picture_block`], as stored in text-only containers.
    pub fn to_base64_block(&self) -> String {
        STANDARD.encode(self.to_picture_block())
    }
}

/// MIME type for a supported image path, `None` for anything else.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())?;

    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
