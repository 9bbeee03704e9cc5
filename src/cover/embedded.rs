//! Embed cover art into audio file tags.
//!
//! Containers with picture blocks (ID3v2, Vorbis comments, MP4 atoms) get
//! the image as their only picture. Records from a store that reports
//! [`PictureSupport::Fallback`] get a base64 `METADATA_BLOCK_PICTURE` text
//! tag instead. The lofty-backed store never does, since every primary
//! container it writes holds pictures.

use std::path::Path;
use tracing::{info, warn};

use super::CoverArt;
use crate::console::Console;
use crate::error::Result;
use crate::metadata::TagStore;
use crate::model::{AudioFile, BatchSummary, PictureSupport};

/// Text key carrying a base64 picture block.
pub const FALLBACK_PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

/// Attach `image` as the front cover of every file.
///
/// The image is validated before any file is touched; an invalid image
/// fails the whole operation. Each file is then persisted on its own and
/// its record is updated only once the write succeeded.
pub fn add_picture(
    files: &mut [AudioFile],
    image: &Path,
    store: &dyn TagStore,
    console: &mut dyn Console,
) -> Result<BatchSummary> {
    let cover = CoverArt::load(image)?;
    let encoded = cover.to_base64_block();
    let mut summary = BatchSummary::default();

    for file in files.iter_mut() {
        let mut updated = file.tags.clone();
        match updated.picture_support {
            PictureSupport::Native => {
                updated.pictures = vec![cover.clone()];
            }
            PictureSupport::Fallback => {
                updated.set_extra(FALLBACK_PICTURE_KEY, vec![encoded.clone()]);
            }
        }

        match store.persist(&file.path, &updated) {
            Ok(()) => {
                info!(path = %file.path.display(), image = %image.display(), "Embedded cover");
                file.tags = updated;
                summary.changed += 1;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to embed cover");
                console.error(&format!("{}: {}", file.path.display(), e));
                summary.failed += 1;
            }
        }
    }

    console.info(&summary.line("Picture"));
    Ok(summary)
}
