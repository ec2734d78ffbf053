//! MusicBrainz identifier scrubbing and category zeroing

use super::{CanonicalTag, MusicBrainzField};
use crate::error::Result;
use crate::formats::AdapterRegistry;
use std::path::Path;
use tagsync_common::ScrubCategory;
use tracing::{debug, info};

/// Copy of `tag` with every MusicBrainz field absent
pub fn strip(tag: &CanonicalTag) -> CanonicalTag {
    let mut stripped = tag.clone();
    for field in MusicBrainzField::ALL {
        field.set(&mut stripped, None);
    }
    stripped
}

/// Remove MusicBrainz fields from a file
///
/// The file is rewritten only if at least one identifier was present, so
/// repeated calls leave the file untouched. Returns whether a write happened.
pub fn strip_in_place(registry: &AdapterRegistry, path: &Path) -> Result<bool> {
    let current = registry.read(path);
    if !current.has_musicbrainz_ids() {
        debug!(file = %path.display(), "No MusicBrainz tags present, skipping write");
        return Ok(false);
    }

    registry.write(path, &strip(&current))?;
    info!(file = %path.display(), "Removed MusicBrainz tags");
    Ok(true)
}

/// Zero the configured categories on a tag
pub fn apply_categories(tag: &mut CanonicalTag, categories: &[ScrubCategory]) {
    for category in categories {
        match category {
            ScrubCategory::MusicBrainz => *tag = strip(tag),
            ScrubCategory::Genres => tag.genres.clear(),
            ScrubCategory::Publisher => tag.publisher = None,
            ScrubCategory::Media => tag.media = None,
        }
    }
}
