//! External cover image handling
//!
//! The catalog supplies a managed image file per album. Embedding replaces the
//! container's front cover; a size mismatch between the managed file and the
//! embedded picture is the change signal.

use super::CanonicalTag;
use crate::error::{Result, TagError};
use crate::formats::AdapterRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cover image loaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub path: PathBuf,
    pub data: Vec<u8>,
    /// Sniffed MIME type, e.g. "image/png"
    pub mime_type: String,
}

impl CoverImage {
    /// Load an image file
    ///
    /// Returns `None` (with one warning) when the file is missing or unreadable.
    pub fn load(path: &Path) -> Option<Self> {
        match std::fs::read(path) {
            Ok(data) => Some(Self::from_bytes(path, data)),
            Err(e) => {
                warn!(image = %path.display(), error = %e, "Cover image not readable, skipping");
                None
            }
        }
    }

    /// Wrap bytes that are already in memory
    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Self {
        let mime_type = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());
        Self {
            path: path.to_path_buf(),
            data,
            mime_type,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Load the image referenced by a desired tag, if embedding applies
    pub fn for_tag(tag: &CanonicalTag) -> Option<Self> {
        tag.image_file.as_deref().and_then(Self::load)
    }
}

/// Size of an image file on disk, if it exists
pub fn image_file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Decide whether the desired tag's image must be embedded
///
/// Requires the feature to be enabled, an image file with a known size, and
/// that size to differ from what the file currently embeds.
pub fn should_embed(desired: &CanonicalTag, enabled: bool, current_size: Option<u64>) -> bool {
    if !enabled {
        return false;
    }
    match (&desired.image_file, desired.image_size) {
        (Some(_), Some(size)) => current_size != Some(size),
        _ => false,
    }
}

/// Embed an image file into an audio file as its single front cover
pub fn embed(registry: &AdapterRegistry, path: &Path, image_file: &Path) -> Result<()> {
    let image = CoverImage::load(image_file).ok_or_else(|| {
        TagError::Common(tagsync_common::Error::NotFound(
            image_file.display().to_string(),
        ))
    })?;
    debug!(
        file = %path.display(),
        image = %image_file.display(),
        bytes = image.size(),
        "Embedding cover image"
    );
    registry.embed_cover(path, &image)
}
