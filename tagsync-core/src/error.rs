//! Error types for tagsync-core
//!
//! Read paths degrade instead of failing (see `FormatAdapter::read`); these
//! errors surface from writes, in-place scrubs and catalog derivation.

use std::path::PathBuf;
use thiserror::Error;

/// Tag engine error type
#[derive(Debug, Error)]
pub enum TagError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container parse or write failure reported by lofty
    #[error("Tag container error: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    /// ID3v2 parse or write failure
    #[error("ID3 error: {0}")]
    Id3(#[from] id3::Error),

    /// Malformed or unsupported ASF structure
    #[error("ASF error: {0}")]
    Asf(String),

    /// No adapter handles this container
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Catalog links required to derive tags are missing
    #[error("Missing catalog data: {0}")]
    MissingCatalogData(String),

    /// tagsync-common error
    #[error("Common error: {0}")]
    Common(#[from] tagsync_common::Error),
}

/// Result type for tag engine operations
pub type Result<T> = std::result::Result<T, TagError>;
