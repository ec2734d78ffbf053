//! # tagsync-core
//!
//! Cross-format audio tag normalization and write-back.
//!
//! Every supported container is read into one [`CanonicalTag`], compared
//! field by field against the tag derived from catalog data, and rewritten
//! only when something differs. Container specifics live behind the
//! [`FormatAdapter`] implementations in [`formats`].

pub mod error;
pub mod formats;
pub mod services;
pub mod tags;

pub use error::{Result, TagError};
pub use formats::{AdapterRegistry, ContainerFamily, FormatAdapter};
pub use services::{AudioTagService, ParsedTrackInfo, RetagPreview, SkipReason, WriteOutcome};
pub use tags::{CanonicalTag, TagDate};
