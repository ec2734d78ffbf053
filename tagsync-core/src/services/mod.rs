//! Tag services
//!
//! - [`AudioTagService`]: read, retag, scrub and strip operations on one file
//! - [`track_metadata`]: desired tag derivation from catalog data
//! - [`LibraryScanner`]: folder discovery and bulk reads on the rayon pool

pub mod audio_tag_service;
pub mod library_scanner;
pub mod parsed_info;
pub mod track_metadata;

pub use audio_tag_service::{AudioTagService, RetagPreview, SkipReason, WriteOutcome};
pub use library_scanner::{read_all, LibraryScanner, ScanReport, ScannedFile};
pub use parsed_info::ParsedTrackInfo;
pub use track_metadata::get_track_metadata;
