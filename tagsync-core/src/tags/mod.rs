//! Canonical tag model
//!
//! - [`CanonicalTag`]: format-agnostic metadata of one audio file
//! - [`date`]: tolerant date parsing
//! - [`quality`]: quality and stream description, populated on every read
//! - [`diff`]: field-by-field comparison with per-field equality
//! - [`scrub`]: MusicBrainz identifier removal
//! - [`cover_art`]: external cover image loading and change detection

pub mod cover_art;
pub mod date;
pub mod diff;
pub mod quality;
pub mod scrub;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use cover_art::CoverImage;
pub use date::TagDate;
pub use diff::{SkipFields, TagField};
pub use quality::{AudioFormat, MediaInfo, Quality, StreamInfo};

/// Unified metadata record of one audio file
///
/// A value object: produced fresh by every read and consumed by every write.
/// Sequence fields are empty rather than unset when the file has no such frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTag {
    pub title: Option<String>,
    pub performers: Vec<String>,
    pub album_artists: Vec<String>,
    pub album: Option<String>,
    pub genres: Vec<String>,

    pub track: Option<u32>,
    pub track_count: Option<u32>,
    pub disc: Option<u32>,
    pub disc_count: Option<u32>,

    pub date: Option<TagDate>,
    pub year: Option<u32>,
    pub original_release_date: Option<TagDate>,
    pub original_year: Option<u32>,

    /// Medium format, e.g. "CD"
    pub media: Option<String>,
    /// Record label
    pub publisher: Option<String>,

    pub musicbrainz_release_id: Option<String>,
    pub musicbrainz_artist_id: Option<String>,
    pub musicbrainz_release_artist_id: Option<String>,
    pub musicbrainz_release_group_id: Option<String>,
    /// Recording id
    pub musicbrainz_track_id: Option<String>,
    pub musicbrainz_release_track_id: Option<String>,
    pub musicbrainz_release_country: Option<String>,
    pub musicbrainz_release_status: Option<String>,
    pub musicbrainz_release_type: Option<String>,
    pub musicbrainz_album_comment: Option<String>,

    /// External cover image used as the write source
    pub image_file: Option<PathBuf>,
    /// Byte length of the external image, or of the embedded image after a read
    pub image_size: Option<u64>,

    pub duration: Option<Duration>,
    pub quality: Quality,
    pub media_info: MediaInfo,
    /// False when the read degraded
    pub is_valid: bool,
}

impl CanonicalTag {
    /// Empty tag with unknown quality
    pub fn new() -> Self {
        Self {
            title: None,
            performers: Vec::new(),
            album_artists: Vec::new(),
            album: None,
            genres: Vec::new(),
            track: None,
            track_count: None,
            disc: None,
            disc_count: None,
            date: None,
            year: None,
            original_release_date: None,
            original_year: None,
            media: None,
            publisher: None,
            musicbrainz_release_id: None,
            musicbrainz_artist_id: None,
            musicbrainz_release_artist_id: None,
            musicbrainz_release_group_id: None,
            musicbrainz_track_id: None,
            musicbrainz_release_track_id: None,
            musicbrainz_release_country: None,
            musicbrainz_release_status: None,
            musicbrainz_release_type: None,
            musicbrainz_album_comment: None,
            image_file: None,
            image_size: None,
            duration: None,
            quality: Quality::unknown(),
            media_info: MediaInfo::unknown(),
            is_valid: true,
        }
    }

    /// Result of a failed read: no tag fields, best-effort quality from the extension
    pub fn degraded(path: &Path) -> Self {
        Self {
            quality: Quality::from_path(path),
            media_info: MediaInfo::from_path(path),
            is_valid: false,
            ..Self::new()
        }
    }

    /// Copy decoded stream properties into the computed fields
    pub fn apply_stream_info(&mut self, stream: &StreamInfo) {
        self.duration = Some(stream.duration);
        self.quality = Quality::from_stream(stream);
        self.media_info = MediaInfo::from_stream(stream);
    }

    /// Date frame text to write for the release date
    pub fn date_frame(&self) -> Option<String> {
        date::join_date_frame(self.date.as_ref(), self.year)
    }

    /// Date frame text to write for the original release date
    pub fn original_date_frame(&self) -> Option<String> {
        date::join_date_frame(self.original_release_date.as_ref(), self.original_year)
    }

    /// Populate date and year from a release date frame
    pub fn set_date_frame(&mut self, raw: Option<&str>) {
        let (date, year) = date::split_date_frame(raw);
        self.date = date;
        self.year = year;
    }

    /// Populate original date and year from an original release date frame
    pub fn set_original_date_frame(&mut self, raw: Option<&str>) {
        let (date, year) = date::split_date_frame(raw);
        self.original_release_date = date;
        self.original_year = year;
    }

    /// True if any MusicBrainz identifier is present
    pub fn has_musicbrainz_ids(&self) -> bool {
        MusicBrainzField::ALL.iter().any(|f| f.get(self).is_some())
    }
}

impl Default for CanonicalTag {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed set of MusicBrainz identifier fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicBrainzField {
    ReleaseId,
    ArtistId,
    ReleaseArtistId,
    ReleaseGroupId,
    TrackId,
    ReleaseTrackId,
    ReleaseCountry,
    ReleaseStatus,
    ReleaseType,
    AlbumComment,
}

impl MusicBrainzField {
    pub const ALL: [MusicBrainzField; 10] = [
        MusicBrainzField::ReleaseId,
        MusicBrainzField::ArtistId,
        MusicBrainzField::ReleaseArtistId,
        MusicBrainzField::ReleaseGroupId,
        MusicBrainzField::TrackId,
        MusicBrainzField::ReleaseTrackId,
        MusicBrainzField::ReleaseCountry,
        MusicBrainzField::ReleaseStatus,
        MusicBrainzField::ReleaseType,
        MusicBrainzField::AlbumComment,
    ];

    pub fn get<'a>(&self, tag: &'a CanonicalTag) -> Option<&'a str> {
        self.slot(tag).as_deref()
    }

    pub fn set(&self, tag: &mut CanonicalTag, value: Option<String>) {
        *self.slot_mut(tag) = value.filter(|v| !v.is_empty());
    }

    fn slot<'a>(&self, tag: &'a CanonicalTag) -> &'a Option<String> {
        match self {
            MusicBrainzField::ReleaseId => &tag.musicbrainz_release_id,
            MusicBrainzField::ArtistId => &tag.musicbrainz_artist_id,
            MusicBrainzField::ReleaseArtistId => &tag.musicbrainz_release_artist_id,
            MusicBrainzField::ReleaseGroupId => &tag.musicbrainz_release_group_id,
            MusicBrainzField::TrackId => &tag.musicbrainz_track_id,
            MusicBrainzField::ReleaseTrackId => &tag.musicbrainz_release_track_id,
            MusicBrainzField::ReleaseCountry => &tag.musicbrainz_release_country,
            MusicBrainzField::ReleaseStatus => &tag.musicbrainz_release_status,
            MusicBrainzField::ReleaseType => &tag.musicbrainz_release_type,
            MusicBrainzField::AlbumComment => &tag.musicbrainz_album_comment,
        }
    }

    fn slot_mut<'a>(&self, tag: &'a mut CanonicalTag) -> &'a mut Option<String> {
        match self {
            MusicBrainzField::ReleaseId => &mut tag.musicbrainz_release_id,
            MusicBrainzField::ArtistId => &mut tag.musicbrainz_artist_id,
            MusicBrainzField::ReleaseArtistId => &mut tag.musicbrainz_release_artist_id,
            MusicBrainzField::ReleaseGroupId => &mut tag.musicbrainz_release_group_id,
            MusicBrainzField::TrackId => &mut tag.musicbrainz_track_id,
            MusicBrainzField::ReleaseTrackId => &mut tag.musicbrainz_release_track_id,
            MusicBrainzField::ReleaseCountry => &mut tag.musicbrainz_release_country,
            MusicBrainzField::ReleaseStatus => &mut tag.musicbrainz_release_status,
            MusicBrainzField::ReleaseType => &mut tag.musicbrainz_release_type,
            MusicBrainzField::AlbumComment => &mut tag.musicbrainz_album_comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tag_invariants() {
        let tag = CanonicalTag::new();
        assert!(tag.performers.is_empty());
        assert!(tag.album_artists.is_empty());
        assert!(tag.genres.is_empty());
        assert_eq!(tag.quality, Quality::unknown());
        assert_eq!(tag.media_info, MediaInfo::unknown());
        assert!(tag.is_valid);
    }

    #[test]
    fn test_degraded_tag_keeps_quality() {
        let tag = CanonicalTag::degraded(Path::new("/music/broken.flac"));
        assert!(!tag.is_valid);
        assert_eq!(tag.quality.format, AudioFormat::Flac);
        assert_eq!(tag.media_info.audio_format, "FLAC");
        assert!(tag.title.is_none());
    }

    #[test]
    fn test_musicbrainz_field_accessors() {
        let mut tag = CanonicalTag::new();
        assert!(!tag.has_musicbrainz_ids());

        MusicBrainzField::ReleaseCountry.set(&mut tag, Some("GB".to_string()));
        assert_eq!(tag.musicbrainz_release_country.as_deref(), Some("GB"));
        assert!(tag.has_musicbrainz_ids());

        MusicBrainzField::ReleaseCountry.set(&mut tag, Some(String::new()));
        assert!(!tag.has_musicbrainz_ids(), "Empty text is treated as absent");
    }

    #[test]
    fn test_date_frame_round_trip() {
        let mut tag = CanonicalTag::new();
        tag.set_date_frame(Some("2019-03-01"));
        assert_eq!(tag.year, Some(2019));
        assert_eq!(tag.date_frame().as_deref(), Some("2019-03-01"));

        tag.set_original_date_frame(Some("2009"));
        assert_eq!(tag.original_release_date, None);
        assert_eq!(tag.original_year, Some(2009));
        assert_eq!(tag.original_date_frame().as_deref(), Some("2009"));
    }
}
