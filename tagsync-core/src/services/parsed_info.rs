//! Parsed track info
//!
//! The condensed view of a file's tags consumed by import and matching code,
//! which cares about identity and quality rather than every stored field.

use crate::tags::{CanonicalTag, MediaInfo, Quality};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity and quality summary of one audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTrackInfo {
    pub title: Option<String>,
    /// Album artist, or the first performer when the file has none
    pub artist_title: Option<String>,
    pub album_title: Option<String>,
    pub disc_number: Option<u32>,
    pub disc_count: Option<u32>,
    pub track_number: Option<u32>,
    pub track_count: Option<u32>,
    pub year: Option<u32>,
    pub release_country: Option<String>,
    pub label: Option<String>,
    pub release_mbid: Option<String>,
    pub release_group_mbid: Option<String>,
    pub recording_mbid: Option<String>,
    pub track_mbid: Option<String>,
    pub artist_mbid: Option<String>,
    pub album_artist_mbid: Option<String>,
    pub duration: Option<Duration>,
    pub quality: Quality,
    pub media_info: MediaInfo,
    /// False when the underlying read degraded
    pub is_valid: bool,
}

impl From<&CanonicalTag> for ParsedTrackInfo {
    fn from(tag: &CanonicalTag) -> Self {
        let artist_title = tag
            .album_artists
            .first()
            .or_else(|| tag.performers.first())
            .cloned();

        Self {
            title: tag.title.clone(),
            artist_title,
            album_title: tag.album.clone(),
            disc_number: tag.disc,
            disc_count: tag.disc_count,
            track_number: tag.track,
            track_count: tag.track_count,
            year: tag.year,
            release_country: tag.musicbrainz_release_country.clone(),
            label: tag.publisher.clone(),
            release_mbid: tag.musicbrainz_release_id.clone(),
            release_group_mbid: tag.musicbrainz_release_group_id.clone(),
            recording_mbid: tag.musicbrainz_track_id.clone(),
            track_mbid: tag.musicbrainz_release_track_id.clone(),
            artist_mbid: tag.musicbrainz_artist_id.clone(),
            album_artist_mbid: tag.musicbrainz_release_artist_id.clone(),
            duration: tag.duration,
            quality: tag.quality.clone(),
            media_info: tag.media_info.clone(),
            is_valid: tag.is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_artist_falls_back_to_performer() {
        let mut tag = CanonicalTag::new();
        tag.performers = vec!["Performer".to_string()];
        assert_eq!(
            ParsedTrackInfo::from(&tag).artist_title.as_deref(),
            Some("Performer")
        );

        tag.album_artists = vec!["Album Artist".to_string()];
        assert_eq!(
            ParsedTrackInfo::from(&tag).artist_title.as_deref(),
            Some("Album Artist"),
            "Album artist takes precedence"
        );
    }

    #[test]
    fn test_degraded_tag_keeps_quality() {
        let info = ParsedTrackInfo::from(&CanonicalTag::degraded(Path::new("missing.mp3")));
        assert!(!info.is_valid);
        assert_eq!(info.title, None);
        assert_eq!(info.media_info.audio_format, "MP3");
    }
}
