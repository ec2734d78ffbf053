//! Catalog models consumed by the tag engine
//!
//! These mirror the music catalog's entities closely enough to derive desired
//! tags. They carry no persistence; the catalog layer owns their lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Artist identity and descriptive metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistMetadata {
    /// MusicBrainz artist id
    pub foreign_artist_id: String,
    pub name: String,
    pub genres: Vec<String>,
}

/// Release group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// MusicBrainz release group id
    pub foreign_album_id: String,
    pub title: String,
    /// Primary type, e.g. "Album", "EP"
    pub album_type: String,
    pub disambiguation: Option<String>,
    /// First release date of the release group
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
    /// Album (release) artist
    pub artist: ArtistMetadata,
    /// Managed cover image on disk, if the catalog has fetched one
    pub cover_image: Option<PathBuf>,
}

/// One disc/medium of a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    /// Medium number as printed, not a list position
    pub number: u32,
    pub name: Option<String>,
    /// Physical format, e.g. "CD", "Digital Media"
    pub format: Option<String>,
}

/// A specific release of an album
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRelease {
    /// MusicBrainz release id
    pub foreign_release_id: String,
    pub title: String,
    /// e.g. "Official", "Bootleg"
    pub status: String,
    pub release_date: Option<NaiveDate>,
    /// Country names, most relevant first
    pub country: Vec<String>,
    /// Label names, most relevant first
    pub label: Vec<String>,
    pub media: Vec<Medium>,
    /// Every track of the release, across all media
    pub tracks: Vec<Track>,
}

impl AlbumRelease {
    /// Look up a medium by its number
    pub fn medium(&self, number: u32) -> Option<&Medium> {
        self.media.iter().find(|m| m.number == number)
    }

    /// Number of release tracks on the given medium
    pub fn tracks_on_medium(&self, number: u32) -> usize {
        self.tracks.iter().filter(|t| t.medium_number == number).count()
    }
}

/// A track of a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// MusicBrainz track id (release-specific)
    pub foreign_track_id: String,
    /// MusicBrainz recording id
    pub foreign_recording_id: String,
    pub title: String,
    /// Position on its medium
    pub absolute_track_number: u32,
    pub medium_number: u32,
    /// Track artist
    pub artist: ArtistMetadata,
}

/// Tracked media file (host record)
///
/// The tag engine updates only `size` and `modified`, after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFile {
    pub id: Uuid,
    pub path: PathBuf,
    /// Size in bytes when last recorded
    pub size: u64,
    /// Modification time when last recorded
    pub modified: DateTime<Utc>,
    /// Logical tracks contained in the file (usually exactly one)
    pub tracks: Vec<Track>,
    pub release: Option<AlbumRelease>,
    pub album: Option<Album>,
}

impl TrackFile {
    /// Create a host record for a path with no catalog links
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            size: 0,
            modified: DateTime::<Utc>::default(),
            tracks: Vec::new(),
            release: None,
            album: None,
        }
    }

    /// First track represented by this file
    pub fn primary_track(&self) -> Option<&Track> {
        self.tracks.first()
    }
}
