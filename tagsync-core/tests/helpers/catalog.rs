//! Catalog fixtures for orchestrator tests

use chrono::NaiveDate;
use std::path::Path;
use tagsync_common::models::{Album, AlbumRelease, ArtistMetadata, Medium, Track, TrackFile};
use tagsync_core::{CanonicalTag, TagDate};

fn artist(name: &str, id: &str) -> ArtistMetadata {
    ArtistMetadata {
        foreign_artist_id: id.to_string(),
        name: name.to_string(),
        genres: vec!["Artist Genre".to_string()],
    }
}

/// Track file linked to a ten-track, two-medium release
///
/// Media are numbered from `1 + medium_offset`. The file is the first track
/// of the first medium. Country is left empty.
pub fn populated_track_file(path: &Path, medium_offset: u32) -> TrackFile {
    let performer = artist("Performer", "1f9df192-a621-4f54-8850-2c5373b7eac9");
    let tracks: Vec<Track> = (0..10u32)
        .map(|i| Track {
            foreign_track_id: format!("0b5d9a6e-0000-4000-8000-{:012}", i),
            foreign_recording_id: format!("4c8f1b2a-0000-4000-8000-{:012}", i),
            title: format!("Title{}", i + 1),
            absolute_track_number: i % 5 + 1,
            medium_number: i / 5 + 1 + medium_offset,
            artist: performer.clone(),
        })
        .collect();

    let release = AlbumRelease {
        foreign_release_id: "9e7f0a3c-5b1d-4f2e-8a6b-3c4d5e6f7a8b".to_string(),
        title: "Album".to_string(),
        status: "Official".to_string(),
        release_date: NaiveDate::from_ymd_opt(2019, 3, 1),
        country: Vec::new(),
        label: vec!["Label".to_string()],
        media: (1..=2)
            .map(|n| Medium {
                number: n + medium_offset,
                name: None,
                format: Some("CD".to_string()),
            })
            .collect(),
        tracks: tracks.clone(),
    };

    let album = Album {
        foreign_album_id: "b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e".to_string(),
        title: "Album".to_string(),
        album_type: "Album".to_string(),
        disambiguation: None,
        release_date: NaiveDate::from_ymd_opt(2009, 4, 1),
        genres: vec!["Rock".to_string()],
        artist: artist("Album Artist", "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d"),
        cover_image: None,
    };

    let mut file = TrackFile::new(path);
    file.tracks = vec![tracks[0].clone()];
    file.release = Some(release);
    file.album = Some(album);
    file
}

/// Tag with every managed field set
pub fn fully_populated_tag() -> CanonicalTag {
    let mut tag = CanonicalTag::new();
    tag.title = Some("Título".to_string());
    tag.performers = vec!["Performer 1".to_string(), "Performer 2".to_string()];
    tag.album_artists = vec!["방탄소년단".to_string()];
    tag.album = Some("Album ünïcödé".to_string());
    tag.genres = vec!["Rock".to_string(), "Pop".to_string()];
    tag.track = Some(2);
    tag.track_count = Some(12);
    tag.disc = Some(1);
    tag.disc_count = Some(2);
    tag.date = TagDate::from_ymd(2019, 3, 1);
    tag.year = Some(2019);
    tag.original_release_date = TagDate::from_ymd(2009, 4, 1);
    tag.original_year = Some(2009);
    tag.media = Some("CD".to_string());
    tag.publisher = Some("Label".to_string());
    tag.musicbrainz_release_id = Some("9e7f0a3c-5b1d-4f2e-8a6b-3c4d5e6f7a8b".to_string());
    tag.musicbrainz_artist_id = Some("1f9df192-a621-4f54-8850-2c5373b7eac9".to_string());
    tag.musicbrainz_release_artist_id = Some("a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d".to_string());
    tag.musicbrainz_release_group_id = Some("b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e".to_string());
    tag.musicbrainz_track_id = Some("4c8f1b2a-0000-4000-8000-000000000001".to_string());
    tag.musicbrainz_release_track_id = Some("0b5d9a6e-0000-4000-8000-000000000001".to_string());
    tag.musicbrainz_release_country = Some("GB".to_string());
    tag.musicbrainz_release_status = Some("official".to_string());
    tag.musicbrainz_release_type = Some("album".to_string());
    tag.musicbrainz_album_comment = Some("Deluxe".to_string());
    tag
}
