//! Desired tag derivation from catalog data
//!
//! Builds the tag a file *should* carry from its catalog links alone, without
//! touching the file. Missing optional catalog data (medium entry, country,
//! label) resolves to absent fields.

use crate::error::{Result, TagError};
use crate::tags::cover_art::image_file_size;
use crate::tags::{CanonicalTag, TagDate};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tagsync_common::models::TrackFile;
use tagsync_common::TagConfig;
use tracing::debug;

/// Country names as the catalog spells them, keyed lower-case, to ISO 3166-1 alpha-2
static COUNTRY_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("[worldwide]", "XW"),
        ("worldwide", "XW"),
        ("europe", "XE"),
        ("argentina", "AR"),
        ("australia", "AU"),
        ("austria", "AT"),
        ("belgium", "BE"),
        ("brazil", "BR"),
        ("bulgaria", "BG"),
        ("canada", "CA"),
        ("chile", "CL"),
        ("china", "CN"),
        ("colombia", "CO"),
        ("croatia", "HR"),
        ("czech republic", "CZ"),
        ("czechia", "CZ"),
        ("denmark", "DK"),
        ("estonia", "EE"),
        ("finland", "FI"),
        ("france", "FR"),
        ("germany", "DE"),
        ("greece", "GR"),
        ("hong kong", "HK"),
        ("hungary", "HU"),
        ("iceland", "IS"),
        ("india", "IN"),
        ("indonesia", "ID"),
        ("ireland", "IE"),
        ("israel", "IL"),
        ("italy", "IT"),
        ("jamaica", "JM"),
        ("japan", "JP"),
        ("latvia", "LV"),
        ("lithuania", "LT"),
        ("luxembourg", "LU"),
        ("malaysia", "MY"),
        ("mexico", "MX"),
        ("netherlands", "NL"),
        ("new zealand", "NZ"),
        ("norway", "NO"),
        ("peru", "PE"),
        ("philippines", "PH"),
        ("poland", "PL"),
        ("portugal", "PT"),
        ("romania", "RO"),
        ("russia", "RU"),
        ("russian federation", "RU"),
        ("serbia", "RS"),
        ("singapore", "SG"),
        ("slovakia", "SK"),
        ("slovenia", "SI"),
        ("south africa", "ZA"),
        ("south korea", "KR"),
        ("korea, republic of", "KR"),
        ("spain", "ES"),
        ("sweden", "SE"),
        ("switzerland", "CH"),
        ("taiwan", "TW"),
        ("thailand", "TH"),
        ("turkey", "TR"),
        ("ukraine", "UA"),
        ("united kingdom", "GB"),
        ("united states", "US"),
        ("venezuela", "VE"),
    ]
    .into_iter()
    .collect()
});

/// ISO code for a catalog country name; two-letter codes pass through
pub fn country_code(name: &str) -> Option<String> {
    let name = name.trim();
    if name.len() == 2 && name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(name.to_ascii_uppercase());
    }
    COUNTRY_CODES
        .get(name.to_lowercase().as_str())
        .map(|code| code.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trimmed values, blanks dropped
fn non_empty_list(values: &[String]) -> Vec<String> {
    values.iter().filter_map(|v| non_empty(v)).collect()
}

/// Build the desired tag of a track file from its catalog links
///
/// Fails with [`TagError::MissingCatalogData`] when the file has no track,
/// release or album; every other gap yields an absent field.
pub fn get_track_metadata(track_file: &TrackFile, config: &TagConfig) -> Result<CanonicalTag> {
    let missing = |what: &str| {
        TagError::MissingCatalogData(format!("{} for {}", what, track_file.path.display()))
    };
    let track = track_file.primary_track().ok_or_else(|| missing("no track"))?;
    let release = track_file.release.as_ref().ok_or_else(|| missing("no release"))?;
    let album = track_file.album.as_ref().ok_or_else(|| missing("no album"))?;

    let mut tag = CanonicalTag::new();
    tag.title = non_empty(&track.title);
    tag.performers = non_empty(&track.artist.name).into_iter().collect();
    tag.album_artists = non_empty(&album.artist.name).into_iter().collect();
    tag.album = non_empty(&album.title);
    let album_genres = non_empty_list(&album.genres);
    tag.genres = if album_genres.is_empty() {
        non_empty_list(&album.artist.genres)
    } else {
        album_genres
    };

    tag.track = Some(track.absolute_track_number).filter(|&n| n > 0);
    let on_medium = release.tracks_on_medium(track.medium_number);
    let track_count = if on_medium > 0 { on_medium } else { release.tracks.len() };
    tag.track_count = u32::try_from(track_count).ok().filter(|&n| n > 0);
    tag.disc = Some(track.medium_number).filter(|&n| n > 0);
    tag.disc_count = u32::try_from(release.media.len()).ok().filter(|&n| n > 0);

    tag.media = match release.medium(track.medium_number) {
        Some(medium) => medium.format.as_deref().and_then(non_empty),
        None => {
            debug!(
                file = %track_file.path.display(),
                medium = track.medium_number,
                "Release has no entry for medium"
            );
            None
        }
    };

    tag.date = release.release_date.and_then(TagDate::from_naive);
    tag.year = tag.date.map(|d| d.year());
    tag.original_release_date = album.release_date.and_then(TagDate::from_naive);
    tag.original_year = tag.original_release_date.map(|d| d.year());

    tag.publisher = release.label.first().and_then(|l| non_empty(l));

    tag.musicbrainz_release_id = non_empty(&release.foreign_release_id);
    tag.musicbrainz_artist_id = non_empty(&track.artist.foreign_artist_id);
    tag.musicbrainz_release_artist_id = non_empty(&album.artist.foreign_artist_id);
    tag.musicbrainz_release_group_id = non_empty(&album.foreign_album_id);
    tag.musicbrainz_track_id = non_empty(&track.foreign_recording_id);
    tag.musicbrainz_release_track_id = non_empty(&track.foreign_track_id);
    tag.musicbrainz_release_country = release.country.first().and_then(|c| country_code(c));
    tag.musicbrainz_release_status = non_empty(&release.status.to_lowercase());
    tag.musicbrainz_release_type = non_empty(&album.album_type.to_lowercase());
    tag.musicbrainz_album_comment = album.disambiguation.as_deref().and_then(non_empty);

    if config.embed_cover_art {
        if let Some(cover) = &album.cover_image {
            if let Some(size) = image_file_size(cover) {
                tag.image_file = Some(cover.clone());
                tag.image_size = Some(size);
            }
        }
    }

    Ok(tag)
}
