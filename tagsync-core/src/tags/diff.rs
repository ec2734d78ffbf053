//! Field-by-field comparison of canonical tags
//!
//! Every field is declared once in [`TagField`] together with its equality
//! strategy. Scalars compare directly; sequences compare as sets, since no
//! sequence field in the tag model is order-significant.

use super::CanonicalTag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Equality strategy of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Sequence,
}

/// Every comparable field of [`CanonicalTag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagField {
    Title,
    Performers,
    AlbumArtists,
    Album,
    Genres,
    Track,
    TrackCount,
    Disc,
    DiscCount,
    Date,
    Year,
    OriginalReleaseDate,
    OriginalYear,
    Media,
    Publisher,
    MusicBrainzReleaseId,
    MusicBrainzArtistId,
    MusicBrainzReleaseArtistId,
    MusicBrainzReleaseGroupId,
    MusicBrainzTrackId,
    MusicBrainzReleaseTrackId,
    MusicBrainzReleaseCountry,
    MusicBrainzReleaseStatus,
    MusicBrainzReleaseType,
    MusicBrainzAlbumComment,
    ImageFile,
    ImageSize,
    Duration,
    Quality,
    MediaInfo,
    IsValid,
}

impl TagField {
    pub const ALL: [TagField; 31] = [
        TagField::Title,
        TagField::Performers,
        TagField::AlbumArtists,
        TagField::Album,
        TagField::Genres,
        TagField::Track,
        TagField::TrackCount,
        TagField::Disc,
        TagField::DiscCount,
        TagField::Date,
        TagField::Year,
        TagField::OriginalReleaseDate,
        TagField::OriginalYear,
        TagField::Media,
        TagField::Publisher,
        TagField::MusicBrainzReleaseId,
        TagField::MusicBrainzArtistId,
        TagField::MusicBrainzReleaseArtistId,
        TagField::MusicBrainzReleaseGroupId,
        TagField::MusicBrainzTrackId,
        TagField::MusicBrainzReleaseTrackId,
        TagField::MusicBrainzReleaseCountry,
        TagField::MusicBrainzReleaseStatus,
        TagField::MusicBrainzReleaseType,
        TagField::MusicBrainzAlbumComment,
        TagField::ImageFile,
        TagField::ImageSize,
        TagField::Duration,
        TagField::Quality,
        TagField::MediaInfo,
        TagField::IsValid,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            TagField::Performers | TagField::AlbumArtists | TagField::Genres => FieldKind::Sequence,
            _ => FieldKind::Scalar,
        }
    }

    /// Human-readable name used in diffs and events
    pub fn name(&self) -> &'static str {
        match self {
            TagField::Title => "Title",
            TagField::Performers => "Performers",
            TagField::AlbumArtists => "Album Artists",
            TagField::Album => "Album",
            TagField::Genres => "Genres",
            TagField::Track => "Track",
            TagField::TrackCount => "Track Count",
            TagField::Disc => "Disc",
            TagField::DiscCount => "Disc Count",
            TagField::Date => "Date",
            TagField::Year => "Year",
            TagField::OriginalReleaseDate => "Original Release Date",
            TagField::OriginalYear => "Original Year",
            TagField::Media => "Media",
            TagField::Publisher => "Publisher",
            TagField::MusicBrainzReleaseId => "MusicBrainz Release Id",
            TagField::MusicBrainzArtistId => "MusicBrainz Artist Id",
            TagField::MusicBrainzReleaseArtistId => "MusicBrainz Release Artist Id",
            TagField::MusicBrainzReleaseGroupId => "MusicBrainz Release Group Id",
            TagField::MusicBrainzTrackId => "MusicBrainz Track Id",
            TagField::MusicBrainzReleaseTrackId => "MusicBrainz Release Track Id",
            TagField::MusicBrainzReleaseCountry => "MusicBrainz Release Country",
            TagField::MusicBrainzReleaseStatus => "MusicBrainz Release Status",
            TagField::MusicBrainzReleaseType => "MusicBrainz Release Type",
            TagField::MusicBrainzAlbumComment => "MusicBrainz Album Comment",
            TagField::ImageFile => "Image File",
            TagField::ImageSize => "Image Size",
            TagField::Duration => "Duration",
            TagField::Quality => "Quality",
            TagField::MediaInfo => "Media Info",
            TagField::IsValid => "Is Valid",
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed view of one field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Number(Option<u64>),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    fn text<T: ToString>(value: Option<T>) -> Self {
        FieldValue::Text(value.map(|v| v.to_string()))
    }

    /// Equality according to the field's kind
    pub fn matches(&self, other: &FieldValue, kind: FieldKind) -> bool {
        match (self, other, kind) {
            (FieldValue::List(a), FieldValue::List(b), FieldKind::Sequence) => {
                let a: HashSet<&String> = a.iter().collect();
                let b: HashSet<&String> = b.iter().collect();
                a == b
            }
            _ => self == other,
        }
    }

    /// Display rendering, empty for absent values
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(v) => v.clone().unwrap_or_default(),
            FieldValue::Number(v) => v.map(|n| n.to_string()).unwrap_or_default(),
            FieldValue::List(v) => v.join(" / "),
            FieldValue::Flag(v) => v.to_string(),
        }
    }
}

/// Read a field from a tag
pub fn field_value(tag: &CanonicalTag, field: TagField) -> FieldValue {
    let num = |v: Option<u32>| FieldValue::Number(v.map(u64::from));
    match field {
        TagField::Title => FieldValue::text(tag.title.as_ref()),
        TagField::Performers => FieldValue::List(tag.performers.clone()),
        TagField::AlbumArtists => FieldValue::List(tag.album_artists.clone()),
        TagField::Album => FieldValue::text(tag.album.as_ref()),
        TagField::Genres => FieldValue::List(tag.genres.clone()),
        TagField::Track => num(tag.track),
        TagField::TrackCount => num(tag.track_count),
        TagField::Disc => num(tag.disc),
        TagField::DiscCount => num(tag.disc_count),
        TagField::Date => FieldValue::text(tag.date.as_ref()),
        TagField::Year => num(tag.year),
        TagField::OriginalReleaseDate => FieldValue::text(tag.original_release_date.as_ref()),
        TagField::OriginalYear => num(tag.original_year),
        TagField::Media => FieldValue::text(tag.media.as_ref()),
        TagField::Publisher => FieldValue::text(tag.publisher.as_ref()),
        TagField::MusicBrainzReleaseId => FieldValue::text(tag.musicbrainz_release_id.as_ref()),
        TagField::MusicBrainzArtistId => FieldValue::text(tag.musicbrainz_artist_id.as_ref()),
        TagField::MusicBrainzReleaseArtistId => {
            FieldValue::text(tag.musicbrainz_release_artist_id.as_ref())
        }
        TagField::MusicBrainzReleaseGroupId => {
            FieldValue::text(tag.musicbrainz_release_group_id.as_ref())
        }
        TagField::MusicBrainzTrackId => FieldValue::text(tag.musicbrainz_track_id.as_ref()),
        TagField::MusicBrainzReleaseTrackId => {
            FieldValue::text(tag.musicbrainz_release_track_id.as_ref())
        }
        TagField::MusicBrainzReleaseCountry => {
            FieldValue::text(tag.musicbrainz_release_country.as_ref())
        }
        TagField::MusicBrainzReleaseStatus => {
            FieldValue::text(tag.musicbrainz_release_status.as_ref())
        }
        TagField::MusicBrainzReleaseType => FieldValue::text(tag.musicbrainz_release_type.as_ref()),
        TagField::MusicBrainzAlbumComment => {
            FieldValue::text(tag.musicbrainz_album_comment.as_ref())
        }
        TagField::ImageFile => FieldValue::text(tag.image_file.as_ref().map(|p| p.display())),
        TagField::ImageSize => FieldValue::Number(tag.image_size),
        TagField::Duration => FieldValue::Number(tag.duration.map(|d| d.as_millis() as u64)),
        TagField::Quality => FieldValue::text(Some(&tag.quality)),
        TagField::MediaInfo => FieldValue::text(Some(&tag.media_info)),
        TagField::IsValid => FieldValue::Flag(tag.is_valid),
    }
}

/// Set of fields excluded from a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipFields(BTreeSet<TagField>);

impl SkipFields {
    pub fn none() -> Self {
        Self::default()
    }

    /// Fields derived from the stream or the host rather than stored in tag frames
    pub fn computed() -> Self {
        Self::from_fields(&[
            TagField::IsValid,
            TagField::Duration,
            TagField::Quality,
            TagField::MediaInfo,
            TagField::ImageFile,
        ])
    }

    pub fn from_fields(fields: &[TagField]) -> Self {
        Self(fields.iter().copied().collect())
    }

    pub fn with(mut self, field: TagField) -> Self {
        self.0.insert(field);
        self
    }

    pub fn contains(&self, field: TagField) -> bool {
        self.0.contains(&field)
    }
}

fn compared_fields(skip: &SkipFields) -> impl Iterator<Item = TagField> + '_ {
    TagField::ALL.into_iter().filter(move |f| !skip.contains(*f))
}

fn field_differs(a: &CanonicalTag, b: &CanonicalTag, field: TagField) -> bool {
    !field_value(a, field).matches(&field_value(b, field), field.kind())
}

/// True if any compared field differs
pub fn differs(a: &CanonicalTag, b: &CanonicalTag, skip: &SkipFields) -> bool {
    compared_fields(skip).any(|f| field_differs(a, b, f))
}

/// Names of every compared field that differs
pub fn describe_differences(
    a: &CanonicalTag,
    b: &CanonicalTag,
    skip: &SkipFields,
) -> BTreeSet<TagField> {
    compared_fields(skip)
        .filter(|&f| field_differs(a, b, f))
        .collect()
}

/// Old/new renderings of every differing field, `old` taken from `a`
pub fn diff_values(
    a: &CanonicalTag,
    b: &CanonicalTag,
    skip: &SkipFields,
) -> BTreeMap<TagField, (String, String)> {
    describe_differences(a, b, skip)
        .into_iter()
        .map(|f| (f, (field_value(a, f).render(), field_value(b, f).render())))
        .collect()
}
