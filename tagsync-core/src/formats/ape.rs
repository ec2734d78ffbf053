//! APEv2 mapping (Monkey's Audio, WavPack, Musepack)
//!
//! APE items have no separate date field: "Year" carries the full date when
//! known. Multi-valued fields are NUL-separated within one item.

use super::lofty_tag::{KeyTable, NativeTag};
use super::sniff_file_type;
use crate::error::{Result, TagError};
use crate::tags::MusicBrainzField;
use lofty::ape::{ApeFile, ApeItem, ApeTag};
use lofty::config::ParseOptions;
use lofty::file::{AudioFile, FileType};
use lofty::musepack::MpcFile;
use lofty::picture::{Picture, PictureType};
use lofty::tag::ItemValue;
use lofty::wavpack::WavPackFile;
use std::fs::File;
use std::path::Path;

pub(crate) static APE_KEYS: KeyTable = KeyTable {
    title: "Title",
    performers: "Artist",
    album_artists: "Album Artist",
    album: "Album",
    genres: "Genre",
    media: "Media",
    publisher: "Label",
    date: "Year",
    original_date: "ORIGINALYEAR",
    musicbrainz: [
        (MusicBrainzField::ReleaseId, "MUSICBRAINZ_ALBUMID"),
        (MusicBrainzField::ArtistId, "MUSICBRAINZ_ARTISTID"),
        (MusicBrainzField::ReleaseArtistId, "MUSICBRAINZ_ALBUMARTISTID"),
        (MusicBrainzField::ReleaseGroupId, "MUSICBRAINZ_RELEASEGROUPID"),
        (MusicBrainzField::TrackId, "MUSICBRAINZ_TRACKID"),
        (MusicBrainzField::ReleaseTrackId, "MUSICBRAINZ_RELEASETRACKID"),
        (MusicBrainzField::ReleaseCountry, "RELEASECOUNTRY"),
        (MusicBrainzField::ReleaseStatus, "MUSICBRAINZ_ALBUMSTATUS"),
        (MusicBrainzField::ReleaseType, "MUSICBRAINZ_ALBUMTYPE"),
        (MusicBrainzField::AlbumComment, "MUSICBRAINZ_ALBUMCOMMENT"),
    ],
    legacy: &["Original Date", "Original Year"],
};

const COVER_KEY_PREFIX: &str = "cover art (";

fn is_cover_key(key: &str) -> bool {
    key.len() > COVER_KEY_PREFIX.len()
        && key.is_char_boundary(COVER_KEY_PREFIX.len())
        && key[..COVER_KEY_PREFIX.len()].eq_ignore_ascii_case(COVER_KEY_PREFIX)
}

fn cover_keys(tag: &ApeTag) -> Vec<String> {
    tag.into_iter()
        .map(ApeItem::key)
        .filter(|key| is_cover_key(key))
        .map(str::to_string)
        .collect()
}

fn cover_from_item(item: &ApeItem) -> Option<Picture> {
    match item.value() {
        ItemValue::Binary(bytes) => Picture::from_ape_bytes(item.key(), bytes).ok(),
        _ => None,
    }
}

impl NativeTag for ApeTag {
    fn load(path: &Path) -> Result<Self> {
        let file_type = sniff_file_type(path)?;
        let mut reader = File::open(path)?;
        let options = ParseOptions::new();

        let tag = match file_type {
            FileType::Ape => ApeFile::read_from(&mut reader, options)?.ape().cloned(),
            FileType::WavPack => WavPackFile::read_from(&mut reader, options)?.ape().cloned(),
            FileType::Mpc => MpcFile::read_from(&mut reader, options)?.ape().cloned(),
            _ => return Err(TagError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(tag.unwrap_or_default())
    }

    fn values(&self, key: &str) -> Vec<String> {
        match self.get(key).map(ApeItem::value) {
            Some(ItemValue::Text(text)) => text.split('\0').map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    fn set_values(&mut self, key: &str, values: &[String]) -> Result<()> {
        self.remove(key);
        if !values.is_empty() {
            let item = ApeItem::new(key.to_string(), ItemValue::Text(values.join("\0")))?;
            self.insert(item);
        }
        Ok(())
    }

    fn cover_size(&self) -> Option<u64> {
        let front = PictureType::CoverFront.as_ape_key().and_then(|key| self.get(key));
        front
            .and_then(cover_from_item)
            .or_else(|| {
                self.into_iter()
                    .filter(|item| is_cover_key(item.key()))
                    .find_map(cover_from_item)
            })
            .map(|p| p.data().len() as u64)
    }

    fn replace_cover(&mut self, picture: Picture) -> Result<()> {
        for key in cover_keys(self) {
            self.remove(&key);
        }

        let pic_type = picture.pic_type();
        let key = pic_type.as_ape_key().unwrap_or("Cover Art (Front)");
        let item = ApeItem::new(key.to_string(), ItemValue::Binary(picture.as_ape_bytes()))?;
        self.insert(item);
        Ok(())
    }
}
