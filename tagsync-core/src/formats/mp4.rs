//! MP4 atom mapping (M4A, M4B, MP4)
//!
//! Standard iTunes atoms where one exists, `----:com.apple.iTunes:` freeform
//! atoms for everything else. Multi-valued fields hold one data atom per value.

use super::lofty_tag::{KeyTable, NativeTag};
use crate::error::Result;
use crate::tags::MusicBrainzField;
use lofty::config::ParseOptions;
use lofty::file::AudioFile;
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::picture::Picture;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

pub(crate) static MP4_KEYS: KeyTable = KeyTable {
    title: "\u{a9}nam",
    performers: "\u{a9}ART",
    album_artists: "aART",
    album: "\u{a9}alb",
    genres: "\u{a9}gen",
    media: "----:com.apple.iTunes:MEDIA",
    publisher: "----:com.apple.iTunes:LABEL",
    date: "\u{a9}day",
    original_date: "----:com.apple.iTunes:ORIGINALDATE",
    musicbrainz: [
        (MusicBrainzField::ReleaseId, "----:com.apple.iTunes:MusicBrainz Album Id"),
        (MusicBrainzField::ArtistId, "----:com.apple.iTunes:MusicBrainz Artist Id"),
        (
            MusicBrainzField::ReleaseArtistId,
            "----:com.apple.iTunes:MusicBrainz Album Artist Id",
        ),
        (
            MusicBrainzField::ReleaseGroupId,
            "----:com.apple.iTunes:MusicBrainz Release Group Id",
        ),
        (MusicBrainzField::TrackId, "----:com.apple.iTunes:MusicBrainz Track Id"),
        (
            MusicBrainzField::ReleaseTrackId,
            "----:com.apple.iTunes:MusicBrainz Release Track Id",
        ),
        (
            MusicBrainzField::ReleaseCountry,
            "----:com.apple.iTunes:MusicBrainz Album Release Country",
        ),
        (
            MusicBrainzField::ReleaseStatus,
            "----:com.apple.iTunes:MusicBrainz Album Status",
        ),
        (MusicBrainzField::ReleaseType, "----:com.apple.iTunes:MusicBrainz Album Type"),
        (
            MusicBrainzField::AlbumComment,
            "----:com.apple.iTunes:MusicBrainz Album Comment",
        ),
    ],
    legacy: &["----:com.apple.iTunes:Original Date"],
};

/// Atom identifier for a key table entry
///
/// `----:mean:name` is a freeform atom; anything else is a fourcc whose
/// characters are Latin-1 (`©nam` and friends).
fn atom_ident(key: &str) -> AtomIdent<'static> {
    if let Some(rest) = key.strip_prefix("----:") {
        if let Some((mean, name)) = rest.split_once(':') {
            return AtomIdent::Freeform {
                mean: Cow::Owned(mean.to_string()),
                name: Cow::Owned(name.to_string()),
            };
        }
    }

    let mut fourcc = [b' '; 4];
    for (slot, c) in fourcc.iter_mut().zip(key.chars()) {
        *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
    AtomIdent::Fourcc(fourcc)
}

impl NativeTag for Ilst {
    fn load(path: &Path) -> Result<Self> {
        let mut reader = File::open(path)?;
        let file = Mp4File::read_from(&mut reader, ParseOptions::new())?;
        Ok(file.ilst().cloned().unwrap_or_default())
    }

    fn values(&self, key: &str) -> Vec<String> {
        let Some(atom) = self.get(&atom_ident(key)) else {
            return Vec::new();
        };
        atom.data()
            .filter_map(|data| match data {
                AtomData::UTF8(text) | AtomData::UTF16(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn set_values(&mut self, key: &str, values: &[String]) -> Result<()> {
        let ident = atom_ident(key);
        let _ = self.remove(&ident);

        let data = values.iter().cloned().map(AtomData::UTF8).collect();
        if let Some(atom) = Atom::from_collection(ident, data) {
            self.insert(atom);
        }
        Ok(())
    }

    fn cover_size(&self) -> Option<u64> {
        self.pictures()?.next().map(|p| p.data().len() as u64)
    }

    fn replace_cover(&mut self, picture: Picture) -> Result<()> {
        self.remove_pictures();
        self.insert_picture(picture);
        Ok(())
    }
}
