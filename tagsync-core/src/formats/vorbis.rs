//! Vorbis comment mapping (FLAC, Ogg Vorbis, Opus, Speex)
//!
//! Field names follow the MusicBrainz Picard conventions. Multi-valued fields
//! are stored as repeated comments.

use super::lofty_tag::{KeyTable, NativeTag};
use super::sniff_file_type;
use crate::error::{Result, TagError};
use crate::tags::MusicBrainzField;
use lofty::config::ParseOptions;
use lofty::file::{AudioFile, FileType};
use lofty::flac::FlacFile;
use lofty::ogg::{OggPictureStorage, OpusFile, SpeexFile, VorbisComments, VorbisFile};
use lofty::picture::{Picture, PictureType};
use std::fs::File;
use std::path::Path;

pub(crate) static VORBIS_KEYS: KeyTable = KeyTable {
    title: "TITLE",
    performers: "ARTIST",
    album_artists: "ALBUMARTIST",
    album: "ALBUM",
    genres: "GENRE",
    media: "MEDIA",
    publisher: "LABEL",
    date: "DATE",
    original_date: "ORIGINALDATE",
    musicbrainz: [
        (MusicBrainzField::ReleaseId, "MUSICBRAINZ_ALBUMID"),
        (MusicBrainzField::ArtistId, "MUSICBRAINZ_ARTISTID"),
        (MusicBrainzField::ReleaseArtistId, "MUSICBRAINZ_ALBUMARTISTID"),
        (MusicBrainzField::ReleaseGroupId, "MUSICBRAINZ_RELEASEGROUPID"),
        (MusicBrainzField::TrackId, "MUSICBRAINZ_TRACKID"),
        (MusicBrainzField::ReleaseTrackId, "MUSICBRAINZ_RELEASETRACKID"),
        (MusicBrainzField::ReleaseCountry, "RELEASECOUNTRY"),
        (MusicBrainzField::ReleaseStatus, "RELEASESTATUS"),
        (MusicBrainzField::ReleaseType, "RELEASETYPE"),
        (MusicBrainzField::AlbumComment, "MUSICBRAINZ_ALBUMCOMMENT"),
    ],
    legacy: &["ORIGINALRELEASEDATE"],
};

impl NativeTag for VorbisComments {
    fn load(path: &Path) -> Result<Self> {
        let file_type = sniff_file_type(path)?;
        let mut reader = File::open(path)?;
        let options = ParseOptions::new();

        let tag = match file_type {
            FileType::Flac => {
                let flac = FlacFile::read_from(&mut reader, options)?;
                let mut tag = flac.vorbis_comments().cloned().unwrap_or_default();
                // FLAC keeps pictures in their own metadata blocks
                for (picture, info) in flac.pictures() {
                    tag.insert_picture(picture.clone(), Some(*info))?;
                }
                tag
            }
            FileType::Vorbis => VorbisFile::read_from(&mut reader, options)?
                .vorbis_comments()
                .clone(),
            FileType::Opus => OpusFile::read_from(&mut reader, options)?
                .vorbis_comments()
                .clone(),
            FileType::Speex => SpeexFile::read_from(&mut reader, options)?
                .vorbis_comments()
                .clone(),
            _ => return Err(TagError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(tag)
    }

    fn values(&self, key: &str) -> Vec<String> {
        self.get_all(key).map(str::to_string).collect()
    }

    fn set_values(&mut self, key: &str, values: &[String]) -> Result<()> {
        let _ = self.remove(key);
        for value in values {
            self.push(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn cover_size(&self) -> Option<u64> {
        let pictures = OggPictureStorage::pictures(self);
        pictures
            .iter()
            .map(|(picture, _)| picture)
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first().map(|(picture, _)| picture))
            .map(|p| p.data().len() as u64)
    }

    fn replace_cover(&mut self, picture: Picture) -> Result<()> {
        let _ = self.remove_pictures();
        self.insert_picture(picture, None)?;
        Ok(())
    }
}
