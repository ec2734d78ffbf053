//! ID3v2 adapter (MP3, MP2, ADTS AAC, WAV, AIFF)
//!
//! Frames are read and written with the `id3` crate. Tags are always saved as
//! ID3v2.4; legacy v2.3 date frames are read as fallbacks and dropped on write.

use super::{read_tagged_file, remove_lofty_tags, stream_info_of, ContainerFamily, FormatAdapter};
use crate::error::Result;
use crate::tags::{CanonicalTag, CoverImage, MusicBrainzField};
use id3::frame::{Content, ExtendedText, Picture, PictureType, UniqueFileIdentifier};
use id3::{ErrorKind, Tag, TagLike, Version};
use lofty::file::FileType;
use lofty::probe::Probe;
use std::path::Path;
use tracing::{debug, info};

const MUSICBRAINZ_UFID_OWNER: &str = "http://musicbrainz.org";

/// TXXX descriptions of the MusicBrainz fields
const TXXX_KEYS: [(MusicBrainzField, &str); 10] = [
    (MusicBrainzField::ReleaseId, "MusicBrainz Album Id"),
    (MusicBrainzField::ArtistId, "MusicBrainz Artist Id"),
    (MusicBrainzField::ReleaseArtistId, "MusicBrainz Album Artist Id"),
    (MusicBrainzField::ReleaseGroupId, "MusicBrainz Release Group Id"),
    (MusicBrainzField::TrackId, "MusicBrainz Track Id"),
    (MusicBrainzField::ReleaseTrackId, "MusicBrainz Release Track Id"),
    (MusicBrainzField::ReleaseCountry, "MusicBrainz Album Release Country"),
    (MusicBrainzField::ReleaseStatus, "MusicBrainz Album Status"),
    (MusicBrainzField::ReleaseType, "MusicBrainz Album Type"),
    (MusicBrainzField::AlbumComment, "MusicBrainz Album Comment"),
];

/// v2.3 date frames replaced by TDRC
const LEGACY_DATE_FRAMES: [&str; 4] = ["TYER", "TDAT", "TIME", "TRDA"];

/// Where the ID3 tag lives inside the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Id3Container {
    /// Prepended to the stream (MP3, MP2, AAC)
    Plain,
    /// "ID3 " RIFF chunk
    Wav,
    /// "ID3 " IFF chunk
    Aiff,
}

impl Id3Container {
    fn of(path: &Path) -> Self {
        let sniffed = Probe::open(path)
            .ok()
            .and_then(|p| p.guess_file_type().ok())
            .and_then(|p| p.file_type());
        let file_type = sniffed.or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(FileType::from_ext)
        });
        match file_type {
            Some(FileType::Wav) => Id3Container::Wav,
            Some(FileType::Aiff) => Id3Container::Aiff,
            _ => Id3Container::Plain,
        }
    }

    /// Existing tag, or an empty one when the file has none
    fn load(self, path: &Path) -> Result<Tag> {
        let read = match self {
            Id3Container::Plain => Tag::read_from_path(path),
            Id3Container::Wav => Tag::read_from_wav_path(path),
            Id3Container::Aiff => Tag::read_from_aiff_path(path),
        };
        match read {
            Ok(tag) => Ok(tag),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(Tag::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(self, tag: &Tag, path: &Path) -> Result<()> {
        match self {
            Id3Container::Plain => tag.write_to_path(path, Version::Id3v24)?,
            Id3Container::Wav => tag.write_to_wav_path(path, Version::Id3v24)?,
            Id3Container::Aiff => tag.write_to_aiff_path(path, Version::Id3v24)?,
        }
        Ok(())
    }
}

fn text(tag: &Tag, id: &str) -> Option<String> {
    tag.get(id)
        .and_then(|frame| frame.content().text())
        .map(|v| v.trim_matches(|c: char| c == '\0' || c.is_whitespace()))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn list(tag: &Tag, id: &str) -> Vec<String> {
    tag.get(id)
        .and_then(|frame| frame.content().text())
        .map(|v| {
            v.split('\0')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn extended_text(tag: &Tag, description: &str) -> Option<String> {
    tag.extended_texts()
        .find(|t| t.description.eq_ignore_ascii_case(description))
        .map(|t| t.value.trim_matches('\0').trim().to_string())
        .filter(|v| !v.is_empty())
}

fn musicbrainz_ufid(tag: &Tag) -> Option<String> {
    tag.frames()
        .filter_map(|frame| match frame.content() {
            Content::UniqueFileIdentifier(ufid) => Some(ufid),
            _ => None,
        })
        .find(|ufid| ufid.owner_identifier == MUSICBRAINZ_UFID_OWNER)
        .map(|ufid| String::from_utf8_lossy(&ufid.identifier).trim().to_string())
        .filter(|v| !v.is_empty())
}

fn set_text_opt(tag: &mut Tag, id: &str, value: Option<&str>) {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => tag.set_text(id, v.to_string()),
        _ => {
            tag.remove(id);
        }
    }
}

fn set_list(tag: &mut Tag, id: &str, values: &[String]) {
    if values.is_empty() {
        tag.remove(id);
    } else {
        tag.set_text(id, values.join("\0"));
    }
}

/// TRCK/TPOS as "n" or "n/total"
fn set_slash_pair(tag: &mut Tag, id: &str, n: Option<u32>, total: Option<u32>) {
    match (n, total) {
        (Some(n), Some(t)) => tag.set_text(id, format!("{}/{}", n, t)),
        (Some(n), None) => tag.set_text(id, n.to_string()),
        (None, _) => {
            tag.remove(id);
        }
    }
}

fn set_extended_text(tag: &mut Tag, description: &str, value: Option<&str>) {
    tag.remove_extended_text(Some(description), None);
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        tag.add_frame(ExtendedText {
            description: description.to_string(),
            value: value.to_string(),
        });
    }
}

fn set_musicbrainz_ufid(tag: &mut Tag, recording_id: Option<&str>) {
    let others: Vec<UniqueFileIdentifier> = tag
        .frames()
        .filter_map(|frame| match frame.content() {
            Content::UniqueFileIdentifier(ufid) => Some(ufid.clone()),
            _ => None,
        })
        .filter(|ufid| ufid.owner_identifier != MUSICBRAINZ_UFID_OWNER)
        .collect();
    tag.remove("UFID");
    for ufid in others {
        tag.add_frame(ufid);
    }

    if let Some(id) = recording_id {
        tag.add_frame(UniqueFileIdentifier {
            owner_identifier: MUSICBRAINZ_UFID_OWNER.to_string(),
            identifier: id.as_bytes().to_vec(),
        });
    }
}

/// Release date frame: TDRC, or the v2.3 TYER + TDAT ("DDMM") pair
fn release_date_text(tag: &Tag) -> Option<String> {
    if let Some(tdrc) = text(tag, "TDRC") {
        return Some(tdrc);
    }
    let year = text(tag, "TYER")?;
    match text(tag, "TDAT").filter(|d| d.len() == 4 && d.bytes().all(|b| b.is_ascii_digit())) {
        Some(ddmm) => Some(format!("{}-{}-{}", year, &ddmm[2..4], &ddmm[0..2])),
        None => Some(year),
    }
}

/// Map ID3 frames into canonical fields (computed fields untouched)
pub(crate) fn read_frames(tag: &Tag, canonical: &mut CanonicalTag) {
    canonical.title = text(tag, "TIT2");
    canonical.performers = list(tag, "TPE1");
    canonical.album_artists = list(tag, "TPE2");
    canonical.album = text(tag, "TALB");
    canonical.genres = list(tag, "TCON");

    canonical.track = tag.track().filter(|&n| n > 0);
    canonical.track_count = tag.total_tracks().filter(|&n| n > 0);
    canonical.disc = tag.disc().filter(|&n| n > 0);
    canonical.disc_count = tag.total_discs().filter(|&n| n > 0);

    canonical.set_date_frame(release_date_text(tag).as_deref());
    let original = text(tag, "TDOR").or_else(|| text(tag, "TORY"));
    canonical.set_original_date_frame(original.as_deref());

    canonical.media = text(tag, "TMED");
    canonical.publisher = text(tag, "TPUB");

    for (field, description) in &TXXX_KEYS {
        field.set(canonical, extended_text(tag, description));
    }
    if let Some(recording_id) = musicbrainz_ufid(tag) {
        canonical.musicbrainz_track_id = Some(recording_id);
    }

    let pictures: Vec<&Picture> = tag.pictures().collect();
    canonical.image_size = pictures
        .iter()
        .find(|p| p.picture_type == PictureType::CoverFront)
        .or_else(|| pictures.first())
        .map(|p| p.data.len() as u64);
}

/// Apply canonical fields to ID3 frames, leaving unmanaged frames alone
pub(crate) fn apply_frames(tag: &mut Tag, canonical: &CanonicalTag) {
    set_text_opt(tag, "TIT2", canonical.title.as_deref());
    set_list(tag, "TPE1", &canonical.performers);
    set_list(tag, "TPE2", &canonical.album_artists);
    set_text_opt(tag, "TALB", canonical.album.as_deref());
    set_list(tag, "TCON", &canonical.genres);

    set_slash_pair(tag, "TRCK", canonical.track, canonical.track_count);
    set_slash_pair(tag, "TPOS", canonical.disc, canonical.disc_count);

    set_text_opt(tag, "TDRC", canonical.date_frame().as_deref());
    for id in LEGACY_DATE_FRAMES {
        tag.remove(id);
    }
    set_text_opt(tag, "TDOR", canonical.original_date_frame().as_deref());
    tag.remove("TORY");

    set_text_opt(tag, "TMED", canonical.media.as_deref());
    set_text_opt(tag, "TPUB", canonical.publisher.as_deref());

    for (field, description) in &TXXX_KEYS {
        set_extended_text(tag, description, field.get(canonical));
    }
    set_musicbrainz_ufid(tag, canonical.musicbrainz_track_id.as_deref());
}

fn replace_cover(tag: &mut Tag, image: &CoverImage) {
    tag.remove_all_pictures();
    tag.add_frame(Picture {
        mime_type: image.mime_type.clone(),
        picture_type: PictureType::CoverFront,
        description: String::new(),
        data: image.data.clone(),
    });
}

/// ID3v2 adapter
#[derive(Debug, Default)]
pub struct Id3v2Adapter;

impl Id3v2Adapter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for Id3v2Adapter {
    fn family(&self) -> ContainerFamily {
        ContainerFamily::Id3v2
    }

    fn read_native(&self, path: &Path) -> Result<CanonicalTag> {
        let file = read_tagged_file(path)?;
        let container = Id3Container::of(path);

        let mut canonical = CanonicalTag::new();
        canonical.apply_stream_info(&stream_info_of(path, &file));

        let tag = container.load(path)?;
        if tag.frames().next().is_none() {
            debug!(file = %path.display(), "File has no ID3 tag");
        }
        read_frames(&tag, &mut canonical);
        Ok(canonical)
    }

    fn write(&self, path: &Path, canonical: &CanonicalTag) -> Result<()> {
        let container = Id3Container::of(path);
        let mut tag = container.load(path)?;
        apply_frames(&mut tag, canonical);
        if let Some(image) = CoverImage::for_tag(canonical) {
            replace_cover(&mut tag, &image);
        }

        container.save(&tag, path)?;
        info!(file = %path.display(), format = "ID3v2.4", "Wrote tags");
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        remove_lofty_tags(path)
    }

    fn embed_cover(&self, path: &Path, image: &CoverImage) -> Result<()> {
        let container = Id3Container::of(path);
        let mut tag = container.load(path)?;
        replace_cover(&mut tag, image);
        container.save(&tag, path)
    }
}
