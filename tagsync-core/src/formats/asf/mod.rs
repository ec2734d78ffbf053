//! ASF adapter (WMA)
//!
//! Title and performers live in the Content Description object; everything
//! else is an Extended Content Description descriptor. A cover too large for a
//! descriptor is stored in the Metadata Library instead. Writes rebuild only
//! the Header Object; the Data Object and any index objects are copied verbatim.

mod object;

use super::{atomic_temp_path, read_prefix, ContainerFamily, FormatAdapter};
use crate::error::Result;
use crate::tags::{AudioFormat, CanonicalTag, CoverImage, MusicBrainzField, StreamInfo};
use object::{
    AsfHeader, AudioProperties, Descriptor, DescriptorValue, LibraryRecord, WmPicture, HEADER_GUID,
};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Extensions of ASF audio files
pub const EXTENSIONS: &[&str] = &["wma", "asf"];

const ALBUM_ARTIST: &str = "WM/AlbumArtist";
const ALBUM: &str = "WM/AlbumTitle";
const GENRE: &str = "WM/Genre";
const TRACK: &str = "WM/TrackNumber";
const TRACK_TOTAL: &str = "TrackTotal";
const DISC: &str = "WM/PartOfSet";
const PUBLISHER: &str = "WM/Publisher";
const MEDIA: &str = "WM/Media";
const YEAR: &str = "WM/Year";
const ORIGINAL_DATE: &str = "WM/OriginalReleaseTime";
const ORIGINAL_YEAR: &str = "WM/OriginalReleaseYear";
const PICTURE: &str = "WM/Picture";

const MUSICBRAINZ_KEYS: [(MusicBrainzField, &str); 10] = [
    (MusicBrainzField::ReleaseId, "MusicBrainz/Album Id"),
    (MusicBrainzField::ArtistId, "MusicBrainz/Artist Id"),
    (MusicBrainzField::ReleaseArtistId, "MusicBrainz/Album Artist Id"),
    (MusicBrainzField::ReleaseGroupId, "MusicBrainz/Release Group Id"),
    (MusicBrainzField::TrackId, "MusicBrainz/Track Id"),
    (MusicBrainzField::ReleaseTrackId, "MusicBrainz/Release Track Id"),
    (MusicBrainzField::ReleaseCountry, "MusicBrainz/Album Release Country"),
    (MusicBrainzField::ReleaseStatus, "MusicBrainz/Album Status"),
    (MusicBrainzField::ReleaseType, "MusicBrainz/Album Type"),
    (MusicBrainzField::AlbumComment, "MusicBrainz/Album Comment"),
];

/// Performers share the single Author field
const AUTHOR_SEPARATOR: &str = "; ";

/// True if the file starts with the ASF Header Object GUID
pub fn has_asf_header(path: &Path) -> bool {
    read_prefix(path, HEADER_GUID.len())
        .map(|prefix| prefix == HEADER_GUID)
        .unwrap_or(false)
}

fn read_header(path: &Path) -> Result<(AsfHeader, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    AsfHeader::read_from(&mut reader)
}

/// Write a new header followed by the original file's remaining objects
fn rewrite_header(path: &Path, mut header: AsfHeader, old_header_len: u64) -> Result<()> {
    let original_len = fs::metadata(path)?.len();
    let new_header_len = header.to_bytes()?.len() as u64;
    header.set_file_size(new_header_len + original_len.saturating_sub(old_header_len));
    let bytes = header.to_bytes()?;

    let temp = atomic_temp_path(path);
    let result = (|| -> Result<()> {
        let mut source = File::open(path)?;
        let permissions = source.metadata()?.permissions();
        source.seek(SeekFrom::Start(old_header_len))?;
        let mut writer = BufWriter::new(File::create(&temp)?);
        writer.write_all(&bytes)?;
        io::copy(&mut source, &mut writer)?;
        writer.flush()?;
        fs::set_permissions(&temp, permissions)?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            fs::rename(&temp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&temp);
            Err(e)
        }
    }
}

fn first_text(descriptors: &[Descriptor], name: &str) -> Option<String> {
    descriptors
        .iter()
        .filter(|d| d.name.eq_ignore_ascii_case(name))
        .find_map(|d| d.value.as_text())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn all_text(descriptors: &[Descriptor], name: &str) -> Vec<String> {
    descriptors
        .iter()
        .filter(|d| d.name.eq_ignore_ascii_case(name))
        .filter_map(|d| d.value.as_text())
        .flat_map(|v| v.split('\0').map(str::to_string).collect::<Vec<_>>())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn number(descriptors: &[Descriptor], name: &str) -> Option<u32> {
    first_text(descriptors, name)
        .and_then(|v| v.split('/').next().and_then(|n| n.trim().parse().ok()))
        .filter(|&n| n > 0)
}

fn pictures<'a>(descriptors: impl IntoIterator<Item = &'a Descriptor>) -> Vec<WmPicture> {
    descriptors
        .into_iter()
        .filter(|d| d.name.eq_ignore_ascii_case(PICTURE))
        .filter_map(|d| match &d.value {
            DescriptorValue::Bytes(bytes) => WmPicture::decode(bytes).ok(),
            _ => None,
        })
        .collect()
}

/// Map header objects into canonical fields
fn read_canonical(header: &AsfHeader, canonical: &mut CanonicalTag) -> Result<()> {
    let content = header.content_description()?;
    let descriptors = header.descriptors()?;
    let library = header.library_records()?;

    canonical.title = Some(content.title.trim().to_string()).filter(|v| !v.is_empty());
    canonical.performers = content
        .author
        .split(AUTHOR_SEPARATOR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    canonical.album_artists = all_text(&descriptors, ALBUM_ARTIST);
    canonical.album = first_text(&descriptors, ALBUM);
    canonical.genres = all_text(&descriptors, GENRE);

    canonical.track = number(&descriptors, TRACK);
    canonical.track_count = number(&descriptors, TRACK_TOTAL);
    let part_of_set = first_text(&descriptors, DISC);
    let mut disc = part_of_set.as_deref().unwrap_or_default().split('/');
    canonical.disc = disc.next().and_then(|n| n.trim().parse().ok()).filter(|&n| n > 0);
    canonical.disc_count = disc.next().and_then(|n| n.trim().parse().ok()).filter(|&n| n > 0);

    canonical.set_date_frame(first_text(&descriptors, YEAR).as_deref());
    let original = first_text(&descriptors, ORIGINAL_DATE)
        .or_else(|| first_text(&descriptors, ORIGINAL_YEAR));
    canonical.set_original_date_frame(original.as_deref());

    canonical.media = first_text(&descriptors, MEDIA);
    canonical.publisher = first_text(&descriptors, PUBLISHER);

    for (field, name) in &MUSICBRAINZ_KEYS {
        field.set(canonical, first_text(&descriptors, name));
    }

    let pictures = pictures(descriptors.iter().chain(library.iter().map(|r| &r.descriptor)));
    canonical.image_size = pictures
        .iter()
        .find(|p| p.picture_type == WmPicture::FRONT_COVER)
        .or_else(|| pictures.first())
        .map(|p| p.data.len() as u64);
    Ok(())
}

/// Names rewritten from canonical fields; anything else is carried over
fn is_managed(name: &str) -> bool {
    [
        ALBUM_ARTIST,
        ALBUM,
        GENRE,
        TRACK,
        TRACK_TOTAL,
        DISC,
        PUBLISHER,
        MEDIA,
        YEAR,
        ORIGINAL_DATE,
        ORIGINAL_YEAR,
    ]
    .iter()
    .chain(MUSICBRAINZ_KEYS.iter().map(|(_, name)| name))
    .any(|managed| managed.eq_ignore_ascii_case(name))
}

/// Apply canonical fields to the header, keeping unmanaged descriptors
fn apply_canonical(header: &mut AsfHeader, canonical: &CanonicalTag) -> Result<()> {
    let mut content = header.content_description()?;
    content.title = canonical.title.clone().unwrap_or_default();
    content.author = canonical.performers.join(AUTHOR_SEPARATOR);
    header.set_content_description(&content)?;

    let mut descriptors: Vec<Descriptor> = header
        .descriptors()?
        .into_iter()
        .filter(|d| !is_managed(&d.name))
        .collect();

    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            descriptors.push(Descriptor::text(name, &value));
        }
    };

    for artist in &canonical.album_artists {
        push(ALBUM_ARTIST, Some(artist.clone()));
    }
    push(ALBUM, canonical.album.clone());
    for genre in &canonical.genres {
        push(GENRE, Some(genre.clone()));
    }
    push(TRACK, canonical.track.map(|n| n.to_string()));
    push(TRACK_TOTAL, canonical.track_count.map(|n| n.to_string()));
    push(
        DISC,
        canonical.disc.map(|n| match canonical.disc_count {
            Some(total) => format!("{}/{}", n, total),
            None => n.to_string(),
        }),
    );
    push(YEAR, canonical.date_frame());
    push(ORIGINAL_DATE, canonical.original_date_frame());
    push(MEDIA, canonical.media.clone());
    push(PUBLISHER, canonical.publisher.clone());
    for (field, name) in &MUSICBRAINZ_KEYS {
        push(name, field.get(canonical).map(str::to_string));
    }

    header.set_descriptors(&descriptors)?;

    let library: Vec<LibraryRecord> = header
        .library_records()?
        .into_iter()
        .filter(|r| !is_managed(&r.descriptor.name))
        .collect();
    header.set_library_records(&library)
}

/// Replace every WM/Picture with the given front cover
///
/// Covers that fit a descriptor's 16-bit length go in the Extended Content
/// Description, larger ones in the Metadata Library.
fn replace_cover(header: &mut AsfHeader, image: &CoverImage) -> Result<()> {
    let picture = WmPicture {
        picture_type: WmPicture::FRONT_COVER,
        mime_type: image.mime_type.clone(),
        description: String::new(),
        data: image.data.clone(),
    };
    let mut descriptors: Vec<Descriptor> = header
        .descriptors()?
        .into_iter()
        .filter(|d| !d.name.eq_ignore_ascii_case(PICTURE))
        .collect();
    let mut library: Vec<LibraryRecord> = header
        .library_records()?
        .into_iter()
        .filter(|r| !r.descriptor.name.eq_ignore_ascii_case(PICTURE))
        .collect();

    let encoded = picture.encode()?;
    let fits_descriptor = encoded.len() <= usize::from(u16::MAX);
    let descriptor = Descriptor {
        name: PICTURE.to_string(),
        value: DescriptorValue::Bytes(encoded),
    };
    if fits_descriptor {
        descriptors.push(descriptor);
    } else {
        library.push(LibraryRecord::file_wide(descriptor));
    }

    header.set_descriptors(&descriptors)?;
    header.set_library_records(&library)
}

fn stream_info(props: &AudioProperties) -> StreamInfo {
    let bitrate_kbps = if props.avg_bytes_per_sec > 0 {
        Some(props.avg_bytes_per_sec * 8 / 1000)
    } else if props.max_bitrate > 0 {
        Some(props.max_bitrate / 1000)
    } else {
        None
    };
    StreamInfo {
        format: AudioFormat::Wma,
        duration: Duration::from_millis(props.duration_ms),
        bitrate_kbps,
        sample_rate: Some(props.sample_rate).filter(|&r| r > 0),
        bit_depth: u8::try_from(props.bits_per_sample).ok().filter(|&b| b > 0),
        channels: u8::try_from(props.channels).ok().filter(|&c| c > 0),
    }
}

/// ASF adapter
#[derive(Debug, Default)]
pub struct AsfAdapter;

impl AsfAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for AsfAdapter {
    fn family(&self) -> ContainerFamily {
        ContainerFamily::Asf
    }

    fn read_native(&self, path: &Path) -> Result<CanonicalTag> {
        let (header, _) = read_header(path)?;

        let mut canonical = CanonicalTag::new();
        canonical.apply_stream_info(&stream_info(&header.audio_properties()?));
        read_canonical(&header, &mut canonical)?;
        Ok(canonical)
    }

    fn write(&self, path: &Path, canonical: &CanonicalTag) -> Result<()> {
        let (mut header, header_len) = read_header(path)?;
        apply_canonical(&mut header, canonical)?;

        if let Some(image) = CoverImage::for_tag(canonical) {
            replace_cover(&mut header, &image)?;
        }

        rewrite_header(path, header, header_len)?;
        info!(file = %path.display(), format = "ASF", "Wrote tags");
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        let (mut header, header_len) = read_header(path)?;
        header.set_content_description(&Default::default())?;
        header.set_descriptors(&[])?;
        header.set_library_records(&[])?;
        rewrite_header(path, header, header_len)?;
        debug!(file = %path.display(), "Removed all tags");
        Ok(())
    }

    fn embed_cover(&self, path: &Path, image: &CoverImage) -> Result<()> {
        let (mut header, header_len) = read_header(path)?;
        replace_cover(&mut header, image)?;
        rewrite_header(path, header, header_len)
    }
}
