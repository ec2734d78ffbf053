//! Shared canonical mapping over lofty's native tag types
//!
//! Vorbis comments, MP4 ilst and APEv2 each load their own tag type from the
//! file, replace the managed keys and save that same tag back. Keys, atoms and
//! binary items with no canonical field are written back as they were read.

use super::{read_tagged_file, remove_lofty_tags, stream_info_of, ContainerFamily, FormatAdapter};
use crate::error::Result;
use crate::tags::{CanonicalTag, CoverImage, MusicBrainzField};
use lofty::ape::ApeTag;
use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::mp4::Ilst;
use lofty::ogg::VorbisComments;
use lofty::picture::{Picture, PictureType};
use lofty::tag::TagExt;
use std::io::Cursor;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info};

/// Native key names of one lofty-backed family
#[derive(Debug)]
pub(crate) struct KeyTable {
    pub title: &'static str,
    pub performers: &'static str,
    pub album_artists: &'static str,
    pub album: &'static str,
    pub genres: &'static str,
    pub media: &'static str,
    pub publisher: &'static str,
    /// Holds the date, or the year when no date is known
    pub date: &'static str,
    pub original_date: &'static str,
    pub musicbrainz: [(MusicBrainzField, &'static str); 10],
    /// Superseded original-date keys, read as fallbacks and removed on write
    pub legacy: &'static [&'static str],
}

/// A family's own tag type, edited in place
///
/// Track and disc numbers go through lofty's `Accessor`, which every native
/// tag implements with its family's own number layout.
pub trait NativeTag: TagExt<Err = LoftyError> {
    /// Tag of this family stored in the file, or an empty one
    fn load(path: &Path) -> Result<Self>;

    /// Every value stored under a key, in file order
    fn values(&self, key: &str) -> Vec<String>;

    /// Replace every value under a key; an empty slice removes the key
    fn set_values(&mut self, key: &str, values: &[String]) -> Result<()>;

    /// Data size of the front cover, or of the first picture
    fn cover_size(&self) -> Option<u64>;

    /// Drop every embedded picture and store `picture` in their place
    fn replace_cover(&mut self, picture: Picture) -> Result<()>;
}

fn text<T: NativeTag>(tag: &T, key: &str) -> Option<String> {
    tag.values(key)
        .into_iter()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn list<T: NativeTag>(tag: &T, key: &str) -> Vec<String> {
    tag.values(key)
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn set_text<T: NativeTag>(tag: &mut T, key: &str, value: Option<&str>) -> Result<()> {
    let values: Vec<String> = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .into_iter()
        .collect();
    tag.set_values(key, &values)
}

fn set_list<T: NativeTag>(tag: &mut T, key: &str, values: &[String]) -> Result<()> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    tag.set_values(key, &values)
}

/// Map a native tag into canonical fields (computed fields untouched)
pub(crate) fn read_canonical<T: NativeTag>(tag: &T, keys: &KeyTable, canonical: &mut CanonicalTag) {
    canonical.title = text(tag, keys.title);
    canonical.performers = list(tag, keys.performers);
    canonical.album_artists = list(tag, keys.album_artists);
    canonical.album = text(tag, keys.album);
    canonical.genres = list(tag, keys.genres);

    canonical.track = tag.track().filter(|&n| n > 0);
    canonical.track_count = tag.track_total().filter(|&n| n > 0);
    canonical.disc = tag.disk().filter(|&n| n > 0);
    canonical.disc_count = tag.disk_total().filter(|&n| n > 0);

    canonical.set_date_frame(text(tag, keys.date).as_deref());
    let original = text(tag, keys.original_date)
        .or_else(|| keys.legacy.iter().find_map(|legacy| text(tag, legacy)));
    canonical.set_original_date_frame(original.as_deref());

    canonical.media = text(tag, keys.media);
    canonical.publisher = text(tag, keys.publisher);

    for (field, key) in &keys.musicbrainz {
        field.set(canonical, text(tag, key));
    }

    canonical.image_size = tag.cover_size();
}

/// Rewrite both number pairs from scratch
///
/// Totals go first: some `remove_*_total` implementations re-insert the
/// number they find.
fn apply_numbers<T: NativeTag>(tag: &mut T, canonical: &CanonicalTag) {
    tag.remove_track_total();
    tag.remove_track();
    if let Some(n) = canonical.track {
        tag.set_track(n);
    }
    if let Some(n) = canonical.track_count {
        tag.set_track_total(n);
    }

    tag.remove_disk_total();
    tag.remove_disk();
    if let Some(n) = canonical.disc {
        tag.set_disk(n);
    }
    if let Some(n) = canonical.disc_count {
        tag.set_disk_total(n);
    }
}

/// Apply canonical fields to a native tag, leaving unmanaged items alone
pub(crate) fn apply_canonical<T: NativeTag>(
    tag: &mut T,
    keys: &KeyTable,
    canonical: &CanonicalTag,
) -> Result<()> {
    set_text(tag, keys.title, canonical.title.as_deref())?;
    set_list(tag, keys.performers, &canonical.performers)?;
    set_list(tag, keys.album_artists, &canonical.album_artists)?;
    set_text(tag, keys.album, canonical.album.as_deref())?;
    set_list(tag, keys.genres, &canonical.genres)?;

    apply_numbers(tag, canonical);

    for legacy in keys.legacy {
        set_text(tag, legacy, None)?;
    }
    set_text(tag, keys.date, canonical.date_frame().as_deref())?;
    set_text(tag, keys.original_date, canonical.original_date_frame().as_deref())?;

    set_text(tag, keys.media, canonical.media.as_deref())?;
    set_text(tag, keys.publisher, canonical.publisher.as_deref())?;

    for (field, key) in &keys.musicbrainz {
        set_text(tag, key, field.get(canonical))?;
    }
    Ok(())
}

/// Front cover picture from an image file's bytes
pub(crate) fn cover_picture(image: &CoverImage) -> Result<Picture> {
    let mut picture = Picture::from_reader(&mut Cursor::new(&image.data))?;
    picture.set_pic_type(PictureType::CoverFront);
    Ok(picture)
}

/// Adapter for the lofty-backed families, generic over the native tag type
pub struct LoftyAdapter<T> {
    family: ContainerFamily,
    keys: &'static KeyTable,
    native: PhantomData<fn() -> T>,
}

impl LoftyAdapter<VorbisComments> {
    pub fn vorbis() -> Self {
        Self::with_keys(ContainerFamily::Vorbis, &super::vorbis::VORBIS_KEYS)
    }
}

impl LoftyAdapter<Ilst> {
    pub fn mp4() -> Self {
        Self::with_keys(ContainerFamily::Mp4, &super::mp4::MP4_KEYS)
    }
}

impl LoftyAdapter<ApeTag> {
    pub fn ape() -> Self {
        Self::with_keys(ContainerFamily::Ape, &super::ape::APE_KEYS)
    }
}

impl<T> LoftyAdapter<T> {
    fn with_keys(family: ContainerFamily, keys: &'static KeyTable) -> Self {
        Self {
            family,
            keys,
            native: PhantomData,
        }
    }
}

impl<T: NativeTag> FormatAdapter for LoftyAdapter<T> {
    fn family(&self) -> ContainerFamily {
        self.family
    }

    fn read_native(&self, path: &Path) -> Result<CanonicalTag> {
        let file = read_tagged_file(path)?;

        let mut canonical = CanonicalTag::new();
        canonical.apply_stream_info(&stream_info_of(path, &file));

        let tag = T::load(path)?;
        if tag.is_empty() {
            debug!(file = %path.display(), format = %self.family, "File has no tags");
        }
        read_canonical(&tag, self.keys, &mut canonical);
        Ok(canonical)
    }

    fn write(&self, path: &Path, canonical: &CanonicalTag) -> Result<()> {
        let mut tag = T::load(path)?;
        apply_canonical(&mut tag, self.keys, canonical)?;
        if let Some(image) = CoverImage::for_tag(canonical) {
            tag.replace_cover(cover_picture(&image)?)?;
        }

        tag.save_to_path(path, WriteOptions::default())?;
        info!(file = %path.display(), format = %self.family, "Wrote tags");
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        remove_lofty_tags(path)
    }

    fn embed_cover(&self, path: &Path, image: &CoverImage) -> Result<()> {
        let mut tag = T::load(path)?;
        tag.replace_cover(cover_picture(image)?)?;
        tag.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}
