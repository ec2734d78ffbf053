//! Container format adapters
//!
//! One [`FormatAdapter`] per container family, selected through an
//! [`AdapterRegistry`] keyed on the detected family:
//!
//! | Family | Containers | Backend |
//! |--------|------------|---------|
//! | Id3v2  | MP3, MP2, AAC (ADTS), WAV, AIFF | `id3` |
//! | Vorbis | FLAC, Ogg Vorbis, Opus, Speex | `lofty` |
//! | Mp4    | M4A, M4B, MP4 (AAC/ALAC) | `lofty` |
//! | Ape    | Monkey's Audio, WavPack, Musepack | `lofty` |
//! | Asf    | WMA | built-in ASF header codec |

pub mod ape;
pub mod asf;
pub mod id3v2;
mod lofty_tag;
pub mod mp4;
pub mod vorbis;

use crate::error::{Result, TagError};
use crate::tags::{AudioFormat, CanonicalTag, CoverImage, StreamInfo};
use lofty::ape::ApeTag;
use lofty::file::{AudioFile, FileType, TaggedFile, TaggedFileExt};
use lofty::mp4::Ilst;
use lofty::ogg::VorbisComments;
use lofty::probe::Probe;
use lofty::tag::TagType;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use lofty_tag::LoftyAdapter;

/// Container family, one adapter each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFamily {
    /// Frame-based ID3v2 tags
    Id3v2,
    /// Vorbis comment blocks
    Vorbis,
    /// MP4 atoms
    Mp4,
    /// APEv2 tag tables
    Ape,
    /// ASF attributes
    Asf,
}

impl ContainerFamily {
    /// Family of a lofty-detected file type
    pub fn from_file_type(file_type: FileType) -> Option<Self> {
        match file_type {
            FileType::Mpeg | FileType::Aac | FileType::Wav | FileType::Aiff => {
                Some(ContainerFamily::Id3v2)
            }
            FileType::Flac | FileType::Opus | FileType::Vorbis | FileType::Speex => {
                Some(ContainerFamily::Vorbis)
            }
            FileType::Mp4 => Some(ContainerFamily::Mp4),
            FileType::Ape | FileType::WavPack | FileType::Mpc => Some(ContainerFamily::Ape),
            _ => None,
        }
    }

    /// Family implied by a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if asf::EXTENSIONS.contains(&ext.as_str()) {
            return Some(ContainerFamily::Asf);
        }
        FileType::from_ext(&ext).and_then(Self::from_file_type)
    }
}

impl fmt::Display for ContainerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerFamily::Id3v2 => "ID3v2",
            ContainerFamily::Vorbis => "Vorbis",
            ContainerFamily::Mp4 => "MP4",
            ContainerFamily::Ape => "APE",
            ContainerFamily::Asf => "ASF",
        };
        f.write_str(name)
    }
}

/// Read/write contract of one container family
///
/// Writes must keep native frames that [`CanonicalTag`] does not represent.
/// An absent canonical field removes its native frame.
pub trait FormatAdapter: Send + Sync {
    fn family(&self) -> ContainerFamily;

    /// Parse tags and stream properties, failing on unreadable containers
    fn read_native(&self, path: &Path) -> Result<CanonicalTag>;

    /// Parse tags, degrading instead of failing
    ///
    /// A failed parse logs exactly one warning and yields a tag with every tag
    /// field empty, `is_valid == false`, and quality derived from the extension.
    fn read(&self, path: &Path) -> CanonicalTag {
        match self.read_native(path) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(
                    file = %path.display(),
                    format = %self.family(),
                    error = %e,
                    "Failed to read tags, returning degraded tag"
                );
                CanonicalTag::degraded(path)
            }
        }
    }

    /// Write every managed field, embedding `image_file` when the tag names one
    fn write(&self, path: &Path, tag: &CanonicalTag) -> Result<()>;

    /// Strip every tag of this family, leaving stream data intact
    fn remove_all(&self, path: &Path) -> Result<()>;

    /// Replace the embedded front cover
    fn embed_cover(&self, path: &Path, image: &CoverImage) -> Result<()>;
}

/// Registry of adapters keyed on container family
pub struct AdapterRegistry {
    adapters: HashMap<ContainerFamily, Box<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with an adapter for every built-in family
    pub fn with_default_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(id3v2::Id3v2Adapter::new()));
        registry.register(Box::new(LoftyAdapter::<VorbisComments>::vorbis()));
        registry.register(Box::new(LoftyAdapter::<Ilst>::mp4()));
        registry.register(Box::new(LoftyAdapter::<ApeTag>::ape()));
        registry.register(Box::new(asf::AsfAdapter::new()));
        registry
    }

    /// Add or replace the adapter for its family
    pub fn register(&mut self, adapter: Box<dyn FormatAdapter>) {
        self.adapters.insert(adapter.family(), adapter);
    }

    pub fn adapter(&self, family: ContainerFamily) -> Option<&dyn FormatAdapter> {
        self.adapters.get(&family).map(|a| a.as_ref())
    }

    /// True if a registered family handles this extension
    pub fn supports_extension(&self, ext: &str) -> bool {
        ContainerFamily::from_extension(ext)
            .map(|family| self.adapters.contains_key(&family))
            .unwrap_or(false)
    }

    /// Adapter for a file, by content sniffing with an extension fallback
    pub fn adapter_for(&self, path: &Path) -> Result<&dyn FormatAdapter> {
        detect_family(path)
            .and_then(|family| self.adapter(family))
            .ok_or_else(|| TagError::UnsupportedFormat(path.to_path_buf()))
    }

    /// Degrading read through the matching adapter
    pub fn read(&self, path: &Path) -> CanonicalTag {
        match self.adapter_for(path) {
            Ok(adapter) => adapter.read(path),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read tags, returning degraded tag");
                CanonicalTag::degraded(path)
            }
        }
    }

    pub fn write(&self, path: &Path, tag: &CanonicalTag) -> Result<()> {
        self.adapter_for(path)?.write(path, tag)
    }

    pub fn remove_all(&self, path: &Path) -> Result<()> {
        self.adapter_for(path)?.remove_all(path)
    }

    pub fn embed_cover(&self, path: &Path, image: &CoverImage) -> Result<()> {
        self.adapter_for(path)?.embed_cover(path, image)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}

/// Detect the container family of a file
///
/// ASF is sniffed first since lofty has no ASF support; everything else goes
/// through lofty content sniffing, then the extension.
pub fn detect_family(path: &Path) -> Option<ContainerFamily> {
    if asf::has_asf_header(path) {
        return Some(ContainerFamily::Asf);
    }

    let sniffed = Probe::open(path)
        .ok()
        .and_then(|p| p.guess_file_type().ok())
        .and_then(|p| p.file_type())
        .and_then(ContainerFamily::from_file_type);
    if sniffed.is_some() {
        return sniffed;
    }

    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ContainerFamily::from_extension);
    debug!(file = %path.display(), family = ?by_extension, "Content sniffing inconclusive, using extension");
    by_extension
}

/// Audio format of a lofty file type
pub(crate) fn audio_format_of(file_type: FileType) -> AudioFormat {
    match file_type {
        FileType::Mpeg => AudioFormat::Mp3,
        FileType::Aac | FileType::Mp4 => AudioFormat::Aac,
        FileType::Flac => AudioFormat::Flac,
        FileType::Opus => AudioFormat::Opus,
        FileType::Vorbis => AudioFormat::Vorbis,
        FileType::Speex => AudioFormat::Speex,
        FileType::Ape => AudioFormat::Ape,
        FileType::WavPack => AudioFormat::WavPack,
        FileType::Mpc => AudioFormat::Musepack,
        FileType::Wav => AudioFormat::Wav,
        FileType::Aiff => AudioFormat::Aiff,
        _ => AudioFormat::Unknown,
    }
}

/// Open and fully parse a file with lofty
pub(crate) fn read_tagged_file(path: &Path) -> Result<TaggedFile> {
    Ok(Probe::open(path)?.guess_file_type()?.read()?)
}

/// Content-sniffed lofty file type
pub(crate) fn sniff_file_type(path: &Path) -> Result<FileType> {
    Probe::open(path)?
        .guess_file_type()?
        .file_type()
        .ok_or_else(|| TagError::UnsupportedFormat(path.to_path_buf()))
}

/// Stream properties of a lofty-parsed file
pub(crate) fn stream_info_of(path: &Path, file: &TaggedFile) -> StreamInfo {
    let properties = file.properties();
    let format = match (file.file_type(), AudioFormat::from_path(path)) {
        // MPEG layer II shares the container; the extension tells them apart
        (FileType::Mpeg, AudioFormat::Mp2) => AudioFormat::Mp2,
        (file_type, _) => audio_format_of(file_type),
    };

    StreamInfo {
        format,
        duration: properties.duration(),
        bitrate_kbps: properties.audio_bitrate(),
        sample_rate: properties.sample_rate(),
        bit_depth: properties.bit_depth(),
        channels: properties.channels(),
    }
}

/// Remove every tag type a lofty-supported file can carry
pub(crate) fn remove_lofty_tags(path: &Path) -> Result<()> {
    let file_type = read_tagged_file(path)?.file_type();
    for tag_type in [
        TagType::Id3v2,
        TagType::Id3v1,
        TagType::Ape,
        TagType::VorbisComments,
        TagType::Mp4Ilst,
        TagType::RiffInfo,
        TagType::AiffText,
    ] {
        if file_type.supports_tag_type(tag_type) {
            tag_type.remove_from_path(path)?;
        }
    }
    debug!(file = %path.display(), "Removed all tags");
    Ok(())
}

/// Hidden sibling path used for write-then-rename updates
///
/// The original extension is kept so the staged copy detects as the same family.
pub(crate) fn atomic_temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".tagsync-tmp.{}", file_name))
}

/// Read the first `n` bytes of a file, or fewer if it is shorter
pub(crate) fn read_prefix(path: &Path, n: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(n);
    File::open(path)?.take(n as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
