//! Encoding quality and technical stream description
//!
//! Both are always populated after a read. When stream properties cannot be
//! obtained the format falls back to the file extension, and failing that to
//! an explicit "unknown" value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Audio encoding family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    Mp2,
    Flac,
    Alac,
    Aac,
    Vorbis,
    Opus,
    Speex,
    Wma,
    Ape,
    WavPack,
    Musepack,
    Wav,
    Aiff,
    Unknown,
}

impl AudioFormat {
    /// Classify from a file extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "mp2" => AudioFormat::Mp2,
            "flac" => AudioFormat::Flac,
            "m4a" | "m4b" | "mp4" | "m4p" | "aac" => AudioFormat::Aac,
            "ogg" | "oga" => AudioFormat::Vorbis,
            "opus" => AudioFormat::Opus,
            "spx" => AudioFormat::Speex,
            "wma" | "asf" => AudioFormat::Wma,
            "ape" => AudioFormat::Ape,
            "wv" => AudioFormat::WavPack,
            "mpc" => AudioFormat::Musepack,
            "wav" => AudioFormat::Wav,
            "aif" | "aiff" | "aifc" => AudioFormat::Aiff,
            _ => AudioFormat::Unknown,
        }
    }

    /// Classify from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(AudioFormat::Unknown)
    }

    /// Lossless encodings report bit depth instead of bitrate
    pub fn is_lossless(&self) -> bool {
        matches!(
            self,
            AudioFormat::Flac
                | AudioFormat::Alac
                | AudioFormat::Ape
                | AudioFormat::WavPack
                | AudioFormat::Wav
                | AudioFormat::Aiff
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Mp2 => "MP2",
            AudioFormat::Flac => "FLAC",
            AudioFormat::Alac => "ALAC",
            AudioFormat::Aac => "AAC",
            AudioFormat::Vorbis => "Vorbis",
            AudioFormat::Opus => "Opus",
            AudioFormat::Speex => "Speex",
            AudioFormat::Wma => "WMA",
            AudioFormat::Ape => "APE",
            AudioFormat::WavPack => "WavPack",
            AudioFormat::Musepack => "Musepack",
            AudioFormat::Wav => "WAV",
            AudioFormat::Aiff => "AIFF",
            AudioFormat::Unknown => "Unknown",
        }
    }
}

/// Where a quality classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitySource {
    /// Decoded stream properties
    Properties,
    /// File extension only
    Extension,
    /// Nothing usable
    Unknown,
}

/// Best-effort encoding quality classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub format: AudioFormat,
    pub bitrate_kbps: Option<u32>,
    pub bit_depth: Option<u8>,
    pub source: QualitySource,
}

/// Standard MPEG layer III bitrates in kbps
const MP3_BITRATES: [u32; 14] = [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];

impl Quality {
    /// Value used when neither properties nor extension identify the file
    pub fn unknown() -> Self {
        Self {
            format: AudioFormat::Unknown,
            bitrate_kbps: None,
            bit_depth: None,
            source: QualitySource::Unknown,
        }
    }

    /// Classification from the extension alone
    pub fn from_path(path: &Path) -> Self {
        match AudioFormat::from_path(path) {
            AudioFormat::Unknown => Self::unknown(),
            format => Self {
                format,
                bitrate_kbps: None,
                bit_depth: None,
                source: QualitySource::Extension,
            },
        }
    }

    /// Classification from decoded stream properties
    pub fn from_stream(stream: &StreamInfo) -> Self {
        let format = match stream.format {
            AudioFormat::Aac if stream.bit_depth.is_some() => AudioFormat::Alac,
            other => other,
        };

        let bitrate_kbps = match format {
            AudioFormat::Mp3 | AudioFormat::Mp2 => stream.bitrate_kbps.map(snap_mpeg_bitrate),
            f if f.is_lossless() => None,
            _ => stream.bitrate_kbps,
        };

        Self {
            format,
            bitrate_kbps,
            bit_depth: if format.is_lossless() { stream.bit_depth } else { None },
            source: QualitySource::Properties,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.format, self.bitrate_kbps, self.bit_depth) {
            (AudioFormat::Unknown, _, _) => write!(f, "Unknown"),
            (AudioFormat::Flac, _, Some(24)) => write!(f, "FLAC 24bit"),
            (format, Some(kbps), _) => write!(f, "{}-{}", format.name(), kbps),
            (format, None, _) => write!(f, "{}", format.name()),
        }
    }
}

fn snap_mpeg_bitrate(kbps: u32) -> u32 {
    MP3_BITRATES
        .iter()
        .copied()
        .min_by_key(|&standard| standard.abs_diff(kbps))
        .unwrap_or(kbps)
}

/// Technical stream description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub audio_format: String,
    pub audio_bitrate: Option<u32>,
    pub audio_channels: Option<u8>,
    pub audio_bits: Option<u8>,
    pub audio_sample_rate: Option<u32>,
}

impl MediaInfo {
    pub fn unknown() -> Self {
        Self {
            audio_format: AudioFormat::Unknown.name().to_string(),
            audio_bitrate: None,
            audio_channels: None,
            audio_bits: None,
            audio_sample_rate: None,
        }
    }

    /// Extension-only description (format name, no numbers)
    pub fn from_path(path: &Path) -> Self {
        Self {
            audio_format: AudioFormat::from_path(path).name().to_string(),
            ..Self::unknown()
        }
    }

    pub fn from_stream(stream: &StreamInfo) -> Self {
        Self {
            audio_format: Quality::from_stream(stream).format.name().to_string(),
            audio_bitrate: stream.bitrate_kbps,
            audio_channels: stream.channels,
            audio_bits: stream.bit_depth,
            audio_sample_rate: stream.sample_rate,
        }
    }
}

impl fmt::Display for MediaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.audio_format)?;
        if let Some(rate) = self.audio_sample_rate {
            write!(f, ", {} Hz", rate)?;
        }
        if let Some(bits) = self.audio_bits {
            write!(f, ", {} bit", bits)?;
        }
        if let Some(channels) = self.audio_channels {
            write!(f, ", {} ch", channels)?;
        }
        if let Some(kbps) = self.audio_bitrate {
            write!(f, ", {} kbps", kbps)?;
        }
        Ok(())
    }
}

/// Raw stream properties as reported by a container parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub format: AudioFormat,
    pub duration: Duration,
    pub bitrate_kbps: Option<u32>,
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u8>,
    pub channels: Option<u8>,
}
