//! Audio Test Fixture Generator
//!
//! Produces small untagged files of each container family. Only WAV carries
//! real samples; the other containers hold valid headers around silent or
//! zeroed payloads, which is all tag reading and writing needs.
//!
//! Covers MP3, WAV, FLAC, M4A, Monkey's Audio, Opus and WMA.

use std::path::{Path, PathBuf};

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 1.0,
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// Generate a 16-bit PCM WAV file with a 440Hz tone
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64) as usize;
    for i in 0..total_samples {
        let t = i as f32 / config.sample_rate as f32;
        let sample = (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo, no padding
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
/// 144 * 128000 / 44100
const MP3_FRAME_LEN: usize = 417;

/// Generate an MP3 made of silent frames, roughly 26ms each
pub fn generate_test_mp3(path: &Path, frames: usize) -> anyhow::Result<PathBuf> {
    let mut bytes = Vec::with_capacity(frames * MP3_FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&MP3_FRAME_HEADER);
        bytes.extend(std::iter::repeat(0u8).take(MP3_FRAME_LEN - MP3_FRAME_HEADER.len()));
    }
    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

fn total_samples(config: &AudioConfig) -> u64 {
    (config.duration_seconds * config.sample_rate as f64) as u64
}

/// Generate a FLAC file: STREAMINFO, a 1 KiB PADDING block and a zeroed payload
pub fn generate_test_flac(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let total_samples = total_samples(config);

    let mut bytes = b"fLaC".to_vec();
    // STREAMINFO type, 34-byte length; PADDING follows as the last block
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 34]);
    bytes.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    bytes.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    bytes.extend_from_slice(&[0, 0, 0]); // min frame size (unknown)
    bytes.extend_from_slice(&[0, 0, 0]); // max frame size (unknown)
    let packed: u64 = (u64::from(config.sample_rate) << 44)
        | (u64::from(config.channels - 1) << 41)
        | (15u64 << 36) // 16 bits per sample
        | (total_samples & 0xF_FFFF_FFFF);
    bytes.extend_from_slice(&packed.to_be_bytes());
    bytes.extend_from_slice(&[0u8; 16]); // MD5 (unset)
    // last-metadata-block flag + PADDING type, 1024-byte length
    bytes.extend_from_slice(&[0x81, 0x00, 0x04, 0x00]);
    bytes.extend_from_slice(&[0u8; 1024]);
    bytes.extend_from_slice(&[0u8; 1024]); // frames (zeroed)

    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

fn mp4_atom(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut atom = ((8 + payload.len()) as u32).to_be_bytes().to_vec();
    atom.extend_from_slice(name);
    atom.extend_from_slice(payload);
    atom
}

/// Generate an M4A file: ftyp, a moov with one sound track, and a zeroed mdat
///
/// The track has no sample table entries, so only the duration is known.
pub fn generate_test_m4a(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let mut ftyp = b"M4A ".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes()); // minor version
    ftyp.extend_from_slice(b"M4A isom");

    let mut mdhd = vec![0u8; 4]; // version 0, flags
    mdhd.extend_from_slice(&0u32.to_be_bytes()); // creation time
    mdhd.extend_from_slice(&0u32.to_be_bytes()); // modification time
    mdhd.extend_from_slice(&config.sample_rate.to_be_bytes()); // timescale
    mdhd.extend_from_slice(&(total_samples(config) as u32).to_be_bytes()); // duration
    mdhd.extend_from_slice(&[0x55, 0xC4, 0, 0]); // language "und", quality

    let mut hdlr = vec![0u8; 8]; // version, flags, pre-defined
    hdlr.extend_from_slice(b"soun");
    hdlr.extend_from_slice(&[0u8; 12]); // reserved
    hdlr.extend_from_slice(b"SoundHandler\0");

    let mdia = mp4_atom(b"mdia", &[mp4_atom(b"mdhd", &mdhd), mp4_atom(b"hdlr", &hdlr)].concat());
    let moov = mp4_atom(b"moov", &mp4_atom(b"trak", &mdia));

    let mut bytes = mp4_atom(b"ftyp", &ftyp);
    bytes.extend_from_slice(&moov);
    bytes.extend_from_slice(&mp4_atom(b"mdat", &[0u8; 1024]));

    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

/// Generate a Monkey's Audio (3.99) file: descriptor, header and one zeroed frame
pub fn generate_test_ape(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let mut bytes = b"MAC ".to_vec();
    bytes.extend_from_slice(&3990u16.to_le_bytes()); // version
    bytes.extend_from_slice(&0u16.to_le_bytes()); // padding
    bytes.extend_from_slice(&52u32.to_le_bytes()); // descriptor bytes
    bytes.extend_from_slice(&24u32.to_le_bytes()); // header bytes
    bytes.extend_from_slice(&0u32.to_le_bytes()); // seek table bytes
    bytes.extend_from_slice(&0u32.to_le_bytes()); // header data bytes
    bytes.extend_from_slice(&1024u32.to_le_bytes()); // frame data bytes
    bytes.extend_from_slice(&0u32.to_le_bytes()); // frame data bytes (high)
    bytes.extend_from_slice(&0u32.to_le_bytes()); // terminating data bytes
    bytes.extend_from_slice(&[0u8; 16]); // MD5 (unset)

    bytes.extend_from_slice(&2000u16.to_le_bytes()); // compression: normal
    bytes.extend_from_slice(&0u16.to_le_bytes()); // format flags
    bytes.extend_from_slice(&73_728u32.to_le_bytes()); // blocks per frame
    bytes.extend_from_slice(&(total_samples(config) as u32).to_le_bytes()); // final frame blocks
    bytes.extend_from_slice(&1u32.to_le_bytes()); // total frames
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(&config.channels.to_le_bytes());
    bytes.extend_from_slice(&config.sample_rate.to_le_bytes());

    bytes.extend_from_slice(&[0u8; 1024]);

    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

/// CRC-32 used by Ogg pages: polynomial 0x04C11DB7, no reflection, zero init
fn ogg_crc(bytes: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in bytes {
        crc ^= u32::from(byte) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// One Ogg page holding a single packet of at most 255 * 255 bytes
fn ogg_page(header_type: u8, granule: u64, sequence: u32, packet: &[u8]) -> Vec<u8> {
    let mut segments = vec![255u8; packet.len() / 255];
    segments.push((packet.len() % 255) as u8);

    let mut page = b"OggS".to_vec();
    page.push(0); // version
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&0x7A67_0001u32.to_le_bytes()); // stream serial
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0u8; 4]); // CRC, filled below
    page.push(segments.len() as u8);
    page.extend_from_slice(&segments);
    page.extend_from_slice(packet);

    let crc = ogg_crc(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

/// Generate an Ogg Opus file: OpusHead, an empty OpusTags and one audio page
pub fn generate_test_opus(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    const PRE_SKIP: u16 = 312;

    let mut head = b"OpusHead".to_vec();
    head.push(1); // version
    head.push(config.channels.min(2) as u8);
    head.extend_from_slice(&PRE_SKIP.to_le_bytes());
    head.extend_from_slice(&config.sample_rate.to_le_bytes()); // input sample rate
    head.extend_from_slice(&0u16.to_le_bytes()); // output gain
    head.push(0); // channel mapping family

    let vendor = b"tagsync test fixture";
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // comment count

    // Opus granule positions always count 48 kHz samples
    let granule = u64::from(PRE_SKIP) + (config.duration_seconds * 48_000.0) as u64;
    // one arbitrary audio packet; nothing here decodes it
    let audio = [0xFCu8, 0xFF, 0xFE];

    let mut bytes = ogg_page(0x02, 0, 0, &head);
    bytes.extend_from_slice(&ogg_page(0x00, 0, 1, &tags));
    bytes.extend_from_slice(&ogg_page(0x04, granule, 2, &audio));

    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

const ASF_HEADER: [u8; 16] = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
const ASF_FILE_PROPERTIES: [u8; 16] = [
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
const ASF_STREAM_PROPERTIES: [u8; 16] = [
    0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
const ASF_AUDIO_MEDIA: [u8; 16] = [
    0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];
const ASF_DATA: [u8; 16] = [
    0x36, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];

fn asf_object(guid: &[u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut object = guid.to_vec();
    object.extend_from_slice(&((24 + payload.len()) as u64).to_le_bytes());
    object.extend_from_slice(payload);
    object
}

/// Generate a WMA file: header with file and audio stream properties, then an empty data object
///
/// The trailing data object is filled with a recognizable byte pattern so
/// tests can check it survives header rewrites untouched.
pub fn generate_test_wma(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let duration_100ns = (config.duration_seconds * 10_000_000.0) as u64;

    let mut file_props = vec![0u8; 16]; // file id
    file_props.extend_from_slice(&0u64.to_le_bytes()); // file size, patched below
    file_props.extend_from_slice(&0u64.to_le_bytes()); // creation date
    file_props.extend_from_slice(&1u64.to_le_bytes()); // data packets
    file_props.extend_from_slice(&duration_100ns.to_le_bytes()); // play duration
    file_props.extend_from_slice(&duration_100ns.to_le_bytes()); // send duration
    file_props.extend_from_slice(&0u64.to_le_bytes()); // preroll (ms)
    file_props.extend_from_slice(&2u32.to_le_bytes()); // flags: seekable
    file_props.extend_from_slice(&512u32.to_le_bytes()); // min packet size
    file_props.extend_from_slice(&512u32.to_le_bytes()); // max packet size
    file_props.extend_from_slice(&128_000u32.to_le_bytes()); // max bitrate

    let mut wave_format = Vec::new();
    wave_format.extend_from_slice(&0x0161u16.to_le_bytes()); // WMA v2
    wave_format.extend_from_slice(&config.channels.to_le_bytes());
    wave_format.extend_from_slice(&config.sample_rate.to_le_bytes());
    wave_format.extend_from_slice(&16_000u32.to_le_bytes()); // 128 kbps
    wave_format.extend_from_slice(&2973u16.to_le_bytes()); // block align
    wave_format.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wave_format.extend_from_slice(&0u16.to_le_bytes()); // extra size

    let mut stream_props = ASF_AUDIO_MEDIA.to_vec();
    stream_props.extend_from_slice(&[0u8; 16]); // error correction type
    stream_props.extend_from_slice(&0u64.to_le_bytes()); // time offset
    stream_props.extend_from_slice(&(wave_format.len() as u32).to_le_bytes());
    stream_props.extend_from_slice(&0u32.to_le_bytes()); // error correction data length
    stream_props.extend_from_slice(&1u16.to_le_bytes()); // stream number 1
    stream_props.extend_from_slice(&0u32.to_le_bytes()); // reserved
    stream_props.extend_from_slice(&wave_format);

    let children = [
        asf_object(&ASF_FILE_PROPERTIES, &file_props),
        asf_object(&ASF_STREAM_PROPERTIES, &stream_props),
    ];
    let children_len: usize = children.iter().map(Vec::len).sum();

    let mut bytes = ASF_HEADER.to_vec();
    bytes.extend_from_slice(&((30 + children_len) as u64).to_le_bytes());
    bytes.extend_from_slice(&(children.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&[0x01, 0x02]);
    for child in &children {
        bytes.extend_from_slice(child);
    }

    let mut data = vec![0u8; 16]; // file id
    data.extend_from_slice(&1u64.to_le_bytes()); // total packets
    data.extend_from_slice(&[0x01, 0x01]); // reserved
    data.extend((0..512u32).map(|i| (i % 251) as u8));
    bytes.extend_from_slice(&asf_object(&ASF_DATA, &data));

    let total = bytes.len() as u64;
    // file size field sits after the header prefix, child object header and file id
    let size_offset = 30 + 24 + 16;
    bytes[size_offset..size_offset + 8].copy_from_slice(&total.to_le_bytes());

    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

/// Write a PNG cover image of exactly `size` bytes (at least 33)
///
/// Only the signature and IHDR chunk are real; the rest is filler.
pub fn write_test_cover(path: &Path, size: usize) -> anyhow::Result<PathBuf> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&16u32.to_be_bytes()); // width
    bytes.extend_from_slice(&16u32.to_be_bytes()); // height
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]); // 8-bit RGB
    bytes.extend_from_slice(&[0u8; 4]); // CRC (not checked by readers here)
    bytes.extend((0..size.saturating_sub(bytes.len())).map(|i| (i % 256) as u8));
    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}
