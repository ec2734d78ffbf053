//! Integration tests: write, read back and strip tags on generated files
//!
//! Untagged fixtures are generated into a temp dir: MP3 and WAV (ID3v2),
//! FLAC and Opus (Vorbis comments), M4A (MP4 atoms), Monkey's Audio (APEv2)
//! and WMA (ASF).

mod helpers;

use helpers::{
    fully_populated_tag, generate_test_ape, generate_test_flac, generate_test_m4a,
    generate_test_mp3, generate_test_opus, generate_test_wav, generate_test_wma, write_test_cover,
    AudioConfig,
};
use lofty::ape::{ApeFile, ApeItem, ApeTag};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::tag::{ItemValue, TagExt};
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use tagsync_core::tags::diff::{describe_differences, SkipFields};
use tagsync_core::tags::AudioFormat;
use tagsync_core::{AdapterRegistry, CanonicalTag, ContainerFamily};
use tempfile::TempDir;

/// Fixture of every family, keyed by a label for assertion messages
fn fixtures(dir: &Path) -> Vec<(&'static str, PathBuf)> {
    let config = AudioConfig::default();
    vec![
        (
            "mp3",
            generate_test_mp3(&dir.join("track.mp3"), 40).expect("Failed to generate MP3"),
        ),
        (
            "wav",
            generate_test_wav(&dir.join("track.wav"), &config).expect("Failed to generate WAV"),
        ),
        (
            "flac",
            generate_test_flac(&dir.join("track.flac"), &config).expect("Failed to generate FLAC"),
        ),
        (
            "m4a",
            generate_test_m4a(&dir.join("track.m4a"), &config).expect("Failed to generate M4A"),
        ),
        (
            "wma",
            generate_test_wma(&dir.join("track.wma"), &config).expect("Failed to generate WMA"),
        ),
        (
            "ape",
            generate_test_ape(&dir.join("track.ape"), &config).expect("Failed to generate APE"),
        ),
        (
            "opus",
            generate_test_opus(&dir.join("track.opus"), &config).expect("Failed to generate Opus"),
        ),
    ]
}

fn read_ilst(path: &Path) -> Ilst {
    let mut file = File::open(path).unwrap();
    let m4a = Mp4File::read_from(&mut file, ParseOptions::new()).unwrap();
    m4a.ilst().cloned().expect("ilst present")
}

fn read_ape_tag(path: &Path) -> ApeTag {
    let mut file = File::open(path).unwrap();
    let ape = ApeFile::read_from(&mut file, ParseOptions::new()).unwrap();
    ape.ape().cloned().expect("APE tag present")
}

fn assert_no_tag_fields(label: &str, tag: &CanonicalTag) {
    let differences = describe_differences(tag, &CanonicalTag::new(), &SkipFields::computed());
    assert!(
        differences.is_empty(),
        "{}: expected no tag fields, found {:?}",
        label,
        differences
    );
}

#[test]
fn test_untagged_files_read_as_empty_and_valid() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        let tag = registry.read(&path);
        assert!(tag.is_valid, "{}: untagged file should read cleanly", label);
        assert_no_tag_fields(label, &tag);
        assert_eq!(tag.image_size, None, "{}: no embedded image", label);
    }
}

#[test]
fn test_family_detection() {
    let dir = TempDir::new().unwrap();
    let expected = [
        ("mp3", ContainerFamily::Id3v2),
        ("wav", ContainerFamily::Id3v2),
        ("flac", ContainerFamily::Vorbis),
        ("m4a", ContainerFamily::Mp4),
        ("wma", ContainerFamily::Asf),
        ("ape", ContainerFamily::Ape),
        ("opus", ContainerFamily::Vorbis),
    ];

    for ((label, path), (_, family)) in fixtures(dir.path()).into_iter().zip(expected) {
        assert_eq!(
            tagsync_core::formats::detect_family(&path),
            Some(family),
            "{}: wrong family",
            label
        );
    }
}

#[test]
fn test_write_then_read_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();
    let written = fully_populated_tag();

    for (label, path) in fixtures(dir.path()) {
        registry
            .write(&path, &written)
            .unwrap_or_else(|e| panic!("{}: write failed: {}", label, e));

        let read = registry.read(&path);
        assert!(read.is_valid, "{}: tagged file should read cleanly", label);

        let differences = describe_differences(&written, &read, &SkipFields::computed());
        assert!(
            differences.is_empty(),
            "{}: fields changed across write/read: {:?}",
            label,
            differences
        );
    }
}

#[test]
fn test_stream_properties_survive_tag_write() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        let before = registry.read(&path);
        registry.write(&path, &fully_populated_tag()).unwrap();
        let after = registry.read(&path);

        assert_eq!(before.quality, after.quality, "{}: quality changed", label);
        assert_eq!(before.duration, after.duration, "{}: duration changed", label);
        assert_ne!(after.quality.format, AudioFormat::Unknown, "{}: format unknown", label);
    }
}

#[test]
fn test_remove_all_leaves_no_tag_fields() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        registry.write(&path, &fully_populated_tag()).unwrap();
        registry
            .remove_all(&path)
            .unwrap_or_else(|e| panic!("{}: remove_all failed: {}", label, e));

        let tag = registry.read(&path);
        assert!(tag.is_valid, "{}: stripped file should still read", label);
        assert_no_tag_fields(label, &tag);
    }
}

#[test]
fn test_clearing_dates_removes_them() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        registry.write(&path, &fully_populated_tag()).unwrap();

        let mut cleared = registry.read(&path);
        cleared.date = None;
        cleared.year = None;
        cleared.original_release_date = None;
        cleared.original_year = None;
        registry.write(&path, &cleared).unwrap();

        let read = registry.read(&path);
        assert_eq!(read.date, None, "{}: date not cleared", label);
        assert_eq!(read.year, None, "{}: year not cleared", label);
        assert_eq!(read.original_release_date, None, "{}: original date not cleared", label);
        assert_eq!(read.original_year, None, "{}: original year not cleared", label);
        assert_eq!(read.title.as_deref(), Some("Título"), "{}: title lost", label);
    }
}

#[test]
fn test_clearing_absent_dates_is_harmless() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        let mut tag = CanonicalTag::new();
        tag.title = Some("No dates".to_string());
        registry
            .write(&path, &tag)
            .unwrap_or_else(|e| panic!("{}: write failed: {}", label, e));

        let read = registry.read(&path);
        assert_eq!(read.year, None, "{}", label);
        assert_eq!(read.original_year, None, "{}", label);
    }
}

#[test]
fn test_title_only_tag() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        let mut tag = CanonicalTag::new();
        tag.title = Some("Only a title".to_string());
        registry.write(&path, &tag).unwrap();

        let read = registry.read(&path);
        assert_eq!(read.title.as_deref(), Some("Only a title"), "{}", label);
        assert!(read.performers.is_empty(), "{}: unexpected performers", label);
        assert_eq!(read.album, None, "{}: unexpected album", label);
        assert!(!read.has_musicbrainz_ids(), "{}: unexpected MusicBrainz ids", label);
    }
}

#[test]
fn test_year_only_dates() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    for (label, path) in fixtures(dir.path()) {
        let mut tag = CanonicalTag::new();
        tag.year = Some(1999);
        tag.original_year = Some(1970);
        registry.write(&path, &tag).unwrap();

        let read = registry.read(&path);
        assert_eq!(read.year, Some(1999), "{}", label);
        assert_eq!(read.date, None, "{}: bare year must not become a date", label);
        assert_eq!(read.original_year, Some(1970), "{}", label);
    }
}

#[test]
fn test_cover_written_from_image_file() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();
    let cover = write_test_cover(&dir.path().join("cover.png"), 2048).unwrap();

    for (label, path) in fixtures(dir.path()) {
        let mut tag = fully_populated_tag();
        tag.image_file = Some(cover.clone());
        tag.image_size = Some(2048);
        registry.write(&path, &tag).unwrap();

        let read = registry.read(&path);
        assert_eq!(read.image_size, Some(2048), "{}: embedded cover size", label);
    }
}

#[test]
fn test_embed_cover_replaces_existing_cover() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();
    let small = write_test_cover(&dir.path().join("small.png"), 1024).unwrap();
    let large = write_test_cover(&dir.path().join("large.png"), 4096).unwrap();

    let service = tagsync_core::AudioTagService::new(AdapterRegistry::with_default_adapters());
    for (label, path) in fixtures(dir.path()) {
        service.embed_cover(&path, &small).unwrap();
        service.embed_cover(&path, &large).unwrap();

        let read = registry.read(&path);
        assert_eq!(read.image_size, Some(4096), "{}: only the latest cover remains", label);
    }
}

#[test]
fn test_rewrite_with_same_tag_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::with_default_adapters();
    let cover = write_test_cover(&dir.path().join("cover.png"), 2048).unwrap();
    let mut tag = fully_populated_tag();
    tag.image_file = Some(cover);

    for (label, path) in fixtures(dir.path()) {
        registry.write(&path, &tag).unwrap();
        let first = registry.read(&path);
        registry.write(&path, &first).unwrap();
        let second = registry.read(&path);

        let differences = describe_differences(&first, &second, &SkipFields::computed());
        assert!(differences.is_empty(), "{}: second write changed {:?}", label, differences);
        assert_eq!(first.image_size, second.image_size, "{}: cover changed", label);
    }
}

#[test]
fn test_unmanaged_mp4_atoms_survive_write() {
    let dir = TempDir::new().unwrap();
    let path = generate_test_m4a(&dir.path().join("track.m4a"), &AudioConfig::default()).unwrap();

    let asin = AtomIdent::Freeform {
        mean: Cow::Borrowed("com.apple.iTunes"),
        name: Cow::Borrowed("ASIN"),
    };
    let mut native = Ilst::new();
    native.insert(Atom::new(AtomIdent::Fourcc(*b"tmpo"), AtomData::SignedInteger(120)));
    native.insert(Atom::new(AtomIdent::Fourcc(*b"stik"), AtomData::SignedInteger(1)));
    native.insert(Atom::new(AtomIdent::Fourcc(*b"cpil"), AtomData::Bool(true)));
    native.insert(Atom::new(asin.clone(), AtomData::UTF8("B000002UB2".to_string())));
    native.save_to_path(&path, WriteOptions::default()).unwrap();

    let idents = [
        AtomIdent::Fourcc(*b"tmpo"),
        AtomIdent::Fourcc(*b"stik"),
        AtomIdent::Fourcc(*b"cpil"),
        asin,
    ];
    let before = read_ilst(&path);
    let unmanaged: Vec<Option<Atom<'static>>> =
        idents.iter().map(|i| before.get(i).cloned()).collect();
    assert!(unmanaged.iter().all(Option::is_some), "Fixture atoms written: {:?}", unmanaged);

    AdapterRegistry::with_default_adapters()
        .write(&path, &fully_populated_tag())
        .unwrap();

    let after = read_ilst(&path);
    for (ident, expected) in idents.iter().zip(&unmanaged) {
        assert_eq!(after.get(ident), expected.as_ref(), "{:?} changed by the write", ident);
    }
    assert!(after.get(&AtomIdent::Fourcc(*b"\xa9nam")).is_some(), "Managed title written");
}

#[test]
fn test_unmanaged_ape_items_survive_write() {
    let dir = TempDir::new().unwrap();
    let path = generate_test_ape(&dir.path().join("track.ape"), &AudioConfig::default()).unwrap();

    let mut native = ApeTag::new();
    let gain = ItemValue::Text("-6.2 dB".to_string());
    native.insert(ApeItem::new("REPLAYGAIN_TRACK_GAIN".to_string(), gain).unwrap());
    let blob = ItemValue::Binary(vec![7, 8, 9]);
    native.insert(ApeItem::new("Cuesheet Blob".to_string(), blob).unwrap());
    native.save_to_path(&path, WriteOptions::default()).unwrap();

    AdapterRegistry::with_default_adapters()
        .write(&path, &fully_populated_tag())
        .unwrap();

    let after = read_ape_tag(&path);
    assert_eq!(
        after.get("REPLAYGAIN_TRACK_GAIN").map(ApeItem::value),
        Some(&ItemValue::Text("-6.2 dB".to_string())),
        "Unmanaged text item kept"
    );
    assert_eq!(
        after.get("Cuesheet Blob").map(ApeItem::value),
        Some(&ItemValue::Binary(vec![7, 8, 9])),
        "Unmanaged binary item kept"
    );
    assert!(after.get("MUSICBRAINZ_ALBUMSTATUS").is_some(), "Release status persisted");
}

#[test]
fn test_large_wma_cover_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = generate_test_wma(&dir.path().join("track.wma"), &AudioConfig::default()).unwrap();
    let cover = write_test_cover(&dir.path().join("cover.png"), 70_000).unwrap();
    let registry = AdapterRegistry::with_default_adapters();

    let mut tag = fully_populated_tag();
    tag.image_file = Some(cover);
    registry.write(&path, &tag).unwrap();

    let read = registry.read(&path);
    assert!(read.is_valid);
    assert_eq!(read.image_size, Some(70_000), "Cover too large for a descriptor still stored");
    assert_eq!(read.title, tag.title);
}

#[test]
fn test_wma_data_object_untouched_by_header_rewrite() {
    let dir = TempDir::new().unwrap();
    let path = generate_test_wma(&dir.path().join("track.wma"), &AudioConfig::default()).unwrap();
    let original = std::fs::read(&path).unwrap();
    let data_tail = original[original.len() - 512..].to_vec();

    let registry = AdapterRegistry::with_default_adapters();
    registry.write(&path, &fully_populated_tag()).unwrap();

    let rewritten = std::fs::read(&path).unwrap();
    assert!(rewritten.len() > original.len(), "Header should have grown");
    assert_eq!(
        &rewritten[rewritten.len() - 512..],
        data_tail.as_slice(),
        "Packet data must be copied verbatim"
    );
}

#[test]
fn test_unreadable_file_degrades() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.flac");
    std::fs::write(&path, b"this is not a flac file").unwrap();

    let registry = AdapterRegistry::with_default_adapters();
    let tag = registry.read(&path);

    assert!(!tag.is_valid, "Corrupt file must read as degraded");
    assert_no_tag_fields("broken.flac", &tag);
    assert_eq!(tag.quality.format, AudioFormat::Flac, "Quality falls back to the extension");
}
