//! ASF header object codec
//!
//! Parses the top-level Header Object into its child objects, decodes the
//! descriptors tags live in, and serializes the header back. Child objects
//! that are not edited are carried as raw payloads and written back as-is.
//!
//! Values too large for an extended content descriptor (over 65535 bytes)
//! go in the Metadata Library object inside the Header Extension.

use crate::error::{Result, TagError};
use std::io::Read;

pub(crate) type Guid = [u8; 16];

pub(crate) const HEADER_GUID: Guid = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
pub(crate) const FILE_PROPERTIES_GUID: Guid = [
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
pub(crate) const STREAM_PROPERTIES_GUID: Guid = [
    0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
pub(crate) const AUDIO_MEDIA_GUID: Guid = [
    0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];
pub(crate) const CONTENT_DESCRIPTION_GUID: Guid = [
    0x33, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
pub(crate) const EXTENDED_CONTENT_DESCRIPTION_GUID: Guid = [
    0x40, 0xA4, 0xD0, 0xD2, 0x07, 0xE3, 0xD2, 0x11, 0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50,
];
pub(crate) const HEADER_EXTENSION_GUID: Guid = [
    0xB5, 0x03, 0xBF, 0x5F, 0x2E, 0xA9, 0xCF, 0x11, 0x8E, 0xE3, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
const HEADER_EXTENSION_RESERVED_GUID: Guid = [
    0x11, 0xD2, 0xD3, 0xAB, 0xBA, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
pub(crate) const METADATA_LIBRARY_GUID: Guid = [
    0x94, 0x1C, 0x23, 0x44, 0x98, 0x94, 0xD1, 0x49, 0xA1, 0x41, 0x1D, 0x13, 0x4E, 0x45, 0x70, 0x54,
];
pub(crate) const DATA_GUID: Guid = [
    0x36, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];

/// GUID plus 64-bit size
const OBJECT_HEADER_LEN: usize = 24;
/// Object header, child count and two reserved bytes
const HEADER_OBJECT_PREFIX_LEN: usize = OBJECT_HEADER_LEN + 6;
/// Reserved GUID and u16 ahead of the extension data size
const HEADER_EXTENSION_RESERVED_LEN: usize = 18;
/// Headers larger than this are treated as corrupt
const MAX_HEADER_LEN: u64 = 64 * 1024 * 1024;

fn malformed(what: &str) -> TagError {
    TagError::Asf(format!("Malformed ASF header: {}", what))
}

/// Little-endian reader over a byte slice
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| malformed("unexpected end of object"))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    fn guid(&mut self) -> Result<Guid> {
        let mut guid = [0u8; 16];
        guid.copy_from_slice(self.take(16)?);
        Ok(guid)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }
}

/// Decode UTF-16LE text, dropping the NUL terminator
pub(crate) fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

/// Encode text as NUL-terminated UTF-16LE
pub(crate) fn encode_utf16(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Child object of the header, payload excluding the 24-byte object header
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawObject {
    pub guid: Guid,
    pub payload: Vec<u8>,
}

fn read_object(r: &mut Reader<'_>) -> Result<RawObject> {
    let guid = r.guid()?;
    let object_size = r.u64()?;
    let payload_len = object_size
        .checked_sub(OBJECT_HEADER_LEN as u64)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| malformed("object size"))?;
    let payload = r.take(payload_len)?.to_vec();
    Ok(RawObject { guid, payload })
}

fn write_objects(objects: &[RawObject], out: &mut Vec<u8>) {
    for object in objects {
        out.extend_from_slice(&object.guid);
        out.extend_from_slice(&((OBJECT_HEADER_LEN + object.payload.len()) as u64).to_le_bytes());
        out.extend_from_slice(&object.payload);
    }
}

/// Replace the first object with this GUID, or append it; `None` removes it
fn put_raw(objects: &mut Vec<RawObject>, guid: Guid, payload: Option<Vec<u8>>) {
    let index = objects.iter().position(|o| o.guid == guid);
    match (index, payload) {
        (Some(i), Some(payload)) => objects[i].payload = payload,
        (None, Some(payload)) => objects.push(RawObject { guid, payload }),
        (Some(i), None) => {
            objects.remove(i);
        }
        (None, None) => {}
    }
}

/// Value of an extended content descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DescriptorValue {
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
    DWord(u32),
    QWord(u64),
    Word(u16),
    /// Only valid in the Metadata Library
    Guid(Guid),
}

impl DescriptorValue {
    /// Textual view; numbers render as decimal
    pub fn as_text(&self) -> Option<String> {
        match self {
            DescriptorValue::Text(s) => Some(s.clone()),
            DescriptorValue::DWord(n) => Some(n.to_string()),
            DescriptorValue::QWord(n) => Some(n.to_string()),
            DescriptorValue::Word(n) => Some(n.to_string()),
            DescriptorValue::Bool(_) | DescriptorValue::Bytes(_) | DescriptorValue::Guid(_) => None,
        }
    }

    fn type_code(&self) -> u16 {
        match self {
            DescriptorValue::Text(_) => 0,
            DescriptorValue::Bytes(_) => 1,
            DescriptorValue::Bool(_) => 2,
            DescriptorValue::DWord(_) => 3,
            DescriptorValue::QWord(_) => 4,
            DescriptorValue::Word(_) => 5,
            DescriptorValue::Guid(_) => 6,
        }
    }

    fn encode(&self) -> Vec<u8> {
        match self {
            DescriptorValue::Text(s) => encode_utf16(s),
            DescriptorValue::Bytes(b) => b.clone(),
            DescriptorValue::Bool(b) => u32::from(*b).to_le_bytes().to_vec(),
            DescriptorValue::DWord(n) => n.to_le_bytes().to_vec(),
            DescriptorValue::QWord(n) => n.to_le_bytes().to_vec(),
            DescriptorValue::Word(n) => n.to_le_bytes().to_vec(),
            DescriptorValue::Guid(guid) => guid.to_vec(),
        }
    }

    /// Library encoding differs only in BOOL, which is a WORD there
    fn encode_in_library(&self) -> Vec<u8> {
        match self {
            DescriptorValue::Bool(b) => u16::from(*b).to_le_bytes().to_vec(),
            other => other.encode(),
        }
    }

    fn decode(type_code: u16, data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        Ok(match type_code {
            0 => DescriptorValue::Text(decode_utf16(data)),
            1 => DescriptorValue::Bytes(data.to_vec()),
            2 => DescriptorValue::Bool(data.iter().any(|&b| b != 0)),
            3 => DescriptorValue::DWord(r.u32()?),
            4 => DescriptorValue::QWord(r.u64()?),
            5 => DescriptorValue::Word(r.u16()?),
            6 => DescriptorValue::Guid(r.guid()?),
            other => return Err(malformed(&format!("descriptor value type {}", other))),
        })
    }
}

/// Named extended content descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Descriptor {
    pub name: String,
    pub value: DescriptorValue,
}

impl Descriptor {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: DescriptorValue::Text(value.to_string()),
        }
    }
}

/// The five fixed fields of the Content Description object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContentDescription {
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub rating: String,
}

impl ContentDescription {
    fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let mut lengths = [0usize; 5];
        for len in lengths.iter_mut() {
            *len = r.u16()? as usize;
        }
        let mut fields = lengths
            .iter()
            .map(|&len| r.take(len).map(decode_utf16))
            .collect::<Result<Vec<String>>>()?
            .into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Ok(Self {
            title: next(),
            author: next(),
            copyright: next(),
            description: next(),
            rating: next(),
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let fields = [
            &self.title,
            &self.author,
            &self.copyright,
            &self.description,
            &self.rating,
        ]
        .map(|s| if s.is_empty() { Vec::new() } else { encode_utf16(s) });

        let mut payload = Vec::new();
        for field in &fields {
            let len = u16::try_from(field.len()).map_err(|_| malformed("content description field too long"))?;
            payload.extend_from_slice(&len.to_le_bytes());
        }
        for field in &fields {
            payload.extend_from_slice(field);
        }
        Ok(payload)
    }
}

fn decode_descriptors(payload: &[u8]) -> Result<Vec<Descriptor>> {
    let mut r = Reader::new(payload);
    let count = r.u16()?;
    let mut descriptors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_len = r.u16()? as usize;
        let name = decode_utf16(r.take(name_len)?);
        let type_code = r.u16()?;
        let value_len = r.u16()? as usize;
        let value = DescriptorValue::decode(type_code, r.take(value_len)?)?;
        descriptors.push(Descriptor { name, value });
    }
    Ok(descriptors)
}

fn encode_descriptors(descriptors: &[Descriptor]) -> Result<Vec<u8>> {
    let count = u16::try_from(descriptors.len()).map_err(|_| malformed("too many descriptors"))?;
    let mut payload = count.to_le_bytes().to_vec();
    for descriptor in descriptors {
        let name = encode_utf16(&descriptor.name);
        let value = descriptor.value.encode();
        let name_len = u16::try_from(name.len()).map_err(|_| malformed("descriptor name too long"))?;
        let value_len = u16::try_from(value.len()).map_err(|_| {
            TagError::Asf(format!("Descriptor {} exceeds 65535 bytes", descriptor.name))
        })?;
        payload.extend_from_slice(&name_len.to_le_bytes());
        payload.extend_from_slice(&name);
        payload.extend_from_slice(&descriptor.value.type_code().to_le_bytes());
        payload.extend_from_slice(&value_len.to_le_bytes());
        payload.extend_from_slice(&value);
    }
    Ok(payload)
}

/// Metadata Library record
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LibraryRecord {
    /// Index into the Language List object, 0 when there is none
    pub language: u16,
    /// 0 applies to the whole file
    pub stream: u16,
    pub descriptor: Descriptor,
}

impl LibraryRecord {
    /// File-wide record with the default language
    pub fn file_wide(descriptor: Descriptor) -> Self {
        Self {
            language: 0,
            stream: 0,
            descriptor,
        }
    }
}

fn decode_library(payload: &[u8]) -> Result<Vec<LibraryRecord>> {
    let mut r = Reader::new(payload);
    let count = r.u16()?;
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let language = r.u16()?;
        let stream = r.u16()?;
        let name_len = r.u16()? as usize;
        let type_code = r.u16()?;
        let data_len = r.u32()? as usize;
        let name = decode_utf16(r.take(name_len)?);
        let value = DescriptorValue::decode(type_code, r.take(data_len)?)?;
        records.push(LibraryRecord {
            language,
            stream,
            descriptor: Descriptor { name, value },
        });
    }
    Ok(records)
}

fn encode_library(records: &[LibraryRecord]) -> Result<Vec<u8>> {
    let count = u16::try_from(records.len()).map_err(|_| malformed("too many library records"))?;
    let mut payload = count.to_le_bytes().to_vec();
    for record in records {
        let name = encode_utf16(&record.descriptor.name);
        let value = record.descriptor.value.encode_in_library();
        let name_len = u16::try_from(name.len()).map_err(|_| malformed("descriptor name too long"))?;
        let data_len = u32::try_from(value.len()).map_err(|_| malformed("library record too large"))?;
        payload.extend_from_slice(&record.language.to_le_bytes());
        payload.extend_from_slice(&record.stream.to_le_bytes());
        payload.extend_from_slice(&name_len.to_le_bytes());
        payload.extend_from_slice(&record.descriptor.value.type_code().to_le_bytes());
        payload.extend_from_slice(&data_len.to_le_bytes());
        payload.extend_from_slice(&name);
        payload.extend_from_slice(&value);
    }
    Ok(payload)
}

/// Header Extension object: reserved fields plus nested child objects
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderExtension {
    reserved: [u8; HEADER_EXTENSION_RESERVED_LEN],
    objects: Vec<RawObject>,
}

impl HeaderExtension {
    fn new() -> Self {
        let mut reserved = [0u8; HEADER_EXTENSION_RESERVED_LEN];
        reserved[..16].copy_from_slice(&HEADER_EXTENSION_RESERVED_GUID);
        reserved[16..].copy_from_slice(&6u16.to_le_bytes());
        Self {
            reserved,
            objects: Vec::new(),
        }
    }

    fn decode(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let mut reserved = [0u8; HEADER_EXTENSION_RESERVED_LEN];
        reserved.copy_from_slice(r.take(HEADER_EXTENSION_RESERVED_LEN)?);
        let data_len = r.u32()? as usize;

        let mut data = Reader::new(r.take(data_len)?);
        let mut objects = Vec::new();
        while !data.is_empty() {
            objects.push(read_object(&mut data)?);
        }
        Ok(Self { reserved, objects })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        write_objects(&self.objects, &mut data);
        let data_len = u32::try_from(data.len()).map_err(|_| malformed("header extension size"))?;

        let mut payload = self.reserved.to_vec();
        payload.extend_from_slice(&data_len.to_le_bytes());
        payload.extend_from_slice(&data);
        Ok(payload)
    }
}

/// WM/Picture descriptor payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WmPicture {
    /// ID3-style picture type, 3 = front cover
    pub picture_type: u8,
    pub mime_type: String,
    pub description: String,
    pub data: Vec<u8>,
}

impl WmPicture {
    pub const FRONT_COVER: u8 = 3;

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let picture_type = r.take(1)?[0];
        let data_len = r.u32()? as usize;
        let mime_type = read_utf16z(&mut r)?;
        let description = read_utf16z(&mut r)?;
        let data = r.take(data_len)?.to_vec();
        Ok(Self {
            picture_type,
            mime_type,
            description,
            data,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let data_len = u32::try_from(self.data.len()).map_err(|_| malformed("picture too large"))?;
        let mut bytes = vec![self.picture_type];
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(&encode_utf16(&self.mime_type));
        bytes.extend_from_slice(&encode_utf16(&self.description));
        bytes.extend_from_slice(&self.data);
        Ok(bytes)
    }
}

fn read_utf16z(r: &mut Reader<'_>) -> Result<String> {
    let start = r.pos;
    loop {
        if r.u16()? == 0 {
            break;
        }
    }
    Ok(decode_utf16(&r.buf[start..r.pos]))
}

/// Audio stream properties decoded from the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AudioProperties {
    /// Play duration minus preroll, in milliseconds
    pub duration_ms: u64,
    pub max_bitrate: u32,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub bits_per_sample: u16,
}

/// Parsed top-level Header Object
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AsfHeader {
    reserved: [u8; 2],
    pub objects: Vec<RawObject>,
}

impl AsfHeader {
    /// Read the Header Object from the start of a stream
    ///
    /// Returns the header and its length in the file; the Data Object and
    /// everything after it start at that offset.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<(Self, u64)> {
        let mut prefix = [0u8; HEADER_OBJECT_PREFIX_LEN];
        reader.read_exact(&mut prefix)?;

        let mut r = Reader::new(&prefix);
        if r.guid()? != HEADER_GUID {
            return Err(TagError::Asf("Not an ASF file".to_string()));
        }
        let size = r.u64()?;
        let count = r.u32()?;
        let reserved = [prefix[28], prefix[29]];
        if size < HEADER_OBJECT_PREFIX_LEN as u64 || size > MAX_HEADER_LEN {
            return Err(malformed("header size"));
        }

        let mut body = vec![0u8; size as usize - HEADER_OBJECT_PREFIX_LEN];
        reader.read_exact(&mut body)?;

        let mut r = Reader::new(&body);
        let mut objects = Vec::with_capacity(count as usize);
        for _ in 0..count {
            objects.push(read_object(&mut r)?);
        }
        Ok((Self { reserved, objects }, size))
    }

    /// Serialize the Header Object
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body_len: usize = self
            .objects
            .iter()
            .map(|o| OBJECT_HEADER_LEN + o.payload.len())
            .sum();
        let size = (HEADER_OBJECT_PREFIX_LEN + body_len) as u64;
        let count = u32::try_from(self.objects.len()).map_err(|_| malformed("object count"))?;

        let mut bytes = Vec::with_capacity(size as usize);
        bytes.extend_from_slice(&HEADER_GUID);
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&self.reserved);
        write_objects(&self.objects, &mut bytes);
        Ok(bytes)
    }

    fn object(&self, guid: &Guid) -> Option<&RawObject> {
        self.objects.iter().find(|o| &o.guid == guid)
    }

    fn put_object(&mut self, guid: Guid, payload: Option<Vec<u8>>) {
        put_raw(&mut self.objects, guid, payload);
    }

    fn header_extension(&self) -> Result<Option<HeaderExtension>> {
        self.object(&HEADER_EXTENSION_GUID)
            .map(|object| HeaderExtension::decode(&object.payload))
            .transpose()
    }

    pub fn content_description(&self) -> Result<ContentDescription> {
        match self.object(&CONTENT_DESCRIPTION_GUID) {
            Some(object) => ContentDescription::decode(&object.payload),
            None => Ok(ContentDescription::default()),
        }
    }

    pub fn set_content_description(&mut self, description: &ContentDescription) -> Result<()> {
        let payload = if description == &ContentDescription::default() {
            None
        } else {
            Some(description.encode()?)
        };
        self.put_object(CONTENT_DESCRIPTION_GUID, payload);
        Ok(())
    }

    pub fn descriptors(&self) -> Result<Vec<Descriptor>> {
        match self.object(&EXTENDED_CONTENT_DESCRIPTION_GUID) {
            Some(object) => decode_descriptors(&object.payload),
            None => Ok(Vec::new()),
        }
    }

    pub fn set_descriptors(&mut self, descriptors: &[Descriptor]) -> Result<()> {
        let payload = if descriptors.is_empty() {
            None
        } else {
            Some(encode_descriptors(descriptors)?)
        };
        self.put_object(EXTENDED_CONTENT_DESCRIPTION_GUID, payload);
        Ok(())
    }

    /// Records of the Metadata Library object, if the header has one
    pub fn library_records(&self) -> Result<Vec<LibraryRecord>> {
        let library = self.header_extension()?.and_then(|extension| {
            extension
                .objects
                .into_iter()
                .find(|o| o.guid == METADATA_LIBRARY_GUID)
        });
        match library {
            Some(object) => decode_library(&object.payload),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the Metadata Library; an empty slice removes the object
    ///
    /// A Header Extension is only created when there are records to store.
    pub fn set_library_records(&mut self, records: &[LibraryRecord]) -> Result<()> {
        let mut extension = match self.header_extension()? {
            Some(extension) => extension,
            None if records.is_empty() => return Ok(()),
            None => HeaderExtension::new(),
        };
        let payload = if records.is_empty() {
            None
        } else {
            Some(encode_library(records)?)
        };
        put_raw(&mut extension.objects, METADATA_LIBRARY_GUID, payload);
        self.put_object(HEADER_EXTENSION_GUID, Some(extension.encode()?));
        Ok(())
    }

    /// Rewrite the total file size recorded in File Properties
    pub fn set_file_size(&mut self, file_size: u64) {
        if let Some(object) = self
            .objects
            .iter_mut()
            .find(|o| o.guid == FILE_PROPERTIES_GUID)
        {
            // file id (16) precedes the size
            if object.payload.len() >= 24 {
                object.payload[16..24].copy_from_slice(&file_size.to_le_bytes());
            }
        }
    }

    /// Duration, bitrate and WAVEFORMATEX fields of the first audio stream
    pub fn audio_properties(&self) -> Result<AudioProperties> {
        let mut props = AudioProperties::default();

        if let Some(object) = self.object(&FILE_PROPERTIES_GUID) {
            let mut r = Reader::new(&object.payload);
            // file id, file size, creation date, packet count
            r.skip(16 + 8 + 8 + 8)?;
            let play_duration_100ns = r.u64()?;
            let _send_duration = r.u64()?;
            let preroll_ms = r.u64()?;
            // flags, min and max packet size
            r.skip(4 + 4 + 4)?;
            props.max_bitrate = r.u32()?;
            props.duration_ms = (play_duration_100ns / 10_000).saturating_sub(preroll_ms);
        }

        let audio_stream = self
            .objects
            .iter()
            .filter(|o| o.guid == STREAM_PROPERTIES_GUID)
            .find(|o| o.payload.get(..16) == Some(&AUDIO_MEDIA_GUID[..]));
        if let Some(object) = audio_stream {
            let mut r = Reader::new(&object.payload);
            // stream type, error correction type, time offset
            r.skip(16 + 16 + 8)?;
            let type_specific_len = r.u32()? as usize;
            // error correction data length, flags, reserved
            r.skip(4 + 2 + 4)?;
            let format = r.take(type_specific_len)?;

            let mut r = Reader::new(format);
            let _codec_id = r.u16()?;
            props.channels = r.u16()?;
            props.sample_rate = r.u32()?;
            props.avg_bytes_per_sec = r.u32()?;
            let _block_align = r.u16()?;
            props.bits_per_sample = r.u16()?;
        }

        Ok(props)
    }
}
