//! Minimal ZIP container: deflated entries, central directory, no extras.
//!
//! Only what an overlay needs is supported: a handful of entries, no
//! encryption, no ZIP64, single disk. Timestamps are fixed so the same
//! input always produces the same bytes.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use survey_common::{SurveyError, SurveyResult};

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_DIRECTORY_SIG: u32 = 0x0605_4b50;

const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_OF_DIRECTORY_LEN: usize = 22;

const VERSION: u16 = 20;
const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// General-purpose bit 11: the entry name is UTF-8.
const FLAG_UTF8_NAME: u16 = 1 << 11;

/// Upper bound on buffer space reserved from an untrusted size field.
const MAX_PREALLOC: usize = 1 << 20;

/// 1980-01-01 00:00:00 in MS-DOS format.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (1 << 5) | 1;

/// A file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

struct Written {
    name: String,
    flags: u16,
    crc: u32,
    compressed_len: u32,
    len: u32,
    offset: u32,
}

/// Write `entries` as a ZIP archive, in order, deflating each one.
pub fn write_zip(entries: &[ArchiveEntry]) -> SurveyResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut written = Vec::with_capacity(entries.len());

    for entry in entries {
        let compressed = deflate(&entry.data)?;
        let record = Written {
            name: entry.name.clone(),
            flags: if entry.name.is_ascii() { 0 } else { FLAG_UTF8_NAME },
            crc: crc32fast::hash(&entry.data),
            compressed_len: to_u32(compressed.len(), "compressed entry")?,
            len: to_u32(entry.data.len(), "entry")?,
            offset: to_u32(out.len(), "archive")?,
        };

        put_u32(&mut out, LOCAL_HEADER_SIG);
        put_u16(&mut out, VERSION);
        put_u16(&mut out, record.flags);
        put_u16(&mut out, METHOD_DEFLATE);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, record.crc);
        put_u32(&mut out, record.compressed_len);
        put_u32(&mut out, record.len);
        put_u16(&mut out, name_len(&record.name)?);
        put_u16(&mut out, 0); // extra field
        out.extend_from_slice(record.name.as_bytes());
        out.extend_from_slice(&compressed);

        written.push(record);
    }

    let directory_offset = to_u32(out.len(), "archive")?;
    for record in &written {
        put_u32(&mut out, CENTRAL_HEADER_SIG);
        put_u16(&mut out, VERSION); // made by
        put_u16(&mut out, VERSION); // needed
        put_u16(&mut out, record.flags);
        put_u16(&mut out, METHOD_DEFLATE);
        put_u16(&mut out, DOS_TIME);
        put_u16(&mut out, DOS_DATE);
        put_u32(&mut out, record.crc);
        put_u32(&mut out, record.compressed_len);
        put_u32(&mut out, record.len);
        put_u16(&mut out, name_len(&record.name)?);
        put_u16(&mut out, 0); // extra field
        put_u16(&mut out, 0); // comment
        put_u16(&mut out, 0); // disk
        put_u16(&mut out, 0); // internal attributes
        put_u32(&mut out, 0); // external attributes
        put_u32(&mut out, record.offset);
        out.extend_from_slice(record.name.as_bytes());
    }
    let directory_len = to_u32(out.len(), "archive")? - directory_offset;

    let count = u16::try_from(written.len())
        .map_err(|_| SurveyError::Encoding("too many archive entries".to_string()))?;
    put_u32(&mut out, END_OF_DIRECTORY_SIG);
    put_u16(&mut out, 0);
    put_u16(&mut out, 0);
    put_u16(&mut out, count);
    put_u16(&mut out, count);
    put_u32(&mut out, directory_len);
    put_u32(&mut out, directory_offset);
    put_u16(&mut out, 0); // comment

    Ok(out)
}

/// Read every entry of a ZIP archive, in central-directory order.
///
/// Entry data is inflated and checked against the recorded size and CRC.
pub fn read_zip(bytes: &[u8]) -> SurveyResult<Vec<ArchiveEntry>> {
    let eocd = find_end_of_directory(bytes)?;
    let count = get_u16(bytes, eocd + 10)? as usize;
    let mut pos = get_u32(bytes, eocd + 16)? as usize;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        if get_u32(bytes, pos)? != CENTRAL_HEADER_SIG {
            return Err(malformed(format!("no central directory header at {}", pos)));
        }
        let method = get_u16(bytes, pos + 10)?;
        let crc = get_u32(bytes, pos + 16)?;
        let compressed_len = get_u32(bytes, pos + 20)? as usize;
        let len = get_u32(bytes, pos + 24)? as usize;
        let name_len = get_u16(bytes, pos + 28)? as usize;
        let extra_len = get_u16(bytes, pos + 30)? as usize;
        let comment_len = get_u16(bytes, pos + 32)? as usize;
        let offset = get_u32(bytes, pos + 42)? as usize;

        let name_start = pos + CENTRAL_HEADER_LEN;
        let name = String::from_utf8(slice(bytes, name_start, name_len)?.to_vec())
            .map_err(|_| malformed("entry name is not UTF-8"))?;
        pos = name_start + name_len + extra_len + comment_len;

        if get_u32(bytes, offset)? != LOCAL_HEADER_SIG {
            return Err(malformed(format!("no local header for '{}'", name)));
        }
        let local_name_len = get_u16(bytes, offset + 26)? as usize;
        let local_extra_len = get_u16(bytes, offset + 28)? as usize;
        let data_start = offset + LOCAL_HEADER_LEN + local_name_len + local_extra_len;
        let raw = slice(bytes, data_start, compressed_len)?;

        let data = match method {
            METHOD_STORED => raw.to_vec(),
            METHOD_DEFLATE => inflate(raw, len)?,
            other => {
                return Err(malformed(format!(
                    "'{}' uses unsupported compression method {}",
                    name, other
                )))
            }
        };
        if data.len() != len {
            return Err(malformed(format!(
                "'{}' is {} bytes, directory says {}",
                name,
                data.len(),
                len
            )));
        }
        if crc32fast::hash(&data) != crc {
            return Err(malformed(format!("CRC mismatch in '{}'", name)));
        }

        entries.push(ArchiveEntry { name, data });
    }

    Ok(entries)
}

fn find_end_of_directory(bytes: &[u8]) -> SurveyResult<usize> {
    if bytes.len() < END_OF_DIRECTORY_LEN {
        return Err(malformed("too short to be a ZIP archive"));
    }
    // The record may be followed by a comment of up to 64 KiB.
    let last = bytes.len() - END_OF_DIRECTORY_LEN;
    let first = last.saturating_sub(u16::MAX as usize);
    (first..=last)
        .rev()
        .find(|&pos| get_u32(bytes, pos).ok() == Some(END_OF_DIRECTORY_SIG))
        .ok_or_else(|| malformed("end of central directory not found"))
}

fn deflate(data: &[u8]) -> SurveyResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SurveyError::Encoding(format!("deflate failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SurveyError::Encoding(format!("deflate failed: {}", e)))
}

/// Inflate at most one byte past `expected_len`, so an oversized entry is
/// caught by the length check without being fully expanded.
fn inflate(data: &[u8], expected_len: usize) -> SurveyResult<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len.min(MAX_PREALLOC));
    DeflateDecoder::new(data)
        .take(expected_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| malformed(format!("inflate failed: {}", e)))?;
    Ok(out)
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn slice(bytes: &[u8], start: usize, len: usize) -> SurveyResult<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| bytes.get(start..end))
        .ok_or_else(|| malformed(format!("truncated at offset {}", start)))
}

fn get_u16(bytes: &[u8], pos: usize) -> SurveyResult<u16> {
    let b = slice(bytes, pos, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn get_u32(bytes: &[u8], pos: usize) -> SurveyResult<u32> {
    let b = slice(bytes, pos, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn to_u32(len: usize, what: &str) -> SurveyResult<u32> {
    u32::try_from(len).map_err(|_| SurveyError::Encoding(format!("{} exceeds 4 GiB", what)))
}

fn name_len(name: &str) -> SurveyResult<u16> {
    u16::try_from(name.len())
        .map_err(|_| SurveyError::Encoding(format!("entry name too long: {}", name.len())))
}

fn malformed(message: impl Into<String>) -> SurveyError {
    SurveyError::MalformedArchive(message.into())
}
