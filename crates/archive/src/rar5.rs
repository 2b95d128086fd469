//! RAR5 (5.0+) block header walking.
//!
//! Block layout: CRC32 (u32), header size (vint, counting everything after
//! itself), then within the header: type (vint), flags (vint), optional
//! extra-area size (vint), optional data size (vint), type-specific fields,
//! and finally the extra area occupying the last `extra_size` bytes of the
//! header. Integers use the 7-bit continuation encoding ("vint").

use crate::classify::{Entry, Listing};

pub(crate) const MARKER: [u8; 8] = [0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x01, 0x00];

const HEAD_FILE: u64 = 2;
const HEAD_CRYPT: u64 = 4;
const HEAD_END: u64 = 5;

/// Header flag: an extra area is present.
const HFL_EXTRA: u64 = 0x01;
/// Header flag: a data area follows the header.
const HFL_DATA: u64 = 0x02;

/// File flag: the entry is a directory.
const FHFL_DIRECTORY: u64 = 0x01;
/// File flag: a u32 mtime field is present.
const FHFL_MTIME: u64 = 0x02;
/// File flag: a u32 data CRC field is present.
const FHFL_CRC: u64 = 0x04;
/// File flag: the unpacked size is unknown (e.g. streamed archives).
const FHFL_UNKNOWN_SIZE: u64 = 0x08;

/// Extra-area record type: file encryption parameters.
const REC_FILE_CRYPT: u64 = 0x01;

/// Decode one variable-length integer, advancing the cursor.
fn vint(data: &[u8], at: &mut usize) -> Option<u64> {
    let mut value = 0u64;
    for shift in 0..10u32 {
        let byte = *data.get(*at)?;
        *at += 1;
        value |= u64::from(byte & 0x7f) << (shift * 7);
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
    None
}

/// Walk every block after the marker and list the file entries.
///
/// The marker must already have been validated by the caller. Truncated or
/// corrupt trailing blocks end the walk; entries seen so far still count.
pub(crate) fn listing(data: &[u8]) -> Listing {
    let mut entries = Vec::new();
    let mut offset = MARKER.len();
    loop {
        let Some(mut at) = offset.checked_add(4) else { break };
        if at >= data.len() {
            break;
        }
        let Some(head_size) = vint(data, &mut at) else { break };
        let head_start = at;
        let head_end = match usize::try_from(head_size).ok().and_then(|s| head_start.checked_add(s)) {
            Some(end) if end <= data.len() => end,
            _ => break,
        };
        let header = &data[head_start..head_end];
        let mut h = 0usize;
        let Some(head_type) = vint(header, &mut h) else { break };
        let Some(head_flags) = vint(header, &mut h) else { break };
        let extra_size = if head_flags & HFL_EXTRA != 0 {
            match vint(header, &mut h) {
                Some(size) => size,
                None => break,
            }
        } else {
            0
        };
        let data_size = if head_flags & HFL_DATA != 0 {
            match vint(header, &mut h) {
                Some(size) => size,
                None => break,
            }
        } else {
            0
        };
        match head_type {
            HEAD_CRYPT => return Listing::Opaque,
            HEAD_END => break,
            HEAD_FILE => {
                if let Some(entry) = file_entry(header, h, extra_size) {
                    entries.push(entry);
                }
            }
            _ => {}
        }
        let data_size = usize::try_from(data_size).unwrap_or(usize::MAX);
        let Some(next) = head_end.checked_add(data_size) else { break };
        offset = next;
    }
    Listing::Entries(entries)
}

/// Parse the file-specific fields of a header into an entry.
///
/// `None` for directories and truncated headers; the walk advances by the
/// block's declared sizes either way.
fn file_entry(header: &[u8], mut at: usize, extra_size: u64) -> Option<Entry> {
    let file_flags = vint(header, &mut at)?;
    let unpacked = vint(header, &mut at)?;
    let _attributes = vint(header, &mut at)?;
    if file_flags & FHFL_MTIME != 0 {
        at = at.checked_add(4)?;
    }
    if file_flags & FHFL_CRC != 0 {
        at = at.checked_add(4)?;
    }
    let _compression = vint(header, &mut at)?;
    let _host_os = vint(header, &mut at)?;
    let name_len = usize::try_from(vint(header, &mut at)?).ok()?;
    let raw = header.get(at..at.checked_add(name_len)?)?;
    if file_flags & FHFL_DIRECTORY != 0 {
        return None;
    }
    let size = if file_flags & FHFL_UNKNOWN_SIZE != 0 { 0 } else { unpacked };
    Some(Entry {
        name: String::from_utf8_lossy(raw).into_owned(),
        size,
        encrypted: has_encryption_record(header, extra_size),
    })
}

/// Whether the header's extra area contains a file-encryption record.
fn has_encryption_record(header: &[u8], extra_size: u64) -> bool {
    let Ok(extra_size) = usize::try_from(extra_size) else { return false };
    if extra_size == 0 || extra_size > header.len() {
        return false;
    }
    let extra = &header[header.len() - extra_size..];
    let mut at = 0usize;
    while at < extra.len() {
        let record_start = at;
        let Some(record_size) = vint(extra, &mut at) else { return false };
        let size_len = at - record_start;
        let Some(record_type) = vint(extra, &mut at) else { return false };
        if record_type == REC_FILE_CRYPT {
            return true;
        }
        // The record size counts the type field and the payload.
        let next = usize::try_from(record_size)
            .ok()
            .and_then(|s| record_start.checked_add(size_len)?.checked_add(s));
        match next {
            Some(next) if next > at => at = next,
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn encode_vint(mut value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    fn block(head_type: u64, body: &[u8], extra: &[u8], data: &[u8]) -> Vec<u8> {
        let mut flags = 0u64;
        if !extra.is_empty() {
            flags |= HFL_EXTRA;
        }
        if !data.is_empty() {
            flags |= HFL_DATA;
        }
        let mut header = encode_vint(head_type);
        header.extend(encode_vint(flags));
        if !extra.is_empty() {
            header.extend(encode_vint(extra.len() as u64));
        }
        if !data.is_empty() {
            header.extend(encode_vint(data.len() as u64));
        }
        header.extend_from_slice(body);
        header.extend_from_slice(extra);
        let mut out = vec![0x00; 4]; // header CRC, not verified by the walker
        out.extend(encode_vint(header.len() as u64));
        out.extend(header);
        out.extend_from_slice(data);
        out
    }

    fn file_body(name: &str, size: u64, file_flags: u64) -> Vec<u8> {
        let mut body = encode_vint(file_flags);
        body.extend(encode_vint(size));
        body.extend(encode_vint(0)); // attributes
        body.extend(encode_vint(0)); // compression info
        body.extend(encode_vint(0)); // host os
        body.extend(encode_vint(name.len() as u64));
        body.extend_from_slice(name.as_bytes());
        body
    }

    fn archive(blocks: &[Vec<u8>]) -> Vec<u8> {
        let mut out = MARKER.to_vec();
        out.extend_from_slice(&block(1, &encode_vint(0), &[], &[])); // main header: archive flags
        for b in blocks {
            out.extend_from_slice(b);
        }
        out.extend_from_slice(&block(HEAD_END, &encode_vint(0), &[], &[]));
        out
    }

    #[test]
    fn lists_entries_in_order() {
        let data = archive(&[
            block(HEAD_FILE, &file_body("movie.mkv", 900, 0), &[], b"packed"),
            block(HEAD_FILE, &file_body("notes.nfo", 42, 0), &[], b"xx"),
        ]);
        let Listing::Entries(entries) = classify(&data).unwrap() else {
            panic!("expected a readable entry table");
        };
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["movie.mkv", "notes.nfo"]);
        assert_eq!(entries[0].size, 900);
    }

    #[test]
    fn encryption_header_is_opaque() {
        let mut data = MARKER.to_vec();
        data.extend_from_slice(&block(HEAD_CRYPT, &encode_vint(0), &[], &[]));
        assert_eq!(classify(&data).unwrap(), Listing::Opaque);
    }

    #[test]
    fn file_encryption_record_flags_the_entry() {
        let mut extra = encode_vint(1 + 8); // record size: type + payload
        extra.extend(encode_vint(REC_FILE_CRYPT));
        extra.extend_from_slice(&[0u8; 8]); // crypt parameters, irrelevant here
        let data = archive(&[block(HEAD_FILE, &file_body("payload.bin", 64, 0), &extra, b"pp")]);
        let listing = classify(&data).unwrap();
        assert!(listing.any_entry_encrypted());
        assert!(listing.files().is_none());
    }

    #[test]
    fn unrelated_extra_records_do_not_flag() {
        let mut extra = encode_vint(1 + 4);
        extra.extend(encode_vint(0x03)); // file time record
        extra.extend_from_slice(&[0u8; 4]);
        let data = archive(&[block(HEAD_FILE, &file_body("payload.bin", 64, 0), &extra, b"pp")]);
        assert!(!classify(&data).unwrap().any_entry_encrypted());
    }

    #[test]
    fn directories_are_skipped() {
        let data = archive(&[
            block(HEAD_FILE, &file_body("Sample", 0, FHFL_DIRECTORY), &[], &[]),
            block(HEAD_FILE, &file_body("movie.mkv", 900, 0), &[], b"packed"),
        ]);
        let Listing::Entries(entries) = classify(&data).unwrap() else {
            panic!("expected a readable entry table");
        };
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn unknown_size_reads_as_zero() {
        let data = archive(&[block(HEAD_FILE, &file_body("stream.bin", 999, FHFL_UNKNOWN_SIZE), &[], b"d")]);
        let Listing::Entries(entries) = classify(&data).unwrap() else {
            panic!("expected a readable entry table");
        };
        assert_eq!(entries[0].size, 0);
    }

    #[test]
    fn truncated_volume_keeps_parsed_entries() {
        let mut data = archive(&[
            block(HEAD_FILE, &file_body("one.bin", 10, 0), &[], b"12345"),
            block(HEAD_FILE, &file_body("two.bin", 20, 0), &[], b"67890"),
        ]);
        data.truncate(data.len() - 20);
        let Listing::Entries(entries) = classify(&data).unwrap() else {
            panic!("expected a readable entry table");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "one.bin");
    }
}
