//! RAR4 (1.5-4.x) block header walking.
//!
//! Block layout: CRC (u16), type (u8), flags (u16), header size (u16),
//! all little-endian, followed by type-specific fields. Blocks with the
//! `LONG_BLOCK` flag carry an additional u32 data size at offset 7; for
//! file headers this coincides with the packed data size.

use crate::classify::{Entry, Listing};

pub(crate) const MARKER: [u8; 7] = [0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x00];

pub(crate) const MAIN_HEAD: u8 = 0x73;
pub(crate) const FILE_HEAD: u8 = 0x74;
pub(crate) const END_HEAD: u8 = 0x7b;

/// Main header: the entry table itself is encrypted.
pub(crate) const MHD_PASSWORD: u16 = 0x0080;
/// File header: this entry requires a password to extract.
pub(crate) const LHD_PASSWORD: u16 = 0x0004;
/// File header: 64-bit packed/unpacked sizes follow the base fields.
pub(crate) const LHD_LARGE: u16 = 0x0100;
/// File header window bits; all set means the entry is a directory.
pub(crate) const LHD_WINDOW_MASK: u16 = 0x00e0;
/// Any block: a u32 data size follows the header fields.
pub(crate) const LONG_BLOCK: u16 = 0x8000;

fn u16le(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(data.get(at..at + 2)?.try_into().ok()?))
}

fn u32le(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(at..at + 4)?.try_into().ok()?))
}

/// Walk every block after the marker and list the file entries.
///
/// The marker must already have been validated by the caller. Truncated or
/// corrupt trailing blocks end the walk; entries seen so far still count.
pub(crate) fn listing(data: &[u8]) -> Listing {
    let mut entries = Vec::new();
    let mut offset = MARKER.len();
    while offset.checked_add(7).is_some_and(|end| end <= data.len()) {
        let block = &data[offset..];
        let head_type = block[2];
        let flags = u16::from_le_bytes([block[3], block[4]]);
        let head_size = u16::from_le_bytes([block[5], block[6]]) as usize;
        if head_size < 7 {
            tracing::trace!(offset, "undersized block header; stopping walk");
            break;
        }
        let mut data_size = if flags & LONG_BLOCK != 0 {
            match u32le(block, 7) {
                Some(size) => u64::from(size),
                None => break,
            }
        } else {
            0
        };
        match head_type {
            MAIN_HEAD if flags & MHD_PASSWORD != 0 => return Listing::Opaque,
            FILE_HEAD => match file_entry(block, flags) {
                Some((entry, packed)) => {
                    data_size = packed;
                    if let Some(entry) = entry {
                        entries.push(entry);
                    }
                }
                None => break,
            },
            END_HEAD => break,
            _ => {}
        }
        let data_size = usize::try_from(data_size).unwrap_or(usize::MAX);
        let Some(next) = offset.checked_add(head_size).and_then(|o| o.checked_add(data_size)) else {
            break;
        };
        offset = next;
    }
    Listing::Entries(entries)
}

/// Parse one file header into an entry and its packed data size.
///
/// Directory entries yield no entry but still report their data size so the
/// walk can skip past them. `None` means the header is truncated.
fn file_entry(block: &[u8], flags: u16) -> Option<(Option<Entry>, u64)> {
    let mut packed = u64::from(u32le(block, 7)?);
    let mut size = u64::from(u32le(block, 11)?);
    let name_size = u16le(block, 26)? as usize;
    let mut name_at: usize = 32;
    if flags & LHD_LARGE != 0 {
        packed |= u64::from(u32le(block, 32)?) << 32;
        size |= u64::from(u32le(block, 36)?) << 32;
        name_at = 40;
    }
    let raw = block.get(name_at..name_at.checked_add(name_size)?)?;
    // LHD_UNICODE names carry "ansi\0packed-unicode"; the portion before the
    // NUL is enough for classification purposes.
    let raw = raw.split(|&b| b == 0).next().unwrap_or(raw);
    if flags & LHD_WINDOW_MASK == LHD_WINDOW_MASK {
        return Some((None, packed));
    }
    let entry = Entry {
        name: String::from_utf8_lossy(raw).into_owned(),
        size,
        encrypted: flags & LHD_PASSWORD != 0,
    };
    Some((Some(entry), packed))
}
