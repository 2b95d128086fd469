//! Hand-assembled RAR4 archives for tests.
//!
//! Producing real fixtures would need a rar binary at build time; these
//! builders emit just enough of the RAR4 block structure to exercise the
//! classifier, which is all the tests need. Intended for use from other
//! crates' dev-dependencies via the `fixtures` feature.

use crate::rar4;

/// A generic RAR4 block: CRC (unchecked), type, flags, header size, body.
pub fn block(head_type: u8, flags: u16, body: &[u8]) -> Vec<u8> {
    let size = 7 + u16::try_from(body.len()).expect("fixture body too large");
    let mut out = vec![0x00, 0x00, head_type];
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// A stored (uncompressed) file entry followed by its packed data.
pub fn file_block(name: &str, size: u32, extra_flags: u16, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&u32::try_from(data.len()).expect("fixture data too large").to_le_bytes());
    body.extend_from_slice(&size.to_le_bytes());
    body.push(0x00); // host os
    body.extend_from_slice(&0u32.to_le_bytes()); // file crc
    body.extend_from_slice(&0u32.to_le_bytes()); // mtime
    body.push(20); // unpack version
    body.push(0x30); // method: store
    body.extend_from_slice(&u16::try_from(name.len()).expect("fixture name too long").to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes()); // attributes
    body.extend_from_slice(name.as_bytes());
    let mut out = block(rar4::FILE_HEAD, extra_flags | rar4::LONG_BLOCK, &body);
    out.extend_from_slice(data);
    out
}

/// Marker, main header, the given blocks, end block.
pub fn archive(blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = rar4::MARKER.to_vec();
    out.extend_from_slice(&block(rar4::MAIN_HEAD, 0, &[0u8; 6]));
    for b in blocks {
        out.extend_from_slice(b);
    }
    out.extend_from_slice(&block(rar4::END_HEAD, 0x4000, &[]));
    out
}

/// A plain archive of stored entries: `(name, declared size, data)`.
pub fn simple(entries: &[(&str, u32, &[u8])]) -> Vec<u8> {
    let blocks: Vec<_> = entries.iter().map(|(name, size, data)| file_block(name, *size, 0, data)).collect();
    archive(&blocks)
}

/// An archive whose entry table itself is encrypted.
pub fn opaque() -> Vec<u8> {
    let mut out = rar4::MARKER.to_vec();
    out.extend_from_slice(&block(rar4::MAIN_HEAD, rar4::MHD_PASSWORD, &[0u8; 6]));
    out
}

/// An archive with a single entry flagged as requiring a password.
pub fn with_encrypted_entry(name: &str) -> Vec<u8> {
    archive(&[file_block(name, 64, rar4::LHD_PASSWORD, b"xxxx")])
}
