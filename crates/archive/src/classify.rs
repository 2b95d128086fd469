use crate::error::{ErrorKind, Result};
use crate::{rar4, rar5};

/// One file recorded inside an archive's entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Archive-relative path, as recorded in the file header.
    pub name: String,
    /// Unpacked size in bytes. Zero when the header declares it unknown.
    pub size: u64,
    /// Whether this entry requires a password to extract.
    pub encrypted: bool,
}

/// The outcome of listing an archive's entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The entry table was readable. Entries appear in enumeration order and
    /// carry their individual encryption flags.
    Entries(Vec<Entry>),
    /// The entry table itself is encrypted; nothing can be enumerated
    /// without a password.
    Opaque,
}

impl Listing {
    /// The listable files, or `None` as a password signal.
    ///
    /// `None` covers an opaque container, an entry table with no entries at
    /// all, and a readable table in which any entry is individually
    /// encrypted. In every one of those cases the archive yields nothing
    /// useful to list and must be treated as password-protected.
    pub fn files(self) -> Option<Vec<Entry>> {
        match self {
            Self::Entries(entries) if !entries.is_empty() && !entries.iter().any(|e| e.encrypted) => Some(entries),
            _ => None,
        }
    }

    /// Whether any individual entry is flagged as encrypted.
    ///
    /// `false` for an opaque container - that is a container-level signal,
    /// not an entry-level one.
    pub fn any_entry_encrypted(&self) -> bool {
        match self {
            Self::Entries(entries) => entries.iter().any(|e| e.encrypted),
            Self::Opaque => false,
        }
    }
}

/// Classify a byte buffer believed to be a single RAR archive.
///
/// Fails with [`ErrorKind::NotAnArchive`] when the buffer carries no RAR
/// marker at all. Otherwise returns the [`Listing`] reported by the format's
/// header walk.
pub fn classify(data: &[u8]) -> Result<Listing> {
    if data.starts_with(&rar5::MARKER) {
        Ok(rar5::listing(data))
    } else if data.starts_with(&rar4::MARKER) {
        Ok(rar4::listing(data))
    } else {
        exn::bail!(ErrorKind::NotAnArchive);
    }
}
