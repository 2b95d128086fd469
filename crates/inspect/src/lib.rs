//! Password inspection of multi-part release archives.
//!
//! One stage of a content-indexing pipeline: given releases whose payloads
//! are described by NZB-style manifests, fetch just enough of the archive to
//! decide whether it is password-protected, collect summary metadata (file
//! count, total size, names), and write the verdict back to the catalog.
//!
//! The decision combines three signals, strongest first:
//! 1. container-level encryption on the fetched archive (the entry table
//!    itself is unreadable),
//! 2. encryption flags on entries of the fetched archive or of any nested
//!    archive found after extraction,
//! 3. filename heuristics over the entry names (sidecar extensions and the
//!    classic `password.url` plant).
//!
//! Nothing here cracks or removes passwords; this stage only classifies.
//!
//! Collaborators are deliberately thin seams: article retrieval is the
//! [`ArticleSource`] trait, extraction is an external unrar binary behind
//! [`Unrar`], and persistence is `rarvet-catalog`'s repository.

mod batch;
pub mod error;
mod part;
mod release;
mod source;
mod unrar;

pub use crate::batch::Batch;
pub use crate::part::inspect_part;
pub use crate::release::inspect_release;
pub use crate::source::ArticleSource;
#[cfg(any(test, feature = "mock"))]
pub use crate::source::MockSource;
pub use crate::unrar::Unrar;
