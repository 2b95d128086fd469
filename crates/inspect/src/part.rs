//! Single-part inspection: fetch, classify, extract, classify again.

use crate::error::{ErrorKind, Result};
use crate::source::ArticleSource;
use crate::unrar::Unrar;
use exn::ResultExt;
use rarvet_archive::{Listing, classify};
use rarvet_catalog::models::{ReleaseSummary, Verdict};
use std::io::Write;
use tracing::instrument;

/// Inspect one archive part of a release.
///
/// Returns `Ok(None)` when the part is unusable (nothing fetched, or the
/// fetched bytes are not a RAR archive); the caller decides what to do with
/// the release then. Returns a summary otherwise, with the verdict combining
/// every signal seen: container-level encryption, entry-level flags on the
/// outer archive, and entry-level or container-level encryption on any
/// nested archive found after extraction.
///
/// The scratch file and extraction directory are removed on every exit path,
/// including errors; a long batch must not leak disk.
#[instrument(skip_all, fields(group = %group))]
pub async fn inspect_part(
    source: &dyn ArticleSource,
    unrar: &Unrar,
    group: &str,
    segments: &[String],
) -> Result<Option<ReleaseSummary>> {
    let Some(data) = source.fetch(group, segments).await? else {
        tracing::debug!("no article data returned; skipping part");
        return Ok(None);
    };

    let listing = match classify(&data) {
        Ok(listing) => listing,
        Err(_) => {
            tracing::debug!("fetched data is not a RAR archive; skipping part");
            return Ok(None);
        }
    };
    let Some(files) = listing.files() else {
        // Container-level encryption, an unreadable entry table, or entries
        // individually flagged: a confirmed password either way, and nothing
        // worth extracting.
        tracing::debug!("archive was encrypted or passworded");
        return Ok(Some(ReleaseSummary::passworded()));
    };

    let mut summary = ReleaseSummary {
        count: files.len() as u64,
        size: files.iter().map(|f| f.size).sum(),
        names: files.iter().map(|f| f.name.clone()).collect(),
        verdict: Verdict::Clean,
    };

    // Spill the fetched bytes for the extraction tool. Both guards clean up
    // when they fall out of scope, whichever way this function leaves.
    let mut archive_file =
        tempfile::Builder::new().suffix(".rar").tempfile().or_raise(|| ErrorKind::Io)?;
    archive_file.write_all(&data).or_raise(|| ErrorKind::Io)?;
    archive_file.flush().or_raise(|| ErrorKind::Io)?;
    let extract_dir = tempfile::tempdir().or_raise(|| ErrorKind::Io)?;

    if let Err(error) = unrar.extract(archive_file.path(), extract_dir.path()) {
        // Routine for multi-volume archives: only the first volume was
        // fetched, so extraction bails part-way. Whatever did land on disk
        // still gets inspected.
        tracing::debug!(%error, "extraction had issues; probably a multi-volume archive");
    }

    let mut inner_encrypted = false;
    for name in &summary.names {
        let path = extract_dir.path().join(name);
        let Ok(inner) = std::fs::read(&path) else {
            tracing::trace!(name, "inner file absent after extraction; skipping");
            continue;
        };
        match classify(&inner) {
            // A media file or similar; carries no password signal.
            Err(_) => continue,
            Ok(Listing::Opaque) => {
                summary.verdict = summary.verdict.upgrade(Verdict::Passworded);
                break;
            }
            Ok(Listing::Entries(entries)) if entries.is_empty() => {
                // A nested archive that yields nothing is treated the same
                // as an unreadable one.
                summary.verdict = summary.verdict.upgrade(Verdict::Passworded);
                break;
            }
            Ok(listing) => inner_encrypted |= listing.any_entry_encrypted(),
        }
    }
    if inner_encrypted {
        summary.verdict = summary.verdict.upgrade(Verdict::Passworded);
    }
    Ok(Some(summary))
}
