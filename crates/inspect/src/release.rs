//! Release-level inspection: part selection and filename heuristics.

use crate::error::Result;
use crate::part::inspect_part;
use crate::source::ArticleSource;
use crate::unrar::Unrar;
use rarvet_catalog::models::{ReleasePart, ReleaseSummary, Verdict};
use regex::Regex;
use std::sync::LazyLock;
use tracing::instrument;

/// Sidecar/container extensions commonly bundled alongside intentionally
/// passworded releases.
static MAYBE_PASSWORDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(ace|cab|tar|gz|url)$").unwrap());
/// The classic "password.url" plant; a confirmed signal on its own.
static PASSWORDED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)password\.url").unwrap());

/// Inspect a release's manifest and classify it.
///
/// Parts are tried in manifest order, each reduced to its first segment
/// before fetching - the archive's own entry table lives in the first
/// volume segment, and fetching more buys classification nothing. The first
/// part with any segments at all decides the outcome: its inspection result
/// is returned as-is, with no fallback to later parts when it comes back
/// empty. Parts whose reduction leaves zero segments are skipped entirely.
#[instrument(skip_all, fields(group = %group, parts = parts.len()))]
pub async fn inspect_release(
    source: &dyn ArticleSource,
    unrar: &Unrar,
    group: &str,
    parts: &[ReleasePart],
) -> Result<Option<ReleaseSummary>> {
    for part in parts {
        let Some(first) = part.segments.first() else {
            tracing::trace!("part has no segments; skipping");
            continue;
        };
        let result = inspect_part(source, unrar, group, std::slice::from_ref(first)).await?;
        return Ok(result.map(apply_name_heuristics));
    }
    Ok(None)
}

/// Upgrade a verdict based on the entry names alone.
///
/// Only consulted when inspection found nothing conclusive. Names are
/// scanned in enumeration order and the first name matching either pattern
/// settles the question; on that name the strict pattern wins over the
/// extension heuristic.
fn apply_name_heuristics(mut summary: ReleaseSummary) -> ReleaseSummary {
    if summary.verdict == Verdict::Passworded {
        return summary;
    }
    for name in &summary.names {
        if PASSWORDED.is_match(name) {
            tracing::debug!(name, "filename confirms a passworded release");
            summary.verdict = summary.verdict.upgrade(Verdict::Passworded);
            break;
        }
        if MAYBE_PASSWORDED.is_match(name) {
            tracing::debug!(name, "filename suggests a passworded release");
            summary.verdict = summary.verdict.upgrade(Verdict::Potentially);
            break;
        }
    }
    summary
}
