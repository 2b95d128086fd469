use crate::models::Verdict;

/// Aggregated inspection result for one release.
///
/// The four fields are persisted together in a single UPDATE so a record is
/// either fully summarised or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Number of entries in the inspected archive part.
    pub count: u64,
    /// Sum of the entries' unpacked sizes, in bytes.
    pub size: u64,
    /// Entry names in the archive's enumeration order.
    pub names: Vec<String>,
    pub verdict: Verdict,
}

impl ReleaseSummary {
    fn terminal(verdict: Verdict) -> Self {
        Self { count: 0, size: 0, names: Vec::new(), verdict }
    }

    /// The summary for an archive whose entry table could not be read: the
    /// container is already known to be password-protected, so there is
    /// nothing to count.
    pub fn passworded() -> Self {
        Self::terminal(Verdict::Passworded)
    }

    /// The terminal summary for a release that could not be inspected
    /// (no archive parts, or none of them usable). Writing it blacklists
    /// the release from future batches.
    pub fn unknown() -> Self {
        Self::terminal(Verdict::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_summaries_are_empty() {
        for summary in [ReleaseSummary::passworded(), ReleaseSummary::unknown()] {
            assert_eq!(summary.count, 0);
            assert_eq!(summary.size, 0);
            assert!(summary.names.is_empty());
        }
        assert_eq!(ReleaseSummary::passworded().verdict, Verdict::Passworded);
        assert_eq!(ReleaseSummary::unknown().verdict, Verdict::Unknown);
    }
}
