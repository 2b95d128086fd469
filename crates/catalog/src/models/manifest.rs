use serde::{Deserialize, Serialize};

/// One file-level unit of a multi-part release.
///
/// A part is assembled from one or more message segments, listed in the
/// order they must be fetched and concatenated. The manifest is parsed by
/// an upstream stage; by the time it reaches the catalog it is already a
/// plain ordered structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePart {
    /// Message identifiers, in assembly order.
    pub segments: Vec<String>,
}

impl ReleasePart {
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { segments: segments.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_json_round_trip() {
        let parts = vec![
            ReleasePart::new(["<a@ex>", "<b@ex>"]),
            ReleasePart::new(["<c@ex>"]),
        ];
        let json = serde_json::to_string(&parts).unwrap();
        let back: Vec<ReleasePart> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parts);
    }
}
