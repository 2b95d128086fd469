use crate::error::{Error, ErrorKind, Result};
use crate::models::{ReleasePart, ReleaseSummary, Verdict};
use exn::ResultExt;

/// A persisted release entry, as read back from the catalog.
///
/// The summary is `None` until the password-check stage has run for this
/// record; afterwards all four summary fields are present together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: i64,
    /// Human-readable release name, owned by the upstream stages.
    pub name: String,
    /// Names the article collection the parts are fetched from.
    pub group_name: String,
    parts: Vec<ReleasePart>,
    pub summary: Option<ReleaseSummary>,
}

impl CatalogRecord {
    /// The ordered archive parts of this release's manifest.
    pub fn parts(&self) -> &[ReleasePart] {
        &self.parts
    }
}

/// A release to be seeded into the catalog by an upstream stage.
#[derive(Debug, Clone)]
pub struct NewRelease {
    pub name: String,
    pub group_name: String,
    pub parts: Vec<ReleasePart>,
}

/// Raw row shape of the `releases` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReleaseRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) group_name: String,
    pub(crate) manifest: String,
    pub(crate) file_count: Option<i64>,
    pub(crate) file_size: Option<i64>,
    pub(crate) file_names: Option<String>,
    pub(crate) verdict: Option<String>,
}

impl TryFrom<ReleaseRow> for CatalogRecord {
    type Error = Error;
    fn try_from(row: ReleaseRow) -> Result<Self> {
        let parts: Vec<ReleasePart> =
            serde_json::from_str(&row.manifest).or_raise(|| ErrorKind::InvalidData("manifest"))?;
        let summary = match row.verdict {
            None => None,
            Some(verdict) => {
                let verdict = Verdict::try_from(verdict.as_str())?;
                // Summary columns are written together; a partial row means
                // someone else has been poking at the table.
                let (Some(count), Some(size), Some(names)) = (row.file_count, row.file_size, row.file_names)
                else {
                    exn::bail!(ErrorKind::InvalidData("summary"));
                };
                Some(ReleaseSummary {
                    count: u64::try_from(count).or_raise(|| ErrorKind::InvalidData("file count"))?,
                    size: u64::try_from(size).or_raise(|| ErrorKind::InvalidData("file size"))?,
                    names: serde_json::from_str(&names).or_raise(|| ErrorKind::InvalidData("file names"))?,
                    verdict,
                })
            }
        };
        Ok(Self {
            id: row.id,
            name: row.name,
            group_name: row.group_name,
            parts,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ReleaseRow {
        ReleaseRow {
            id: 7,
            name: "Some.Release-GRP".into(),
            group_name: "alt.binaries.test".into(),
            manifest: r#"[{"segments":["<a@ex>"]}]"#.into(),
            file_count: None,
            file_size: None,
            file_names: None,
            verdict: None,
        }
    }

    #[test]
    fn uninspected_row_has_no_summary() {
        let record = CatalogRecord::try_from(row()).unwrap();
        assert!(record.summary.is_none());
        assert_eq!(record.parts().len(), 1);
    }

    #[test]
    fn summarised_row_carries_all_fields() {
        let mut raw = row();
        raw.file_count = Some(2);
        raw.file_size = Some(940);
        raw.file_names = Some(r#"["movie.mkv","sample.rar"]"#.into());
        raw.verdict = Some("passworded".into());
        let record = CatalogRecord::try_from(raw).unwrap();
        let summary = record.summary.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.size, 940);
        assert_eq!(summary.names, ["movie.mkv", "sample.rar"]);
        assert_eq!(summary.verdict, Verdict::Passworded);
    }

    #[test]
    fn partial_summary_is_rejected() {
        let mut raw = row();
        raw.verdict = Some("clean".into());
        assert!(CatalogRecord::try_from(raw).is_err());
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        let mut raw = row();
        raw.manifest = "not json".into();
        assert!(CatalogRecord::try_from(raw).is_err());
    }
}
