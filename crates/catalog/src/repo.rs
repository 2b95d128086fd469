//! Repository for release records.
//!
//! The password-check stage owns exactly four columns of the `releases`
//! table (the summary fields); everything else is written by upstream
//! stages and read-only here. Each record's summary update is one UPDATE
//! statement, so the all-set-or-all-unset invariant holds without a
//! transaction.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{CatalogRecord, NewRelease, ReleaseRow, ReleaseSummary, Verdict};
use exn::ResultExt;
use sqlx::SqlitePool;

/// Repository for managing release entries in the catalog database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Seed a release handed down by an upstream stage.
    ///
    /// Returns the new record's identifier. The summary fields start unset,
    /// which is what marks the record as "not yet inspected".
    pub async fn insert(&self, release: &NewRelease) -> Result<i64> {
        let manifest = serde_json::to_string(&release.parts).or_raise(|| ErrorKind::InvalidData("manifest"))?;
        let id: i64 = sqlx::query_scalar(include_str!("../queries/insert_release.sql"))
            .bind(&release.name)
            .bind(&release.group_name)
            .bind(manifest)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(id)
    }

    /// Fetch up to `limit` records whose verdict has never been set, in
    /// ascending id order.
    ///
    /// Records with any verdict at all - including the terminal `unknown` -
    /// are never returned, which is what makes the batch driver idempotent.
    pub async fn find_uninspected(&self, limit: u32) -> Result<Vec<CatalogRecord>> {
        let rows: Vec<ReleaseRow> = sqlx::query_as(include_str!("../queries/find_uninspected.sql"))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a single record by identifier.
    pub async fn get(&self, id: i64) -> Result<Option<CatalogRecord>> {
        let row: Option<ReleaseRow> = sqlx::query_as(include_str!("../queries/get_by_id.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(TryInto::try_into).transpose()
    }

    /// Persist an inspection summary for a record.
    ///
    /// All four summary fields are set in one statement.
    pub async fn update_summary(&self, id: i64, summary: &ReleaseSummary) -> Result<()> {
        let names = serde_json::to_string(&summary.names).or_raise(|| ErrorKind::InvalidData("file names"))?;
        let count = i64::try_from(summary.count).or_raise(|| ErrorKind::InvalidData("file count"))?;
        let size = i64::try_from(summary.size).or_raise(|| ErrorKind::InvalidData("file size"))?;
        sqlx::query(include_str!("../queries/update_summary.sql"))
            .bind(count)
            .bind(size)
            .bind(names)
            .bind(summary.verdict.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(id, verdict = %summary.verdict, files = summary.count, "summary persisted");
        Ok(())
    }

    /// Delete every record carrying one of the given verdicts.
    ///
    /// Returns the number of records removed.
    pub async fn delete_with_verdict(&self, verdicts: &[Verdict]) -> Result<u64> {
        let mut removed = 0;
        for verdict in verdicts {
            let result = sqlx::query(include_str!("../queries/delete_by_verdict.sql"))
                .bind(verdict.as_str())
                .execute(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }

    /// Total number of records in the catalog.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_releases.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(count.unsigned_abs())
    }
}
