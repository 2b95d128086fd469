//! The batch driver: pull uninspected releases, classify, persist, clean up.

use crate::error::{ErrorKind, Result};
use crate::release::inspect_release;
use crate::source::ArticleSource;
use crate::unrar::Unrar;
use exn::ResultExt;
use rarvet_catalog::Repository;
use rarvet_catalog::models::{CatalogRecord, ReleaseSummary, Verdict};
use rarvet_config::Config;
use tracing::instrument;

/// One batch run over the catalog.
///
/// Strictly sequential: each release is fully fetched, classified, extracted
/// and persisted before the next one starts. A failure inside one release is
/// logged and the record is left with its NULL verdict, so the next run
/// picks it up again; nothing short of a catalog outage stops the batch.
pub struct Batch<'a> {
    source: &'a dyn ArticleSource,
    repo: &'a Repository,
    unrar: Unrar,
    config: &'a Config,
}

impl<'a> Batch<'a> {
    /// Assemble a batch from its collaborators.
    ///
    /// The extraction tool comes from the configured path when one is set,
    /// otherwise from `PATH` discovery - failing here, before any record is
    /// touched, beats failing once per release.
    pub fn new(source: &'a dyn ArticleSource, repo: &'a Repository, config: &'a Config) -> Result<Self> {
        let unrar = match &config.unrar_path {
            Some(path) => Unrar::at(path),
            None => Unrar::discover()?,
        };
        Ok(Self { source, repo, unrar, config })
    }

    /// Process up to the configured limit of uninspected releases, then run
    /// the policy deletion pass.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<()> {
        tracing::info!("checking for passworded releases");
        let records = self
            .repo
            .find_uninspected(self.config.batch_limit)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        for record in records {
            if let Err(error) = self.process(&record).await {
                // The record keeps its NULL verdict and stays eligible for
                // the next run; a terminal summary would bury it forever.
                tracing::warn!(id = record.id, name = %record.name, %error, "inspection failed; leaving record for retry");
            }
        }
        self.apply_deletion_policy().await
    }

    async fn process(&self, record: &CatalogRecord) -> Result<()> {
        tracing::debug!(name = %record.name, "processing release");
        if record.parts().is_empty() {
            tracing::debug!(name = %record.name, "no archive parts in release; blacklisting");
            return self
                .repo
                .update_summary(record.id, &ReleaseSummary::unknown())
                .await
                .or_raise(|| ErrorKind::Catalog);
        }
        let summary = match inspect_release(self.source, &self.unrar, &record.group_name, record.parts()).await? {
            Some(summary) => {
                tracing::info!(name = %record.name, verdict = %summary.verdict, "adding file data to release");
                summary
            }
            // No part was usable; blacklist rather than retry forever.
            None => ReleaseSummary::unknown(),
        };
        self.repo.update_summary(record.id, &summary).await.or_raise(|| ErrorKind::Catalog)
    }

    async fn apply_deletion_policy(&self) -> Result<()> {
        if !self.config.delete_passworded {
            return Ok(());
        }
        tracing::info!("deleting passworded releases");
        let mut verdicts = vec![Verdict::Passworded];
        if self.config.delete_potentially_passworded {
            verdicts.push(Verdict::Potentially);
        }
        let removed = self.repo.delete_with_verdict(&verdicts).await.or_raise(|| ErrorKind::Catalog)?;
        tracing::info!(removed, "passworded releases deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use rarvet_archive::fixtures;
    use rarvet_catalog::Database;
    use rarvet_catalog::models::{NewRelease, ReleasePart};

    const GROUP: &str = "alt.binaries.test";

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    fn config() -> Config {
        let mut config = Config::default();
        // `true` exits 0 and extracts nothing, which is all these tests need.
        config.unrar_path = Some("true".into());
        config
    }

    fn release(name: &str, parts: Vec<ReleasePart>) -> NewRelease {
        NewRelease { name: name.to_string(), group_name: GROUP.to_string(), parts }
    }

    #[tokio::test]
    async fn releases_without_parts_are_blacklisted() {
        let repo = repo().await;
        let config = config();
        let id = repo.insert(&release("A", Vec::new())).await.unwrap();

        Batch::new(&MockSource::empty(), &repo, &config).unwrap().run().await.unwrap();

        let record = repo.get(id).await.unwrap().unwrap();
        assert_eq!(record.summary, Some(ReleaseSummary::unknown()));
    }

    #[tokio::test]
    async fn unusable_releases_are_blacklisted() {
        let repo = repo().await;
        let config = config();
        // A manifest exists, but nothing is on the spool.
        let id = repo.insert(&release("A", vec![ReleasePart::new(["<1@ex>"])])).await.unwrap();

        Batch::new(&MockSource::empty(), &repo, &config).unwrap().run().await.unwrap();

        let record = repo.get(id).await.unwrap().unwrap();
        assert_eq!(record.summary, Some(ReleaseSummary::unknown()));
    }

    #[tokio::test]
    async fn inspected_summaries_are_persisted() {
        let repo = repo().await;
        let config = config();
        let id = repo.insert(&release("A", vec![ReleasePart::new(["<1@ex>"])])).await.unwrap();
        let data = fixtures::simple(&[("movie.mkv", 900, b"aa"), ("notes.nfo", 40, b"bb")]);
        let source = MockSource::with_articles([((GROUP, "<1@ex>"), data)]);

        Batch::new(&source, &repo, &config).unwrap().run().await.unwrap();

        let summary = repo.get(id).await.unwrap().unwrap().summary.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.size, 940);
        assert_eq!(summary.names, ["movie.mkv", "notes.nfo"]);
        assert_eq!(summary.verdict, Verdict::Clean);
    }

    #[tokio::test]
    async fn a_failing_record_does_not_stop_the_batch() {
        let repo = repo().await;
        let config = config();
        let failing = repo.insert(&release("A", vec![ReleasePart::new(["<1@ex>"])])).await.unwrap();
        let fine = repo.insert(&release("B", Vec::new())).await.unwrap();

        Batch::new(&MockSource::failing(), &repo, &config).unwrap().run().await.unwrap();

        // The failed record keeps its NULL verdict for a retry...
        assert!(repo.get(failing).await.unwrap().unwrap().summary.is_none());
        // ...while the rest of the batch still ran.
        assert!(repo.get(fine).await.unwrap().unwrap().summary.is_some());
    }

    #[tokio::test]
    async fn reruns_select_nothing_new() {
        let repo = repo().await;
        let config = config();
        repo.insert(&release("A", Vec::new())).await.unwrap();

        let source = MockSource::empty();
        Batch::new(&source, &repo, &config).unwrap().run().await.unwrap();
        assert!(repo.find_uninspected(10).await.unwrap().is_empty());
        // A second run has nothing to do and changes nothing.
        Batch::new(&source, &repo, &config).unwrap().run().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deletion_policy_removes_only_confirmed_by_default() {
        let repo = repo().await;
        let mut config = config();
        config.delete_passworded = true;

        let confirmed = repo.insert(&release("A", Vec::new())).await.unwrap();
        let suspected = repo.insert(&release("B", Vec::new())).await.unwrap();
        repo.update_summary(confirmed, &ReleaseSummary::passworded()).await.unwrap();
        let mut maybe = ReleaseSummary::passworded();
        maybe.verdict = Verdict::Potentially;
        repo.update_summary(suspected, &maybe).await.unwrap();

        Batch::new(&MockSource::empty(), &repo, &config).unwrap().run().await.unwrap();

        assert!(repo.get(confirmed).await.unwrap().is_none());
        assert!(repo.get(suspected).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deletion_policy_can_include_suspected() {
        let repo = repo().await;
        let mut config = config();
        config.delete_passworded = true;
        config.delete_potentially_passworded = true;

        let confirmed = repo.insert(&release("A", Vec::new())).await.unwrap();
        let suspected = repo.insert(&release("B", Vec::new())).await.unwrap();
        repo.update_summary(confirmed, &ReleaseSummary::passworded()).await.unwrap();
        let mut maybe = ReleaseSummary::passworded();
        maybe.verdict = Verdict::Potentially;
        repo.update_summary(suspected, &maybe).await.unwrap();

        Batch::new(&MockSource::empty(), &repo, &config).unwrap().run().await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn batch_limit_is_honoured() {
        let repo = repo().await;
        let mut config = config();
        config.batch_limit = 1;
        repo.insert(&release("A", Vec::new())).await.unwrap();
        repo.insert(&release("B", Vec::new())).await.unwrap();

        Batch::new(&MockSource::empty(), &repo, &config).unwrap().run().await.unwrap();

        assert_eq!(repo.find_uninspected(10).await.unwrap().len(), 1);
    }
}
