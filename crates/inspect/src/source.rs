//! The article-retrieval boundary.

use crate::error::Result;
use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use std::collections::HashMap;

/// Retrieves raw article bytes from a remote collection.
///
/// Implementations wrap whatever wire protocol the deployment uses; this
/// crate only cares about the bytes. A `None` result means "nothing could be
/// retrieved" and is a normal, recoverable outcome - callers skip the part
/// rather than failing the record.
// TODO: When `dyn async trait` stabilizes, migrate to native 2024 Edition async traits.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch and concatenate the raw bytes of `segments` within `group`,
    /// in the given order.
    async fn fetch(&self, group: &str, segments: &[String]) -> Result<Option<Vec<u8>>>;
}

/// In-memory article source for testing.
///
/// Articles are keyed by `(group, segment id)`. Missing segments are simply
/// skipped, which is how a real server behaves when a segment has expired
/// off the spool.
#[cfg(any(test, feature = "mock"))]
pub struct MockSource {
    articles: HashMap<(String, String), Vec<u8>>,
    fail: bool,
}

#[cfg(any(test, feature = "mock"))]
impl MockSource {
    /// Create a mock source pre-populated with articles.
    pub fn with_articles(
        articles: impl IntoIterator<Item = ((impl Into<String>, impl Into<String>), impl Into<Vec<u8>>)>,
    ) -> Self {
        let articles = articles
            .into_iter()
            .map(|((group, segment), data)| ((group.into(), segment.into()), data.into()))
            .collect();
        Self { articles, fail: false }
    }

    /// Create a mock source with nothing on the spool.
    pub fn empty() -> Self {
        Self { articles: HashMap::new(), fail: false }
    }

    /// Create a mock source whose every fetch fails outright, for testing
    /// the record-is-left-for-retry path.
    pub fn failing() -> Self {
        Self { articles: HashMap::new(), fail: true }
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl ArticleSource for MockSource {
    async fn fetch(&self, group: &str, segments: &[String]) -> Result<Option<Vec<u8>>> {
        if self.fail {
            exn::bail!(crate::error::ErrorKind::Fetch);
        }
        let mut data = Vec::new();
        for segment in segments {
            if let Some(article) = self.articles.get(&(group.to_string(), segment.clone())) {
                data.extend_from_slice(article);
            }
        }
        Ok(if data.is_empty() { None } else { Some(data) })
    }
}
