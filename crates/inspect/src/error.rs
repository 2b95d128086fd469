//! Inspect Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An inspection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for inspection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// The batch driver treats every one of these as fatal for the current record
/// only: the record keeps its NULL verdict and is retried on a later run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The article source failed outright. An empty result is not an error;
    /// it is a skip.
    #[display("article fetch failed")]
    Fetch,
    #[display("unrar executable not found")]
    UnrarNotFound,
    /// The extraction tool exited abnormally. Negative when it was killed by
    /// a signal rather than exiting. Callers treat this as routine: a lone
    /// first volume of a multi-volume set always fails extraction.
    #[display("unrar exited with code {_0}")]
    ExtractionFailed(#[error(not(source))] i32),
    #[display("catalog operation failed")]
    Catalog,
    /// Unexpected filesystem trouble with the scratch file or directory.
    #[display("filesystem error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::Catalog)
    }
}
