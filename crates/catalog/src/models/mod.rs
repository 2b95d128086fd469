mod manifest;
mod release;
mod summary;
mod verdict;

pub use self::manifest::ReleasePart;
pub use self::release::{CatalogRecord, NewRelease};
pub(crate) use self::release::ReleaseRow;
pub use self::summary::ReleaseSummary;
pub use self::verdict::Verdict;
