//! SQLite catalog of releases and their password verdicts.
//!
//! This crate persists the one piece of state the password-check stage is
//! allowed to mutate: per-release summary fields (file count, total size,
//! file names, verdict). Releases themselves are seeded by earlier pipeline
//! stages along with their manifests; a `NULL` verdict marks a record as
//! not yet inspected.
//!
//! # Architecture
//! - [`Database`] owns the connection pool, PRAGMAs and embedded migrations.
//! - [`Repository`] is the query surface: select uninspected records,
//!   persist a summary atomically, and run the policy deletion pass.
//! - `models` holds the persisted shapes, most importantly the closed
//!   [`models::Verdict`] tri-state whose `upgrade` method enforces that a
//!   verdict never moves away from `passworded`.

mod db;
pub mod error;
pub mod models;
mod repo;

pub use crate::db::Database;
pub use crate::repo::Repository;
