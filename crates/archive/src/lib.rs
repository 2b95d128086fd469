//! RAR header inspection for password classification.
//!
//! This crate answers one question about a byte buffer: is it a RAR archive,
//! and if so, can its contents be listed without a password? It walks RAR4
//! (1.5-4.x) and RAR5 (5.0+) block headers directly and never decompresses
//! anything - extraction is someone else's job (an external unrar binary,
//! driven by the inspect crate).
//!
//! Classification is pure over the input bytes: no network, no disk writes.
//! Truncated archives are routine (most fetched parts are the first volume
//! of a multi-volume set), so the walkers stop quietly at the end of the
//! buffer and report whatever entries they saw up to that point.

mod classify;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod rar4;
mod rar5;

pub use crate::classify::{Entry, Listing, classify};
