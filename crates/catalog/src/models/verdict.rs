use crate::error::{Error, ErrorKind};
use derive_more::Display;

/// The password classification attached to a release.
///
/// `Clean`, `Potentially` and `Passworded` are the inspection tri-state;
/// within one inspection run a verdict only ever moves towards `Passworded`
/// (see [`upgrade`](Self::upgrade)). `Unknown` is a terminal marker written
/// by the batch driver for releases that could not be inspected at all, so
/// they are never selected again.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    #[display("clean")]
    Clean,
    /// Heuristic signal only: the file names look like an intentionally
    /// passworded release, but no encryption flag was observed.
    #[display("potentially")]
    Potentially,
    /// Confirmed: container- or entry-level encryption, or the strict
    /// filename hint.
    #[display("passworded")]
    Passworded,
    /// Terminal "could not inspect" marker; excluded from future batches.
    #[display("unknown")]
    Unknown,
}

impl Verdict {
    /// The TEXT value stored in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Potentially => "potentially",
            Self::Passworded => "passworded",
            Self::Unknown => "unknown",
        }
    }

    /// Position on the clean -> potentially -> passworded ladder.
    ///
    /// `Unknown` sits at the bottom: it is not an inspection outcome and
    /// must never displace one.
    fn rank(self) -> u8 {
        match self {
            Self::Clean | Self::Unknown => 0,
            Self::Potentially => 1,
            Self::Passworded => 2,
        }
    }

    /// Move the verdict up the ladder, never down.
    #[must_use]
    pub fn upgrade(self, to: Self) -> Self {
        if to.rank() > self.rank() { to } else { self }
    }
}

impl TryFrom<&str> for Verdict {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "clean" => Ok(Self::Clean),
            "potentially" => Ok(Self::Potentially),
            "passworded" => Ok(Self::Passworded),
            "unknown" => Ok(Self::Unknown),
            _ => exn::bail!(ErrorKind::InvalidData("verdict")),
        }
    }
}
