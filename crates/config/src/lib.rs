//! Configuration loading for the password-check stage.
//!
//! Sources are merged in increasing precedence: built-in defaults, an
//! optional TOML file, then `RARVET_`-prefixed environment variables. The
//! stage itself never installs logging or parses command-line arguments;
//! whatever drives it is expected to do that.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `RARVET_BATCH_LIMIT=50`.
const ENV_PREFIX: &str = "RARVET_";

/// Settings for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the catalog database file.
    pub database_path: PathBuf,
    /// Maximum number of uninspected releases to process per run.
    pub batch_limit: u32,
    /// Explicit path to the unrar executable. When unset, the binary is
    /// discovered on `PATH`.
    pub unrar_path: Option<PathBuf>,
    /// Delete releases with a confirmed `passworded` verdict after the batch.
    pub delete_passworded: bool,
    /// Additionally delete `potentially` passworded releases. Only consulted
    /// when [`delete_passworded`](Self::delete_passworded) is enabled.
    pub delete_potentially_passworded: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            batch_limit: 20,
            unrar_path: None,
            delete_passworded: false,
            delete_potentially_passworded: false,
        }
    }
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "rarvet")
        .map(|dirs| dirs.data_dir().join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("rarvet-catalog.db"))
}

impl Config {
    /// Load configuration from the default file location (if it exists) and
    /// the environment.
    pub fn load() -> Result<Self> {
        let file = directories::ProjectDirs::from("", "", "rarvet").map(|dirs| dirs.config_dir().join("rarvet.toml"));
        match file {
            Some(path) if path.is_file() => Self::load_from(path),
            _ => Self::figment(None).extract().or_raise(|| ErrorKind::Load).and_then(Self::validated),
        }
    }

    /// Load configuration from a specific TOML file and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::figment(Some(path.as_ref())).extract().or_raise(|| ErrorKind::Load).and_then(Self::validated)
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn validated(self) -> Result<Self> {
        if self.batch_limit == 0 {
            exn::bail!(ErrorKind::Invalid("batch_limit must be at least 1"));
        }
        if self.delete_potentially_passworded && !self.delete_passworded {
            // Not an error: the policy pass only runs when delete_passworded
            // is enabled, matching how the flags have always nested.
            tracing::warn!("delete_potentially_passworded has no effect without delete_passworded");
        }
        Ok(self)
    }
}
