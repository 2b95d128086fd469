//! External extraction tool invocation.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Handle to an unrar executable.
///
/// Extraction is strictly a black box: archive path in, files on disk out.
/// Header parsing and password classification never go through here - the
/// binary only exists to surface the *inner* files of an outer archive for
/// a second round of classification.
#[derive(Debug, Clone)]
pub struct Unrar {
    path: PathBuf,
}

impl Unrar {
    /// Find an unrar executable on `PATH`.
    pub fn discover() -> Result<Self> {
        let executables = ["unrar", "unrar-nonfree", "rar"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::trace!(unrar = %path.display(), "discovered extraction tool");
                return Ok(Self { path });
            }
        }
        exn::bail!(ErrorKind::UnrarNotFound);
    }

    /// Use the executable at an explicitly configured path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Extract `archive` flat into `dest`.
    ///
    /// Flags: extract without paths (`e -ep`), process all files and
    /// attributes (`-ai -r`), keep broken extracted files (`-kb`, partial
    /// volumes leave partial files and that is fine), never prompt and
    /// never wait on a password (`-p- -y -id -inul`), no comments (`-c-`).
    ///
    /// A non-zero exit is reported as [`ErrorKind::ExtractionFailed`] and is
    /// non-fatal to every caller in this crate: the first volume of a
    /// multi-volume archive always fails this way.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let output = Command::new(&self.path)
            .args(["e", "-ai", "-ep", "-r", "-kb", "-c-", "-id", "-p-", "-y", "-inul"])
            .arg(archive)
            .arg(dest)
            .output()
            .or_raise(|| ErrorKind::Io)?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            tracing::debug!(
                code,
                output = %String::from_utf8_lossy(&output.stderr),
                "extraction tool reported failure"
            );
            exn::bail!(ErrorKind::ExtractionFailed(code));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        // `true` ignores its arguments and exits 0.
        let unrar = Unrar::at("true");
        assert!(unrar.extract(Path::new("in.rar"), Path::new("/tmp")).is_ok());
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let unrar = Unrar::at("false");
        assert!(unrar.extract(Path::new("in.rar"), Path::new("/tmp")).is_err());
    }

    #[test]
    fn missing_binary_is_an_error() {
        let unrar = Unrar::at("this-binary-does-not-exist-anywhere");
        assert!(unrar.extract(Path::new("in.rar"), Path::new("/tmp")).is_err());
    }
}
