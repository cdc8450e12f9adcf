//! Local patch fingerprinting.
//!
//! The fingerprint is computed by an external hash script over the patch
//! directories. The digest depends on the order the directories are passed,
//! so [`PatchDirs`] always yields the primary patch set before the secondary one.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::process::CommandRunner;

/// Digest summarizing the contents of a patch set.
///
/// Two fingerprints are equal when their trimmed string forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchFingerprint(String);

impl PatchFingerprint {
  pub fn new(value: impl AsRef<str>) -> Self {
    Self(value.as_ref().trim().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Exact comparison against a fingerprint read from somewhere else.
  pub fn matches(&self, other: &str) -> bool {
    self.0 == other.trim()
  }
}

impl fmt::Display for PatchFingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Errors that can occur while computing the local fingerprint.
#[derive(Debug, Error)]
pub enum FingerprintError {
  /// The hash script exited with a failure (or was killed).
  #[error("hash script '{script}' failed with exit code {code}: {message}")]
  ScriptFailed { script: String, code: i32, message: String },

  /// The hash script succeeded but printed nothing.
  #[error("hash script '{0}' produced no output")]
  EmptyOutput(String),
}

/// The patch directories to fingerprint, in their fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDirs {
  /// Patches applied to the upstream dependency by this repository.
  pub primary: PathBuf,
  /// Patches contributed by a vendored parent project, when there is one.
  pub secondary: Option<PathBuf>,
}

impl PatchDirs {
  pub fn new(primary: impl Into<PathBuf>) -> Self {
    Self {
      primary: primary.into(),
      secondary: None,
    }
  }

  pub fn with_secondary(mut self, secondary: impl Into<PathBuf>) -> Self {
    self.secondary = Some(secondary.into());
    self
  }

  /// Directories in the order they are handed to the hash script.
  pub fn ordered(&self) -> Vec<&Path> {
    std::iter::once(self.primary.as_path())
      .chain(self.secondary.as_deref())
      .collect()
  }
}

/// Source of the local patch fingerprint.
pub trait FingerprintSource {
  fn local_fingerprint(&self) -> impl Future<Output = Result<PatchFingerprint, FingerprintError>> + Send;
}

/// Computes the fingerprint by running a hash script over [`PatchDirs`].
///
/// Nothing is cached: every call runs the script again.
#[derive(Debug, Clone)]
pub struct ScriptFingerprintSource<R> {
  runner: R,
  script: PathBuf,
  dirs: PatchDirs,
}

impl<R: CommandRunner + Sync> ScriptFingerprintSource<R> {
  pub fn new(runner: R, script: impl Into<PathBuf>, dirs: PatchDirs) -> Self {
    Self {
      runner,
      script: script.into(),
      dirs,
    }
  }

  fn command(&self) -> Vec<String> {
    std::iter::once(self.script.as_path())
      .chain(self.dirs.ordered())
      .map(|p| p.to_string_lossy().into_owned())
      .collect()
  }
}

impl<R: CommandRunner + Sync> FingerprintSource for ScriptFingerprintSource<R> {
  async fn local_fingerprint(&self) -> Result<PatchFingerprint, FingerprintError> {
    let script = self.script.display().to_string();
    let argv = self.command();
    debug!(script = %script, dirs = ?self.dirs.ordered(), "computing local patch fingerprint");

    let output = self.runner.run(&argv).await;
    if !output.success() {
      return Err(FingerprintError::ScriptFailed {
        script,
        code: output.exit_code,
        message: output.error_message(),
      });
    }

    let fingerprint = PatchFingerprint::new(&output.stdout);
    if fingerprint.as_str().is_empty() {
      return Err(FingerprintError::EmptyOutput(script));
    }

    info!(fingerprint = %fingerprint, "local patch fingerprint");
    Ok(fingerprint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{ScriptedRunner, fail, ok};

  #[test]
  fn fingerprint_equality_ignores_surrounding_whitespace() {
    let fp = PatchFingerprint::new("  abc123\n");
    assert_eq!(fp.as_str(), "abc123");
    assert!(fp.matches("abc123\n"));
    assert!(!fp.matches("abc1234"));
    assert!(!fp.matches("ABC123"));
  }

  #[test]
  fn primary_dir_always_comes_first() {
    let dirs = PatchDirs::new("patches/react-native").with_secondary("vendor/patches/react-native");
    assert_eq!(
      dirs.ordered(),
      vec![Path::new("patches/react-native"), Path::new("vendor/patches/react-native")]
    );
  }

  #[tokio::test]
  async fn passes_directories_in_order_to_script() {
    let runner = ScriptedRunner::new().on("hash.sh primary secondary", ok("deadbeef"));
    let source = ScriptFingerprintSource::new(runner, "hash.sh", PatchDirs::new("primary").with_secondary("secondary"));

    let fp = source.local_fingerprint().await.unwrap();

    assert_eq!(fp.as_str(), "deadbeef");
  }

  #[tokio::test]
  async fn single_directory_is_supported() {
    let runner = ScriptedRunner::new().on("hash.sh primary", ok("cafe"));
    let source = ScriptFingerprintSource::new(runner, "hash.sh", PatchDirs::new("primary"));

    assert_eq!(source.local_fingerprint().await.unwrap().as_str(), "cafe");
  }

  #[tokio::test]
  async fn script_failure_is_an_error() {
    let runner = ScriptedRunner::new().on("hash.sh primary", fail(1, "no such directory"));
    let source = ScriptFingerprintSource::new(runner, "hash.sh", PatchDirs::new("primary"));

    let err = source.local_fingerprint().await.unwrap_err();

    assert!(matches!(err, FingerprintError::ScriptFailed { code: 1, .. }));
    assert!(err.to_string().contains("no such directory"));
  }

  #[tokio::test]
  async fn empty_output_is_an_error() {
    let runner = ScriptedRunner::new().on("hash.sh primary", ok("   "));
    let source = ScriptFingerprintSource::new(runner, "hash.sh", PatchDirs::new("primary"));

    assert!(matches!(
      source.local_fingerprint().await,
      Err(FingerprintError::EmptyOutput(_))
    ));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn runs_a_real_hash_script() {
    use std::os::unix::fs::PermissionsExt;

    use crate::process::ProcessRunner;

    let temp = tempfile::TempDir::new().unwrap();
    let script = temp.path().join("hash.sh");
    std::fs::write(&script, "#!/bin/sh\necho \"hash-of-$1\"\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let source = ScriptFingerprintSource::new(ProcessRunner::default(), &script, PatchDirs::new("patches"));

    assert_eq!(source.local_fingerprint().await.unwrap().as_str(), "hash-of-patches");
  }
}
