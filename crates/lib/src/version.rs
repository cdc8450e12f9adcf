//! Reading the locally required dependency version.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("{0} has no version field")]
  MissingVersion(PathBuf),
}

#[derive(Debug, Deserialize)]
struct PackageJson {
  #[serde(default)]
  version: Option<String>,
}

/// The `version` field of a `package.json` file.
pub fn read_package_version(path: &Path) -> Result<String, VersionError> {
  let content = std::fs::read_to_string(path).map_err(|source| VersionError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let package: PackageJson = serde_json::from_str(&content).map_err(|source| VersionError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  package
    .version
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| VersionError::MissingVersion(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("package.json");
    std::fs::write(&path, content).unwrap();
    (temp, path)
  }

  #[test]
  fn reads_version_field() {
    let (_temp, path) = write(r#"{"name":"react-native","version":"0.75.1","main":"index.js"}"#);

    assert_eq!(read_package_version(&path).unwrap(), "0.75.1");
  }

  #[test]
  fn missing_file_is_read_error() {
    let temp = TempDir::new().unwrap();

    assert!(matches!(
      read_package_version(&temp.path().join("package.json")),
      Err(VersionError::Read { .. })
    ));
  }

  #[test]
  fn missing_version_field() {
    let (_temp, path) = write(r#"{"name":"react-native"}"#);

    assert!(matches!(read_package_version(&path), Err(VersionError::MissingVersion(_))));
  }

  #[test]
  fn invalid_json() {
    let (_temp, path) = write("not json");

    assert!(matches!(read_package_version(&path), Err(VersionError::Parse { .. })));
  }
}
