//! Types shared by registry implementations.

use thiserror::Error;

/// A prebuilt artifact version that is a candidate for reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
  pub version: String,
  pub package_name: String,
}

impl ArtifactCandidate {
  pub fn new(package_name: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      package_name: package_name.into(),
    }
  }
}

/// Errors that can occur while talking to the package registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// Listing versions through the CLI tool failed.
  #[error("failed to list versions of '{package}' (exit code {code}): {message}")]
  ListFailed {
    package: String,
    code: i32,
    message: String,
  },

  /// The HTTP client could not be constructed.
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  /// The manifest request failed before a response arrived.
  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The registry answered with a non-success status.
  #[error("request to {url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  /// A response did not have the expected shape.
  #[error("malformed {what}: {message}")]
  MalformedResponse { what: String, message: String },
}

impl RegistryError {
  pub fn malformed(what: impl Into<String>, message: impl Into<String>) -> Self {
    RegistryError::MalformedResponse {
      what: what.into(),
      message: message.into(),
    }
  }
}
