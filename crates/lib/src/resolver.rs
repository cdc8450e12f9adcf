//! Artifact resolution.
//!
//! A single sequential pass: fingerprint the local patches, acquire
//! credentials, list candidates, then probe candidates in registry order until
//! one carries the same fingerprint. The first match wins; later candidates are
//! never fetched. Any failure along the way degrades to a source build.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::credentials::CredentialProvider;
use crate::fingerprint::{FingerprintError, FingerprintSource};
use crate::registry::{Registry, RegistryError};
use crate::types::{FallbackReason, ResolutionResult};

#[derive(Debug, Error)]
enum SearchError {
  #[error(transparent)]
  Fingerprint(#[from] FingerprintError),
  #[error(transparent)]
  Registry(#[from] RegistryError),
}

impl From<SearchError> for FallbackReason {
  fn from(err: SearchError) -> Self {
    match err {
      SearchError::Fingerprint(e) => FallbackReason::Fingerprint(e.to_string()),
      SearchError::Registry(e) => FallbackReason::Registry(e.to_string()),
    }
  }
}

/// Decides whether a prebuilt artifact built from the local patches exists.
#[derive(Debug)]
pub struct ArtifactResolver<F, C, R> {
  fingerprints: F,
  credentials: C,
  registry: R,
  required_version: String,
}

impl<F, C, R> ArtifactResolver<F, C, R>
where
  F: FingerprintSource,
  C: CredentialProvider,
  R: Registry,
{
  /// `required_version` is the prefix every candidate version must start with.
  pub fn new(fingerprints: F, credentials: C, registry: R, required_version: impl Into<String>) -> Self {
    Self {
      fingerprints,
      credentials,
      registry,
      required_version: required_version.into(),
    }
  }

  /// Resolve `package_name`. Never fails; errors become a source build.
  pub async fn resolve(&self, package_name: &str) -> ResolutionResult {
    info!(package = %package_name, version = %self.required_version, "resolving prebuilt artifact");

    let result = match self.search(package_name).await {
      Ok(result) => result,
      Err(e) => {
        warn!(package = %package_name, error = %e, "artifact search failed, building from source");
        ResolutionResult::from_source(e.into())
      }
    };

    match &result.reason {
      Some(reason) => info!(package = %package_name, kind = ?reason.kind(), "building from source: {}", reason),
      None => info!(
        package = %package_name,
        version = result.version.as_deref().unwrap_or_default(),
        "using prebuilt artifact"
      ),
    }
    result
  }

  async fn search(&self, package_name: &str) -> Result<ResolutionResult, SearchError> {
    let local = self.fingerprints.local_fingerprint().await?;

    let credentials = match self.credentials.acquire().await {
      Ok(credentials) => credentials,
      Err(reason) => return Ok(ResolutionResult::from_source(FallbackReason::CredentialsUnavailable(reason))),
    };

    let candidates = self
      .registry
      .list_candidates(package_name, &self.required_version)
      .await?;

    for candidate in &candidates {
      let remote = self.registry.fetch_fingerprint(candidate, &credentials.token).await?;
      if local.matches(&remote) {
        return Ok(ResolutionResult::prebuilt(candidate.clone(), credentials));
      }
      debug!(version = %candidate.version, remote = %remote, local = %local, "fingerprint mismatch");
    }

    Ok(ResolutionResult::from_source(FallbackReason::NoMatch {
      prefix: self.required_version.clone(),
      candidates: candidates.len(),
    }))
  }
}
