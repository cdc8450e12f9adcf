//! Package registry access.
//!
//! Versions are listed through the GitHub CLI (`gh api`), which carries its
//! own authentication. Manifests are fetched directly over HTTPS with the
//! bearer token obtained by [`crate::credentials`].
//!
//! Candidate order is whatever order the registry returns; nothing here sorts.

mod manifest;
mod types;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

pub use types::{ArtifactCandidate, RegistryError};

use crate::consts::{
  ARTIFACT_GROUP, ARTIFACT_ID, DEFAULT_AUTH_TOOL, DEFAULT_HTTP_TIMEOUT, DEFAULT_REGISTRY_OWNER, DEFAULT_REGISTRY_URL,
};
use crate::process::{CommandRunner, argv};

/// Remote store of prebuilt artifacts.
pub trait Registry {
  /// Versions of `package_name` starting with `version_prefix`, in registry order.
  fn list_candidates(
    &self,
    package_name: &str,
    version_prefix: &str,
  ) -> impl Future<Output = Result<Vec<ArtifactCandidate>, RegistryError>> + Send;

  /// The patches fingerprint embedded in a candidate's manifest.
  fn fetch_fingerprint(
    &self,
    candidate: &ArtifactCandidate,
    token: &str,
  ) -> impl Future<Output = Result<String, RegistryError>> + Send;
}

/// Connection settings for [`GithubRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
  /// Maven repository root, e.g. `https://maven.pkg.github.com/Expensify/App`.
  pub base_url: String,
  /// Organization owning the packages.
  pub owner: String,
  pub tool: String,
  pub http_timeout: Duration,
}

impl Default for RegistrySettings {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_REGISTRY_URL.to_string(),
      owner: DEFAULT_REGISTRY_OWNER.to_string(),
      tool: DEFAULT_AUTH_TOOL.to_string(),
      http_timeout: DEFAULT_HTTP_TIMEOUT,
    }
  }
}

#[derive(Debug, Deserialize)]
struct PackageVersion {
  name: String,
}

/// GitHub Packages backed registry.
#[derive(Debug, Clone)]
pub struct GithubRegistry<R> {
  runner: R,
  http: reqwest::Client,
  settings: RegistrySettings,
}

impl<R: CommandRunner + Sync> GithubRegistry<R> {
  pub fn new(runner: R, settings: RegistrySettings) -> Result<Self, RegistryError> {
    let http = reqwest::Client::builder()
      .timeout(settings.http_timeout)
      .user_agent(concat!("prebuilt/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(RegistryError::Client)?;

    Ok(Self { runner, http, settings })
  }

  fn versions_command(&self, package_name: &str) -> Vec<String> {
    argv([
      self.settings.tool.clone(),
      "api".to_string(),
      versions_path(&self.settings.owner, package_name),
      "--jq".to_string(),
      "[.[] | {name: .name}]".to_string(),
    ])
  }
}

impl<R: CommandRunner + Sync> Registry for GithubRegistry<R> {
  async fn list_candidates(
    &self,
    package_name: &str,
    version_prefix: &str,
  ) -> Result<Vec<ArtifactCandidate>, RegistryError> {
    let output = self.runner.run(&self.versions_command(package_name)).await;
    if !output.success() {
      return Err(RegistryError::ListFailed {
        package: package_name.to_string(),
        code: output.exit_code,
        message: output.error_message(),
      });
    }

    let versions: Vec<PackageVersion> = serde_json::from_str(&output.stdout)
      .map_err(|e| RegistryError::malformed(format!("version listing for {}", package_name), e.to_string()))?;

    let candidates: Vec<ArtifactCandidate> = filter_versions(versions.into_iter().map(|v| v.name), version_prefix)
      .into_iter()
      .map(|version| ArtifactCandidate::new(package_name, version))
      .collect();

    info!(
      package = %package_name,
      prefix = %version_prefix,
      count = candidates.len(),
      "listed candidate artifacts"
    );
    Ok(candidates)
  }

  async fn fetch_fingerprint(&self, candidate: &ArtifactCandidate, token: &str) -> Result<String, RegistryError> {
    let url = manifest_url(&self.settings.base_url, candidate);
    debug!(url = %url, "fetching artifact manifest");

    let response = self
      .http
      .get(&url)
      .bearer_auth(token)
      .send()
      .await
      .map_err(|source| RegistryError::Request {
        url: url.clone(),
        source,
      })?;

    if !response.status().is_success() {
      return Err(RegistryError::Status {
        url,
        status: response.status().as_u16(),
      });
    }

    let body = response
      .text()
      .await
      .map_err(|source| RegistryError::Request { url, source })?;

    manifest::patches_hash(&body, &candidate.version)
  }
}

/// Keep versions that start with `prefix`, preserving their order.
pub fn filter_versions<I>(versions: I, prefix: &str) -> Vec<String>
where
  I: IntoIterator<Item = String>,
{
  versions.into_iter().filter(|v| v.starts_with(prefix)).collect()
}

/// REST path listing the versions of a package.
pub fn versions_path(owner: &str, package_name: &str) -> String {
  format!(
    "/orgs/{}/packages/maven/{}.{}.{}/versions?per_page=100",
    owner, ARTIFACT_GROUP, package_name, ARTIFACT_ID
  )
}

/// Location of a candidate's POM under the Maven repository root.
pub fn manifest_url(base_url: &str, candidate: &ArtifactCandidate) -> String {
  format!(
    "{}/{}/{}/{}/{}/{}-{}.pom",
    base_url.trim_end_matches('/'),
    ARTIFACT_GROUP.replace('.', "/"),
    candidate.package_name,
    ARTIFACT_ID,
    candidate.version,
    ARTIFACT_ID,
    candidate.version
  )
}
