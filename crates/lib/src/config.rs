//! Resolver configuration.
//!
//! Values come from [`ResolverConfig::default`], then `PREBUILT_*` environment
//! variables, then whatever the caller overrides (the CLI applies its flags
//! last). Relative paths are resolved against `project_root`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::consts::{
  DEFAULT_AUTH_TOOL, DEFAULT_COMMAND_TIMEOUT, DEFAULT_HASH_SCRIPT, DEFAULT_HTTP_TIMEOUT, DEFAULT_PACKAGE_JSON,
  DEFAULT_PACKAGE_NAME, DEFAULT_PATCH_DIR, DEFAULT_REGISTRY_OWNER, DEFAULT_REGISTRY_URL, ENV_PREFIX,
};
use crate::credentials::GhCredentialProvider;
use crate::fingerprint::{PatchDirs, ScriptFingerprintSource};
use crate::process::ProcessRunner;
use crate::registry::{GithubRegistry, RegistryError, RegistrySettings};
use crate::version::{VersionError, read_package_version};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid boolean for {var}: '{value}' (expected 1/0, true/false, yes/no, on/off)")]
  InvalidBool { var: String, value: String },

  #[error("invalid duration for {var}: '{value}': {source}")]
  InvalidDuration {
    var: String,
    value: String,
    #[source]
    source: humantime::DurationError,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
  /// Skip resolution entirely and always build from source.
  pub build_from_source: bool,
  pub package_name: String,
  /// Version prefix candidates must match. Read from `package_json` when unset.
  pub required_version: Option<String>,
  pub package_json: PathBuf,
  pub project_root: PathBuf,
  pub hash_script: PathBuf,
  pub patch_dir: PathBuf,
  pub secondary_patch_dir: Option<PathBuf>,
  pub registry_url: String,
  pub registry_owner: String,
  pub auth_tool: String,
  pub command_timeout: Duration,
  pub http_timeout: Duration,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      build_from_source: false,
      package_name: DEFAULT_PACKAGE_NAME.to_string(),
      required_version: None,
      package_json: PathBuf::from(DEFAULT_PACKAGE_JSON),
      project_root: PathBuf::from("."),
      hash_script: PathBuf::from(DEFAULT_HASH_SCRIPT),
      patch_dir: PathBuf::from(DEFAULT_PATCH_DIR),
      secondary_patch_dir: None,
      registry_url: DEFAULT_REGISTRY_URL.to_string(),
      registry_owner: DEFAULT_REGISTRY_OWNER.to_string(),
      auth_tool: DEFAULT_AUTH_TOOL.to_string(),
      command_timeout: DEFAULT_COMMAND_TIMEOUT,
      http_timeout: DEFAULT_HTTP_TIMEOUT,
    }
  }
}

impl ResolverConfig {
  /// Defaults overlaid with the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::default().with_env()
  }

  pub fn with_env(mut self) -> Result<Self, ConfigError> {
    if let Some(value) = env_var("BUILD_FROM_SOURCE") {
      self.build_from_source = parse_bool("BUILD_FROM_SOURCE", &value)?;
    }
    if let Some(value) = env_var("PACKAGE_NAME") {
      self.package_name = value;
    }
    if let Some(value) = env_var("REQUIRED_VERSION") {
      self.required_version = Some(value);
    }
    if let Some(value) = env_var("PACKAGE_JSON") {
      self.package_json = PathBuf::from(value);
    }
    if let Some(value) = env_var("PROJECT_ROOT") {
      self.project_root = PathBuf::from(value);
    }
    if let Some(value) = env_var("HASH_SCRIPT") {
      self.hash_script = PathBuf::from(value);
    }
    if let Some(value) = env_var("PATCH_DIR") {
      self.patch_dir = PathBuf::from(value);
    }
    if let Some(value) = env_var("SECONDARY_PATCH_DIR") {
      self.secondary_patch_dir = Some(PathBuf::from(value));
    }
    if let Some(value) = env_var("REGISTRY_URL") {
      self.registry_url = value;
    }
    if let Some(value) = env_var("REGISTRY_OWNER") {
      self.registry_owner = value;
    }
    if let Some(value) = env_var("AUTH_TOOL") {
      self.auth_tool = value;
    }
    if let Some(value) = env_var("COMMAND_TIMEOUT") {
      self.command_timeout = parse_duration("COMMAND_TIMEOUT", &value)?;
    }
    if let Some(value) = env_var("HTTP_TIMEOUT") {
      self.http_timeout = parse_duration("HTTP_TIMEOUT", &value)?;
    }
    Ok(self)
  }

  /// `path` joined onto the project root, unless it is already absolute.
  pub fn resolve_path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      return path.to_path_buf();
    }
    let root = dunce::canonicalize(&self.project_root).unwrap_or_else(|_| self.project_root.clone());
    root.join(path)
  }

  /// The version prefix candidates must start with.
  pub fn required_version(&self) -> Result<String, VersionError> {
    match self.required_version.as_deref().map(str::trim) {
      Some(version) if !version.is_empty() => Ok(version.to_string()),
      _ => read_package_version(&self.resolve_path(&self.package_json)),
    }
  }

  pub fn patch_dirs(&self) -> PatchDirs {
    let dirs = PatchDirs::new(self.resolve_path(&self.patch_dir));
    match &self.secondary_patch_dir {
      Some(secondary) => dirs.with_secondary(self.resolve_path(secondary)),
      None => dirs,
    }
  }

  pub fn registry_settings(&self) -> RegistrySettings {
    RegistrySettings {
      base_url: self.registry_url.clone(),
      owner: self.registry_owner.clone(),
      tool: self.auth_tool.clone(),
      http_timeout: self.http_timeout,
    }
  }

  pub fn runner(&self) -> ProcessRunner {
    ProcessRunner::new(self.command_timeout)
  }

  pub fn fingerprint_source(&self) -> ScriptFingerprintSource<ProcessRunner> {
    ScriptFingerprintSource::new(self.runner(), self.resolve_path(&self.hash_script), self.patch_dirs())
  }

  pub fn credential_provider(&self) -> GhCredentialProvider<ProcessRunner> {
    GhCredentialProvider::with_tool(self.runner(), &self.auth_tool)
  }

  pub fn registry(&self) -> Result<GithubRegistry<ProcessRunner>, RegistryError> {
    GithubRegistry::new(self.runner(), self.registry_settings())
  }
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(format!("{}{}", ENV_PREFIX, name))
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ConfigError::InvalidBool {
      var: format!("{}{}", ENV_PREFIX, name),
      value: value.to_string(),
    }),
  }
}

fn parse_duration(name: &str, value: &str) -> Result<Duration, ConfigError> {
  humantime::parse_duration(value).map_err(|source| ConfigError::InvalidDuration {
    var: format!("{}{}", ENV_PREFIX, name),
    value: value.to_string(),
    source,
  })
}
