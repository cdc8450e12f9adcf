//! Flags that override [`ResolverConfig`] values.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use prebuilt_lib::{ConfigError, ResolverConfig};

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
  /// Always build from source, skipping the artifact search
  #[arg(long, global = true)]
  pub build_from_source: bool,

  /// Package whose prebuilt artifacts are searched
  #[arg(long, global = true)]
  pub package_name: Option<String>,

  /// Version prefix candidates must start with (default: read from package.json)
  #[arg(long, global = true)]
  pub required_version: Option<String>,

  /// Directory relative paths are resolved against
  #[arg(long, global = true)]
  pub project_root: Option<PathBuf>,

  /// Script printing the fingerprint of the patch directories
  #[arg(long, global = true)]
  pub hash_script: Option<PathBuf>,

  /// Primary patch directory
  #[arg(long, global = true)]
  pub patch_dir: Option<PathBuf>,

  /// Secondary patch directory, hashed after the primary one
  #[arg(long, global = true)]
  pub secondary_patch_dir: Option<PathBuf>,

  /// Maven repository root of the package registry
  #[arg(long, global = true)]
  pub registry_url: Option<String>,

  /// Authenticating CLI tool
  #[arg(long, global = true)]
  pub auth_tool: Option<String>,

  /// Timeout for external commands (e.g. "10s")
  #[arg(long, global = true, value_parser = humantime::parse_duration)]
  pub command_timeout: Option<Duration>,

  /// Timeout for registry HTTP requests (e.g. "30s")
  #[arg(long, global = true, value_parser = humantime::parse_duration)]
  pub http_timeout: Option<Duration>,
}

impl ConfigArgs {
  /// Environment-derived configuration with these flags applied on top.
  pub fn load(&self) -> Result<ResolverConfig, ConfigError> {
    Ok(self.apply(ResolverConfig::from_env()?))
  }

  pub fn apply(&self, mut config: ResolverConfig) -> ResolverConfig {
    config.build_from_source |= self.build_from_source;
    if let Some(v) = &self.package_name {
      config.package_name = v.clone();
    }
    if let Some(v) = &self.required_version {
      config.required_version = Some(v.clone());
    }
    if let Some(v) = &self.project_root {
      config.project_root = v.clone();
    }
    if let Some(v) = &self.hash_script {
      config.hash_script = v.clone();
    }
    if let Some(v) = &self.patch_dir {
      config.patch_dir = v.clone();
    }
    if let Some(v) = &self.secondary_patch_dir {
      config.secondary_patch_dir = Some(v.clone());
    }
    if let Some(v) = &self.registry_url {
      config.registry_url = v.clone();
    }
    if let Some(v) = &self.auth_tool {
      config.auth_tool = v.clone();
    }
    if let Some(v) = self.command_timeout {
      config.command_timeout = v;
    }
    if let Some(v) = self.http_timeout {
      config.http_timeout = v;
    }
    config
  }
}
