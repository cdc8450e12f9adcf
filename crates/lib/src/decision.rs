//! Entry point used by the build: configuration in, decision out.

use tracing::{info, warn};

use crate::config::ResolverConfig;
use crate::resolver::ArtifactResolver;
use crate::types::{FallbackReason, ResolutionResult};

/// Decide whether the build can use a prebuilt artifact.
///
/// Never fails. Every problem, including configuration problems, turns into
/// a source build with a reason attached.
pub async fn decide(config: &ResolverConfig) -> ResolutionResult {
  if config.build_from_source {
    info!(package = %config.package_name, "prebuilt artifacts disabled, building from source");
    return ResolutionResult::from_source(FallbackReason::ForcedBySetting);
  }

  let required_version = match config.required_version() {
    Ok(version) => version,
    Err(e) => {
      warn!(package = %config.package_name, error = %e, "could not determine required version");
      return ResolutionResult::from_source(FallbackReason::Configuration(e.to_string()));
    }
  };

  let registry = match config.registry() {
    Ok(registry) => registry,
    Err(e) => {
      warn!(package = %config.package_name, error = %e, "could not set up registry client");
      return ResolutionResult::from_source(FallbackReason::Registry(e.to_string()));
    }
  };

  ArtifactResolver::new(
    config.fingerprint_source(),
    config.credential_provider(),
    registry,
    required_version,
  )
  .resolve(&config.package_name)
  .await
}
