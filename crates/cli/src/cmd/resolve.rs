//! Implementation of the `prebuilt resolve` command.
//!
//! Always produces a decision. Configuration errors and resolution failures
//! both end in a source build rather than a non-zero exit.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use prebuilt_lib::{BuildProperties, FailureKind, FallbackReason, ResolutionResult, decide};

use crate::args::ConfigArgs;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, print_warning, redact};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
  #[serde(flatten)]
  properties: &'a BuildProperties,
  reason: Option<String>,
  reason_kind: Option<FailureKind>,
}

pub async fn cmd_resolve(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
  let result = match args.load() {
    Ok(config) => decide(&config).await,
    Err(e) => {
      warn!(error = %e, "invalid configuration");
      ResolutionResult::from_source(FallbackReason::Configuration(e.to_string()))
    }
  };

  let properties = BuildProperties::from(&result);

  match format {
    OutputFormat::Text => print_text(&properties, result.reason.as_ref()),
    OutputFormat::Json => print_json(&ResolveReport {
      properties: &properties,
      reason: result.reason.as_ref().map(ToString::to_string),
      reason_kind: result.reason.as_ref().map(FallbackReason::kind),
    })?,
    OutputFormat::Properties => print!("{}", properties.to_properties()),
  }

  Ok(())
}

fn print_text(properties: &BuildProperties, reason: Option<&FallbackReason>) {
  if properties.build_from_source {
    match reason {
      Some(reason) if reason.kind() == FailureKind::Transient => {
        print_warning(&format!("Building from source: {}", reason))
      }
      Some(reason) => print_info(&format!("Building from source: {}", reason)),
      None => print_info("Building from source"),
    }
    return;
  }

  print_success("Using prebuilt artifact");
  print_stat("Package", properties.package_name.as_deref().unwrap_or_default());
  print_stat("Version", properties.version.as_deref().unwrap_or_default());
  print_stat("User", properties.github_username.as_deref().unwrap_or_default());
  print_stat("Token", &redact(properties.github_token.as_deref().unwrap_or_default()));
}
