//! Implementation of the `prebuilt candidates` command.
//!
//! Lists published versions matching the required version, in the order the
//! resolver would probe them.

use anyhow::{Context, Result};

use prebuilt_lib::registry::Registry;

use crate::args::ConfigArgs;
use crate::output::{OutputFormat, print_info, print_json};

pub async fn cmd_candidates(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
  let config = args.load().context("Invalid configuration")?;
  let version = config
    .required_version()
    .context("Failed to determine required version")?;

  let registry = config.registry().context("Failed to set up registry client")?;
  let candidates = registry
    .list_candidates(&config.package_name, &version)
    .await
    .with_context(|| format!("Failed to list candidates for {}", config.package_name))?;

  let versions: Vec<&str> = candidates.iter().map(|c| c.version.as_str()).collect();

  match format {
    OutputFormat::Json => print_json(&versions)?,
    OutputFormat::Text | OutputFormat::Properties => {
      if versions.is_empty() {
        print_info(&format!("No artifacts of {} match version {}", config.package_name, version));
      }
      for v in versions {
        println!("{}", v);
      }
    }
  }

  Ok(())
}
