//! Implementation of the `prebuilt fingerprint` command.

use anyhow::{Context, Result};

use prebuilt_lib::fingerprint::FingerprintSource;

use crate::args::ConfigArgs;

pub async fn cmd_fingerprint(args: &ConfigArgs) -> Result<()> {
  let config = args.load().context("Invalid configuration")?;

  let fingerprint = config
    .fingerprint_source()
    .local_fingerprint()
    .await
    .context("Failed to compute patch fingerprint")?;

  println!("{}", fingerprint);
  Ok(())
}
