//! Implementation of the `prebuilt auth` command.

use anyhow::{Context, Result, bail};

use prebuilt_lib::credentials::CredentialProvider;

use crate::args::ConfigArgs;
use crate::output::{print_error, print_success};

pub async fn cmd_auth(args: &ConfigArgs) -> Result<()> {
  let config = args.load().context("Invalid configuration")?;

  match config.credential_provider().acquire().await {
    Ok(credentials) => {
      print_success(&format!("Registry access available as {}", credentials.username));
      Ok(())
    }
    Err(reason) => {
      print_error(&reason.to_string());
      bail!("registry credentials unavailable")
    }
  }
}
