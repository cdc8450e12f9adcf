mod args;
mod cmd;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use args::ConfigArgs;
use cmd::{cmd_auth, cmd_candidates, cmd_fingerprint, cmd_resolve};
use output::OutputFormat;

/// prebuilt - reuse prebuilt patched artifacts when they match the local patches
#[derive(Parser)]
#[command(name = "prebuilt")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  config: ConfigArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Decide between a prebuilt artifact and a source build
  Resolve {
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print the fingerprint of the local patches
  Fingerprint,

  /// List published artifact versions matching the required version
  Candidates {
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Check whether registry credentials are available
  Auth,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Logs go to stderr so stdout stays machine-readable.
  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  match cli.command {
    Commands::Resolve { format } => rt.block_on(cmd_resolve(&cli.config, format)),
    Commands::Fingerprint => rt.block_on(cmd_fingerprint(&cli.config)),
    Commands::Candidates { format } => rt.block_on(cmd_candidates(&cli.config, format)),
    Commands::Auth => rt.block_on(cmd_auth(&cli.config)),
  }
}
