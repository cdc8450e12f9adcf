//! Registry credentials obtained through the GitHub CLI.
//!
//! Acquisition is a series of guarded checks, each of which can end the
//! attempt with an [`Unavailable`] reason:
//!
//! 1. the CLI tool must be installed,
//! 2. its auth status must list at least one of the package scopes,
//! 3. the authenticated user's login is looked up,
//! 4. a token is requested.
//!
//! Nothing is cached or written to disk.

use std::fmt;
use std::future::Future;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_AUTH_TOOL, REQUIRED_SCOPES};
use crate::process::{CommandRunner, argv};

/// Username and bearer token for the package registry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub token: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("token", &"<redacted>")
      .finish()
  }
}

/// Why credentials could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
  /// The CLI tool is not installed.
  ToolMissing { tool: String },
  /// The tool is logged in without any package scope (or not logged in at all).
  MissingScope { tool: String },
  /// The user lookup failed or returned something unexpected.
  UserLookupFailed(String),
  /// The token lookup failed or returned an empty token.
  TokenLookupFailed(String),
}

impl fmt::Display for Unavailable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Unavailable::ToolMissing { tool } => write!(f, "'{}' is not installed", tool),
      Unavailable::MissingScope { tool } => write!(
        f,
        "'{}' is not authenticated with {} scope (run `{} auth refresh -s {}`)",
        tool,
        REQUIRED_SCOPES.join(" or "),
        tool,
        REQUIRED_SCOPES[0]
      ),
      Unavailable::UserLookupFailed(message) => write!(f, "failed to look up authenticated user: {}", message),
      Unavailable::TokenLookupFailed(message) => write!(f, "failed to obtain auth token: {}", message),
    }
  }
}

pub type CredentialOutcome = Result<Credentials, Unavailable>;

/// Source of registry credentials.
pub trait CredentialProvider {
  fn acquire(&self) -> impl Future<Output = CredentialOutcome> + Send;
}

#[derive(Debug, Deserialize)]
struct ApiUser {
  login: String,
}

/// Obtains credentials from the `gh` CLI.
#[derive(Debug, Clone)]
pub struct GhCredentialProvider<R> {
  runner: R,
  tool: String,
}

impl<R: CommandRunner + Sync> GhCredentialProvider<R> {
  pub fn new(runner: R) -> Self {
    Self::with_tool(runner, DEFAULT_AUTH_TOOL)
  }

  pub fn with_tool(runner: R, tool: impl Into<String>) -> Self {
    Self {
      runner,
      tool: tool.into(),
    }
  }

  async fn is_installed(&self) -> bool {
    #[cfg(windows)]
    let lookup = "where";
    #[cfg(not(windows))]
    let lookup = "which";

    self.runner.run(&argv([lookup, self.tool.as_str()])).await.success()
  }

  async fn has_package_scope(&self) -> bool {
    // Older releases print the status to stderr, newer ones to stdout.
    let output = self.runner.run(&argv([self.tool.as_str(), "auth", "status"])).await;
    let status = format!("{}\n{}", output.stdout, output.stderr);
    REQUIRED_SCOPES.iter().any(|scope| status.contains(scope))
  }

  async fn username(&self) -> Result<String, Unavailable> {
    let output = self.runner.run(&argv([self.tool.as_str(), "api", "user"])).await;
    if !output.success() {
      return Err(Unavailable::UserLookupFailed(output.error_message()));
    }

    let user: ApiUser =
      serde_json::from_str(&output.stdout).map_err(|e| Unavailable::UserLookupFailed(e.to_string()))?;
    let login = user.login.trim();
    if login.is_empty() {
      return Err(Unavailable::UserLookupFailed("empty login".to_string()));
    }
    Ok(login.to_string())
  }

  async fn lookup(&self) -> CredentialOutcome {
    let username = self.username().await?;
    let token = self.token().await?;
    Ok(Credentials { username, token })
  }

  async fn token(&self) -> Result<String, Unavailable> {
    let output = self.runner.run(&argv([self.tool.as_str(), "auth", "token"])).await;
    if !output.success() {
      return Err(Unavailable::TokenLookupFailed(output.error_message()));
    }

    let token = output.stdout.trim();
    if token.is_empty() {
      return Err(Unavailable::TokenLookupFailed("empty token".to_string()));
    }
    Ok(token.to_string())
  }
}

impl<R: CommandRunner + Sync> CredentialProvider for GhCredentialProvider<R> {
  async fn acquire(&self) -> CredentialOutcome {
    if !self.is_installed().await {
      let reason = Unavailable::ToolMissing { tool: self.tool.clone() };
      info!("{}, prebuilt artifacts are unavailable", reason);
      return Err(reason);
    }

    if !self.has_package_scope().await {
      let reason = Unavailable::MissingScope { tool: self.tool.clone() };
      info!("{}", reason);
      return Err(reason);
    }

    let credentials = self.lookup().await;
    match &credentials {
      Ok(c) => debug!(username = %c.username, "acquired registry credentials"),
      Err(reason) => warn!("{}", reason),
    }
    credentials
  }
}
