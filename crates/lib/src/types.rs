//! Resolution outcome types.
//!
//! [`ResolutionResult`] is what the resolver produces. [`BuildProperties`] is
//! what gets handed to the build, after one more check that every field needed
//! to consume a prebuilt artifact is actually present.

use std::fmt;

use serde::Serialize;

use crate::credentials::{Credentials, Unavailable};
use crate::registry::ArtifactCandidate;

/// Coarse classification of why a build falls back to source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
  /// Prebuilt artifacts were switched off explicitly.
  Disabled,
  /// Something required is not installed or not configured.
  NotConfigured,
  /// Credentials exist but lack access to packages.
  Unauthorized,
  /// A network, parse or tool error interrupted the search.
  Transient,
  /// The search completed and nothing matched the local patches.
  NoMatch,
}

/// Why the build falls back to compiling the dependency from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
  ForcedBySetting,
  Configuration(String),
  CredentialsUnavailable(Unavailable),
  Fingerprint(String),
  Registry(String),
  NoMatch { prefix: String, candidates: usize },
}

impl FallbackReason {
  pub fn kind(&self) -> FailureKind {
    match self {
      FallbackReason::ForcedBySetting => FailureKind::Disabled,
      FallbackReason::Configuration(_) => FailureKind::NotConfigured,
      FallbackReason::CredentialsUnavailable(Unavailable::ToolMissing { .. }) => FailureKind::NotConfigured,
      FallbackReason::CredentialsUnavailable(Unavailable::MissingScope { .. }) => FailureKind::Unauthorized,
      FallbackReason::CredentialsUnavailable(_) => FailureKind::Transient,
      FallbackReason::Fingerprint(_) | FallbackReason::Registry(_) => FailureKind::Transient,
      FallbackReason::NoMatch { .. } => FailureKind::NoMatch,
    }
  }
}

impl fmt::Display for FallbackReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FallbackReason::ForcedBySetting => write!(f, "building from source was requested explicitly"),
      FallbackReason::Configuration(message) => write!(f, "not configured: {}", message),
      FallbackReason::CredentialsUnavailable(reason) => write!(f, "no registry credentials: {}", reason),
      FallbackReason::Fingerprint(message) => write!(f, "could not fingerprint local patches: {}", message),
      FallbackReason::Registry(message) => write!(f, "registry error: {}", message),
      FallbackReason::NoMatch { prefix, candidates: 0 } => {
        write!(f, "no prebuilt artifacts published for version {}", prefix)
      }
      FallbackReason::NoMatch { prefix, candidates } => write!(
        f,
        "none of {} prebuilt artifact(s) for version {} were built with the local patches",
        candidates, prefix
      ),
    }
  }
}

/// Output of a resolution run.
///
/// When `build_from_source` is false, `version`, `package_name` and
/// `credentials` are all set and denote a verified match. Otherwise they must
/// be ignored and `reason` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
  pub build_from_source: bool,
  pub version: Option<String>,
  pub package_name: Option<String>,
  pub credentials: Option<Credentials>,
  pub reason: Option<FallbackReason>,
}

impl ResolutionResult {
  pub fn from_source(reason: FallbackReason) -> Self {
    Self {
      build_from_source: true,
      version: None,
      package_name: None,
      credentials: None,
      reason: Some(reason),
    }
  }

  pub fn prebuilt(candidate: ArtifactCandidate, credentials: Credentials) -> Self {
    Self {
      build_from_source: false,
      version: Some(candidate.version),
      package_name: Some(candidate.package_name),
      credentials: Some(credentials),
      reason: None,
    }
  }
}

/// Values exposed to the surrounding build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProperties {
  pub build_from_source: bool,
  pub version: Option<String>,
  pub package_name: Option<String>,
  pub github_username: Option<String>,
  pub github_token: Option<String>,
}

impl BuildProperties {
  fn source_build() -> Self {
    Self {
      build_from_source: true,
      version: None,
      package_name: None,
      github_username: None,
      github_token: None,
    }
  }

  /// Render as Java properties, one `key=value` per line.
  ///
  /// Unset values are omitted.
  pub fn to_properties(&self) -> String {
    let mut out = format!("buildFromSource={}\n", self.build_from_source);
    let fields = [
      ("version", &self.version),
      ("packageName", &self.package_name),
      ("githubUsername", &self.github_username),
      ("githubToken", &self.github_token),
    ];
    for (key, value) in fields {
      if let Some(value) = value {
        out.push_str(&format!("{}={}\n", key, escape_property(value)));
      }
    }
    out
  }
}

impl From<&ResolutionResult> for BuildProperties {
  /// A prebuilt artifact is only used when version, package name, username and
  /// token are all present, regardless of what `build_from_source` says.
  fn from(result: &ResolutionResult) -> Self {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    let username = result.credentials.as_ref().map(|c| c.username.clone());
    let token = result.credentials.as_ref().map(|c| c.token.clone());

    if result.build_from_source
      || !present(&result.version)
      || !present(&result.package_name)
      || !present(&username)
      || !present(&token)
    {
      return Self::source_build();
    }

    Self {
      build_from_source: false,
      version: result.version.clone(),
      package_name: result.package_name.clone(),
      github_username: username,
      github_token: token,
    }
  }
}

fn escape_property(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '\\' => escaped.push_str("\\\\"),
      '\n' => escaped.push_str("\\n"),
      '\r' => escaped.push_str("\\r"),
      '=' | ':' | '#' | '!' => {
        escaped.push('\\');
        escaped.push(c);
      }
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  fn credentials() -> Credentials {
    Credentials {
      username: "octocat".to_string(),
      token: "gho_secret".to_string(),
    }
  }

  fn matched() -> ResolutionResult {
    ResolutionResult::prebuilt(ArtifactCandidate::new("react-native", "0.75.1-b"), credentials())
  }

  #[test]
  fn complete_match_uses_prebuilt() {
    let props = BuildProperties::from(&matched());

    assert!(!props.build_from_source);
    assert_eq!(props.version.as_deref(), Some("0.75.1-b"));
    assert_eq!(props.package_name.as_deref(), Some("react-native"));
    assert_eq!(props.github_username.as_deref(), Some("octocat"));
    assert_eq!(props.github_token.as_deref(), Some("gho_secret"));
  }

  #[test]
  fn missing_credentials_forces_source_build() {
    let mut result = matched();
    result.credentials = None;

    assert_eq!(BuildProperties::from(&result), BuildProperties::source_build());
  }

  #[test]
  fn empty_token_forces_source_build() {
    let mut result = matched();
    result.credentials = Some(Credentials {
      username: "octocat".to_string(),
      token: String::new(),
    });

    assert!(BuildProperties::from(&result).build_from_source);
  }

  #[test]
  fn missing_version_forces_source_build() {
    let mut result = matched();
    result.version = None;

    assert!(BuildProperties::from(&result).build_from_source);
  }

  #[test]
  fn source_flag_wins_over_populated_fields() {
    let mut result = matched();
    result.build_from_source = true;

    assert_eq!(BuildProperties::from(&result), BuildProperties::source_build());
  }

  #[test]
  fn serializes_with_build_property_names() {
    let json = serde_json::to_value(BuildProperties::from(&matched())).unwrap();

    assert_eq!(json["buildFromSource"], false);
    assert_eq!(json["githubUsername"], "octocat");
    assert_eq!(json["githubToken"], "gho_secret");
    assert_eq!(json["packageName"], "react-native");
  }

  #[test]
  fn properties_output_omits_unset_values() {
    let props = BuildProperties::from(&ResolutionResult::from_source(FallbackReason::ForcedBySetting));

    assert_eq!(props.to_properties(), "buildFromSource=true\n");
  }

  #[test]
  fn properties_output_escapes_separators() {
    let mut props = BuildProperties::from(&matched());
    props.github_token = Some("a=b:c".to_string());

    assert!(props.to_properties().contains("githubToken=a\\=b\\:c\n"));
  }

  #[test]
  fn reasons_have_distinct_kinds() {
    let tool = "gh".to_string();
    assert_eq!(
      FallbackReason::CredentialsUnavailable(Unavailable::ToolMissing { tool: tool.clone() }).kind(),
      FailureKind::NotConfigured
    );
    assert_eq!(
      FallbackReason::CredentialsUnavailable(Unavailable::MissingScope { tool }).kind(),
      FailureKind::Unauthorized
    );
    assert_eq!(FallbackReason::Registry("timeout".into()).kind(), FailureKind::Transient);
    assert_eq!(
      FallbackReason::NoMatch {
        prefix: "0.75.1".into(),
        candidates: 2
      }
      .kind(),
      FailureKind::NoMatch
    );
    assert_eq!(FallbackReason::ForcedBySetting.kind(), FailureKind::Disabled);
  }

  #[test]
  fn no_match_message_distinguishes_empty_registry() {
    let none = FallbackReason::NoMatch {
      prefix: "0.75.1".into(),
      candidates: 0,
    };
    let some = FallbackReason::NoMatch {
      prefix: "0.75.1".into(),
      candidates: 3,
    };

    assert!(none.to_string().contains("no prebuilt artifacts published"));
    assert!(some.to_string().contains("none of 3"));
  }
}
