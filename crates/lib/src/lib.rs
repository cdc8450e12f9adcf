//! prebuilt-lib: decides whether a build can reuse a prebuilt, patched artifact.
//!
//! A prebuilt artifact of the patched dependency is only usable when it was
//! built from exactly the local patch set. This crate provides:
//! - `process`: bounded external command execution
//! - `fingerprint`: the local patch fingerprint
//! - `credentials`: registry credentials from the GitHub CLI
//! - `registry`: candidate listing and manifest fingerprints
//! - `resolver`: the first-match search over candidates
//! - `decision`: configuration in, [`ResolutionResult`] out

pub mod config;
pub mod consts;
pub mod credentials;
pub mod decision;
pub mod fingerprint;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod types;
mod util;
pub mod version;

pub use config::{ConfigError, ResolverConfig};
pub use decision::decide;
pub use types::{BuildProperties, FailureKind, FallbackReason, ResolutionResult};
