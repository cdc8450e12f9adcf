//! Shared constants.

use std::time::Duration;

/// Prefix for every environment variable the resolver reads.
pub const ENV_PREFIX: &str = "PREBUILT_";

/// How long an external command may run before it is killed.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a single manifest request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code reported when a command was killed after exceeding its timeout.
pub const TIMED_OUT_EXIT_CODE: i32 = 124;

/// Exit code reported when a command could not be started at all.
pub const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// Exit code reported when a command was terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

pub const DEFAULT_PACKAGE_NAME: &str = "react-native";
pub const DEFAULT_AUTH_TOOL: &str = "gh";
pub const DEFAULT_REGISTRY_URL: &str = "https://maven.pkg.github.com/Expensify/App";
pub const DEFAULT_REGISTRY_OWNER: &str = "Expensify";
pub const DEFAULT_HASH_SCRIPT: &str = "scripts/compute-patches-hash.sh";
pub const DEFAULT_PATCH_DIR: &str = "patches/react-native";
pub const DEFAULT_PACKAGE_JSON: &str = "node_modules/react-native/package.json";

/// Maven group the patched artifacts are published under.
pub const ARTIFACT_GROUP: &str = "com.expensify";

/// Artifact id of the prebuilt Android library inside each package.
pub const ARTIFACT_ID: &str = "react-android";

/// Manifest property carrying the fingerprint of the patches an artifact was built with.
pub const PATCHES_HASH_PROPERTY: &str = "patchesHash";

/// Scopes that grant access to the package registry. Either one is enough.
pub const REQUIRED_SCOPES: [&str; 2] = ["read:packages", "write:packages"];
