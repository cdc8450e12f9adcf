//! Shared utilities.
//!
//! Test helpers live here so every module can script external tools the same way.

#[cfg(test)]
pub mod testutil;
