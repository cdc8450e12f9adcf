//! Test utilities for prebuilt-lib.
//!
//! Cross-platform helpers for tests that spawn real processes, plus a
//! [`ScriptedRunner`] that answers commands from a table instead.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::process::{CommandOutput, CommandRunner};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to echo a message.
///
/// On Unix, this uses /bin/echo directly.
/// On Windows, echo is a shell builtin, so we wrap it in cmd.exe.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("/bin/echo", vec![msg.to_string()])
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo {}", msg)])
}

/// A successful output with the given stdout.
pub fn ok(stdout: &str) -> CommandOutput {
  CommandOutput {
    stdout: stdout.to_string(),
    ..CommandOutput::default()
  }
}

/// A failed output with the given exit code and stderr.
pub fn fail(exit_code: i32, stderr: &str) -> CommandOutput {
  CommandOutput {
    stderr: stderr.to_string(),
    exit_code,
    ..CommandOutput::default()
  }
}

/// Answers commands from a table keyed by the space-joined argument vector.
///
/// Unknown commands behave like a missing program. Every invocation is
/// recorded so tests can assert on what was (or was not) run.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
  responses: HashMap<String, CommandOutput>,
  calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on(mut self, command: &str, output: CommandOutput) -> Self {
    self.responses.insert(command.to_string(), output);
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn was_called(&self, command: &str) -> bool {
    self.calls().iter().any(|c| c == command)
  }
}

impl CommandRunner for ScriptedRunner {
  async fn run(&self, argv: &[String]) -> CommandOutput {
    let key = argv.join(" ");
    self.calls.lock().unwrap().push(key.clone());
    self
      .responses
      .get(&key)
      .cloned()
      .unwrap_or_else(|| CommandOutput::spawn_failed(format!("no scripted response for `{}`", key)))
  }
}
