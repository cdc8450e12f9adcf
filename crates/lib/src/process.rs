//! External command execution with a bounded wait.
//!
//! Commands are always spawned from an argument vector, never through a shell.
//! A command that outlives its timeout is killed and reported as a failure
//! with [`TIMED_OUT_EXIT_CODE`]; its real exit status is never read.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_COMMAND_TIMEOUT, SIGNALED_EXIT_CODE, SPAWN_FAILED_EXIT_CODE, TIMED_OUT_EXIT_CODE};

/// Captured result of running an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
  /// Standard output with trailing whitespace removed.
  pub stdout: String,
  /// Standard error, kept for diagnostics.
  pub stderr: String,
  pub exit_code: i32,
  pub timed_out: bool,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.exit_code == 0 && !self.timed_out
  }

  /// Output reported when the process could not be started.
  pub fn spawn_failed(message: impl Into<String>) -> Self {
    Self {
      stderr: message.into(),
      exit_code: SPAWN_FAILED_EXIT_CODE,
      ..Self::default()
    }
  }

  /// Output reported when the process was killed after its timeout.
  pub fn timed_out(timeout: Duration) -> Self {
    Self {
      stderr: format!("timed out after {}", humantime::format_duration(timeout)),
      exit_code: TIMED_OUT_EXIT_CODE,
      timed_out: true,
      ..Self::default()
    }
  }

  /// Best human-readable description of why the command failed.
  pub fn error_message(&self) -> String {
    let stderr = self.stderr.trim();
    if !stderr.is_empty() {
      return stderr.to_string();
    }
    self.stdout.trim().to_string()
  }
}

/// Something that can run an argument vector and report its output.
///
/// The resolver components only talk to external tools through this trait,
/// which keeps them testable without the tools installed.
pub trait CommandRunner {
  fn run(&self, argv: &[String]) -> impl Future<Output = CommandOutput> + Send;
}

/// Runs commands as real OS processes.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
  timeout: Duration,
}

impl Default for ProcessRunner {
  fn default() -> Self {
    Self::new(DEFAULT_COMMAND_TIMEOUT)
  }
}

impl ProcessRunner {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }
}

impl CommandRunner for ProcessRunner {
  async fn run(&self, argv: &[String]) -> CommandOutput {
    run_command(argv, self.timeout).await
  }
}

/// Run `argv` and wait at most `timeout` for it to exit.
///
/// Never fails: spawn errors, I/O errors and timeouts are all folded into a
/// non-zero [`CommandOutput::exit_code`].
pub async fn run_command(argv: &[String], timeout: Duration) -> CommandOutput {
  let Some((program, args)) = argv.split_first() else {
    return CommandOutput::spawn_failed("empty command");
  };

  let mut command = Command::new(program);
  command
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    // The child is killed when the wait future below is dropped on timeout.
    .kill_on_drop(true);

  debug!(program = %program, args = ?args, "spawning process");

  let child = match command.spawn() {
    Ok(child) => child,
    Err(e) => {
      debug!(program = %program, error = %e, "failed to spawn process");
      return CommandOutput::spawn_failed(e.to_string());
    }
  };

  match tokio::time::timeout(timeout, child.wait_with_output()).await {
    Ok(Ok(output)) => {
      let exit_code = output.status.code().unwrap_or(SIGNALED_EXIT_CODE);
      let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
      let stderr = String::from_utf8_lossy(&output.stderr).to_string();

      if exit_code != 0 {
        debug!(program = %program, code = exit_code, stderr = %stderr.trim(), "process exited with failure");
      }

      CommandOutput {
        stdout,
        stderr,
        exit_code,
        timed_out: false,
      }
    }
    Ok(Err(e)) => {
      debug!(program = %program, error = %e, "failed to wait for process");
      CommandOutput::spawn_failed(e.to_string())
    }
    Err(_) => {
      warn!(program = %program, timeout = %humantime::format_duration(timeout), "process timed out, killed");
      CommandOutput::timed_out(timeout)
    }
  }
}

/// Convenience for building an argument vector from string slices.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  parts.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{echo_msg, shell_cmd};

  fn to_argv((program, args): (&str, Vec<String>)) -> Vec<String> {
    let mut v = vec![program.to_string()];
    v.extend(args);
    v
  }

  #[tokio::test]
  async fn captures_stdout_and_trims_trailing_whitespace() {
    let output = run_command(&to_argv(echo_msg("hello")), DEFAULT_COMMAND_TIMEOUT).await;

    assert!(output.success());
    assert_eq!(output.stdout, "hello");
  }

  #[tokio::test]
  async fn arguments_are_not_shell_interpreted() {
    let output = run_command(&to_argv(echo_msg("$HOME;ls")), DEFAULT_COMMAND_TIMEOUT).await;

    assert_eq!(output.stdout, "$HOME;ls");
  }

  #[tokio::test]
  async fn nonexistent_command_reports_failure_without_panicking() {
    let output = run_command(&argv(["definitely-not-a-real-command-4f1c"]), DEFAULT_COMMAND_TIMEOUT).await;

    assert!(!output.success());
    assert_eq!(output.exit_code, SPAWN_FAILED_EXIT_CODE);
    assert!(!output.timed_out);
  }

  #[tokio::test]
  async fn empty_argv_reports_failure() {
    let output = run_command(&[], DEFAULT_COMMAND_TIMEOUT).await;

    assert_eq!(output.exit_code, SPAWN_FAILED_EXIT_CODE);
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn non_zero_exit_code_is_reported() {
    let output = run_command(&to_argv(shell_cmd("echo oops >&2; exit 3")), DEFAULT_COMMAND_TIMEOUT).await;

    assert_eq!(output.exit_code, 3);
    assert_eq!(output.error_message(), "oops");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn hung_process_is_killed_after_timeout() {
    let started = std::time::Instant::now();
    let output = run_command(&argv(["sleep", "30"]), Duration::from_millis(200)).await;

    assert!(output.timed_out);
    assert_eq!(output.exit_code, TIMED_OUT_EXIT_CODE);
    assert!(!output.success());
    assert!(started.elapsed() < Duration::from_secs(10));
  }

  #[tokio::test]
  async fn process_runner_uses_configured_timeout() {
    let runner = ProcessRunner::new(Duration::from_secs(5));
    assert_eq!(runner.timeout(), Duration::from_secs(5));

    let output = runner.run(&to_argv(echo_msg("ok"))).await;
    assert_eq!(output.stdout, "ok");
  }
}
