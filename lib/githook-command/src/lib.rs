use std::process::Stdio;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{process::Command, time::Duration};

mod output;

pub use output::{CommandError, CommandErrorKind};

/// The outcome of one child-process execution: the argv that actually
/// ran, the terminal error (if any) and the fully captured streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
  pub cmd: Vec<String>,
  pub error: Option<CommandError>,
  pub stdout: String,
  pub stderr: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
}

impl CommandResult {
  pub fn success(&self) -> bool {
    self.error.is_none()
  }
}

/// Runs `cmd` as a child process, capturing stdout/stderr to completion
/// or killing it once `timeout_secs` elapses.
///
/// `cmd` is never interpreted by a shell: `cmd[0]` is the executable,
/// the rest are passed through as literal arguments.
pub async fn run(cmd: Vec<String>, timeout_secs: u64) -> CommandResult {
  let started_at = Utc::now();

  if cmd.is_empty() {
    return CommandResult {
      cmd,
      error: Some(CommandError::empty_command()),
      stdout: String::new(),
      stderr: String::new(),
      started_at,
      finished_at: Utc::now(),
    };
  }

  let mut child = match Command::new(&cmd[0])
    .args(&cmd[1..])
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
  {
    Ok(child) => child,
    Err(e) => {
      return CommandResult {
        cmd,
        error: Some(CommandError::spawn(e)),
        stdout: String::new(),
        stderr: String::new(),
        started_at,
        finished_at: Utc::now(),
      };
    }
  };

  let output =
    tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
      .await;

  let (stdout, stderr, error) = match output {
    Ok(Ok(output)) => {
      let stdout = lossy_utf8(output.stdout);
      let stderr = lossy_utf8(output.stderr);
      let error = if output.status.success() {
        None
      } else {
        Some(CommandError::exit_non_zero(
          output.status.code().unwrap_or(-1),
        ))
      };
      (stdout, stderr, error)
    }
    Ok(Err(e)) => (String::new(), String::new(), Some(CommandError::spawn(e))),
    Err(_elapsed) => {
      (String::new(), String::new(), Some(CommandError::timeout(timeout_secs)))
    }
  };

  CommandResult {
    cmd,
    error,
    stdout,
    stderr,
    started_at,
    finished_at: Utc::now(),
  }
}

fn lossy_utf8(bytes: Vec<u8>) -> String {
  String::from_utf8(bytes)
    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn empty_command_fails_without_spawning() {
    let result = run(vec![], 5).await;
    assert_eq!(
      result.error.map(|e| e.kind),
      Some(CommandErrorKind::EmptyCommand)
    );
  }

  #[tokio::test]
  async fn captures_stdout_on_success() {
    let result =
      run(vec!["echo".to_string(), "hello".to_string()], 5).await;
    assert!(result.success());
    assert_eq!(result.stdout, "hello\n");
  }

  #[tokio::test]
  async fn non_zero_exit_is_reported() {
    let result =
      run(vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()], 5)
        .await;
    let error = result.error.expect("expected ExitNonZero error");
    assert_eq!(error.kind, CommandErrorKind::ExitNonZero);
    assert_eq!(error.exit_code, Some(3));
  }

  #[tokio::test]
  async fn timeout_kills_the_child() {
    let start = std::time::Instant::now();
    let result =
      run(vec!["sleep".to_string(), "10".to_string()], 1).await;
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(
      result.error.map(|e| e.kind),
      Some(CommandErrorKind::Timeout)
    );
  }

  #[tokio::test]
  async fn spawn_failure_is_reported() {
    let result =
      run(vec!["/no/such/executable-xyz".to_string()], 5).await;
    assert_eq!(
      result.error.map(|e| e.kind),
      Some(CommandErrorKind::SpawnError)
    );
  }
}
