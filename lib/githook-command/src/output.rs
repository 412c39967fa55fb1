use serde::{Deserialize, Serialize};

/// The distinct ways a command execution can fail, matching the error
/// kinds an execution handler is allowed to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandErrorKind {
  EmptyCommand,
  SpawnError,
  Timeout,
  ExitNonZero,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
  pub kind: CommandErrorKind,
  pub message: String,
  /// Only populated for `ExitNonZero`.
  pub exit_code: Option<i32>,
}

impl CommandError {
  pub fn empty_command() -> Self {
    Self {
      kind: CommandErrorKind::EmptyCommand,
      message: "command cannot be run: argv is empty".to_string(),
      exit_code: None,
    }
  }

  pub fn spawn(message: impl std::fmt::Display) -> Self {
    Self {
      kind: CommandErrorKind::SpawnError,
      message: message.to_string(),
      exit_code: None,
    }
  }

  pub fn timeout(timeout_secs: u64) -> Self {
    Self {
      kind: CommandErrorKind::Timeout,
      message: format!(
        "command killed after exceeding {timeout_secs}s timeout"
      ),
      exit_code: None,
    }
  }

  pub fn exit_non_zero(code: i32) -> Self {
    Self {
      kind: CommandErrorKind::ExitNonZero,
      message: format!("command exited with non-zero code {code}"),
      exit_code: Some(code),
    }
  }
}

impl std::fmt::Display for CommandError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.message)
  }
}
