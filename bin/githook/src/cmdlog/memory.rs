use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use githook_command::CommandResult;

use super::{CommandLog, LogError};

/// Bounded, ordered sequence of results held in memory. `max_commands
/// == 0` disables rotation (an infinite log).
pub struct MemoryCommandLog {
  max_commands: usize,
  entries: Mutex<VecDeque<CommandResult>>,
}

impl MemoryCommandLog {
  pub fn new(max_commands: usize) -> Self {
    Self {
      max_commands,
      entries: Mutex::new(VecDeque::new()),
    }
  }

  fn rotate_locked(&self, entries: &mut VecDeque<CommandResult>) -> usize {
    if self.max_commands == 0 {
      return 0;
    }
    let mut deleted = 0;
    while entries.len() > self.max_commands {
      entries.pop_front();
      deleted += 1;
    }
    deleted
  }
}

#[async_trait]
impl CommandLog for MemoryCommandLog {
  async fn append(&self, result: CommandResult) -> Result<usize, LogError> {
    let mut entries = self.entries.lock().unwrap();
    entries.push_back(result);
    Ok(self.rotate_locked(&mut entries))
  }

  async fn get_results(
    &self,
    n: i64,
  ) -> Result<Vec<CommandResult>, LogError> {
    let entries = self.entries.lock().unwrap();
    let take = if n < 0 {
      entries.len()
    } else {
      (n as usize).min(entries.len())
    };
    Ok(entries.iter().rev().take(take).cloned().collect())
  }

  async fn rotate_results(&self) -> Result<usize, LogError> {
    let mut entries = self.entries.lock().unwrap();
    Ok(self.rotate_locked(&mut entries))
  }

  async fn count(&self) -> Result<usize, LogError> {
    Ok(self.entries.lock().unwrap().len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn result(cmd: &str) -> CommandResult {
    CommandResult {
      cmd: vec![cmd.to_string()],
      error: None,
      stdout: String::new(),
      stderr: String::new(),
      started_at: Utc::now(),
      finished_at: Utc::now(),
    }
  }

  #[tokio::test]
  async fn append_then_count_grows_up_to_capacity() {
    let log = MemoryCommandLog::new(10);
    for i in 0..10 {
      log.append(result(&i.to_string())).await.unwrap();
    }
    assert_eq!(log.count().await.unwrap(), 10);

    let (deleted, _) = (
      log.append(result("11")).await.unwrap(),
      (),
    );
    assert_eq!(deleted, 1);
    assert_eq!(log.count().await.unwrap(), 10);
  }

  #[tokio::test]
  async fn eleventh_append_evicts_the_oldest() {
    let log = MemoryCommandLog::new(10);
    for i in 0..10 {
      log.append(result(&i.to_string())).await.unwrap();
    }
    log.append(result("eleventh")).await.unwrap();
    let latest = log.get_results(1).await.unwrap();
    assert_eq!(latest[0].cmd, vec!["eleventh".to_string()]);
  }

  #[tokio::test]
  async fn get_results_returns_min_n_count_newest_first() {
    let log = MemoryCommandLog::new(0);
    log.append(result("a")).await.unwrap();
    log.append(result("b")).await.unwrap();
    log.append(result("c")).await.unwrap();

    let two = log.get_results(2).await.unwrap();
    assert_eq!(two[0].cmd, vec!["c".to_string()]);
    assert_eq!(two[1].cmd, vec!["b".to_string()]);

    let all = log.get_results(-1).await.unwrap();
    assert_eq!(all.len(), 3);

    let more_than_count = log.get_results(100).await.unwrap();
    assert_eq!(more_than_count.len(), 3);
  }

  #[tokio::test]
  async fn rotation_is_disabled_when_max_commands_is_zero() {
    let log = MemoryCommandLog::new(0);
    for i in 0..50 {
      log.append(result(&i.to_string())).await.unwrap();
    }
    assert_eq!(log.count().await.unwrap(), 50);
  }

  #[tokio::test]
  async fn rotate_results_is_idempotent() {
    let log = MemoryCommandLog::new(2);
    log.append(result("a")).await.unwrap();
    log.append(result("b")).await.unwrap();
    log.append(result("c")).await.unwrap();
    assert_eq!(log.count().await.unwrap(), 2);

    let first = log.rotate_results().await.unwrap();
    let second = log.rotate_results().await.unwrap();
    assert_eq!(first, 0);
    assert_eq!(second, 0);
  }
}
