use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use githook_command::CommandResult;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use super::{CommandLog, LogError};

/// One `CommandResult` per file in `dir`, named by a strictly
/// monotonic nanosecond counter. Sorting file names numerically
/// ascending yields insertion order.
pub struct DiskCommandLog {
  dir: PathBuf,
  max_commands: usize,
}

impl DiskCommandLog {
  pub fn new(dir: impl Into<PathBuf>, max_commands: usize) -> Self {
    Self {
      dir: dir.into(),
      max_commands,
    }
  }

  async fn entries(&self) -> Result<Vec<(i64, PathBuf)>, LogError> {
    let mut out = Vec::new();
    let mut reader = tokio::fs::read_dir(&self.dir).await?;
    while let Some(entry) = reader.next_entry().await? {
      let path = entry.path();
      if let Some(Ok(ts)) =
        path.file_name().and_then(|n| n.to_str()).map(str::parse)
      {
        out.push((ts, path));
      }
    }
    Ok(out)
  }

  /// Creates and writes a new entry file, retrying with `ts += 1` on a
  /// filename collision. `create_new` makes the existence check and
  /// the write a single atomic filesystem operation, so two concurrent
  /// appends racing on the same nanosecond timestamp can never have
  /// one silently overwrite the other.
  async fn write_entry(&self, bytes: &[u8]) -> Result<(), LogError> {
    let mut ts = Utc::now().timestamp_nanos_opt().unwrap_or(0);
    loop {
      let path = self.dir.join(ts.to_string());
      let opened = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await;
      match opened {
        Ok(mut file) => {
          file.write_all(bytes).await?;
          return Ok(());
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
          ts += 1;
        }
        Err(e) => return Err(e.into()),
      }
    }
  }

  async fn rotate_to_capacity(&self) -> Result<usize, LogError> {
    if self.max_commands == 0 {
      return Ok(0);
    }
    let mut entries = self.entries().await?;
    entries.sort_by_key(|(ts, _)| *ts);
    let mut deleted = 0;
    while entries.len() > self.max_commands {
      let (_, path) = entries.remove(0);
      // Tolerate a file another rotation already removed.
      if tokio::fs::remove_file(&path).await.is_ok() {
        deleted += 1;
      }
    }
    Ok(deleted)
  }
}

fn to_storage_error(e: impl std::fmt::Display) -> LogError {
  LogError::Storage(std::io::Error::other(e.to_string()))
}

#[async_trait]
impl CommandLog for DiskCommandLog {
  async fn append(
    &self,
    result: CommandResult,
  ) -> Result<usize, LogError> {
    let json =
      serde_json::to_vec(&result).map_err(to_storage_error)?;
    self.write_entry(&json).await?;
    self.rotate_to_capacity().await
  }

  async fn get_results(
    &self,
    n: i64,
  ) -> Result<Vec<CommandResult>, LogError> {
    let mut entries = self.entries().await?;
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    let take = if n < 0 {
      entries.len()
    } else {
      (n as usize).min(entries.len())
    };

    let mut out = Vec::with_capacity(take);
    for (_, path) in entries.into_iter().take(take) {
      // A concurrent rotation may have deleted this file already;
      // readers skip and continue rather than erroring.
      let Ok(bytes) = tokio::fs::read(&path).await else {
        continue;
      };
      if let Ok(result) = serde_json::from_slice(&bytes) {
        out.push(result);
      }
    }
    Ok(out)
  }

  async fn rotate_results(&self) -> Result<usize, LogError> {
    self.rotate_to_capacity().await
  }

  async fn count(&self) -> Result<usize, LogError> {
    Ok(self.entries().await?.len())
  }
}
