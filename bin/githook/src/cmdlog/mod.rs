//! The append-only, rotating store of [`CommandResult`] entries,
//! queryable via the `/admin/cmdlog` REST endpoint.
//!
//! Exposed as a capability set (`append`, `get_results`,
//! `rotate_results`, `count`) so the in-memory and on-disk variants are
//! interchangeable behind `Arc<dyn CommandLog>`; neither backend's
//! specifics leak through the trait.

use async_trait::async_trait;
use githook_command::CommandResult;

mod disk;
mod memory;

pub use disk::DiskCommandLog;
pub use memory::MemoryCommandLog;

// `MaxCommands` is modeled as `usize` rather than a signed integer, so
// the negative-capacity `ConfigError` the spec describes can't arise
// here: the type system rules it out instead of a runtime check.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
  #[error("command log storage error: {0}")]
  Storage(#[from] std::io::Error),
}

#[async_trait]
pub trait CommandLog: Send + Sync {
  /// Appends `result`, rotating out the oldest entries if the log is
  /// over capacity. Returns the number of entries deleted by this
  /// specific append (typically 0 or 1).
  async fn append(&self, result: CommandResult) -> Result<usize, LogError>;

  /// Returns the latest `n` results, newest first. `n < 0` returns
  /// every stored result.
  async fn get_results(
    &self,
    n: i64,
  ) -> Result<Vec<CommandResult>, LogError>;

  /// Rotates the log down to `max_commands` entries (oldest first),
  /// returning the number of entries deleted.
  async fn rotate_results(&self) -> Result<usize, LogError>;

  async fn count(&self) -> Result<usize, LogError>;
}
