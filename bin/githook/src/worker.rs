//! Per-hook bounded job queue and worker pool. Producers (HTTP
//! handlers) and consumers (command executors) are decoupled so each
//! hook is independently rate-limited.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use uuid::Uuid;

use crate::cmdlog::CommandLog;

/// A unit of work enqueued for a worker: expanded argv, a correlation
/// id, a per-job timeout and an optional single-use response slot.
pub struct CommandJob {
  pub id: Uuid,
  pub cmd: Vec<String>,
  pub timeout_secs: u64,
  pub response: Option<oneshot::Sender<githook_command::CommandResult>>,
}

/// The sending half of a hook's queue, held by the server and cloned
/// into every request handler for that hook.
pub type JobSender = mpsc::Sender<CommandJob>;

/// A running worker pool: the queue is closed by dropping every clone
/// of `JobSender` (done by the server on shutdown), at which point
/// each worker finishes its current job and exits once the queue is
/// drained.
pub struct Pool {
  pub sender: JobSender,
  pub handles: Vec<tokio::task::JoinHandle<()>>,
}

/// Spawns `concurrency` workers draining a shared bounded queue of
/// capacity `queue_size`, each appending completed results to `log`.
pub fn spawn_pool(
  hook_name: String,
  concurrency: usize,
  queue_size: usize,
  log: Arc<dyn CommandLog>,
) -> Pool {
  let (tx, rx) = mpsc::channel(queue_size);
  let rx = Arc::new(Mutex::new(rx));

  let handles = (0..concurrency)
    .map(|worker_idx| {
      let rx = rx.clone();
      let log = log.clone();
      let hook_name = hook_name.clone();
      tokio::spawn(async move {
        run_worker(&hook_name, worker_idx, rx, log).await;
      })
    })
    .collect();

  Pool {
    sender: tx,
    handles,
  }
}

async fn run_worker(
  hook_name: &str,
  worker_idx: usize,
  rx: Arc<Mutex<mpsc::Receiver<CommandJob>>>,
  log: Arc<dyn CommandLog>,
) {
  loop {
    let job = {
      let mut rx = rx.lock().await;
      rx.recv().await
    };
    let Some(job) = job else {
      tracing::debug!(hook = hook_name, worker_idx, "queue closed, exiting");
      return;
    };

    tracing::info!(
      hook = hook_name,
      worker_idx,
      job_id = %job.id,
      cmd = ?job.cmd,
      "executing command"
    );

    let result =
      githook_command::run(job.cmd, job.timeout_secs).await;

    if let Some(error) = &result.error {
      tracing::warn!(
        hook = hook_name,
        job_id = %job.id,
        %error,
        "command finished unsuccessfully"
      );
    } else {
      tracing::info!(hook = hook_name, job_id = %job.id, "command finished successfully");
    }

    if let Err(e) = log.append(result.clone()).await {
      tracing::warn!(hook = hook_name, job_id = %job.id, %e, "failed to append to command log");
    }

    if let Some(response) = job.response {
      // Buffered-1, fire-and-forget: dropping the receiver (handler
      // gave up) just turns this into a harmless `Err`.
      let _ = response.send(result);
    }
  }
}
