//! Validates hook definitions, builds worker pools and queues, mounts
//! admin endpoints, and owns graceful shutdown.

use std::{collections::HashSet, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get, routing::post};
use tower_http::trace::TraceLayer;

use crate::{
  api::{admin, hook},
  cmdlog::CommandLog,
  config::ServerConfig,
  hook::{Hook, HookConfig, validate},
  worker::{self, JobSender, Pool},
};

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
  #[error("no valid hooks found in configuration")]
  NoHooks,
}

/// Shared state behind the admin endpoints.
pub struct AppState {
  pub cmd_log: Arc<dyn CommandLog>,
}

/// A fully assembled server: the axum router plus the worker pools it
/// owns, so the caller can join on them during shutdown.
pub struct Server {
  pub router: Router,
  pools: Vec<Pool>,
  senders: Vec<JobSender>,
  pub addr: SocketAddr,
}

impl Server {
  /// Waits for every queued job across every hook's pool to drain.
  /// Drops every `JobSender` clone this `Server` holds, including the
  /// ones captured by the router's route states, so workers observe
  /// the queue closing. Callers must also drop any other clone of
  /// `router` they took (e.g. the one handed to the HTTP listener)
  /// before calling this, or the senders inside it keep the queues
  /// open and this waits forever.
  pub async fn join_workers(self) {
    drop(self.senders);
    drop(self.router);
    for pool in self.pools {
      for handle in pool.handles {
        let _ = handle.await;
      }
    }
  }
}

/// Validates every hook definition (skipping and warning on invalid
/// ones per spec), builds the per-hook worker pools, and mounts the
/// admin + hook routes.
pub fn build(
  hooks: std::collections::HashMap<String, HookConfig>,
  cmd_log: Arc<dyn CommandLog>,
  config: &ServerConfig,
) -> Result<Server, AssemblyError> {
  let mut seen_paths = HashSet::new();
  let mut valid_hooks = Vec::new();

  for (name, raw) in hooks {
    if seen_paths.contains(&raw.path) {
      tracing::warn!(hook = name, path = raw.path, "path already defined, ignoring");
      continue;
    }
    let path = raw.path.clone();
    match validate(&name, raw) {
      Ok(hook) => {
        seen_paths.insert(path);
        valid_hooks.push(hook);
      }
      Err(e) => {
        tracing::warn!(hook = name, "skipping invalid hook: {e}");
      }
    }
  }

  if valid_hooks.is_empty() {
    return Err(AssemblyError::NoHooks);
  }

  let mut router = Router::new()
    .route("/admin/hello", get(admin::hello))
    .route(
      "/admin/cmdlog",
      get(admin::cmdlog).with_state(Arc::new(AppState {
        cmd_log: cmd_log.clone(),
      })),
    );

  let mut pools = Vec::new();
  let mut senders = Vec::new();

  for hook in valid_hooks {
    tracing::info!(
      hook = hook.name,
      path = hook.path,
      kind = %hook.kind,
      concurrency = hook.concurrency,
      "mounting hook"
    );
    let pool = worker::spawn_pool(
      hook.name.clone(),
      hook.concurrency,
      config.worker_queue_size,
      cmd_log.clone(),
    );
    senders.push(pool.sender.clone());

    let hook_state = Arc::new((hook.clone(), pool.sender.clone()));
    router = router.route(
      &hook.path,
      post(hook::handle).with_state(hook_state),
    );
    pools.push(pool);
  }

  let router = router.layer(TraceLayer::new_for_http());

  let addr = SocketAddr::new(config.bind_ip, config.port);

  Ok(Server {
    router,
    pools,
    senders,
    addr,
  })
}
