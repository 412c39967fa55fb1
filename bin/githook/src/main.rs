use std::sync::Arc;

use clap::Parser;

mod api;
mod cli;
mod cmdlog;
mod config;
mod event;
mod hook;
mod logger;
mod response;
mod server;
mod template;
mod worker;

use cmdlog::CommandLog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  let args = cli::CliArgs::parse();
  let config = config::resolve(args)?;

  logger::init(config.log_level, logger::LogFormat::Text)?;

  tracing::info!("githook version: v{}", env!("CARGO_PKG_VERSION"));

  rustls::crypto::aws_lc_rs::default_provider()
    .install_default()
    .expect("failed to install default crypto provider");

  let dir_exists = config
    .storage
    .command_log_dir
    .as_ref()
    .map(|dir| {
      std::fs::metadata(dir).map(|m| m.is_dir()).unwrap_or(false)
    })
    .unwrap_or(false);

  let cmd_log: Arc<dyn CommandLog> = match &config.storage.command_log_dir
  {
    Some(dir) if dir_exists => {
      tracing::info!(dir = %dir.display(), "command log backed by disk");
      Arc::new(cmdlog::DiskCommandLog::new(
        dir.clone(),
        config.storage.command_log_capacity,
      ))
    }
    Some(dir) => {
      tracing::warn!(
        dir = %dir.display(),
        "command log directory does not exist or is not a directory, falling back to in-memory log"
      );
      Arc::new(cmdlog::MemoryCommandLog::new(
        config.storage.command_log_capacity,
      ))
    }
    None => {
      tracing::info!("command log kept in memory only");
      Arc::new(cmdlog::MemoryCommandLog::new(
        config.storage.command_log_capacity,
      ))
    }
  };

  let assembled =
    server::build(config.hooks, cmd_log, &config.server)?;

  let addr = assembled.addr;
  let router = assembled
    .router
    .clone()
    .into_make_service_with_connect_info::<std::net::SocketAddr>();

  let handle = axum_server::Handle::new();
  let shutdown_handle = handle.clone();
  tokio::spawn(async move {
    shutdown_signal().await;
    shutdown_handle
      .graceful_shutdown(Some(std::time::Duration::from_secs(5)));
  });

  if let Some(tls) = &config.tls {
    tracing::info!("githook listening on https://{addr}");
    let rustls_config =
      axum_server::tls_rustls::RustlsConfig::from_pem_file(
        &tls.cert, &tls.key,
      )
      .await?;
    axum_server::bind_rustls(addr, rustls_config)
      .handle(handle)
      .serve(router)
      .await?;
  } else {
    tracing::info!("githook listening on http://{addr}");
    axum_server::bind(addr).handle(handle).serve(router).await?;
  }

  assembled.join_workers().await;

  Ok(())
}

/// Resolves once on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    tokio::signal::ctrl_c()
      .await
      .expect("failed to install Ctrl+C handler");
  };

  #[cfg(unix)]
  let terminate = async {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
      .expect("failed to install SIGTERM handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  tracing::info!("shutdown signal received");
}
