use std::path::PathBuf;

use clap::Parser;

/// Command line arguments. Every field is optional here: final values
/// are resolved by [`crate::config::resolve`] as `cli > env > file`.
#[derive(Debug, Parser)]
#[command(name = "githook", version, about = "Webhook command runner")]
pub struct CliArgs {
  /// Path to the YAML hooks configuration file.
  #[arg(long, short = 'c')]
  pub config: Option<PathBuf>,

  /// Address to bind the HTTP(S) listener to.
  #[arg(long)]
  pub address: Option<String>,

  /// Port to bind the HTTP(S) listener to.
  #[arg(long)]
  pub port: Option<u16>,

  /// Directory to persist command results in. Omit to keep results
  /// in memory only.
  #[arg(long)]
  pub command_log_dir: Option<PathBuf>,

  /// Number of command results to retain before the oldest are
  /// rotated out.
  #[arg(long)]
  pub command_log_capacity: Option<usize>,

  /// Per-hook bounded queue capacity.
  #[arg(long)]
  pub worker_queue_size: Option<usize>,

  /// Logging level: error, warn, info, debug, trace.
  #[arg(long)]
  pub log_level: Option<tracing::Level>,

  /// TLS certificate file. Requires `--tls-key`.
  #[arg(long)]
  pub tls_cert: Option<PathBuf>,

  /// TLS private key file. Requires `--tls-cert`.
  #[arg(long)]
  pub tls_key: Option<PathBuf>,
}
