use std::{collections::HashMap, net::IpAddr, path::PathBuf};

use serde::Deserialize;

use crate::{cli::CliArgs, hook::HookConfig};

/// Environment variable overrides, parsed with `envy`. Every field
/// mirrors a [`CliArgs`] field one-for-one; CLI flags win when both
/// are set.
#[derive(Debug, Deserialize, Default)]
struct Env {
  githook_config: Option<PathBuf>,
  githook_address: Option<String>,
  githook_port: Option<u16>,
  githook_command_log_dir: Option<PathBuf>,
  githook_command_log_capacity: Option<usize>,
  githook_worker_queue_size: Option<usize>,
  githook_tls_cert: Option<PathBuf>,
  githook_tls_key: Option<PathBuf>,
}

/// Fully resolved, ready-to-use runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub bind_ip: IpAddr,
  pub port: u16,
  pub worker_queue_size: usize,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
  pub command_log_dir: Option<PathBuf>,
  pub command_log_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
  pub cert: PathBuf,
  pub key: PathBuf,
}

/// Top-level resolved configuration: the listener, storage, optional
/// TLS material, and the hook definitions loaded from the config
/// file.
#[derive(Debug, Clone)]
pub struct Config {
  pub server: ServerConfig,
  pub storage: StorageConfig,
  pub tls: Option<TlsConfig>,
  pub log_level: tracing::Level,
  pub hooks: HashMap<String, HookConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("no --config path or GITHOOK_CONFIG provided")]
  MissingConfigPath,
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config file {path} as YAML: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml_ng::Error,
  },
  #[error("failed to parse GITHOOK_* environment variables: {0}")]
  Env(#[from] envy::Error),
  #[error("--tls-cert was given without --tls-key, or vice versa")]
  IncompleteTls,
  #[error("invalid bind address {0:?}: {1}")]
  InvalidAddress(String, std::net::AddrParseError),
}

/// A hooks file is just a map from hook name to its definition.
#[derive(Debug, Deserialize)]
struct HooksFile {
  #[serde(flatten)]
  hooks: HashMap<String, HookConfig>,
}

/// Resolves final configuration from CLI args, `GITHOOK_*`
/// environment variables, and the YAML hooks file, in that priority
/// order (CLI wins).
pub fn resolve(args: CliArgs) -> Result<Config, ConfigError> {
  let env: Env = envy::from_env()?;

  let config_path = args
    .config
    .or(env.githook_config)
    .ok_or(ConfigError::MissingConfigPath)?;

  let raw = std::fs::read_to_string(&config_path).map_err(|source| {
    ConfigError::Read {
      path: config_path.clone(),
      source,
    }
  })?;
  let hooks_file: HooksFile =
    serde_yaml_ng::from_str(&raw).map_err(|source| ConfigError::Parse {
      path: config_path.clone(),
      source,
    })?;

  let address = args
    .address
    .or(env.githook_address)
    .unwrap_or_else(|| "0.0.0.0".to_string());
  let bind_ip = address
    .parse::<IpAddr>()
    .map_err(|e| ConfigError::InvalidAddress(address, e))?;
  let port = args.port.or(env.githook_port).unwrap_or(9440);

  let command_log_dir =
    args.command_log_dir.or(env.githook_command_log_dir);
  let command_log_capacity = args
    .command_log_capacity
    .or(env.githook_command_log_capacity)
    .unwrap_or(1000);

  let worker_queue_size = args
    .worker_queue_size
    .or(env.githook_worker_queue_size)
    .unwrap_or(100);

  let tls_cert = args.tls_cert.or(env.githook_tls_cert);
  let tls_key = args.tls_key.or(env.githook_tls_key);
  let tls = match (tls_cert, tls_key) {
    (Some(cert), Some(key)) => Some(TlsConfig { cert, key }),
    (None, None) => None,
    _ => return Err(ConfigError::IncompleteTls),
  };

  let log_level = args.log_level.unwrap_or(tracing::Level::INFO);

  Ok(Config {
    server: ServerConfig {
      bind_ip,
      port,
      worker_queue_size,
    },
    storage: StorageConfig {
      command_log_dir,
      command_log_capacity,
    },
    tls,
    log_level,
    hooks: hooks_file.hooks,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  fn args(rest: &[&str]) -> CliArgs {
    let mut full = vec!["githook"];
    full.extend_from_slice(rest);
    CliArgs::parse_from(full)
  }

  #[test]
  fn missing_config_path_is_an_error() {
    assert!(std::env::var("GITHOOK_CONFIG").is_err());
    let result = resolve(args(&[]));
    assert!(matches!(result, Err(ConfigError::MissingConfigPath)));
  }

  #[test]
  fn loads_hooks_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hooks.yaml");
    std::fs::write(
      &path,
      "deploy:\n  type: github\n  path: /deploy\n  timeout: 30\n  cmd: [\"echo\", \"{{.Branch}}\"]\n",
    )
    .unwrap();

    let config =
      resolve(args(&["--config", path.to_str().unwrap()])).unwrap();
    assert_eq!(config.hooks.len(), 1);
    assert!(config.hooks.contains_key("deploy"));
    assert_eq!(config.server.port, 9440);
  }

  #[test]
  fn unrecognized_hook_type_still_loads_the_file() {
    // `HookConfig.kind` is a plain `String`, not the closed `HookType`
    // enum, precisely so a typo'd or unsupported provider name doesn't
    // fail deserialization of the whole hooks file. Rejecting it is
    // `hook::validate`'s job at assembly time, not the config loader's.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hooks.yaml");
    std::fs::write(
      &path,
      "deploy:\n  type: github\n  path: /deploy\n  timeout: 30\n  cmd: [\"echo\"]\nlegacy:\n  type: svn\n  path: /legacy\n  timeout: 30\n  cmd: [\"echo\"]\n",
    )
    .unwrap();

    let config =
      resolve(args(&["--config", path.to_str().unwrap()])).unwrap();
    assert_eq!(config.hooks.len(), 2);
    assert_eq!(config.hooks["legacy"].kind, "svn");
  }

  #[test]
  fn incomplete_tls_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hooks.yaml");
    std::fs::write(&path, "deploy:\n  type: github\n  path: /deploy\n  timeout: 30\n  cmd: [\"echo\"]\n").unwrap();

    let result = resolve(args(&[
      "--config",
      path.to_str().unwrap(),
      "--tls-cert",
      "/tmp/cert.pem",
    ]));
    assert!(matches!(result, Err(ConfigError::IncompleteTls)));
  }
}
