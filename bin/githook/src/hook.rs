use serde::Deserialize;

/// Repository provider a hook is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookType {
  Github,
  Gitlab,
  Bitbucket,
}

impl std::fmt::Display for HookType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      HookType::Github => "github",
      HookType::Gitlab => "gitlab",
      HookType::Bitbucket => "bitbucket",
    };
    write!(f, "{s}")
  }
}

impl HookType {
  /// Parses a hook's configured `type` string, returning `None` for
  /// anything outside `{github, gitlab, bitbucket}` so the caller can
  /// turn that into a per-hook validation skip rather than a hard
  /// deserialization failure.
  fn parse(s: &str) -> Option<Self> {
    match s {
      "github" => Some(HookType::Github),
      "gitlab" => Some(HookType::Gitlab),
      "bitbucket" => Some(HookType::Bitbucket),
      _ => None,
    }
  }
}

/// Raw hook definition as it appears in the configuration file, before
/// validation and default coercion. `kind` is kept as a plain `String`
/// rather than `HookType` so an unrecognized provider name fails
/// `validate` as a per-hook skip rather than aborting the whole config
/// file's deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct HookConfig {
  #[serde(rename = "type")]
  pub kind: String,
  pub path: String,
  pub timeout: i64,
  pub cmd: Vec<String>,
  #[serde(default)]
  pub concurrency: i64,
}

/// A validated, immutable hook binding an HTTP path to a command
/// template, a provider type, a timeout and a concurrency level.
#[derive(Debug, Clone)]
pub struct Hook {
  pub name: String,
  pub kind: HookType,
  pub path: String,
  pub timeout_secs: u64,
  pub cmd: Vec<String>,
  pub concurrency: usize,
}

/// Why a configured hook was rejected at assembly time. Assembly never
/// aborts on these; each is logged at warn-level and the hook is
/// skipped.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HookValidationError {
  #[error("path {0:?} is already handled by another hook")]
  DuplicatePath(String),
  #[error("unknown hook type {0:?}, expected github, gitlab or bitbucket")]
  UnknownType(String),
  #[error("path must start with '/' and not be under /admin, got {0:?}")]
  InvalidPath(String),
  #[error("timeout must be greater than 0, got {0}")]
  NonPositiveTimeout(i64),
  #[error("cmd must be a non-empty list of template strings")]
  EmptyCmd,
  #[error("concurrency must be >= 0, got {0}")]
  NegativeConcurrency(i64),
}

/// Validates a single raw hook definition, coercing `concurrency == 0`
/// to `1` per spec. Does not check for duplicate paths across hooks;
/// that is the caller's responsibility since it requires the full set.
pub fn validate(
  name: &str,
  raw: HookConfig,
) -> Result<Hook, HookValidationError> {
  let kind = HookType::parse(&raw.kind)
    .ok_or_else(|| HookValidationError::UnknownType(raw.kind.clone()))?;
  if !raw.path.starts_with('/') || raw.path.starts_with("/admin") {
    return Err(HookValidationError::InvalidPath(raw.path));
  }
  if raw.timeout <= 0 {
    return Err(HookValidationError::NonPositiveTimeout(raw.timeout));
  }
  if raw.cmd.is_empty() {
    return Err(HookValidationError::EmptyCmd);
  }
  let concurrency = if raw.concurrency < 0 {
    return Err(HookValidationError::NegativeConcurrency(raw.concurrency));
  } else if raw.concurrency == 0 {
    1
  } else {
    raw.concurrency as usize
  };

  Ok(Hook {
    name: name.to_string(),
    kind,
    path: raw.path,
    timeout_secs: raw.timeout as u64,
    cmd: raw.cmd,
    concurrency,
  })
}
