//! Maps an incoming webhook request body to the canonical
//! [`RepoEvent`], one parser per repository-hosting provider.

use axum::http::HeaderMap;
use serde::Serialize;

use crate::hook::HookType;

mod bitbucket;
mod github;
mod gitlab;

/// The canonical `{Author, Branch, Commit}` triple extracted from any
/// provider payload.
#[derive(Debug, Clone, Serialize)]
pub struct RepoEvent {
  pub author: String,
  pub branch: String,
  pub commit: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
  #[error("malformed request: {0}")]
  MalformedRequest(String),
  #[error("malformed payload: missing field {0}")]
  MalformedPayload(&'static str),
}

/// Parses `body` (plus `content_type`, needed only by the GitHub-shaped
/// parser) into a [`RepoEvent`] according to `kind`.
pub fn parse(
  kind: HookType,
  headers: &HeaderMap,
  body: &[u8],
) -> Result<RepoEvent, ParseError> {
  if body.is_empty() {
    return Err(ParseError::MalformedRequest(
      "request body is empty".to_string(),
    ));
  }

  match kind {
    HookType::Github => github::parse(headers, body),
    HookType::Gitlab => gitlab::parse(body),
    HookType::Bitbucket => bitbucket::parse(body),
  }
}

/// Builds a [`RepoEvent`] from the three extracted fields, failing
/// with [`ParseError::MalformedPayload`] naming the first empty one.
fn require_fields(
  author: String,
  branch: String,
  commit: String,
) -> Result<RepoEvent, ParseError> {
  if branch.is_empty() {
    return Err(ParseError::MalformedPayload("branch"));
  }
  if commit.is_empty() {
    return Err(ParseError::MalformedPayload("commit"));
  }
  if author.is_empty() {
    return Err(ParseError::MalformedPayload("author"));
  }
  Ok(RepoEvent {
    author,
    branch,
    commit,
  })
}

/// Extracts the last `/`-separated segment of a git ref, e.g.
/// `refs/heads/master` -> `master`.
fn branch_from_ref(git_ref: &str) -> String {
  git_ref
    .rsplit('/')
    .next()
    .unwrap_or(git_ref)
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn branch_from_ref_takes_last_segment() {
    assert_eq!(branch_from_ref("refs/heads/master"), "master");
    assert_eq!(branch_from_ref("refs/heads/feature/thing"), "thing");
    assert_eq!(branch_from_ref("master"), "master");
  }

  #[test]
  fn empty_body_is_malformed_request() {
    let err = parse(HookType::Github, &HeaderMap::new(), b"")
      .unwrap_err();
    assert!(matches!(err, ParseError::MalformedRequest(_)));
  }
}
