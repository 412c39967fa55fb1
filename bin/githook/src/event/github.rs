use axum::http::HeaderMap;
use serde::Deserialize;

use super::{ParseError, RepoEvent, branch_from_ref, require_fields};

#[derive(Debug, Deserialize, Default)]
struct Payload {
  #[serde(rename = "ref", default)]
  git_ref: String,
  #[serde(default)]
  head_commit: HeadCommit,
}

#[derive(Debug, Deserialize, Default)]
struct HeadCommit {
  #[serde(default)]
  id: String,
  #[serde(default)]
  author: CommitAuthor,
}

#[derive(Debug, Deserialize, Default)]
struct CommitAuthor {
  #[serde(default)]
  username: String,
}

/// Accepts a JSON body, or a `application/x-www-form-urlencoded` body
/// whose `payload` field holds the JSON string.
pub fn parse(
  headers: &HeaderMap,
  body: &[u8],
) -> Result<RepoEvent, ParseError> {
  let content_type = headers
    .get(axum::http::header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();

  let json = if content_type.starts_with(
    "application/x-www-form-urlencoded",
  ) {
    extract_form_payload(body)?
  } else {
    body.to_vec()
  };

  if json.is_empty() {
    return Err(ParseError::MalformedRequest(
      "request body is empty".to_string(),
    ));
  }

  let payload: Payload = serde_json::from_slice(&json).map_err(|e| {
    ParseError::MalformedRequest(format!(
      "failed to decode github payload: {e}"
    ))
  })?;

  require_fields(
    payload.head_commit.author.username,
    branch_from_ref(&payload.git_ref),
    payload.head_commit.id,
  )
}

fn extract_form_payload(body: &[u8]) -> Result<Vec<u8>, ParseError> {
  let pairs: Vec<(String, String)> =
    serde_urlencoded::from_bytes(body).map_err(|e| {
      ParseError::MalformedRequest(format!(
        "failed to decode urlencoded form: {e}"
      ))
    })?;
  pairs
    .into_iter()
    .find(|(k, _)| k == "payload")
    .map(|(_, v)| v.into_bytes())
    .ok_or_else(|| {
      ParseError::MalformedRequest(
        "urlencoded form missing 'payload' field".to_string(),
      )
    })
}
