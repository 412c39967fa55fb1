use serde::Deserialize;

use super::{ParseError, RepoEvent, branch_from_ref, require_fields};

#[derive(Debug, Deserialize, Default)]
struct Payload {
  #[serde(rename = "ref", default)]
  git_ref: String,
  #[serde(default)]
  checkout_sha: String,
  #[serde(default)]
  user_username: String,
}

/// GitLab-shaped parser: JSON body only.
pub fn parse(body: &[u8]) -> Result<RepoEvent, ParseError> {
  let payload: Payload = serde_json::from_slice(body).map_err(|e| {
    ParseError::MalformedRequest(format!(
      "failed to decode gitlab payload: {e}"
    ))
  })?;

  require_fields(
    payload.user_username,
    branch_from_ref(&payload.git_ref),
    payload.checkout_sha,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAYLOAD: &str = r#"{
    "ref": "refs/heads/master",
    "checkout_sha": "da1560886d4f094c3e6c9ef40349f7d38b5d27d7",
    "user_username": "jsmith"
  }"#;

  #[test]
  fn parses_gitlab_payload() {
    let event = parse(PAYLOAD.as_bytes()).unwrap();
    assert_eq!(event.branch, "master");
    assert_eq!(event.author, "jsmith");
    assert_eq!(
      event.commit,
      "da1560886d4f094c3e6c9ef40349f7d38b5d27d7"
    );
  }

  #[test]
  fn empty_body_is_malformed() {
    assert!(parse(b"").is_err());
  }

  #[test]
  fn missing_field_is_malformed_payload() {
    let err = parse(br#"{"ref": "refs/heads/master"}"#).unwrap_err();
    assert!(matches!(err, ParseError::MalformedPayload("commit")));
  }
}
