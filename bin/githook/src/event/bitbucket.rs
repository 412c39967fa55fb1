use serde::Deserialize;

use super::{ParseError, RepoEvent, require_fields};

#[derive(Debug, Deserialize, Default)]
struct Payload {
  #[serde(default)]
  push: Push,
}

#[derive(Debug, Deserialize, Default)]
struct Push {
  #[serde(default)]
  changes: Vec<Change>,
}

#[derive(Debug, Deserialize, Default)]
struct Change {
  #[serde(default)]
  new: ChangeTarget,
}

#[derive(Debug, Deserialize, Default)]
struct ChangeTarget {
  #[serde(default)]
  name: String,
  #[serde(default)]
  target: Target,
}

#[derive(Debug, Deserialize, Default)]
struct Target {
  #[serde(default)]
  hash: String,
  #[serde(default)]
  author: Author,
}

#[derive(Debug, Deserialize, Default)]
struct Author {
  #[serde(default)]
  user: Actor,
}

#[derive(Debug, Deserialize, Default)]
struct Actor {
  #[serde(default)]
  username: String,
}

/// Bitbucket-shaped parser: JSON body only. Requires `push.changes` to
/// be non-empty.
pub fn parse(body: &[u8]) -> Result<RepoEvent, ParseError> {
  let payload: Payload = serde_json::from_slice(body).map_err(|e| {
    ParseError::MalformedRequest(format!(
      "failed to decode bitbucket payload: {e}"
    ))
  })?;

  let change = payload.push.changes.into_iter().next().ok_or_else(|| {
    ParseError::MalformedRequest(
      "push.changes should contain at least 1 element, got 0".to_string(),
    )
  })?;

  require_fields(
    change.new.target.author.user.username,
    change.new.name,
    change.new.target.hash,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAYLOAD: &str = r#"{
    "push": {
      "changes": [
        {
          "new": {
            "name": "master",
            "target": {
              "hash": "ffcc6f559d9be8124711e94349c4fe26642d762b",
              "author": { "user": { "username": "vcabezas" } }
            }
          }
        }
      ]
    }
  }"#;

  #[test]
  fn parses_bitbucket_payload() {
    let event = parse(PAYLOAD.as_bytes()).unwrap();
    assert_eq!(event.branch, "master");
    assert_eq!(event.author, "vcabezas");
    assert_eq!(
      event.commit,
      "ffcc6f559d9be8124711e94349c4fe26642d762b"
    );
  }

  #[test]
  fn empty_changes_is_malformed_request() {
    let err = parse(br#"{"push": {"changes": []}}"#).unwrap_err();
    assert!(matches!(err, ParseError::MalformedRequest(_)));
  }

  #[test]
  fn missing_nested_fields_decode_to_malformed_payload() {
    let err =
      parse(br#"{"push": {"changes": [{"new": {}}]}}"#).unwrap_err();
    assert!(matches!(err, ParseError::MalformedPayload("branch")));
  }

  #[test]
  fn wrong_provider_payload_fails() {
    let err = parse(br#"{"ref": "refs/heads/master"}"#).unwrap_err();
    assert!(matches!(err, ParseError::MalformedRequest(_)));
  }
}
