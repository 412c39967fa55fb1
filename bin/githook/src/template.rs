//! Expands `{{.Author}}`, `{{.Branch}}`, `{{.Commit}}` field references
//! in a hook's command template against a [`RepoEvent`].
//!
//! This is deliberately not a general templating engine: the field set
//! is closed to the three `RepoEvent` attributes, arguments stay
//! separate (never joined into a shell string), and literal arguments
//! with no field reference pass through unchanged.

use crate::event::RepoEvent;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
  #[error("unknown template field {{{{.{0}}}}}")]
  UnknownField(String),
  #[error("malformed template argument {0:?}: unterminated {{{{")]
  Malformed(String),
}

/// Expands every argument in `cmd` against `event`, returning the
/// parallel list of expanded arguments.
pub fn expand(
  cmd: &[String],
  event: &RepoEvent,
) -> Result<Vec<String>, TemplateError> {
  cmd.iter().map(|arg| expand_arg(arg, event)).collect()
}

fn expand_arg(
  arg: &str,
  event: &RepoEvent,
) -> Result<String, TemplateError> {
  let mut out = String::with_capacity(arg.len());
  let mut rest = arg;

  while let Some(start) = rest.find("{{") {
    out.push_str(&rest[..start]);
    let after_open = &rest[start + 2..];
    let Some(end) = after_open.find("}}") else {
      return Err(TemplateError::Malformed(arg.to_string()));
    };
    let field = after_open[..end].trim();
    out.push_str(&resolve_field(field, event, arg)?);
    rest = &after_open[end + 2..];
  }
  out.push_str(rest);

  Ok(out)
}

fn resolve_field(
  field: &str,
  event: &RepoEvent,
  arg: &str,
) -> Result<String, TemplateError> {
  match field.strip_prefix('.') {
    Some("Author") => Ok(event.author.clone()),
    Some("Branch") => Ok(event.branch.clone()),
    Some("Commit") => Ok(event.commit.clone()),
    Some(other) => Err(TemplateError::UnknownField(other.to_string())),
    None => Err(TemplateError::Malformed(arg.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event() -> RepoEvent {
    RepoEvent {
      author: "jsmith".to_string(),
      branch: "master".to_string(),
      commit: "abc123".to_string(),
    }
  }

  #[test]
  fn substitutes_known_fields() {
    let cmd = vec![
      "echo".to_string(),
      "{{.Branch}} by {{.Author}} at {{.Commit}}".to_string(),
    ];
    let expanded = expand(&cmd, &event()).unwrap();
    assert_eq!(expanded, vec!["echo", "master by jsmith at abc123"]);
  }

  #[test]
  fn literal_arguments_pass_through() {
    let cmd = vec!["--flag".to_string(), "value".to_string()];
    let expanded = expand(&cmd, &event()).unwrap();
    assert_eq!(expanded, cmd);
  }

  #[test]
  fn unknown_field_fails() {
    let cmd = vec!["{{.Nope}}".to_string()];
    let err = expand(&cmd, &event()).unwrap_err();
    assert_eq!(err, TemplateError::UnknownField("Nope".to_string()));
  }

  #[test]
  fn malformed_template_fails() {
    let cmd = vec!["{{.Branch".to_string()];
    assert!(matches!(
      expand(&cmd, &event()),
      Err(TemplateError::Malformed(_))
    ));
  }

  #[test]
  fn expansion_is_deterministic() {
    let cmd = vec!["{{.Branch}}".to_string()];
    let a = expand(&cmd, &event()).unwrap();
    let b = expand(&cmd, &event()).unwrap();
    assert_eq!(a, b);
  }
}
