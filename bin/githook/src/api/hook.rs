use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Query, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  event::{self, ParseError},
  hook::Hook,
  response::Envelope,
  template::{self, TemplateError},
  worker::CommandJob,
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
  #[error("unable to parse event: {0}")]
  Parse(#[from] ParseError),
  #[error("repository type is unknown")]
  MalformedPayload,
  #[error("unable to expand command template: {0}")]
  Template(#[from] TemplateError),
  #[error("hook queue is full, command was not accepted")]
  QueueFull,
  #[error("worker closed the response channel before delivering a result")]
  ResponseLost,
}

impl IntoResponse for DispatchError {
  fn into_response(self) -> Response {
    Envelope::<()>::error(
      StatusCode::INTERNAL_SERVER_ERROR,
      self.to_string(),
    )
    .into_response()
  }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DispatchBody {
  Command(String),
  Result(githook_command::CommandResult),
}

/// Per-hook request handler: parses the provider payload, expands the
/// command template, enqueues the job, and (in `sync` mode) waits for
/// the result before responding.
pub async fn handle(
  State(hook): State<Arc<(Hook, crate::worker::JobSender)>>,
  Query(query): Query<HashMap<String, String>>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<Envelope<DispatchBody>, DispatchError> {
  let (hook, sender) = hook.as_ref();

  let repo_event = event::parse(hook.kind, &headers, &body)?;
  // Guards against a parser returning a zero value on an unexpected
  // shape rather than an explicit error.
  if repo_event.branch.is_empty() {
    return Err(DispatchError::MalformedPayload);
  }

  let cmd = template::expand(&hook.cmd, &repo_event)?;

  let sync = query.contains_key("sync");
  let id = Uuid::new_v4();

  let (response_tx, response_rx) = if sync {
    let (tx, rx) = tokio::sync::oneshot::channel();
    (Some(tx), Some(rx))
  } else {
    (None, None)
  };

  let job = CommandJob {
    id,
    cmd: cmd.clone(),
    timeout_secs: hook.timeout_secs,
    response: response_tx,
  };

  sender.try_send(job).map_err(|_| DispatchError::QueueFull)?;

  let command_str = cmd.join(" ");

  if let Some(rx) = response_rx {
    let result = rx.await.map_err(|_| DispatchError::ResponseLost)?;
    return Ok(Envelope::ok(
      format!("command '{command_str}' accepted with result"),
      DispatchBody::Result(result),
    ));
  }

  Ok(Envelope::ok(
    format!("command '{command_str}' accepted"),
    DispatchBody::Command(command_str),
  ))
}
