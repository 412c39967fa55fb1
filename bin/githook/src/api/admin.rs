use std::sync::Arc;

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::{cmdlog::CommandLog, response::Envelope, server::AppState};

pub async fn hello() -> Envelope<()> {
  Envelope {
    status: 200,
    msg: "Hello from githook listener".to_string(),
    body: None,
  }
}

#[derive(Debug, Deserialize)]
pub struct CmdLogQuery {
  count: Option<i64>,
}

pub async fn cmdlog(
  State(state): State<Arc<AppState>>,
  Query(query): Query<CmdLogQuery>,
) -> axum::response::Response {
  use axum::response::IntoResponse;

  let n = query.count.unwrap_or(-1);
  match state.cmd_log.get_results(n).await {
    Ok(results) => Envelope::ok("ok", results).into_response(),
    Err(e) => Envelope::<()>::error(
      axum::http::StatusCode::INTERNAL_SERVER_ERROR,
      format!("StorageError: {e}"),
    )
    .into_response(),
  }
}
