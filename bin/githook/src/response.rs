use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{ status, msg, body }` envelope wrapping every HTTP response.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
  pub status: u16,
  pub msg: String,
  pub body: Option<T>,
}

impl<T: Serialize> Envelope<T> {
  pub fn ok(msg: impl Into<String>, body: T) -> Self {
    Self {
      status: 200,
      msg: msg.into(),
      body: Some(body),
    }
  }

  pub fn error(status: StatusCode, msg: impl Into<String>) -> Self {
    Self {
      status: status.as_u16(),
      msg: msg.into(),
      body: None,
    }
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(self)).into_response()
  }
}
