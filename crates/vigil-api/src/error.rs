//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"status":"error","message":"..."}` so that
//! callers (the chat bot in particular) can relay `message` verbatim.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] vigil_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Domain(vigil_core::Error::MalformedInput(rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use vigil_core::Error as E;

    let (status, message) = match &self {
      ApiError::Domain(E::NotFound(_)) => {
        (StatusCode::NOT_FOUND, "not found".to_owned())
      }
      ApiError::Domain(E::AlreadyExists(_)) => {
        (StatusCode::CONFLICT, "already registered".to_owned())
      }
      ApiError::Domain(E::MalformedInput(m)) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Domain(E::UpstreamUnreachable(m)) => {
        (StatusCode::BAD_GATEWAY, m.clone())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "registry failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
  }
}
