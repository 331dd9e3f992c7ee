//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] cairn_core::Error),

  #[error(transparent)]
  Summarizer(#[from] cairn_summary::SummarizerError),
}

/// Backend-agnostic mapping: every not-found kind becomes a 404 regardless
/// of which store produced it; everything else is a 500.
impl From<cairn_core::Error> for ApiError {
  fn from(error: cairn_core::Error) -> Self {
    if error.is_not_found() {
      Self::NotFound(error.to_string())
    } else {
      Self::Store(error)
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Summarizer(e) => (
        StatusCode::from_u16(e.suggested_status())
          .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        e.to_string(),
      ),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
