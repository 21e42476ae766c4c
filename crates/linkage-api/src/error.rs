//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use linkage_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The body could not be read as JSON of the expected shape.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] linkage_core::Error),
}

impl ApiError {
  /// Lift a store backend error into its core classification.
  pub fn store<E: Into<linkage_core::Error>>(e: E) -> Self { Self::Core(e.into()) }

  pub fn kind(&self) -> ErrorKind {
    match self {
      ApiError::BadRequest(_) => ErrorKind::InvalidInput,
      ApiError::Core(e) => e.kind(),
    }
  }

  pub fn is_retryable(&self) -> bool {
    matches!(self, ApiError::Core(e) if e.is_retryable())
  }
}

fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::StorageUnavailable | ErrorKind::LockTimeout => {
      StatusCode::SERVICE_UNAVAILABLE
    }
    ErrorKind::ConsistencyViolation => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.kind();
    let message = self.to_string();
    if kind == ErrorKind::ConsistencyViolation {
      tracing::error!(%kind, "{message}");
    } else if self.is_retryable() {
      tracing::warn!(%kind, "{message}");
    } else {
      tracing::debug!(%kind, "{message}");
    }
    (
      status_for(kind),
      Json(json!({ "error": message, "kind": kind })),
    )
      .into_response()
  }
}
