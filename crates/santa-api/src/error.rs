//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. The message is shown to the user
/// verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Map a domain error to its response.
  ///
  /// Storage failures never leak their cause; the client sees
  /// `storage_message` instead.
  pub fn from_core(e: santa_core::Error, storage_message: &str) -> Self {
    use santa_core::Error as E;
    match e {
      E::Validation(_) | E::AlreadyAssigned => ApiError::BadRequest(e.to_string()),
      E::Auth => ApiError::Unauthorized(e.to_string()),
      E::RegistryMismatch(m) => ApiError::Forbidden(m.to_string()),
      E::ExhaustedPool => ApiError::NotFound(e.to_string()),
      E::Hashing(_) | E::Storage(_) | E::Inconsistent(_) => {
        ApiError::Internal(storage_message.to_owned())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
