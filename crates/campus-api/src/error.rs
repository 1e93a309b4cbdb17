//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client-visible messages are stable and non-leaking: persistence and
//! identity-provider detail is logged server-side and replaced with an
//! opaque message before it crosses the wire.

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
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthenticated(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<campus_core::Error> for ApiError {
  fn from(e: campus_core::Error) -> Self {
    use campus_core::Error as E;
    match e {
      E::Unauthenticated(f) => ApiError::Unauthenticated(f.to_string()),
      // Authorization boundaries, not faults.
      E::DomainNotAllowed
      | E::NotPreRegistered
      | E::RoleNotPermitted(_)
      | E::OwnershipMismatch => ApiError::Forbidden(e.to_string()),
      E::RecordNotFound | E::CourseNotFound(_) => ApiError::NotFound(e.to_string()),
      E::Conflict(_) | E::CourseInUse(_) => ApiError::Conflict(e.to_string()),
      E::InvalidEmail(_) | E::CourseCardinality { .. } => {
        ApiError::BadRequest(e.to_string())
      }
      E::IdentityProvider(detail) => {
        tracing::error!(%detail, "identity provider fault");
        ApiError::Internal("identity provider unavailable".into())
      }
      E::Store(detail) => {
        tracing::error!(%detail, "persistence fault");
        ApiError::Internal("server error".into())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
