//! Error taxonomy shared by the store, scorer, auth gate and HTTP layer.
//!
//! Component errors are recovered at the HTTP boundary and mapped onto status codes.
//! `Internal` details are logged but never sent to the caller.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
  /// Malformed or empty input.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Unknown question id.
  #[error("not found: {0}")]
  NotFound(String),

  /// Bad password, or a missing/invalid/expired token.
  #[error("unauthorized: {0}")]
  Auth(String),

  /// Anything else (storage unavailable, serialization failure, ...).
  #[error("internal error: {0}")]
  Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
  pub fn status(&self) -> StatusCode {
    match self {
      ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
      ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
      ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
      ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      ServiceError::Validation(_) => "validation",
      ServiceError::NotFound(_) => "not_found",
      ServiceError::Auth(_) => "unauthorized",
      ServiceError::Internal(_) => "internal",
    }
  }

  /// Message that is safe to show to the caller.
  fn public_message(&self) -> String {
    match self {
      ServiceError::Validation(m) | ServiceError::NotFound(m) | ServiceError::Auth(m) => m.clone(),
      ServiceError::Internal(_) => "Internal server error.".into(),
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error: &'static str,
  message: String,
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    if let ServiceError::Internal(detail) = &self {
      error!(target: "quiz_backend", %detail, "Internal error while serving request");
    }
    let body = ErrorBody { error: self.kind(), message: self.public_message() };
    (self.status(), Json(body)).into_response()
  }
}

/// Startup failures. These are fatal in `main`.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: String, source: std::io::Error },

  #[error("failed to parse config file {path}: {source}")]
  Parse { path: String, source: toml::de::Error },

  #[error("invalid value for {key}: {value}")]
  InvalidValue { key: &'static str, value: String },

  #[error("no admin password configured (set ADMIN_PASSWORD or [auth].admin_password)")]
  MissingAdminPassword,
}
