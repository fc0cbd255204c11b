//! Bearer-token extractors gating the admin endpoints.
//!
//! `AdminToken` rejects with 401 when the `Authorization: Bearer <token>` header is
//! missing, malformed, or carries a token the auth gate does not accept.
//! `MaybeAdmin` never rejects; it only reports whether a valid token was presented.

use std::{convert::Infallible, sync::Arc};

use axum::{
  async_trait,
  extract::FromRequestParts,
  http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::error::ServiceError;
use crate::state::AppState;

/// A verified admin bearer token.
#[derive(Debug)]
pub struct AdminToken(pub String);

/// Whether the caller presented a valid admin token.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAdmin(pub bool);

/// Pull the token out of `Authorization: Bearer <token>`. Scheme match is case-insensitive.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
  let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminToken {
  type Rejection = ServiceError;

  async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts).ok_or_else(|| ServiceError::Auth("Missing bearer token.".into()))?;
    if state.auth.verify(token).await {
      Ok(AdminToken(token.to_string()))
    } else {
      debug!(target: "auth", path = %parts.uri.path(), "Rejected invalid or expired admin token");
      Err(ServiceError::Auth("Invalid or expired token.".into()))
    }
  }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeAdmin {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
    let ok = match bearer_token(parts) {
      Some(token) => state.auth.verify(token).await,
      None => false,
    };
    Ok(MaybeAdmin(ok))
  }
}
