//! HTTP endpoint handlers. These are thin wrappers that forward to the store, scorer
//! and auth gate, and turn component errors into status codes via `ServiceError`.

use std::sync::Arc;

use axum::{
  extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
  },
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::protocol::*;
use crate::routes::guard::{AdminToken, MaybeAdmin};
use crate::state::AppState;

/// Unwrap a JSON body, reporting malformed payloads as validation errors.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ServiceResult<T> {
  payload
    .map(|Json(v)| v)
    .map_err(|e| ServiceError::Validation(format!("Invalid request body: {}", e.body_text())))
}

/// Unwrap the `{id}` path segment with the same JSON error body as everything else.
fn path_id(path: Result<Path<String>, PathRejection>) -> ServiceResult<String> {
  path
    .map(|Path(id)| id)
    .map_err(|e| ServiceError::Validation(format!("Invalid question id: {}", e.body_text())))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_questions(
  State(state): State<Arc<AppState>>,
  MaybeAdmin(is_admin): MaybeAdmin,
) -> impl IntoResponse {
  let questions = state.store.list().await;
  let full = is_admin || state.expose_answers;
  info!(target: "question", count = questions.len(), full, "HTTP questions listed");
  Json(to_list_out(questions, full))
}

#[instrument(level = "info", skip_all)]
pub async fn http_create_question(
  State(state): State<Arc<AppState>>,
  _admin: AdminToken,
  payload: Result<Json<QuestionIn>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
  let input = body(payload)?;
  let q = state.store.create(&input.statement, &input.correct_answer).await?;
  Ok((StatusCode::CREATED, Json(q)))
}

#[instrument(level = "info", skip(state, _admin, path, payload))]
pub async fn http_update_question(
  State(state): State<Arc<AppState>>,
  _admin: AdminToken,
  path: Result<Path<String>, PathRejection>,
  payload: Result<Json<QuestionIn>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
  let question_id = path_id(path)?;
  let input = body(payload)?;
  let q = state.store.update(&question_id, &input.statement, &input.correct_answer).await?;
  Ok(Json(q))
}

#[instrument(level = "info", skip(state, _admin, path))]
pub async fn http_delete_question(
  State(state): State<Arc<AppState>>,
  _admin: AdminToken,
  path: Result<Path<String>, PathRejection>,
) -> ServiceResult<StatusCode> {
  let question_id = path_id(path)?;
  state.store.delete(&question_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, path, payload))]
pub async fn http_evaluate(
  State(state): State<Arc<AppState>>,
  path: Result<Path<String>, PathRejection>,
  payload: Result<Json<EvaluateIn>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
  let question_id = path_id(path)?;
  let input = body(payload)?;
  let score = state.scorer.evaluate(state.store.as_ref(), &question_id, &input.answer).await?;
  info!(target: "question", %question_id, score, "HTTP answer evaluated");
  Ok(Json(EvaluateOut { score }))
}

#[instrument(level = "info", skip_all)]
pub async fn http_admin_login(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<LoginIn>, JsonRejection>,
) -> ServiceResult<impl IntoResponse> {
  let input = body(payload)?;
  let token = state.auth.login(&input.password).await?;
  Ok(Json(LoginOut { token }))
}

#[instrument(level = "info", skip_all)]
pub async fn http_admin_logout(
  State(state): State<Arc<AppState>>,
  AdminToken(token): AdminToken,
) -> StatusCode {
  state.auth.revoke(&token).await;
  StatusCode::NO_CONTENT
}
