//! End-to-end tests of the HTTP surface, driven through the router without a socket.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{header, Method, Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use quiz_backend::config::ServiceConfig;
use quiz_backend::routes::build_router;
use quiz_backend::scorer::ScoreScale;
use quiz_backend::snapshot::SnapshotStore;
use quiz_backend::state::AppState;
use quiz_backend::store::InMemoryStore;

const PASSWORD: &str = "correct horse";

fn app_with(cfg: ServiceConfig) -> Router {
  build_router(Arc::new(AppState::new(&cfg)))
}

fn app() -> Router {
  app_with(ServiceConfig::with_password(PASSWORD))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(v) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(v.to_string())),
    None => req.body(Body::empty()),
  }
  .unwrap();

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn login(app: &Router) -> String {
  let (status, body) = send(app, Method::POST, "/admin/login", None, Some(json!({ "password": PASSWORD }))).await;
  assert_eq!(status, StatusCode::OK);
  body["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, statement: &str, answer: &str) -> Value {
  let (status, body) = send(
    app,
    Method::POST,
    "/questions",
    Some(token),
    Some(json!({ "statement": statement, "correct_answer": answer })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body
}

#[tokio::test]
async fn health_is_open() {
  let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn login_rejects_wrong_password() {
  let app = app();
  let (status, body) = send(&app, Method::POST, "/admin/login", None, Some(json!({ "password": "wrong-password" }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "unauthorized");

  let (status, _) = send(&app, Method::POST, "/admin/login", None, Some(json!({}))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
  let app = app();
  let payload = json!({ "statement": "s", "correct_answer": "a" });

  let (status, _) = send(&app, Method::POST, "/questions", None, Some(payload.clone())).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&app, Method::POST, "/questions", Some("forged"), Some(payload.clone())).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&app, Method::PUT, "/questions/any", None, Some(payload)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&app, Method::DELETE, "/questions/any", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn crud_round_trip() {
  let app = app();
  let token = login(&app).await;

  let created = create(&app, &token, "What does `cargo` do?", "builds and manages Rust packages").await;
  let id = created["question_id"].as_str().unwrap().to_string();
  assert_eq!(created["statement"], "What does `cargo` do?");

  let (status, listed) = send(&app, Method::GET, "/questions", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed[&id], created);

  let (status, updated) = send(
    &app,
    Method::PUT,
    &format!("/questions/{id}"),
    Some(&token),
    Some(json!({ "statement": "What is cargo?", "correct_answer": "the Rust package manager" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated, json!({ "question_id": id, "statement": "What is cargo?", "correct_answer": "the Rust package manager" }));

  let (status, _) = send(&app, Method::DELETE, &format!("/questions/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, listed) = send(&app, Method::GET, "/questions", Some(&token), None).await;
  assert!(listed.get(&id).is_none());

  let (status, body) = send(&app, Method::DELETE, &format!("/questions/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_inputs_are_bad_requests() {
  let app = app();
  let token = login(&app).await;

  let (status, body) = send(&app, Method::POST, "/questions", Some(&token), Some(json!({ "statement": "", "correct_answer": "a" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "validation");

  let (status, _) = send(&app, Method::POST, "/questions", Some(&token), Some(json!({ "statement": "only" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let req = Request::builder()
    .method(Method::POST)
    .uri("/questions")
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{ not json"))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let created = create(&app, &token, "s", "a").await;
  let id = created["question_id"].as_str().unwrap();
  let (status, _) = send(&app, Method::PUT, &format!("/questions/{id}"), Some(&token), Some(json!({ "statement": "s", "correct_answer": "" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&app, Method::PUT, "/questions/unknown", Some(&token), Some(json!({ "statement": "s", "correct_answer": "a" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_listing_hides_answers() {
  let app = app();
  let token = login(&app).await;
  let created = create(&app, &token, "Name the Rust mascot", "Ferris the crab").await;
  let id = created["question_id"].as_str().unwrap().to_string();

  let (status, listed) = send(&app, Method::GET, "/questions", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed[&id], json!({ "question_id": id, "statement": "Name the Rust mascot" }));

  // An unknown token is treated as anonymous rather than refused.
  let (status, listed) = send(&app, Method::GET, "/questions", Some("stale"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(listed[&id].get("correct_answer").is_none());
}

#[tokio::test]
async fn expose_answers_restores_full_listing() {
  let mut cfg = ServiceConfig::with_password(PASSWORD);
  cfg.expose_answers = true;
  let app = app_with(cfg);
  let token = login(&app).await;
  let created = create(&app, &token, "s", "a").await;
  let id = created["question_id"].as_str().unwrap().to_string();

  let (_, listed) = send(&app, Method::GET, "/questions", None, None).await;
  assert_eq!(listed[&id], created);
}

#[tokio::test]
async fn evaluate_scores_answers() {
  let app = app();
  let token = login(&app).await;
  let created = create(&app, &token, "What enforces aliasing rules?", "the borrow checker").await;
  let id = created["question_id"].as_str().unwrap();
  let uri = format!("/questions/evaluate/{id}");

  let (status, body) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "the borrow checker" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "score": 100 }));

  let (_, close) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "borrow checker" }))).await;
  let (_, far) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "garbage collection" }))).await;
  assert!(close["score"].as_u64().unwrap() >= far["score"].as_u64().unwrap());
  assert!(close["score"].as_u64().unwrap() < 100);
  assert_eq!(far["score"], 0);

  let (status, _) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&app, Method::POST, "/questions/evaluate/unknown", None, Some(json!({ "answer": "x" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn banded_scale_uses_coarse_scores() {
  let mut cfg = ServiceConfig::with_password(PASSWORD);
  cfg.scale = ScoreScale::Banded;
  let app = app_with(cfg);
  let token = login(&app).await;
  let created = create(&app, &token, "q", "ownership and borrowing rules").await;
  let uri = format!("/questions/evaluate/{}", created["question_id"].as_str().unwrap());

  let (_, body) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "ownership rules" }))).await;
  assert_eq!(body["score"], 90);
  let (_, body) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "ownership and borrowing rules" }))).await;
  assert_eq!(body["score"], 100);
  let (_, body) = send(&app, Method::POST, &uri, None, Some(json!({ "answer": "ownership" }))).await;
  assert_eq!(body["score"], 70);
}

#[tokio::test]
async fn logout_revokes_token() {
  let app = app();
  let token = login(&app).await;
  let (status, _) = send(&app, Method::POST, "/admin/logout", Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, Method::POST, "/questions", Some(&token), Some(json!({ "statement": "s", "correct_answer": "a" }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = send(&app, Method::POST, "/admin/logout", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn undecodable_path_id_gets_json_error() {
  let app = app();
  let (status, body) = send(&app, Method::POST, "/questions/evaluate/%FF", None, Some(json!({ "answer": "x" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn mutations_are_on_disk_before_the_response() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("questions.json");
  let cfg = ServiceConfig::with_password(PASSWORD);
  let store = Arc::new(SnapshotStore::new(InMemoryStore::new(), path.clone()));
  let app = build_router(Arc::new(AppState::with_store(&cfg, store)));
  let token = login(&app).await;

  let created = create(&app, &token, "Who maintains crates.io?", "the Rust project").await;
  let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(saved, json!([created]));
}

#[tokio::test]
async fn storage_failure_is_a_generic_server_error() {
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("not-a-dir");
  std::fs::write(&blocker, "").unwrap();
  let cfg = ServiceConfig::with_password(PASSWORD);
  let store = Arc::new(SnapshotStore::new(InMemoryStore::new(), blocker.join("questions.json")));
  let app = build_router(Arc::new(AppState::with_store(&cfg, store)));
  let token = login(&app).await;

  let (status, body) = send(&app, Method::POST, "/questions", Some(&token), Some(json!({ "statement": "s", "correct_answer": "a" }))).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, json!({ "error": "internal", "message": "Internal server error." }));

  let (_, listed) = send(&app, Method::GET, "/questions", Some(&token), None).await;
  assert_eq!(listed, json!({}));
}
