//! Question store: the injectable persistence seam and its in-memory implementation.
//!
//! Every mutation runs under a single write-lock acquisition, so concurrent
//! create/update/delete calls take effect in some total order. Reads only take the
//! shared lock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{validate_fields, Question};
use crate::error::{ServiceError, ServiceResult};

#[async_trait]
pub trait QuestionStore: Send + Sync {
  /// All current questions keyed by id. Order is not meaningful.
  async fn list(&self) -> HashMap<String, Question>;

  async fn get(&self, question_id: &str) -> ServiceResult<Question>;

  /// Validate and insert a new question under a freshly generated id.
  async fn create(&self, statement: &str, correct_answer: &str) -> ServiceResult<Question>;

  /// Insert a fully formed record (seed bank, snapshot restore). Duplicate ids are rejected.
  async fn insert(&self, question: Question) -> ServiceResult<Question>;

  /// Full replace of both text fields.
  async fn update(&self, question_id: &str, statement: &str, correct_answer: &str) -> ServiceResult<Question>;

  async fn delete(&self, question_id: &str) -> ServiceResult<()>;
}

fn not_found(question_id: &str) -> ServiceError {
  ServiceError::NotFound(format!("Unknown question id: {}", question_id))
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
  by_id: RwLock<HashMap<String, Question>>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn len(&self) -> usize {
    self.by_id.read().await.len()
  }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
  async fn list(&self) -> HashMap<String, Question> {
    self.by_id.read().await.clone()
  }

  async fn get(&self, question_id: &str) -> ServiceResult<Question> {
    self.by_id.read().await.get(question_id).cloned().ok_or_else(|| not_found(question_id))
  }

  #[instrument(level = "debug", skip_all)]
  async fn create(&self, statement: &str, correct_answer: &str) -> ServiceResult<Question> {
    let (statement, correct_answer) = validate_fields(statement, correct_answer)?;
    let mut by_id = self.by_id.write().await;
    let mut question_id = Uuid::new_v4().to_string();
    while by_id.contains_key(&question_id) {
      question_id = Uuid::new_v4().to_string();
    }
    let q = Question { question_id: question_id.clone(), statement, correct_answer };
    by_id.insert(question_id.clone(), q.clone());
    info!(target: "question", %question_id, "Question created");
    Ok(q)
  }

  #[instrument(level = "debug", skip_all, fields(question_id = %question.question_id))]
  async fn insert(&self, question: Question) -> ServiceResult<Question> {
    if question.question_id.trim().is_empty() {
      return Err(ServiceError::Validation("question_id must not be empty".into()));
    }
    let q = Question::new(question.question_id, &question.statement, &question.correct_answer)?;
    let mut by_id = self.by_id.write().await;
    if by_id.contains_key(&q.question_id) {
      return Err(ServiceError::Validation(format!("Duplicate question id: {}", q.question_id)));
    }
    by_id.insert(q.question_id.clone(), q.clone());
    Ok(q)
  }

  #[instrument(level = "debug", skip(self, statement, correct_answer))]
  async fn update(&self, question_id: &str, statement: &str, correct_answer: &str) -> ServiceResult<Question> {
    let (statement, correct_answer) = validate_fields(statement, correct_answer)?;
    let mut by_id = self.by_id.write().await;
    let q = by_id.get_mut(question_id).ok_or_else(|| not_found(question_id))?;
    q.statement = statement;
    q.correct_answer = correct_answer;
    info!(target: "question", %question_id, "Question updated");
    Ok(q.clone())
  }

  #[instrument(level = "debug", skip(self))]
  async fn delete(&self, question_id: &str) -> ServiceResult<()> {
    let removed = self.by_id.write().await.remove(question_id);
    match removed {
      Some(_) => {
        info!(target: "question", %question_id, "Question deleted");
        Ok(())
      }
      None => Err(not_found(question_id)),
    }
  }
}
