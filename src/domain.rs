//! Domain models: the stored question record and its public projection.

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Core question record persisted by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub question_id: String,
  pub statement: String,
  pub correct_answer: String,
}

/// What anonymous quiz takers get to see: no answer key.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PublicQuestion {
  pub question_id: String,
  pub statement: String,
}

impl From<&Question> for PublicQuestion {
  fn from(q: &Question) -> Self {
    Self { question_id: q.question_id.clone(), statement: q.statement.clone() }
  }
}

impl Question {
  /// Build a record after checking that both text fields carry content.
  pub fn new(question_id: String, statement: &str, correct_answer: &str) -> ServiceResult<Self> {
    let (statement, correct_answer) = validate_fields(statement, correct_answer)?;
    Ok(Self { question_id, statement, correct_answer })
  }
}

/// Both fields must be non-empty once surrounding whitespace is removed.
/// Returns the trimmed values.
pub fn validate_fields(statement: &str, correct_answer: &str) -> ServiceResult<(String, String)> {
  let statement = statement.trim();
  let correct_answer = correct_answer.trim();
  if statement.is_empty() {
    return Err(ServiceError::Validation("statement must not be empty".into()));
  }
  if correct_answer.is_empty() {
    return Err(ServiceError::Validation("correct_answer must not be empty".into()));
  }
  Ok((statement.to_string(), correct_answer.to_string()))
}
