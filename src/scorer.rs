//! Answer scoring: similarity between a submitted answer and the stored reference,
//! mapped onto an integer score in 0..=100.
//!
//! The similarity measure is a policy behind the `Similarity` trait; the default is a
//! term-frequency cosine over normalised tokens. Scoring is a pure function of its two
//! text inputs.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::store::QuestionStore;
use crate::util::tokenize;

pub const MAX_SCORE: u8 = 100;

/// A text-similarity policy. Must return a value in `[0, 1]`, with `1.0` meaning
/// the two texts are equivalent.
pub trait Similarity: Send + Sync {
  fn similarity(&self, answer: &str, reference: &str) -> f64;
}

/// Cosine similarity of token frequency vectors (bag of words).
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenCosine;

fn term_freqs(text: &str) -> HashMap<String, u32> {
  let mut tf = HashMap::new();
  for tok in tokenize(text) {
    *tf.entry(tok).or_insert(0) += 1;
  }
  tf
}

impl Similarity for TokenCosine {
  fn similarity(&self, answer: &str, reference: &str) -> f64 {
    if answer.trim() == reference.trim() {
      return 1.0;
    }
    let a = term_freqs(answer);
    let b = term_freqs(reference);
    if a.is_empty() || b.is_empty() {
      return 0.0;
    }
    if a == b {
      return 1.0;
    }

    let dot: f64 = a
      .iter()
      .filter_map(|(tok, &n)| b.get(tok).map(|&m| f64::from(n) * f64::from(m)))
      .sum();
    let norm = |tf: &HashMap<String, u32>| tf.values().map(|&n| f64::from(n).powi(2)).sum::<f64>().sqrt();
    let cos = dot / (norm(&a) * norm(&b));

    // Rounding must not let a different bag of words reach the perfect score.
    cos.clamp(0.0, 1.0 - f64::EPSILON)
  }
}

/// How a similarity in `[0, 1]` becomes a 0..=100 score.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
  /// `floor(sim * 100)`, with 100 reserved for `sim == 1.0`.
  #[default]
  Linear,
  /// Coarse bands: 0, 40, 70 or 90, and 100 only for `sim == 1.0`.
  Banded,
}

impl ScoreScale {
  pub fn map(self, sim: f64) -> u8 {
    let sim = if sim.is_nan() { 0.0 } else { sim.clamp(0.0, 1.0) };
    match self {
      ScoreScale::Linear => {
        if sim >= 1.0 {
          MAX_SCORE
        } else {
          ((sim * 100.0).floor() as u8).min(MAX_SCORE - 1)
        }
      }
      ScoreScale::Banded => match sim {
        s if s < 0.20 => 0,
        s if s < 0.40 => 40,
        s if s < 0.70 => 70,
        s if s < 1.0 => 90,
        _ => MAX_SCORE,
      },
    }
  }
}

impl std::str::FromStr for ScoreScale {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "linear" => Ok(ScoreScale::Linear),
      "banded" => Ok(ScoreScale::Banded),
      other => Err(format!("unknown score scale '{other}'")),
    }
  }
}

pub struct AnswerScorer {
  similarity: Box<dyn Similarity>,
  scale: ScoreScale,
}

impl std::fmt::Debug for AnswerScorer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AnswerScorer").field("scale", &self.scale).finish_non_exhaustive()
  }
}

impl Default for AnswerScorer {
  fn default() -> Self {
    Self::new(ScoreScale::default())
  }
}

impl AnswerScorer {
  pub fn new(scale: ScoreScale) -> Self {
    Self::with_similarity(Box::new(TokenCosine), scale)
  }

  pub fn with_similarity(similarity: Box<dyn Similarity>, scale: ScoreScale) -> Self {
    Self { similarity, scale }
  }

  pub fn scale(&self) -> ScoreScale {
    self.scale
  }

  /// Pure scoring of two texts.
  pub fn score(&self, answer: &str, reference: &str) -> u8 {
    self.scale.map(self.similarity.similarity(answer, reference))
  }

  /// Score `answer` against the reference answer of the stored question.
  #[instrument(level = "info", skip(self, store, answer), fields(answer_len = answer.len()))]
  pub async fn evaluate(&self, store: &dyn QuestionStore, question_id: &str, answer: &str) -> ServiceResult<u8> {
    if answer.trim().is_empty() {
      return Err(ServiceError::Validation("answer must not be empty".into()));
    }
    let question = store.get(question_id).await?;
    let score = self.score(answer, &question.correct_answer);
    debug!(target: "question", %question_id, score, scale = ?self.scale, "Answer scored");
    Ok(score)
  }
}
