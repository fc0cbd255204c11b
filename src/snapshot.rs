//! JSON snapshot of the question collection.
//!
//! The file is a pretty-printed array of question records. `SnapshotStore` rewrites it
//! after every successful mutation, so the file always reflects the last acknowledged
//! write.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::domain::Question;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{InMemoryStore, QuestionStore};

/// Read a snapshot. `None` means no file exists yet (fresh deployment).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> ServiceResult<Option<Vec<Question>>> {
  let raw = match tokio::fs::read_to_string(path).await {
    Ok(s) => s,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      warn!(target: "quiz_backend", path = %path.display(), "No snapshot found");
      return Ok(None);
    }
    Err(e) => return Err(ServiceError::Internal(format!("reading {}: {}", path.display(), e))),
  };
  let questions: Vec<Question> = serde_json::from_str(&raw)
    .map_err(|e| ServiceError::Internal(format!("parsing {}: {}", path.display(), e)))?;
  info!(target: "quiz_backend", count = questions.len(), "Snapshot loaded");
  Ok(Some(questions))
}

/// Write a snapshot via a temporary sibling file, then rename over the target.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), count = questions.len()))]
pub async fn save(path: &Path, questions: &[Question]) -> ServiceResult<()> {
  let json = serde_json::to_string_pretty(questions)
    .map_err(|e| ServiceError::Internal(format!("serializing snapshot: {}", e)))?;

  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(dir)
      .await
      .map_err(|e| ServiceError::Internal(format!("creating {}: {}", dir.display(), e)))?;
  }

  let tmp = tmp_path(path);
  tokio::fs::write(&tmp, json)
    .await
    .map_err(|e| ServiceError::Internal(format!("writing {}: {}", tmp.display(), e)))?;
  tokio::fs::rename(&tmp, path)
    .await
    .map_err(|e| ServiceError::Internal(format!("renaming {}: {}", tmp.display(), e)))?;
  Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}

/// Insert snapshot records into `store`, skipping ids that are already present
/// or records that fail validation. Returns how many were restored.
pub async fn restore_into(store: &dyn QuestionStore, questions: Vec<Question>) -> usize {
  let mut restored = 0;
  for q in questions {
    let id = q.question_id.clone();
    match store.insert(q).await {
      Ok(_) => restored += 1,
      Err(e) => warn!(target: "quiz_backend", question_id = %id, error = %e, "Skipping snapshot record"),
    }
  }
  restored
}

/// Dump the store in a stable order (by id) so snapshots diff cleanly.
pub async fn save_store(path: &Path, store: &dyn QuestionStore) -> ServiceResult<()> {
  let mut questions: Vec<Question> = store.list().await.into_values().collect();
  questions.sort_by(|a, b| a.question_id.cmp(&b.question_id));
  save(path, &questions).await
}

/// Write-through store: every acknowledged mutation is on disk before the call returns.
///
/// Mutations are serialized by `write_order`, so snapshots land in the same order as the
/// writes they capture. If the snapshot cannot be written, the in-memory change is
/// rolled back and the caller gets `Internal`.
pub struct SnapshotStore {
  inner: InMemoryStore,
  path: PathBuf,
  write_order: Mutex<()>,
}

impl SnapshotStore {
  pub fn new(inner: InMemoryStore, path: PathBuf) -> Self {
    Self { inner, path, write_order: Mutex::new(()) }
  }

  /// Write the current contents out, e.g. right after seeding a fresh store.
  pub async fn flush(&self) -> ServiceResult<()> {
    let _order = self.write_order.lock().await;
    save_store(&self.path, &self.inner).await
  }

  async fn save_or_log(&self) -> ServiceResult<()> {
    save_store(&self.path, &self.inner).await.map_err(|e| {
      error!(target: "question", path = %self.path.display(), error = %e, "Snapshot write failed; rolling back");
      e
    })
  }
}

#[async_trait]
impl QuestionStore for SnapshotStore {
  async fn list(&self) -> HashMap<String, Question> {
    self.inner.list().await
  }

  async fn get(&self, question_id: &str) -> ServiceResult<Question> {
    self.inner.get(question_id).await
  }

  async fn create(&self, statement: &str, correct_answer: &str) -> ServiceResult<Question> {
    let _order = self.write_order.lock().await;
    let q = self.inner.create(statement, correct_answer).await?;
    if let Err(e) = self.save_or_log().await {
      let _ = self.inner.delete(&q.question_id).await;
      return Err(e);
    }
    Ok(q)
  }

  async fn insert(&self, question: Question) -> ServiceResult<Question> {
    let _order = self.write_order.lock().await;
    let q = self.inner.insert(question).await?;
    if let Err(e) = self.save_or_log().await {
      let _ = self.inner.delete(&q.question_id).await;
      return Err(e);
    }
    Ok(q)
  }

  async fn update(&self, question_id: &str, statement: &str, correct_answer: &str) -> ServiceResult<Question> {
    let _order = self.write_order.lock().await;
    let before = self.inner.get(question_id).await;
    let q = self.inner.update(question_id, statement, correct_answer).await?;
    if let Err(e) = self.save_or_log().await {
      if let Ok(prev) = before {
        let _ = self.inner.update(question_id, &prev.statement, &prev.correct_answer).await;
      }
      return Err(e);
    }
    Ok(q)
  }

  async fn delete(&self, question_id: &str) -> ServiceResult<()> {
    let _order = self.write_order.lock().await;
    let before = self.inner.get(question_id).await?;
    self.inner.delete(question_id).await?;
    if let Err(e) = self.save_or_log().await {
      let _ = self.inner.insert(before).await;
      return Err(e);
    }
    Ok(())
  }
}
