//! Application state shared by all handlers.
//!
//! This module owns:
//!   - the question store (behind the `QuestionStore` trait)
//!   - the answer scorer
//!   - the admin auth gate
//!   - snapshot location and list projection policy
//!
//! Startup: an existing snapshot is the source of truth. The TOML seed bank only fills
//! a store that has never been written to disk.

use std::{path::PathBuf, sync::Arc};

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::AuthGate;
use crate::config::{QuestionCfg, ServiceConfig};
use crate::domain::Question;
use crate::error::ServiceResult;
use crate::scorer::AnswerScorer;
use crate::snapshot::{self, SnapshotStore};
use crate::store::{InMemoryStore, QuestionStore};

pub struct AppState {
    pub store: Arc<dyn QuestionStore>,
    pub scorer: AnswerScorer,
    pub auth: AuthGate,
    pub expose_answers: bool,
    pub data_path: Option<PathBuf>,
}

async fn seed_into(store: &dyn QuestionStore, seeds: &[QuestionCfg]) -> usize {
    let mut seeded = 0usize;
    for qc in seeds {
        let id = qc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let q = Question { question_id: id.clone(), statement: qc.statement.clone(), correct_answer: qc.correct_answer.clone() };
        match store.insert(q).await {
            Ok(_) => seeded += 1,
            Err(e) => {
                error!(target: "question", %id, error = %e, "Skipping seed question.");
            }
        }
    }
    seeded
}

impl AppState {
    /// Empty in-memory state built from config. No seeding, no disk access.
    pub fn new(cfg: &ServiceConfig) -> Self {
        Self::with_store(cfg, Arc::new(InMemoryStore::new()))
    }

    /// Same as `new` but with a caller-provided store implementation.
    pub fn with_store(cfg: &ServiceConfig, store: Arc<dyn QuestionStore>) -> Self {
        Self {
            store,
            scorer: AnswerScorer::new(cfg.scale),
            auth: AuthGate::new(cfg.admin_password.as_str(), cfg.token_ttl),
            expose_answers: cfg.expose_answers,
            data_path: cfg.data_path.clone(),
        }
    }

    /// Build state and populate the store from the snapshot, or from the seed bank
    /// when no snapshot exists yet. With a data path, the store writes through to disk.
    #[instrument(level = "info", skip_all)]
    pub async fn bootstrap(cfg: &ServiceConfig) -> ServiceResult<Self> {
        let memory = InMemoryStore::new();

        let snapshot = match &cfg.data_path {
            Some(path) => snapshot::load(path).await?,
            None => None,
        };
        let (seeded, restored) = match snapshot {
            Some(questions) => {
                if !cfg.seed_questions.is_empty() {
                    info!(target: "quiz_backend", seeds = cfg.seed_questions.len(), "Snapshot present; seed bank ignored");
                }
                (0, snapshot::restore_into(&memory, questions).await)
            }
            None => (seed_into(&memory, &cfg.seed_questions).await, 0),
        };

        let store: Arc<dyn QuestionStore> = match &cfg.data_path {
            Some(path) => {
                let store = SnapshotStore::new(memory, path.clone());
                // Establish the file so later restarts never fall back to the seed bank.
                store.flush().await?;
                Arc::new(store)
            }
            None => Arc::new(memory),
        };
        let state = Self::with_store(cfg, store);

        info!(
            target: "quiz_backend",
            seeded,
            restored,
            total = state.store.list().await.len(),
            scale = ?state.scorer.scale(),
            expose_answers = state.expose_answers,
            "Startup question inventory"
        );
        Ok(state)
    }

    /// Final flush on shutdown. Mutations are already written through, so this only
    /// matters for custom stores injected via `with_store`.
    #[instrument(level = "info", skip(self))]
    pub async fn persist(&self) -> ServiceResult<()> {
        match &self.data_path {
            Some(path) => snapshot::save_store(path, self.store.as_ref()).await,
            None => {
                warn!(target: "quiz_backend", "No data path configured; questions are not persisted.");
                Ok(())
            }
        }
    }
}
