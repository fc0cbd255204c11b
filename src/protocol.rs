//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PublicQuestion, Question};

/// Body of `POST /questions` and `PUT /questions/{id}`.
/// Missing fields become empty strings and fail validation downstream.
#[derive(Debug, Deserialize)]
pub struct QuestionIn {
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub correct_answer: String,
}

/// One entry of `GET /questions`: admins see the full record, everyone else
/// gets the statement only (unless answers are exposed by config).
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QuestionView {
    Full(Question),
    Public(PublicQuestion),
}

pub type QuestionListOut = HashMap<String, QuestionView>;

pub fn to_list_out(questions: HashMap<String, Question>, full: bool) -> QuestionListOut {
    questions
        .into_iter()
        .map(|(id, q)| {
            let view = if full { QuestionView::Full(q) } else { QuestionView::Public(PublicQuestion::from(&q)) };
            (id, view)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct EvaluateIn {
    #[serde(default)]
    pub answer: String,
}
#[derive(Debug, Serialize)]
pub struct EvaluateOut {
    pub score: u8,
}

#[derive(Deserialize)]
pub struct LoginIn {
    #[serde(default)]
    pub password: String,
}
#[derive(Serialize)]
pub struct LoginOut {
    pub token: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
