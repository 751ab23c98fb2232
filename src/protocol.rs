//! Public HTTP request/response DTOs (serde ready).
//! Field names follow the web client (`docId`, `nbQuestions`, `correctAnswer`).

use serde::{Deserialize, Serialize};

use crate::domain::QuizQuestion;

/// Fields are optional so that a missing one is reported as a validation error
/// with our own message rather than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct AskIn {
    #[serde(rename = "docId")]
    pub doc_id: Option<String>,
    pub question: Option<String>,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct AskOut {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizIn {
    #[serde(rename = "docId")]
    pub doc_id: Option<String>,
    #[serde(rename = "nbQuestions")]
    pub nb_questions: Option<i64>,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizOut {
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
    /// 0-based index of the offending question for `schema_invalid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}
