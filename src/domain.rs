//! Domain models: stored documents, uploads waiting for extraction, and quiz questions.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of options every quiz question carries.
pub const OPTION_COUNT: usize = 4;

/// A stored document: the text extracted from one uploaded file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  pub id: String,
  /// Original filename.
  pub title: String,
  /// Normalized extracted text; the only thing the model ever sees.
  pub content: String,
  /// Declared content type of the upload.
  pub media_type: String,
  pub created_at: DateTime<Utc>,
}

/// One file as delivered by the upload transport.
#[derive(Clone, Debug)]
pub struct Upload {
  pub filename: String,
  pub media_type: String,
  pub bytes: Bytes,
}

/// A validated multiple-choice question. Never persisted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
  #[serde(rename = "question")]
  pub prompt: String,
  pub options: Vec<String>,
  #[serde(rename = "correctAnswer")]
  pub correct_option: String,
}
