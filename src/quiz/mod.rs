//! Quiz Synthesizer: document text → exactly `n` validated multiple-choice questions.
//!
//! Flow:
//! 1) Build a JSON-only system message and a user message carrying the count,
//!    the schema, one example and the full source text.
//! 2) One call to the text generator (bounded tokens, non-zero temperature).
//! 3) Recover JSON from the reply (`parse`), then validate and trim (`validate`).
//!
//! No retries happen here; the caller decides.

pub mod parse;
pub mod playback;
pub mod validate;

use std::time::Instant;

use tracing::{debug, error, info, instrument};

use crate::config::{GenerationConfig, Prompts};
use crate::domain::QuizQuestion;
use crate::error::{GenerationError, QuizError};
use crate::openai::{ChatMessage, CompletionRequest, TextGenerator};
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};

pub struct QuizSynthesizer<'a> {
  generator: &'a dyn TextGenerator,
  prompts: &'a Prompts,
  settings: &'a GenerationConfig,
}

impl<'a> QuizSynthesizer<'a> {
  pub fn new(generator: &'a dyn TextGenerator, prompts: &'a Prompts, settings: &'a GenerationConfig) -> Self {
    Self { generator, prompts, settings }
  }

  pub fn build_request(&self, source_text: &str, question_count: usize) -> CompletionRequest {
    let count = question_count.to_string();
    let user = fill_template(&self.prompts.quiz_user_template, &[("count", &count), ("text", source_text)]);
    CompletionRequest {
      model: self.settings.model.clone(),
      messages: vec![ChatMessage::system(self.prompts.quiz_system.clone()), ChatMessage::user(user)],
      max_tokens: self.settings.quiz_max_tokens,
      temperature: self.settings.quiz_temperature,
    }
  }

  #[instrument(level = "info", skip(self, source_text), fields(text_len = source_text.len(), %question_count))]
  pub async fn synthesize(&self, source_text: &str, question_count: usize) -> Result<Vec<QuizQuestion>, QuizError> {
    if question_count == 0 {
      return Err(QuizError::InvalidInput("question count must be at least 1".into()));
    }
    if source_text.trim().is_empty() {
      return Err(QuizError::InvalidInput("source text is empty".into()));
    }

    let request = self.build_request(source_text, question_count);
    let start = Instant::now();
    let reply = self.generator.complete(request).await.map_err(|e| {
      error!(target: "quiz", elapsed = ?start.elapsed(), error = %e, "Quiz generation call failed");
      QuizError::from(e)
    })?;
    debug!(target: "quiz", elapsed = ?start.elapsed(), reply = %trunc_for_log(&reply, 300), "Quiz reply received");

    let parsed = parse::parse_reply(&reply).map_err(|e| {
      error!(target: "quiz", reply_len = reply.len(), "Quiz reply is not JSON in any recoverable form");
      e
    })?;
    let questions = validate::validate_batch(parsed.value, question_count).map_err(|e| {
      error!(target: "quiz", stage = ?parsed.stage, error = %e, "Quiz reply failed validation");
      e
    })?;

    info!(target: "quiz", stage = ?parsed.stage, questions = questions.len(), "Quiz generated");
    Ok(questions)
  }
}

/// Load the document and synthesize a quiz from its content.
#[instrument(level = "info", skip(state), fields(%doc_id, %question_count))]
pub async fn generate_for_document(
  state: &AppState,
  doc_id: &str,
  question_count: usize,
) -> Result<Vec<QuizQuestion>, QuizError> {
  let doc = state
    .documents
    .get(doc_id)
    .await
    .map_err(|_| QuizError::DocumentNotFound(doc_id.to_string()))?;

  let generator = state
    .generator
    .as_deref()
    .ok_or_else(|| GenerationError::Unavailable("generation service is not configured".into()))?;

  QuizSynthesizer::new(generator, &state.prompts, &state.generation)
    .synthesize(&doc.content, question_count)
    .await
}
