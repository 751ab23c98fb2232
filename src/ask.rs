//! Question answering scoped to one document's text.

use tracing::{info, instrument};

use crate::error::{AskError, GenerationError};
use crate::openai::{ChatMessage, CompletionRequest};
use crate::state::AppState;
use crate::util::fill_template;

#[instrument(level = "info", skip(state, question), fields(%doc_id, question_len = question.len()))]
pub async fn answer_question(state: &AppState, doc_id: &str, question: &str) -> Result<String, AskError> {
  let question = question.trim();
  if question.is_empty() {
    return Err(AskError::InvalidInput("question is empty".into()));
  }

  let doc = state
    .documents
    .get(doc_id)
    .await
    .map_err(|_| AskError::DocumentNotFound(doc_id.to_string()))?;

  let generator = state
    .generator
    .as_deref()
    .ok_or_else(|| GenerationError::Unavailable("generation service is not configured".into()))?;

  let prompt = fill_template(
    &state.prompts.answer_user_template,
    &[("question", question), ("text", &doc.content)],
  );
  let request = CompletionRequest {
    model: state.generation.model.clone(),
    messages: vec![ChatMessage::user(prompt)],
    max_tokens: state.generation.answer_max_tokens,
    temperature: state.generation.answer_temperature,
  };

  let answer = generator.complete(request).await?.trim().to_string();
  info!(target: "ask", %doc_id, answer_len = answer.len(), "Question answered");
  Ok(answer)
}
