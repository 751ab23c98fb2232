//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures are `ApiError`s rendered as JSON.

use std::sync::Arc;

use axum::{
  extract::{
    multipart::{MultipartError, MultipartRejection},
    rejection::JsonRejection,
    Multipart, Path, State,
  },
  http::{StatusCode, Uri},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::ask::answer_question;
use crate::domain::{Document, Upload};
use crate::error::ApiError;
use crate::extract::extract_text;
use crate::protocol::*;
use crate::quiz::generate_for_document;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[instrument(level = "info")]
pub async fn http_root() -> &'static str {
  "Document quiz API is running"
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_documents(State(state): State<Arc<AppState>>) -> Json<Vec<Document>> {
  let docs = state.documents.list().await;
  info!(target: "documents", count = docs.len(), "HTTP documents listed");
  Json(docs)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
  Ok(Json(state.documents.get(&id).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<MessageOut>, ApiError> {
  state.documents.delete(&id).await?;
  Ok(Json(MessageOut { message: "Document deleted successfully".into() }))
}

/// Multipart upload with a single `file` field: extract, then store.
#[instrument(level = "info", skip(state, multipart))]
pub async fn http_upload_document(
  State(state): State<Arc<AppState>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
  let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let upload = read_file_field(&mut multipart).await?;

  let content = extract_text(&upload).await?;
  let doc = state.documents.create(&upload.filename, content, &upload.media_type).await?;
  info!(target: "documents", id = %doc.id, title = %doc.title, media_type = %doc.media_type, "HTTP document uploaded");
  Ok((StatusCode::CREATED, Json(doc)))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Upload, ApiError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| upload_error("malformed upload", e))?
  {
    if field.name() != Some(FILE_FIELD) {
      continue;
    }

    let filename = field
      .file_name()
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .map(str::to_string)
      .ok_or_else(|| ApiError::BadRequest("uploaded file has no filename".into()))?;
    let media_type = field
      .content_type()
      .unwrap_or("application/octet-stream")
      .to_string();
    let bytes = field
      .bytes()
      .await
      .map_err(|e| upload_error("upload could not be read", e))?;

    return Ok(Upload { filename, media_type, bytes });
  }

  Err(ApiError::BadRequest(format!("missing `{FILE_FIELD}` field")))
}

/// Hitting the body limit is reported as 413; any other multipart failure is a bad request.
fn upload_error(context: &str, e: MultipartError) -> ApiError {
  let message = format!("{context}: {}", e.body_text());
  if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
    ApiError::PayloadTooLarge(message)
  } else {
    ApiError::BadRequest(message)
  }
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_ask(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<AskIn>, JsonRejection>,
) -> Result<Json<AskOut>, ApiError> {
  let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let (Some(doc_id), Some(question)) = (non_blank(body.doc_id), non_blank(body.question)) else {
    return Err(ApiError::BadRequest("docId and question are required".into()));
  };

  let answer = answer_question(&state, &doc_id, &question).await?;
  Ok(Json(AskOut { answer }))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<QuizIn>, JsonRejection>,
) -> Result<Json<QuizOut>, ApiError> {
  let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let (Some(doc_id), Some(count)) = (non_blank(body.doc_id), body.nb_questions) else {
    return Err(ApiError::BadRequest("docId and nbQuestions are required".into()));
  };
  if count < 1 {
    return Err(ApiError::BadRequest(format!("nbQuestions must be at least 1, got {count}")));
  }

  let quiz = generate_for_document(&state, &doc_id, count as usize).await?;
  info!(target: "quiz", %doc_id, questions = quiz.len(), "HTTP quiz served");
  Ok(Json(QuizOut { quiz }))
}

pub async fn http_not_found(uri: Uri) -> (StatusCode, Json<ErrorOut>) {
  (
    StatusCode::NOT_FOUND,
    Json(ErrorOut { error: "not_found", message: format!("no route for {uri}"), index: None }),
  )
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
