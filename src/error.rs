//! Error types: one enum per component, folded into `ApiError` at the HTTP edge.
//!
//! Every failure keeps a distinguishable kind all the way to the response body,
//! so callers can tell "extraction failed" from "document missing" from
//! "the model is rate limited".

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::protocol::ErrorOut;

/// Text extraction failures. Reported as "extraction failed", never as a storage problem.
#[derive(Error, Debug)]
pub enum ExtractError {
  #[error("PDF extraction failed: {0}")]
  Pdf(String),

  #[error("DOCX extraction failed: {0}")]
  Docx(String),

  #[error("text is not valid UTF-8: {0}")]
  Encoding(#[from] std::string::FromUtf8Error),
}

/// Document store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  #[error("document not found: {0}")]
  NotFound(String),

  #[error("document has no text content")]
  EmptyContent,

  #[error("document title is empty")]
  EmptyTitle,
}

/// Failures reported by the text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
  /// Quota exhausted or rate limit hit (HTTP 429, `insufficient_quota`, ...).
  #[error("generation service rate limited: {0}")]
  RateLimited(String),

  #[error("generation service unavailable: {0}")]
  Unavailable(String),
}

/// Quiz Synthesizer failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
  #[error("invalid quiz request: {0}")]
  InvalidInput(String),

  #[error("document not found: {0}")]
  DocumentNotFound(String),

  #[error("generation service rate limited: {0}")]
  UpstreamRateLimited(String),

  #[error("generation service unavailable: {0}")]
  UpstreamUnavailable(String),

  #[error("model response is not parseable as JSON")]
  ResponseNotParseable,

  /// `index` is the 0-based position of the offending question.
  #[error("question #{} is invalid: {reason}", .index + 1)]
  SchemaInvalid { index: usize, reason: String },
}

impl From<GenerationError> for QuizError {
  fn from(e: GenerationError) -> Self {
    match e {
      GenerationError::RateLimited(m) => QuizError::UpstreamRateLimited(m),
      GenerationError::Unavailable(m) => QuizError::UpstreamUnavailable(m),
    }
  }
}

/// Question-answering failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AskError {
  #[error("invalid question request: {0}")]
  InvalidInput(String),

  #[error("document not found: {0}")]
  DocumentNotFound(String),

  #[error("generation service rate limited: {0}")]
  UpstreamRateLimited(String),

  #[error("generation service unavailable: {0}")]
  UpstreamUnavailable(String),
}

impl From<GenerationError> for AskError {
  fn from(e: GenerationError) -> Self {
    match e {
      GenerationError::RateLimited(m) => AskError::UpstreamRateLimited(m),
      GenerationError::Unavailable(m) => AskError::UpstreamUnavailable(m),
    }
  }
}

/// Quiz playback misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
  #[error("quiz is already finished")]
  Finished,

  #[error("`{0}` is not an option of the current question")]
  UnknownOption(String),
}

/// Everything an HTTP handler can fail with.
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  /// Upload exceeded the configured body limit.
  #[error("{0}")]
  PayloadTooLarge(String),

  #[error(transparent)]
  Extract(#[from] ExtractError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Quiz(#[from] QuizError),

  #[error(transparent)]
  Ask(#[from] AskError),
}

impl ApiError {
  /// HTTP status, machine-readable kind and optional question index.
  pub fn classify(&self) -> (StatusCode, &'static str, Option<usize>) {
    match self {
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
      ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", None),
      ApiError::Extract(_) => (StatusCode::UNPROCESSABLE_ENTITY, "extraction_failed", None),
      ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found", None),
      ApiError::Store(StoreError::EmptyContent) => (StatusCode::UNPROCESSABLE_ENTITY, "empty_content", None),
      ApiError::Store(StoreError::EmptyTitle) => (StatusCode::BAD_REQUEST, "bad_request", None),
      ApiError::Quiz(e) => match e {
        QuizError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
        QuizError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
        QuizError::UpstreamRateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited", None),
        QuizError::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable", None),
        QuizError::ResponseNotParseable => (StatusCode::BAD_GATEWAY, "response_not_parseable", None),
        QuizError::SchemaInvalid { index, .. } => (StatusCode::BAD_GATEWAY, "schema_invalid", Some(*index)),
      },
      ApiError::Ask(e) => match e {
        AskError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
        AskError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
        AskError::UpstreamRateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited", None),
        AskError::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable", None),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind, index) = self.classify();
    let message = match (&self, status) {
      (_, StatusCode::TOO_MANY_REQUESTS) => format!("{self}. Please try again later."),
      _ => self.to_string(),
    };

    if status.is_server_error() {
      error!(target: "docquiz_backend", %status, kind, error = %self, "Request failed");
    } else {
      warn!(target: "docquiz_backend", %status, kind, error = %self, "Request rejected");
    }

    (status, Json(ErrorOut { error: kind, message, index })).into_response()
  }
}
