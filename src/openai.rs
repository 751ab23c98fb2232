//! Text-generation service: the `TextGenerator` seam plus an OpenAI-compatible client.
//!
//! The client is an explicitly constructed value injected into `AppState`, so
//! tests can swap in a scripted generator. Calls log model name, latency and
//! response size, never the API key or the prompt contents.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::error::GenerationError;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

/// One chat-completion call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
  pub model: String,
  pub messages: Vec<ChatMessage>,
  pub max_tokens: u32,
  pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// Returns the generated text of the first choice.
  async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
}

impl OpenAI {
  pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, GenerationError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| GenerationError::Unavailable(format!("HTTP client setup failed: {e}")))?;
    Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string() })
  }

  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  ///
  /// OPENAI_BASE_URL defaults to OpenRouter; OPENAI_TIMEOUT_SECS to 60.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://openrouter.ai/api/v1".into());
    let timeout = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .map(Duration::from_secs)
      .unwrap_or(Duration::from_secs(60));

    match Self::new(api_key, base_url, timeout) {
      Ok(client) => Some(client),
      Err(e) => {
        error!(target: "generation", error = %e, "Generation client could not be built");
        None
      }
    }
  }
}

#[async_trait]
impl TextGenerator for OpenAI {
  #[instrument(
    level = "info",
    skip(self, request),
    fields(model = %request.model, messages = request.messages.len(), max_tokens = request.max_tokens)
  )]
  async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: &request.model,
      messages: &request.messages,
      temperature: request.temperature,
      max_tokens: request.max_tokens,
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "docquiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

    let status = res.status();
    let body = res
      .text()
      .await
      .map_err(|e| GenerationError::Unavailable(format!("reading response body: {e}")))?;
    let elapsed = start.elapsed();

    if !status.is_success() {
      let err = classify_failure(status, &body);
      warn!(target: "generation", %status, ?elapsed, error = %err, "Completion call failed");
      return Err(err);
    }

    let parsed: ChatCompletionResponse = serde_json::from_str(&body)
      .map_err(|e| GenerationError::Unavailable(format!("malformed completion payload: {e}")))?;

    // Some gateways answer 200 with an error object instead of choices.
    if let Some(err) = parsed.error {
      let err = classify_error_body(status, err);
      warn!(target: "generation", %status, ?elapsed, error = %err, "Completion returned an error body");
      return Err(err);
    }

    if let Some(usage) = &parsed.usage {
      info!(target: "generation", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Completion usage");
    }

    let text = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| GenerationError::Unavailable("completion has no content".into()))?;

    info!(target: "generation", ?elapsed, response_len = text.len(), "Completion received");
    Ok(text)
  }
}

/// Map a non-success HTTP answer to a generation error.
fn classify_failure(status: StatusCode, body: &str) -> GenerationError {
  match serde_json::from_str::<ErrorWrap>(body) {
    Ok(wrap) => classify_error_body(status, wrap.error),
    Err(_) if status == StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(format!("HTTP {status}")),
    Err(_) => GenerationError::Unavailable(format!("HTTP {status}: {}", crate::util::trunc_for_log(body, 200))),
  }
}

fn classify_error_body(status: StatusCode, err: ErrorBody) -> GenerationError {
  let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
    || match &err.code {
      Some(serde_json::Value::String(code)) => {
        matches!(code.as_str(), "insufficient_quota" | "rate_limit_exceeded")
      }
      Some(serde_json::Value::Number(n)) => n.as_u64() == Some(429),
      _ => false,
    };

  if rate_limited {
    GenerationError::RateLimited(err.message)
  } else {
    GenerationError::Unavailable(format!("HTTP {status}: {}", err.message))
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  model: &'a str,
  messages: &'a [ChatMessage],
  temperature: f32,
  max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
  #[serde(default)]
  error: Option<ErrorBody>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ErrorWrap {
  error: ErrorBody,
}
/// OpenAI uses string codes (`insufficient_quota`), OpenRouter numeric ones (429).
#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: String,
  #[serde(default)]
  code: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_429_is_rate_limited() {
    let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down");
    assert!(matches!(err, GenerationError::RateLimited(_)));
  }

  #[test]
  fn quota_code_is_rate_limited_even_without_429() {
    let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
    let err = classify_failure(StatusCode::FORBIDDEN, body);
    assert_eq!(err, GenerationError::RateLimited("You exceeded your current quota".into()));
  }

  #[test]
  fn numeric_code_from_gateway_is_rate_limited() {
    let body = r#"{"error":{"message":"Rate limit exceeded","code":429}}"#;
    assert!(matches!(classify_failure(StatusCode::OK, body), GenerationError::RateLimited(_)));
  }

  #[test]
  fn other_failures_are_unavailable() {
    let body = r#"{"error":{"message":"model overloaded","code":"server_error"}}"#;
    let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, body);
    assert_eq!(err, GenerationError::Unavailable("HTTP 503 Service Unavailable: model overloaded".into()));
    assert!(matches!(
      classify_failure(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
      GenerationError::Unavailable(_)
    ));
  }

  #[test]
  fn request_serializes_roles_lowercase() {
    let messages = vec![ChatMessage::system("json only"), ChatMessage::user("hi")];
    let req = ChatCompletionRequest { model: "m", messages: &messages, temperature: 0.7, max_tokens: 2000 };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["messages"][0]["role"], "system");
    assert_eq!(v["messages"][1]["content"], "hi");
    assert_eq!(v["max_tokens"], 2000);
  }
}
