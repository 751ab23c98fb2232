//! Application configuration: prompts, generation limits and server limits.
//!
//! Defaults are compiled in. An optional TOML file (APP_CONFIG_PATH) can override
//! any subset of them, and OPENAI_MODEL overrides the model id on top of that.
//!
//! ```toml
//! [generation]
//! model = "gpt-4o-mini"
//! quiz_max_tokens = 2000
//! quiz_temperature = 0.7
//!
//! [prompts]
//! quiz_system = "Reply with JSON only."
//!
//! [server]
//! max_upload_bytes = 20971520
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationConfig,
  #[serde(default)]
  pub server: ServerConfig,
}

/// Model id and per-feature token budgets / sampling temperatures.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
  pub model: String,
  pub quiz_max_tokens: u32,
  pub quiz_temperature: f32,
  pub answer_max_tokens: u32,
  pub answer_temperature: f32,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      model: "gpt-4o-mini".into(),
      quiz_max_tokens: 2000,
      quiz_temperature: 0.7,
      answer_max_tokens: 500,
      answer_temperature: 0.2,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Request body limit for uploads.
  pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { max_upload_bytes: 20 * 1024 * 1024 }
  }
}

/// Prompt templates. `{count}`, `{text}` and `{question}` are substituted at call time.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub quiz_system: String,
  pub quiz_user_template: String,
  pub answer_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are an assistant that replies only with valid JSON. Never produce any text outside the JSON.".into(),
      quiz_user_template: r#"You are a quiz generator. Generate exactly {count} multiple-choice questions based ONLY on the text provided below.

IMPORTANT RULES:
1. Reply ONLY with a valid JSON array, with no text before or after it
2. Each question must have exactly 4 options
3. Exactly one option is correct, and "correctAnswer" repeats it verbatim
4. Questions must be relevant and grounded in the document content
5. Vary the position of the correct answer (do not always put it first)

STRICT JSON FORMAT (example):
[
  {
    "question": "What is the capital of France?",
    "options": ["Berlin", "Madrid", "Paris", "Rome"],
    "correctAnswer": "Paris"
  }
]

Document text:
{text}

Now generate {count} questions, as JSON only:"#
        .into(),
      answer_user_template: "Answer the following question using only this text:\n{text}\n\nQuestion: {question}".into(),
    }
  }
}

impl AppConfig {
  /// Defaults, overridden by APP_CONFIG_PATH (if readable) and OPENAI_MODEL.
  pub fn from_env() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    if let Ok(model) = std::env::var("OPENAI_MODEL") {
      if !model.trim().is_empty() {
        cfg.generation.model = model;
      }
    }
    cfg
  }
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_file_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "docquiz_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "docquiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "docquiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
        [generation]
        quiz_temperature = 0.3

        [prompts]
        quiz_system = "JSON only."
      "#,
    )
    .unwrap();
    assert_eq!(cfg.generation.quiz_temperature, 0.3);
    assert_eq!(cfg.generation.quiz_max_tokens, 2000);
    assert_eq!(cfg.generation.model, "gpt-4o-mini");
    assert_eq!(cfg.prompts.quiz_system, "JSON only.");
    assert!(cfg.prompts.quiz_user_template.contains("{count}"));
    assert_eq!(cfg.server.max_upload_bytes, 20 * 1024 * 1024);
  }

  #[test]
  fn default_quiz_template_has_placeholders() {
    let p = Prompts::default();
    assert!(p.quiz_user_template.contains("{text}"));
    assert!(p.quiz_user_template.contains("\"correctAnswer\": \"Paris\""));
    assert!(p.answer_user_template.contains("{question}"));
  }
}
