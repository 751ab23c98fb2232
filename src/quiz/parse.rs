//! Best-effort JSON recovery from a model reply.
//!
//! Three bounded stages, tried in order, each reporting a tagged outcome:
//! 1. `Direct`   – the whole reply is JSON.
//! 2. `Fenced`   – the inner text of the first ```` ```json ```` block.
//! 3. `Embedded` – the first bracket-balanced `[ { ... } ]` span in the reply.
//!    Brackets inside JSON strings are not counted.
//!
//! No repair is attempted beyond that.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::QuizError;

static FENCED_JSON: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fenced-block pattern compiles"));


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
  Direct,
  Fenced,
  Embedded,
}

impl ParseStage {
  pub const ALL: [ParseStage; 3] = [ParseStage::Direct, ParseStage::Fenced, ParseStage::Embedded];

  fn candidate(self, body: &str) -> Option<&str> {
    match self {
      ParseStage::Direct => Some(body),
      ParseStage::Fenced => FENCED_JSON.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str()),
      ParseStage::Embedded => first_balanced_array(body),
    }
  }

  pub fn attempt(self, body: &str) -> StageOutcome {
    match self.candidate(body) {
      None => StageOutcome::NoCandidate,
      Some(text) => match serde_json::from_str::<Value>(text) {
        Ok(value) => StageOutcome::Parsed(value),
        Err(e) => StageOutcome::Invalid(e.to_string()),
      },
    }
  }
}

#[derive(Debug, PartialEq)]
pub enum StageOutcome {
  Parsed(Value),
  /// The stage found nothing to look at.
  NoCandidate,
  /// The stage found a candidate that is not valid JSON.
  Invalid(String),
}

#[derive(Debug, PartialEq)]
pub struct ParsedReply {
  pub stage: ParseStage,
  pub value: Value,
}

/// First `[` opening an array of objects whose brackets close within `body`.
fn first_balanced_array(body: &str) -> Option<&str> {
  let mut from = 0;
  while let Some(offset) = body[from..].find('[') {
    let start = from + offset;
    let opens_object = body[start + 1..].trim_start().starts_with('{');
    if opens_object {
      if let Some(end) = balanced_end(&body[start..]) {
        return Some(&body[start..start + end]);
      }
    }
    from = start + 1;
  }
  None
}

/// Byte length of the bracketed value at the start of `text`, if it closes.
fn balanced_end(text: &str) -> Option<usize> {
  let mut depth = 0usize;
  let mut in_string = false;
  let mut escaped = false;

  for (i, c) in text.char_indices() {
    if in_string {
      match c {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }
    match c {
      '"' => in_string = true,
      '[' | '{' => depth += 1,
      ']' | '}' => {
        depth = depth.checked_sub(1)?;
        if depth == 0 {
          return Some(i + 1);
        }
      }
      _ => {}
    }
  }
  None
}

pub fn parse_reply(raw: &str) -> Result<ParsedReply, QuizError> {
  let body = raw.trim();
  for stage in ParseStage::ALL {
    match stage.attempt(body) {
      StageOutcome::Parsed(value) => {
        debug!(target: "quiz", ?stage, "Model reply parsed");
        return Ok(ParsedReply { stage, value });
      }
      StageOutcome::NoCandidate => debug!(target: "quiz", ?stage, "No candidate"),
      StageOutcome::Invalid(error) => debug!(target: "quiz", ?stage, %error, "Candidate is not JSON"),
    }
  }
  Err(QuizError::ResponseNotParseable)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const QUESTIONS: &str = r#"[{"question":"What is the capital of France?","options":["Berlin","Madrid","Paris","Rome"],"correctAnswer":"Paris"}]"#;

  fn expected() -> Value {
    json!([{
      "question": "What is the capital of France?",
      "options": ["Berlin", "Madrid", "Paris", "Rome"],
      "correctAnswer": "Paris"
    }])
  }

  #[test]
  fn raw_json_parses_directly() {
    let parsed = parse_reply(&format!("\n  {QUESTIONS}\n")).unwrap();
    assert_eq!(parsed.stage, ParseStage::Direct);
    assert_eq!(parsed.value, expected());
  }

  #[test]
  fn fenced_block_is_unwrapped() {
    let reply = format!("Here is your quiz:\n```json\n{QUESTIONS}\n```\nGood luck!");
    let parsed = parse_reply(&reply).unwrap();
    assert_eq!(parsed.stage, ParseStage::Fenced);
    assert_eq!(parsed.value, expected());
  }

  #[test]
  fn embedded_array_is_found_in_prose() {
    let reply = format!("Sure! {QUESTIONS} Let me know if you need more.");
    let parsed = parse_reply(&reply).unwrap();
    assert_eq!(parsed.stage, ParseStage::Embedded);
    assert_eq!(parsed.value, expected());
  }

  #[test]
  fn broken_fence_falls_through_to_embedded() {
    let reply = format!("```json\n{{ not json\n```\nAnyway: {QUESTIONS}");
    assert_eq!(ParseStage::Fenced.attempt(reply.trim()), StageOutcome::Invalid(
      serde_json::from_str::<Value>("{ not json").unwrap_err().to_string()
    ));
    let parsed = parse_reply(&reply).unwrap();
    assert_eq!(parsed.stage, ParseStage::Embedded);
    assert_eq!(parsed.value, expected());
  }

  #[test]
  fn unlabeled_fence_is_not_a_fenced_candidate() {
    assert_eq!(ParseStage::Fenced.attempt("```\n[1]\n```"), StageOutcome::NoCandidate);
  }

  #[test]
  fn prose_only_is_not_parseable() {
    assert_eq!(
      parse_reply("I'm sorry, I cannot create a quiz from this document."),
      Err(QuizError::ResponseNotParseable)
    );
    assert_eq!(parse_reply(""), Err(QuizError::ResponseNotParseable));
  }

  #[test]
  fn first_of_two_arrays_is_taken() {
    let reply = format!("Here is the quiz: {QUESTIONS}\nAnd a spare one: [{{\"question\":\"Extra?\"}}]");
    let parsed = parse_reply(&reply).unwrap();
    assert_eq!(parsed.stage, ParseStage::Embedded);
    assert_eq!(parsed.value, expected());
  }

  #[test]
  fn brackets_inside_strings_do_not_end_the_array() {
    let inner = r#"[{"question":"Which is a list ] or } sign?","options":["]","}","[","{"],"correctAnswer":"]"}]"#;
    let reply = format!("Result: {inner} done");
    assert_eq!(ParseStage::Embedded.attempt(&reply), StageOutcome::Parsed(serde_json::from_str(inner).unwrap()));
  }

  #[test]
  fn array_of_scalars_is_not_an_embedded_candidate() {
    assert_eq!(ParseStage::Embedded.attempt("pick [1, 2] please"), StageOutcome::NoCandidate);
  }

  #[test]
  fn truncated_array_is_not_parseable() {
    let reply = r#"[{"question":"Q","options":["a","b","c","d"],"correctAnswer":"a"}, {"question":"#;
    assert_eq!(parse_reply(reply), Err(QuizError::ResponseNotParseable));
  }
}
