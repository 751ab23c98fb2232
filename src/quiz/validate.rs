//! Schema validation and normalization of a parsed quiz.
//!
//! All-or-nothing: the first invalid question fails the batch with its 0-based
//! index, and the batch must contain exactly the requested number of questions.

use serde_json::{Map, Value};

use crate::domain::{QuizQuestion, OPTION_COUNT};
use crate::error::QuizError;
use crate::util::json_kind;

pub fn validate_batch(value: Value, expected: usize) -> Result<Vec<QuizQuestion>, QuizError> {
  let items = match value {
    Value::Array(items) => items,
    other => {
      return Err(QuizError::SchemaInvalid {
        index: 0,
        reason: format!("expected a JSON array of questions, got {}", json_kind(&other)),
      })
    }
  };

  let questions = items
    .iter()
    .enumerate()
    .map(|(index, item)| validate_question(item).map_err(|reason| QuizError::SchemaInvalid { index, reason }))
    .collect::<Result<Vec<_>, _>>()?;

  if questions.len() != expected {
    return Err(QuizError::SchemaInvalid {
      index: questions.len().min(expected),
      reason: format!("expected {expected} questions, got {}", questions.len()),
    });
  }

  Ok(questions)
}

/// Validate one element and return it trimmed.
fn validate_question(item: &Value) -> Result<QuizQuestion, String> {
  let obj = item
    .as_object()
    .ok_or_else(|| format!("expected an object, got {}", json_kind(item)))?;

  let prompt = required_text(obj, "question")?;

  let raw_options = match obj.get("options") {
    Some(Value::Array(options)) => options,
    Some(other) => return Err(format!("`options` must be an array, got {}", json_kind(other))),
    None => return Err("missing `options`".into()),
  };
  if raw_options.len() != OPTION_COUNT {
    return Err(format!("expected exactly {OPTION_COUNT} options, got {}", raw_options.len()));
  }

  let mut options: Vec<String> = Vec::with_capacity(OPTION_COUNT);
  for (pos, option) in raw_options.iter().enumerate() {
    let text = option
      .as_str()
      .ok_or_else(|| format!("option {} must be a string, got {}", pos + 1, json_kind(option)))?
      .trim();
    if text.is_empty() {
      return Err(format!("option {} is empty", pos + 1));
    }
    if options.iter().any(|seen| seen == text) {
      return Err(format!("option {} duplicates an earlier option", pos + 1));
    }
    options.push(text.to_string());
  }

  let correct_option = required_text(obj, "correctAnswer")?;
  if !options.contains(&correct_option) {
    return Err(format!("`correctAnswer` \"{correct_option}\" is not one of the options"));
  }

  Ok(QuizQuestion { prompt, options, correct_option })
}

fn required_text(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
  match obj.get(key) {
    Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
    Some(Value::String(_)) => Err(format!("`{key}` is empty")),
    Some(other) => Err(format!("`{key}` must be a string, got {}", json_kind(other))),
    None => Err(format!("missing `{key}`")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn question(n: usize) -> Value {
    json!({
      "question": format!("Question {n}?"),
      "options": ["a", "b", "c", "d"],
      "correctAnswer": "c"
    })
  }

  fn batch(n: usize) -> Vec<Value> {
    (0..n).map(question).collect()
  }

  fn schema_index(err: QuizError) -> usize {
    match err {
      QuizError::SchemaInvalid { index, .. } => index,
      other => panic!("expected SchemaInvalid, got {other:?}"),
    }
  }

  #[test]
  fn accepts_exactly_n_well_formed_questions() {
    for n in [1, 3, 10] {
      let out = validate_batch(Value::Array(batch(n)), n).unwrap();
      assert_eq!(out.len(), n);
      for q in &out {
        assert_eq!(q.options.len(), OPTION_COUNT);
        assert!(q.options.contains(&q.correct_option));
      }
    }
  }

  #[test]
  fn non_array_is_schema_invalid() {
    let err = validate_batch(json!({"questions": batch(1)}), 1).unwrap_err();
    assert_eq!(
      err,
      QuizError::SchemaInvalid { index: 0, reason: "expected a JSON array of questions, got an object".into() }
    );
  }

  #[test]
  fn one_short_option_list_fails_the_whole_batch() {
    let mut items = batch(10);
    items[6]["options"] = json!(["a", "b", "c"]);
    let err = validate_batch(Value::Array(items), 10).unwrap_err();
    assert_eq!(
      err,
      QuizError::SchemaInvalid { index: 6, reason: "expected exactly 4 options, got 3".into() }
    );
  }

  #[test]
  fn answer_must_be_an_option() {
    let mut items = batch(2);
    items[1]["correctAnswer"] = json!("z");
    assert_eq!(schema_index(validate_batch(Value::Array(items), 2).unwrap_err()), 1);
  }

  #[test]
  fn missing_or_blank_fields_are_rejected() {
    let mut items = batch(3);
    items[0].as_object_mut().unwrap().remove("question");
    assert_eq!(schema_index(validate_batch(Value::Array(items), 3).unwrap_err()), 0);

    let mut items = batch(3);
    items[2]["correctAnswer"] = json!("   ");
    assert_eq!(schema_index(validate_batch(Value::Array(items), 3).unwrap_err()), 2);

    let mut items = batch(3);
    items[1]["options"] = json!("a, b, c, d");
    assert_eq!(schema_index(validate_batch(Value::Array(items), 3).unwrap_err()), 1);

    let err = validate_batch(json!(["just a string"]), 1).unwrap_err();
    assert_eq!(schema_index(err), 0);
  }

  #[test]
  fn duplicate_and_non_string_options_are_rejected() {
    let mut items = batch(1);
    items[0]["options"] = json!(["a", "b ", " b", "c"]);
    let err = validate_batch(Value::Array(items), 1).unwrap_err();
    assert_eq!(err, QuizError::SchemaInvalid { index: 0, reason: "option 3 duplicates an earlier option".into() });

    let mut items = batch(1);
    items[0]["options"] = json!(["a", "b", 3, "c"]);
    assert_eq!(schema_index(validate_batch(Value::Array(items), 1).unwrap_err()), 0);
  }

  #[test]
  fn count_mismatch_is_schema_invalid() {
    let err = validate_batch(Value::Array(batch(2)), 3).unwrap_err();
    assert_eq!(err, QuizError::SchemaInvalid { index: 2, reason: "expected 3 questions, got 2".into() });

    let err = validate_batch(Value::Array(batch(5)), 3).unwrap_err();
    assert_eq!(schema_index(err), 3);

    assert_eq!(schema_index(validate_batch(json!([]), 1).unwrap_err()), 0);
  }

  #[test]
  fn whitespace_is_trimmed() {
    let raw = json!([{
      "question": "  What is the capital of France?\n",
      "options": [" Berlin", "Madrid ", "\tParis", "Rome"],
      "correctAnswer": " Paris "
    }]);
    let out = validate_batch(raw, 1).unwrap();
    assert_eq!(
      out,
      vec![QuizQuestion {
        prompt: "What is the capital of France?".into(),
        options: vec!["Berlin".into(), "Madrid".into(), "Paris".into(), "Rome".into()],
        correct_option: "Paris".into(),
      }]
    );
  }
}
