//! Turns one free-text model completion into validated questions.
//!
//! The JSON object is located by taking everything from the first `{` to the last `}`.
//! Braces are not balanced: prose containing braces around the object will end up in
//! the candidate and fail to parse. Extraction is all-or-nothing; one invalid element
//! rejects the whole batch.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::{GenerationOptions, Question, ValidationError};
use crate::util::trunc_for_log;

const RAW_LOG_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum ExtractError {
  #[error("No JSON found in model response")]
  NoStructuredDataFound,

  #[error("Invalid JSON response from model: {0}")]
  MalformedStructuredData(#[source] serde_json::Error),

  #[error("No 'questions' array in model response")]
  MissingQuestionsField,

  #[error("Question {index} in model response is invalid: {source}")]
  QuestionValidationFailed {
    index: usize,
    #[source]
    source: ValidationError,
  },
}

/// Slice from the first `{` to the last `}` (inclusive), if both exist in that order.
pub fn locate_json(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let end = text.rfind('}')?;
  if end < start {
    return None;
  }
  Some(&text[start..=end])
}

#[instrument(level = "info", skip(raw, options), fields(raw_len = raw.len(), requested = options.num_questions))]
pub fn extract_questions(raw: &str, options: &GenerationOptions) -> Result<Vec<Question>, ExtractError> {
  debug!(raw = %trunc_for_log(raw, RAW_LOG_CHARS), "Model response");

  let candidate = locate_json(raw).ok_or_else(|| {
    warn!("No JSON object found in model response");
    ExtractError::NoStructuredDataFound
  })?;

  let data: Value = serde_json::from_str(candidate).map_err(|e| {
    warn!(error = %e, "Failed to parse model response as JSON");
    ExtractError::MalformedStructuredData(e)
  })?;

  let items = data
    .get("questions")
    .and_then(Value::as_array)
    .ok_or(ExtractError::MissingQuestionsField)?;

  let questions = items
    .iter()
    .enumerate()
    .map(|(index, item)| {
      Question::from_json(item).map_err(|source| ExtractError::QuestionValidationFailed { index, source })
    })
    .collect::<Result<Vec<_>, _>>()?;

  info!(extracted = questions.len(), requested = options.num_questions, "Questions extracted from model response");
  Ok(questions)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuestionType;
  use serde_json::json;

  fn two_questions() -> Value {
    json!({
      "questions": [
        {
          "question": "What is the capital of Italy?",
          "type": "multiple_choice",
          "correct_answer": "Rome",
          "options": ["Rome", "Milan", "Naples", "Venice"],
          "explanation": "Rome is the capital and largest city of Italy.",
          "difficulty": "easy",
          "topic": "Geography",
          "concepts_tested": ["Italian cities", "European capitals"]
        },
        {
          "question": "Is Rome located in northern Italy?",
          "type": "boolean",
          "correct_answer": false,
          "explanation": "Rome is located in central Italy, not northern Italy.",
          "difficulty": "medium",
          "topic": "Geography",
          "concepts_tested": ["Italian geography"]
        }
      ]
    })
  }

  #[test]
  fn extracts_questions_in_order() {
    let raw = two_questions().to_string();
    let qs = extract_questions(&raw, &GenerationOptions::default()).unwrap();
    assert_eq!(qs.len(), 2);
    assert_eq!(qs[0].kind, QuestionType::MultipleChoice);
    assert_eq!(qs[0].options.as_deref().map(<[String]>::len), Some(4));
    assert_eq!(qs[1].kind, QuestionType::Boolean);
    assert_eq!(qs[1].correct_answer, "false");
    assert!(qs[1].options.is_none());
  }

  #[test]
  fn tolerates_commentary_around_the_object() {
    let raw = format!("Here is your quiz:\n```json\n{}\n```\nGood luck!", two_questions());
    let qs = extract_questions(&raw, &GenerationOptions::default()).unwrap();
    assert_eq!(qs.len(), 2);
  }

  #[test]
  fn does_not_clamp_to_requested_count() {
    let options = GenerationOptions { num_questions: 5, ..Default::default() };
    let qs = extract_questions(&two_questions().to_string(), &options).unwrap();
    assert_eq!(qs.len(), 2);
  }

  #[test]
  fn empty_questions_array_between_noise() {
    let qs = extract_questions("noise{\"questions\":[]}moretext", &GenerationOptions::default()).unwrap();
    assert!(qs.is_empty());
  }

  #[test]
  fn missing_braces_means_no_structured_data() {
    for raw in ["no json here", "only an opening { brace", "only a closing } brace", "} reversed {"] {
      let err = extract_questions(raw, &GenerationOptions::default()).unwrap_err();
      assert!(matches!(err, ExtractError::NoStructuredDataFound), "{raw}: {err}");
    }
  }

  #[test]
  fn braces_in_surrounding_prose_break_the_candidate() {
    let raw = format!("Use {{this}} format: {}", two_questions());
    let err = extract_questions(&raw, &GenerationOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedStructuredData(_)));
  }

  #[test]
  fn malformed_json_carries_parser_diagnostic() {
    let err = extract_questions("{\"questions\": [", &GenerationOptions::default());
    assert!(matches!(err, Err(ExtractError::NoStructuredDataFound)));

    let err = extract_questions("{\"questions\": [}", &GenerationOptions::default()).unwrap_err();
    match err {
      ExtractError::MalformedStructuredData(e) => assert!(e.line() >= 1),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn questions_field_must_be_an_array() {
    let err = extract_questions("{\"items\": []}", &GenerationOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::MissingQuestionsField));
    let err = extract_questions("{\"questions\": {}}", &GenerationOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractError::MissingQuestionsField));
  }

  #[test]
  fn one_invalid_question_rejects_the_batch() {
    let mut data = two_questions();
    data["questions"][1]["difficulty"] = json!("impossible");
    let err = extract_questions(&data.to_string(), &GenerationOptions::default()).unwrap_err();
    match err {
      ExtractError::QuestionValidationFailed { index, source } => {
        assert_eq!(index, 1);
        assert!(matches!(source, ValidationError::UnknownDifficulty(_)));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn locate_json_spans_first_to_last_brace() {
    assert_eq!(locate_json("a{b}c{d}e"), Some("{b}c{d}"));
    assert_eq!(locate_json("{}"), Some("{}"));
    assert_eq!(locate_json("}{"), None);
  }
}
