//! Domain models: questions, quizzes, stored quiz documents and generation options.
//!
//! Construction goes through `Question::new` / `Quiz::new`, which apply the field rules.
//! Serde derives are used for the store and HTTP shapes; records read back from the
//! store were validated when they were written.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const MIN_QUESTION_CHARS: usize = 10;
pub const MIN_EXPLANATION_CHARS: usize = 20;
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 20;

#[derive(Debug, Error)]
pub enum ValidationError {
  #[error("question must be at least 10 characters long (got {0})")]
  QuestionTooShort(usize),

  #[error("explanation must be at least 20 characters long (got {0})")]
  ExplanationTooShort(usize),

  #[error("unknown question type '{0}' (expected multiple_choice, boolean or open)")]
  UnknownQuestionType(String),

  #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
  UnknownDifficulty(String),

  #[error("correct_answer must be a string, boolean or number (got {0})")]
  UnsupportedAnswer(&'static str),

  #[error("concepts_tested must contain at least one concept")]
  NoConcepts,

  #[error("quiz must contain between 1 and 20 questions (got {0})")]
  QuestionCount(usize),

  #[error("invalid question shape: {0}")]
  Shape(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  MultipleChoice,
  Boolean,
  Open,
}

impl QuestionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      QuestionType::MultipleChoice => "multiple_choice",
      QuestionType::Boolean => "boolean",
      QuestionType::Open => "open",
    }
  }
}

impl FromStr for QuestionType {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "multiple_choice" => Ok(QuestionType::MultipleChoice),
      "boolean" => Ok(QuestionType::Boolean),
      "open" => Ok(QuestionType::Open),
      other => Err(ValidationError::UnknownQuestionType(other.to_string())),
    }
  }
}

/// Ordered easy < medium < hard so distributions render in a stable order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      other => Err(ValidationError::UnknownDifficulty(other.to_string())),
    }
  }
}

/// One validated quiz question. `correct_answer` is always a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub question: String,
  #[serde(rename = "type")]
  pub kind: QuestionType,
  pub correct_answer: String,
  #[serde(default)]
  pub options: Option<Vec<String>>,
  pub explanation: String,
  pub difficulty: Difficulty,
  pub topic: String,
  pub concepts_tested: Vec<String>,
}

/// Loose shape of a question as the model writes it. Enum tags and the answer are
/// kept raw so `Question::new` can report precise validation errors.
#[derive(Debug, Deserialize)]
struct RawQuestion {
  question: String,
  #[serde(rename = "type")]
  kind: String,
  correct_answer: Value,
  #[serde(default)]
  options: Option<Vec<String>>,
  explanation: String,
  difficulty: String,
  topic: String,
  concepts_tested: Vec<String>,
}

impl Question {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    question: String,
    kind: &str,
    correct_answer: &Value,
    options: Option<Vec<String>>,
    explanation: String,
    difficulty: &str,
    topic: String,
    concepts_tested: Vec<String>,
  ) -> Result<Self, ValidationError> {
    let question_len = question.chars().count();
    if question_len < MIN_QUESTION_CHARS {
      return Err(ValidationError::QuestionTooShort(question_len));
    }
    let kind = kind.parse::<QuestionType>()?;
    let correct_answer = normalize_answer(correct_answer)?;
    let explanation_len = explanation.chars().count();
    if explanation_len < MIN_EXPLANATION_CHARS {
      return Err(ValidationError::ExplanationTooShort(explanation_len));
    }
    let difficulty = difficulty.parse::<Difficulty>()?;
    if concepts_tested.is_empty() {
      return Err(ValidationError::NoConcepts);
    }

    Ok(Self { question, kind, correct_answer, options, explanation, difficulty, topic, concepts_tested })
  }

  /// Build a question from one element of the model's `questions` array.
  pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
    let raw: RawQuestion = serde_json::from_value(value.clone())?;
    Self::new(
      raw.question,
      &raw.kind,
      &raw.correct_answer,
      raw.options,
      raw.explanation,
      &raw.difficulty,
      raw.topic,
      raw.concepts_tested,
    )
  }
}

/// Booleans become "true"/"false"; strings stay as given; numbers keep their JSON text.
pub fn normalize_answer(value: &Value) -> Result<String, ValidationError> {
  match value {
    Value::Bool(b) => Ok(b.to_string()),
    Value::String(s) => Ok(s.clone()),
    Value::Number(n) => Ok(n.to_string()),
    Value::Null => Err(ValidationError::UnsupportedAnswer("null")),
    Value::Array(_) => Err(ValidationError::UnsupportedAnswer("array")),
    Value::Object(_) => Err(ValidationError::UnsupportedAnswer("object")),
  }
}

/// A generated quiz, before or after storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
  pub book_id: String,
  pub questions: Vec<Question>,
  pub created_at: DateTime<Utc>,
  pub ai_model: String,
  #[serde(default)]
  pub generation_prompt: Option<String>,
  #[serde(default)]
  pub metadata: Map<String, Value>,
}

impl Quiz {
  pub fn new(
    book_id: String,
    questions: Vec<Question>,
    ai_model: String,
    generation_prompt: Option<String>,
    metadata: Map<String, Value>,
  ) -> Result<Self, ValidationError> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&questions.len()) {
      return Err(ValidationError::QuestionCount(questions.len()));
    }
    Ok(Self { book_id, questions, created_at: Utc::now(), ai_model, generation_prompt, metadata })
  }
}

/// A stored quiz with its store-assigned id (hex ObjectId).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizDocument {
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(flatten)]
  pub quiz: Quiz,
}

/// Caller-tunable generation parameters. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
  #[serde(default = "default_num_questions")]
  pub num_questions: i64,
  #[serde(default = "default_difficulty_distribution")]
  pub difficulty_distribution: BTreeMap<Difficulty, f64>,
  #[serde(default = "default_question_types")]
  pub question_types: Vec<QuestionType>,
  #[serde(default = "default_language")]
  pub language: String,
}

fn default_num_questions() -> i64 { 10 }

fn default_difficulty_distribution() -> BTreeMap<Difficulty, f64> {
  BTreeMap::from([(Difficulty::Easy, 0.3), (Difficulty::Medium, 0.5), (Difficulty::Hard, 0.2)])
}

fn default_question_types() -> Vec<QuestionType> {
  vec![QuestionType::MultipleChoice, QuestionType::Boolean]
}

fn default_language() -> String { "it".into() }

impl Default for GenerationOptions {
  fn default() -> Self {
    Self {
      num_questions: default_num_questions(),
      difficulty_distribution: default_difficulty_distribution(),
      question_types: default_question_types(),
      language: default_language(),
    }
  }
}

impl GenerationOptions {
  /// Range checks serde cannot express. Returns a message suitable for a 400 response.
  pub fn validate(&self) -> Result<(), String> {
    if self.num_questions < MIN_QUESTIONS as i64 || self.num_questions > MAX_QUESTIONS as i64 {
      return Err(format!(
        "num_questions must be between {MIN_QUESTIONS} and {MAX_QUESTIONS} (got {})",
        self.num_questions
      ));
    }
    if let Some((d, p)) = self.difficulty_distribution.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
      return Err(format!("difficulty_distribution.{d} must be a non-negative number (got {p})"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::sample_question;
  use serde_json::json;

  fn question_json(answer: Value) -> Value {
    json!({
      "question": "Is Rome located in northern Italy?",
      "type": "boolean",
      "correct_answer": answer,
      "explanation": "Rome is located in central Italy, not northern Italy.",
      "difficulty": "medium",
      "topic": "Geography",
      "concepts_tested": ["Italian geography"]
    })
  }

  #[test]
  fn boolean_answers_become_lowercase_strings() {
    let q = Question::from_json(&question_json(json!(true))).unwrap();
    assert_eq!(q.correct_answer, "true");
    let q = Question::from_json(&question_json(json!(false))).unwrap();
    assert_eq!(q.correct_answer, "false");

    let stored = serde_json::to_value(&q).unwrap();
    assert_eq!(stored["correct_answer"], json!("false"));
  }

  #[test]
  fn string_and_number_answers_are_kept() {
    let q = Question::from_json(&question_json(json!("Rome"))).unwrap();
    assert_eq!(q.correct_answer, "Rome");
    let q = Question::from_json(&question_json(json!(42))).unwrap();
    assert_eq!(q.correct_answer, "42");
  }

  #[test]
  fn null_answer_is_rejected() {
    let err = Question::from_json(&question_json(Value::Null)).unwrap_err();
    assert!(matches!(err, ValidationError::UnsupportedAnswer("null")));
  }

  #[test]
  fn field_rules_are_enforced() {
    let mut v = question_json(json!("x"));
    v["question"] = json!("Short?");
    assert!(matches!(Question::from_json(&v), Err(ValidationError::QuestionTooShort(6))));

    let mut v = question_json(json!("x"));
    v["explanation"] = json!("Too brief.");
    assert!(matches!(Question::from_json(&v), Err(ValidationError::ExplanationTooShort(_))));

    let mut v = question_json(json!("x"));
    v["type"] = json!("essay");
    assert!(matches!(Question::from_json(&v), Err(ValidationError::UnknownQuestionType(t)) if t == "essay"));

    let mut v = question_json(json!("x"));
    v["difficulty"] = json!("extreme");
    assert!(matches!(Question::from_json(&v), Err(ValidationError::UnknownDifficulty(_))));

    let mut v = question_json(json!("x"));
    v["concepts_tested"] = json!([]);
    assert!(matches!(Question::from_json(&v), Err(ValidationError::NoConcepts)));

    let mut v = question_json(json!("x"));
    v.as_object_mut().unwrap().remove("topic");
    assert!(matches!(Question::from_json(&v), Err(ValidationError::Shape(_))));
  }

  #[test]
  fn lengths_count_characters_not_bytes() {
    let mut v = question_json(json!("sì"));
    // 10 characters, more than 10 bytes
    v["question"] = json!("perché è?!");
    assert!(Question::from_json(&v).is_ok());
  }

  #[test]
  fn quiz_size_bounds() {
    let build = |n: usize| {
      Quiz::new("book-1".into(), vec![sample_question(); n], "model".into(), None, Map::new())
    };
    assert!(matches!(build(0), Err(ValidationError::QuestionCount(0))));
    assert!(build(1).is_ok());
    assert!(build(20).is_ok());
    assert!(matches!(build(21), Err(ValidationError::QuestionCount(21))));
  }

  #[test]
  fn document_serializes_id_as_underscore_id() {
    let quiz = Quiz::new("book-1".into(), vec![sample_question()], "model".into(), None, Map::new()).unwrap();
    let doc = QuizDocument { id: Some("507f1f77bcf86cd799439011".into()), quiz };
    let v = serde_json::to_value(&doc).unwrap();
    assert_eq!(v["_id"], json!("507f1f77bcf86cd799439011"));
    assert_eq!(v["book_id"], json!("book-1"));
    assert_eq!(v["questions"][0]["type"], json!("boolean"));
  }

  #[test]
  fn options_defaults_and_validation() {
    let opts: GenerationOptions = serde_json::from_value(json!({})).unwrap();
    assert_eq!(opts, GenerationOptions::default());
    assert_eq!(opts.num_questions, 10);
    assert_eq!(opts.language, "it");
    assert_eq!(opts.question_types, vec![QuestionType::MultipleChoice, QuestionType::Boolean]);
    assert!(opts.validate().is_ok());

    let opts = GenerationOptions { num_questions: 0, ..Default::default() };
    assert!(opts.validate().is_err());
    let opts = GenerationOptions { num_questions: 21, ..Default::default() };
    assert!(opts.validate().is_err());
  }
}
