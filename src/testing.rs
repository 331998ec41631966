//! Fixtures and fake collaborators shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::anthropic::{CompletionError, CompletionProvider};
use crate::content::{ContentError, ContentFetcher};
use crate::domain::{Question, Quiz, QuizDocument};
use crate::store::{QuizStore, StoreError};

pub fn question_value(i: usize) -> Value {
  json!({
    "question": format!("Question number {i}: is Rome in Italy?"),
    "type": "boolean",
    "correct_answer": true,
    "explanation": "Rome is the capital city of Italy, in the centre of the peninsula.",
    "difficulty": "easy",
    "topic": "Geography",
    "concepts_tested": ["Italian cities"]
  })
}

pub fn sample_question() -> Question {
  Question::from_json(&json!({
    "question": "Is Rome located in northern Italy?",
    "type": "boolean",
    "correct_answer": false,
    "explanation": "Rome is located in central Italy, not northern Italy.",
    "difficulty": "medium",
    "topic": "Geography",
    "concepts_tested": ["Italian geography"]
  }))
  .expect("valid sample question")
}

pub fn sample_quiz(book_id: &str) -> Quiz {
  let metadata: Map<String, Value> = json!({ "chapter": "1" }).as_object().cloned().unwrap_or_default();
  Quiz::new(
    book_id.to_string(),
    vec![sample_question()],
    "fake-model".into(),
    Some("Quiz generated from book content".into()),
    metadata,
  )
  .expect("valid sample quiz")
}

/// A model reply with `n` valid questions wrapped in chatty prose.
pub fn model_reply(n: usize) -> String {
  let questions: Vec<Value> = (0..n).map(question_value).collect();
  format!("Sure! Here is the quiz:\n{}\nLet me know if you need more.", json!({ "questions": questions }))
}

pub fn long_content(chars: usize) -> String {
  "Rome is the capital of Italy. ".chars().cycle().take(chars).collect()
}

pub struct FakeCompletion {
  reply: String,
  last_prompt: Mutex<Option<String>>,
}

impl FakeCompletion {
  pub fn new(reply: &str) -> Self {
    Self { reply: reply.to_string(), last_prompt: Mutex::new(None) }
  }

  pub fn last_prompt(&self) -> Option<String> {
    self.last_prompt.lock().ok().and_then(|p| p.clone())
  }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
  fn model(&self) -> &str {
    "fake-model"
  }

  async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
    if let Ok(mut last) = self.last_prompt.lock() {
      *last = Some(prompt.to_string());
    }
    Ok(self.reply.clone())
  }
}

/// Returns the configured text, or fails like an unconfigured fetcher when there is none.
pub struct FakeFetcher {
  content: Option<String>,
  calls: AtomicUsize,
}

impl FakeFetcher {
  pub fn new(content: Option<&str>) -> Self {
    Self { content: content.map(str::to_string), calls: AtomicUsize::new(0) }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
  async fn fetch(&self, _book_id: &str) -> Result<String, ContentError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.content.clone().ok_or(ContentError::NotConfigured)
  }
}

/// Every operation fails with the given message.
pub struct FailingStore(pub String);

impl FailingStore {
  fn err(&self) -> StoreError {
    StoreError::Unavailable(self.0.clone())
  }
}

#[async_trait]
impl QuizStore for FailingStore {
  async fn create_quiz(&self, _quiz: &Quiz) -> Result<String, StoreError> {
    Err(self.err())
  }

  async fn get_quiz(&self, _id: &str) -> Result<Option<QuizDocument>, StoreError> {
    Err(self.err())
  }

  async fn list_quizzes(&self, _book_id: Option<&str>, _limit: i64, _offset: u64) -> Result<Vec<QuizDocument>, StoreError> {
    Err(self.err())
  }

  async fn delete_quiz(&self, _id: &str) -> Result<bool, StoreError> {
    Err(self.err())
  }

  async fn ping(&self) -> Result<(), StoreError> {
    Err(self.err())
  }

  async fn disconnect(&self) {}
}
