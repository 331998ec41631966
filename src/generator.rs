//! Quiz generation and the read/delete operations behind the HTTP handlers.
//!
//! Generation runs strictly in sequence: resolve content, call the model, extract
//! questions, build the quiz, store it. Any failure aborts the request; nothing is
//! retried and nothing is stored unless the quiz was fully built.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::anthropic::CompletionProvider;
use crate::config::Prompts;
use crate::content::ContentFetcher;
use crate::domain::{GenerationOptions, Quiz, QuizDocument};
use crate::error::ServiceError;
use crate::extract::extract_questions;
use crate::protocol::{GenerateQuizIn, GenerateQuizOut, QuizPage};
use crate::store::QuizStore;
use crate::util::{fill_template, round2};

pub const MIN_CONTENT_CHARS: usize = 100;
const GENERATION_PROMPT_RECORD: &str = "Quiz generated from book content";

#[derive(Clone)]
pub struct QuizGenerator {
  completion: Arc<dyn CompletionProvider>,
  fetcher: Arc<dyn ContentFetcher>,
  store: Arc<dyn QuizStore>,
  prompts: Prompts,
}

/// "easy: 30%, medium: 50%, hard: 20%" and "multiple_choice, boolean" for the prompt.
pub fn render_prompt(template: &str, content: &str, options: &GenerationOptions) -> String {
  let distribution = options.difficulty_distribution.iter()
    .map(|(d, p)| format!("{}: {:.0}%", d, p * 100.0))
    .collect::<Vec<_>>()
    .join(", ");
  let types = options.question_types.iter()
    .map(|t| t.as_str())
    .collect::<Vec<_>>()
    .join(", ");
  let num_questions = options.num_questions.to_string();

  fill_template(template, &[
    ("content", content),
    ("num_questions", &num_questions),
    ("difficulty_distribution", &distribution),
    ("question_types", &types),
    ("language", &options.language),
  ])
}

impl QuizGenerator {
  pub fn new(
    completion: Arc<dyn CompletionProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    store: Arc<dyn QuizStore>,
    prompts: Prompts,
  ) -> Self {
    Self { completion, fetcher, store, prompts }
  }

  pub fn model(&self) -> &str {
    self.completion.model()
  }

  /// Non-blank supplied text is used as given; with no text at all we fetch by `book_id`.
  ///
  /// Supplied text under 100 characters is a caller error (400). It does not fall
  /// back to a fetch, so a short `content` field is rejected the same way whether
  /// or not the content processor knows the book.
  #[instrument(level = "info", skip(self, supplied), fields(supplied_len = ?supplied.map(str::len)))]
  async fn resolve_content(&self, book_id: &str, supplied: Option<&str>) -> Result<String, ServiceError> {
    let content = match supplied.filter(|c| !c.trim().is_empty()) {
      Some(text) => text.to_string(),
      None => {
        info!(%book_id, "Content not provided, fetching from content processor");
        self.fetcher.fetch(book_id).await?
      }
    };

    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
      return Err(ServiceError::ContentTooShort(chars));
    }
    Ok(content)
  }

  #[instrument(level = "info", skip(self, req), fields(book_id = %req.book_id))]
  pub async fn generate(&self, req: GenerateQuizIn) -> Result<GenerateQuizOut, ServiceError> {
    let start = Instant::now();
    let result = self.generate_inner(req, start).await;
    if let Err(e) = &result {
      error!(elapsed = ?start.elapsed(), error = %e, "Quiz generation failed");
    }
    result
  }

  async fn generate_inner(&self, req: GenerateQuizIn, start: Instant) -> Result<GenerateQuizOut, ServiceError> {
    if req.book_id.trim().is_empty() {
      return Err(ServiceError::InputValidation("book_id must not be empty".into()));
    }
    let options = req.options.unwrap_or_default();
    options.validate().map_err(ServiceError::InputValidation)?;

    info!(num_questions = options.num_questions, model = %self.model(), "Starting quiz generation");
    let content = self.resolve_content(&req.book_id, req.content.as_deref()).await?;

    let prompt = render_prompt(&self.prompts.quiz_generation_template, &content, &options);
    let raw = self.completion.complete(&prompt).await?;
    let questions = extract_questions(&raw, &options)?;

    let quiz = Quiz::new(
      req.book_id,
      questions,
      self.model().to_string(),
      Some(GENERATION_PROMPT_RECORD.to_string()),
      req.metadata.unwrap_or_default(),
    )?;
    let questions_count = quiz.questions.len();
    let quiz_id = self.store.create_quiz(&quiz).await?;

    let elapsed = start.elapsed().as_secs_f64();
    info!(%quiz_id, questions_count, elapsed = %format!("{:.2}s", elapsed), "Quiz generation completed");

    Ok(GenerateQuizOut {
      quiz_id,
      questions_count,
      status: "success".into(),
      generation_time_seconds: round2(elapsed),
      ai_model_used: self.model().to_string(),
    })
  }

  #[instrument(level = "info", skip(self))]
  pub async fn get_quiz(&self, quiz_id: &str) -> Result<QuizDocument, ServiceError> {
    match self.store.get_quiz(quiz_id).await {
      Ok(Some(doc)) => Ok(doc),
      Ok(None) => Err(ServiceError::NotFound(format!("Quiz with ID {quiz_id} not found"))),
      Err(e) => {
        error!(%quiz_id, error = %e, "Error retrieving quiz");
        Err(e.into())
      }
    }
  }

  #[instrument(level = "info", skip(self))]
  pub async fn list_quizzes(&self, book_id: Option<&str>, limit: i64, offset: u64) -> Result<QuizPage, ServiceError> {
    let book_id = book_id.filter(|b| !b.is_empty());
    let quizzes = self.store.list_quizzes(book_id, limit, offset).await.map_err(|e| {
      error!(error = %e, "Error listing quizzes");
      ServiceError::from(e)
    })?;
    Ok(QuizPage { count: quizzes.len(), quizzes, limit, offset })
  }

  #[instrument(level = "info", skip(self))]
  pub async fn delete_quiz(&self, quiz_id: &str) -> Result<bool, ServiceError> {
    let deleted = self.store.delete_quiz(quiz_id).await.map_err(|e| {
      error!(%quiz_id, error = %e, "Error deleting quiz");
      ServiceError::from(e)
    })?;
    if deleted {
      info!(%quiz_id, "Quiz deleted");
    } else {
      warn!(%quiz_id, "Quiz not found for deletion");
    }
    Ok(deleted)
  }
}
