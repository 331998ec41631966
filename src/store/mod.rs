//! Persistence gateway for quizzes.
//!
//! Ids are MongoDB ObjectIds rendered as 24 hex digits. A malformed id is never an
//! error: lookups return `None` and deletes return `false`.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::domain::{Quiz, QuizDocument};

pub mod memory;
pub mod mongo;

pub use memory::MemoryQuizStore;
pub use mongo::MongoQuizStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Failed to encode quiz document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("Failed to decode quiz document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("Database returned a non-ObjectId identifier: {0}")]
    UnexpectedId(String),

    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Insert a quiz and return its new id.
    async fn create_quiz(&self, quiz: &Quiz) -> Result<String, StoreError>;

    async fn get_quiz(&self, id: &str) -> Result<Option<QuizDocument>, StoreError>;

    /// Optional `book_id` equality filter, then skip `offset`, take `limit`.
    async fn list_quizzes(
        &self,
        book_id: Option<&str>,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<QuizDocument>, StoreError>;

    /// True when a quiz existed and was removed.
    async fn delete_quiz(&self, id: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn disconnect(&self);
}

/// Parse a hex ObjectId; anything malformed is `None`.
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}
