//! In-process quiz store (QUIZ_STORE=memory). Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{parse_object_id, QuizStore, StoreError};
use crate::domain::{Quiz, QuizDocument};

#[derive(Default)]
pub struct MemoryQuizStore {
    by_id: RwLock<BTreeMap<ObjectId, Quiz>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.by_id.read().await.len()
    }
}

fn to_document(id: &ObjectId, quiz: &Quiz) -> QuizDocument {
    QuizDocument { id: Some(id.to_hex()), quiz: quiz.clone() }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    #[instrument(level = "debug", skip(self, quiz), fields(book_id = %quiz.book_id))]
    async fn create_quiz(&self, quiz: &Quiz) -> Result<String, StoreError> {
        let id = ObjectId::new();
        self.by_id.write().await.insert(id, quiz.clone());
        debug!(id = %id, "Quiz stored in memory");
        Ok(id.to_hex())
    }

    async fn get_quiz(&self, id: &str) -> Result<Option<QuizDocument>, StoreError> {
        let Some(oid) = parse_object_id(id) else { return Ok(None) };
        Ok(self.by_id.read().await.get(&oid).map(|q| to_document(&oid, q)))
    }

    async fn list_quizzes(
        &self,
        book_id: Option<&str>,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<QuizDocument>, StoreError> {
        let by_id = self.by_id.read().await;
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(by_id
            .iter()
            .filter(|(_, q)| book_id.map_or(true, |b| q.book_id == b))
            .skip(skip)
            .take(take)
            .map(|(id, q)| to_document(id, q))
            .collect())
    }

    async fn delete_quiz(&self, id: &str) -> Result<bool, StoreError> {
        let Some(oid) = parse_object_id(id) else { return Ok(false) };
        Ok(self.by_id.write().await.remove(&oid).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn disconnect(&self) {}
}
