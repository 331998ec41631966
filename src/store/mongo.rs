//! MongoDB-backed quiz store: database `learning_platform` (configurable), collection `quizzes`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, instrument};

use super::{parse_object_id, QuizStore, StoreError};
use crate::domain::{Question, Quiz, QuizDocument};

const COLLECTION: &str = "quizzes";

#[derive(Clone)]
pub struct MongoQuizStore {
    client: Client,
    quizzes: Collection<Document>,
}

impl MongoQuizStore {
    /// Connect and ping once; fails if the server is unreachable.
    #[instrument(level = "info", skip(url))]
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        let quizzes = client.database(database).collection::<Document>(COLLECTION);
        let store = Self { client, quizzes };
        match store.ping().await {
            Ok(()) => {
                info!(target: "quiz_generator", %database, "Connected to MongoDB");
                Ok(store)
            }
            Err(e) => {
                error!(target: "quiz_generator", error = %e, "Failed to connect to MongoDB");
                Err(e)
            }
        }
    }
}

/// Collection layout of a quiz. `created_at` is a BSON date here while the HTTP
/// representation keeps RFC 3339 text.
#[derive(Debug, Serialize, Deserialize)]
struct StoredQuiz {
    book_id: String,
    questions: Vec<Question>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    ai_model: String,
    #[serde(default)]
    generation_prompt: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl From<&Quiz> for StoredQuiz {
    fn from(quiz: &Quiz) -> Self {
        Self {
            book_id: quiz.book_id.clone(),
            questions: quiz.questions.clone(),
            created_at: quiz.created_at,
            ai_model: quiz.ai_model.clone(),
            generation_prompt: quiz.generation_prompt.clone(),
            metadata: quiz.metadata.clone(),
        }
    }
}

impl From<StoredQuiz> for Quiz {
    fn from(stored: StoredQuiz) -> Self {
        Quiz {
            book_id: stored.book_id,
            questions: stored.questions,
            created_at: stored.created_at,
            ai_model: stored.ai_model,
            generation_prompt: stored.generation_prompt,
            metadata: stored.metadata,
        }
    }
}

fn to_stored(quiz: &Quiz) -> Result<Document, StoreError> {
    Ok(bson::to_document(&StoredQuiz::from(quiz))?)
}

/// Turn a raw stored document into a `QuizDocument` with a hex id.
fn from_stored(mut doc: Document) -> Result<QuizDocument, StoreError> {
    let id = match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        Some(other) => Some(other.to_string()),
        None => None,
    };
    let stored: StoredQuiz = bson::from_document(doc)?;
    Ok(QuizDocument { id, quiz: stored.into() })
}

#[async_trait]
impl QuizStore for MongoQuizStore {
    #[instrument(level = "debug", skip(self, quiz), fields(book_id = %quiz.book_id))]
    async fn create_quiz(&self, quiz: &Quiz) -> Result<String, StoreError> {
        let doc = to_stored(quiz)?;
        let result = self.quizzes.insert_one(doc, None).await?;
        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            other => Err(StoreError::UnexpectedId(other.to_string())),
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_quiz(&self, id: &str) -> Result<Option<QuizDocument>, StoreError> {
        let Some(oid) = parse_object_id(id) else { return Ok(None) };
        self.quizzes
            .find_one(doc! { "_id": oid }, None)
            .await?
            .map(from_stored)
            .transpose()
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_quizzes(
        &self,
        book_id: Option<&str>,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<QuizDocument>, StoreError> {
        let filter = match book_id {
            Some(b) => doc! { "book_id": b },
            None => doc! {},
        };
        let options = FindOptions::builder().skip(offset).limit(limit).build();
        let docs: Vec<Document> = self.quizzes.find(filter, options).await?.try_collect().await?;
        docs.into_iter().map(from_stored).collect()
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_quiz(&self, id: &str) -> Result<bool, StoreError> {
        let Some(oid) = parse_object_id(id) else { return Ok(false) };
        let result = self.quizzes.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let reply = self.client.database("admin").run_command(doc! { "ping": 1 }, None).await?;
        let ok = match reply.get("ok") {
            Some(Bson::Double(v)) => *v >= 1.0,
            Some(Bson::Int32(v)) => *v >= 1,
            Some(Bson::Int64(v)) => *v >= 1,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("Ping failed: {reply}")))
        }
    }

    async fn disconnect(&self) {
        self.client.clone().shutdown().await;
        info!(target: "quiz_generator", "Disconnected from MongoDB");
    }
}
