//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve the service and its callers independently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{GenerationOptions, QuizDocument};

#[derive(Debug, Deserialize)]
pub struct GenerateQuizIn {
    #[serde(default)]
    pub content: Option<String>,
    pub book_id: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

/// Summary returned after a quiz has been generated and stored.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerateQuizOut {
    pub quiz_id: String,
    pub questions_count: usize,
    pub status: String,
    pub generation_time_seconds: f64,
    pub ai_model_used: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub book_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizPage {
    pub quizzes: Vec<QuizDocument>,
    pub count: usize,
    pub limit: i64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub detail: String,
}
