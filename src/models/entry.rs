use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    /// Sentiment score in roughly [-1, 1]; absent until analyzed.
    pub mood_score: Option<f64>,
    pub emotion_id: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Weather/air-quality snapshot captured at submission time.
    pub weather_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Client-supplied mood score; when absent the sentiment analyzer
    /// fills it in (best effort).
    pub mood_score: Option<f64>,
    pub emotion_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000))]
    pub content: Option<String>,

    pub mood_score: Option<f64>,
    pub emotion_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EntryListQuery {
    /// Range token: "7", "30", or "all"/absent.
    pub range: Option<String>,
}
