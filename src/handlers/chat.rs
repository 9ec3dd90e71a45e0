use axum::{extract::State, Extension, Json};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::services::{ai, embeddings};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Journal entries whose chunks grounded the answer.
    pub sources: Vec<Uuid>,
}

const CONTEXT_CHUNKS: i64 = 5;

/// POST /api/chat — retrieval-augmented chat over the user's journal.
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let query_vec = embeddings::embed(&state.config, &body.message)
        .await
        .map_err(AppError::Internal)?;

    // Cosine-nearest chunks for this user only.
    let hits: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT entry_id, chunk_text
        FROM entry_embeddings
        WHERE user_id = $1
        ORDER BY embedding <=> $2
        LIMIT $3
        "#,
    )
    .bind(auth_user.id)
    .bind(Vector::from(query_vec))
    .bind(CONTEXT_CHUNKS)
    .fetch_all(&state.db)
    .await?;

    if hits.is_empty() {
        return Ok(Json(ChatResponse {
            answer: "I don't have any journal entries to draw on yet. Write a few entries and ask again!".into(),
            sources: Vec::new(),
        }));
    }

    let context = hits
        .iter()
        .map(|(_, text)| format!("- {}", text))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        r#"You are a reflective journaling companion. Answer the user's question using only the journal excerpts below. If the excerpts don't contain the answer, say so.

Journal excerpts:
{}

Question: {}"#,
        context, body.message
    );

    let answer = ai::complete(&state.config, &prompt)
        .await
        .map_err(AppError::Internal)?;

    let mut sources: Vec<Uuid> = Vec::new();
    for (entry_id, _) in &hits {
        if !sources.contains(entry_id) {
            sources.push(*entry_id);
        }
    }

    Ok(Json(ChatResponse { answer, sources }))
}
