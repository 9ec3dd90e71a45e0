use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::aggregate::range::RangeToken;
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::emotion::EmotionLookup;
use crate::models::entry::{CreateEntryRequest, EntryListQuery, JournalEntry, UpdateEntryRequest};
use crate::services::{ai, embeddings, weather};
use crate::AppState;

/// Resolved enrichment for a new entry: a sentiment score/emotion when
/// none was supplied, and a weather snapshot for the given coordinates.
/// Both degrade gracefully; neither can fail the write.
async fn enrich(
    state: &AppState,
    lookup: &EmotionLookup,
    body: &CreateEntryRequest,
) -> (Option<f64>, Option<i32>, Option<serde_json::Value>) {
    let (mut mood_score, mut emotion_id) = (body.mood_score, body.emotion_id);

    if mood_score.is_none() && emotion_id.is_none() {
        match ai::analyze_sentiment(&state.config, &body.content).await {
            Ok(sentiment) => {
                mood_score = Some(sentiment.mood_score.clamp(-1.0, 1.0));
                emotion_id = lookup.id_of(&sentiment.emotion);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment analysis unavailable, storing entry unscored");
            }
        }
    }

    let weather_data = match (body.latitude, body.longitude) {
        (Some(lat), Some(lng)) => match weather::fetch_snapshot(&state.config, lat, lng).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Weather snapshot unavailable");
                None
            }
        },
        _ => None,
    };

    (mood_score, emotion_id, weather_data)
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<JournalEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lookup = EmotionLookup::load(&state.db).await?;
    let (mood_score, emotion_id, weather_data) = enrich(&state, &lookup, &body).await;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries
            (id, user_id, title, content, mood_score, emotion_id, latitude, longitude, weather_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(mood_score)
    .bind(emotion_id)
    .bind(body.latitude)
    .bind(body.longitude)
    .bind(&weather_data)
    .fetch_one(&state.db)
    .await?;

    let emotion_name = entry.emotion_id.map(|id| lookup.name_of(Some(id)));
    embeddings::spawn_reindex(
        state.db.clone(),
        state.config.clone(),
        entry.clone(),
        emotion_name,
    );

    Ok(Json(entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryListQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let bound = RangeToken::parse(query.range.as_deref()).instant_bound(Utc::now());

    let entries = match bound {
        Some(from) => {
            sqlx::query_as::<_, JournalEntry>(
                r#"
                SELECT * FROM journal_entries
                WHERE user_id = $1 AND created_at >= $2
                ORDER BY created_at DESC
                "#,
            )
            .bind(auth_user.id)
            .bind(from)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, JournalEntry>(
                "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<JournalEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries SET
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            mood_score = COALESCE($5, mood_score),
            emotion_id = COALESCE($6, emotion_id),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(body.mood_score)
    .bind(body.emotion_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    let lookup = EmotionLookup::load(&state.db).await?;
    let emotion_name = entry.emotion_id.map(|id| lookup.name_of(Some(id)));
    embeddings::spawn_reindex(
        state.db.clone(),
        state.config.clone(),
        entry.clone(),
        emotion_name,
    );

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Embeddings go with the entry via ON DELETE CASCADE.
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
