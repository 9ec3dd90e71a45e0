//! Dashboard aggregation endpoints. Each one is a single-pass, stateless
//! computation: resolve the range bound, fetch this user's rows, reduce
//! with the pure functions in `crate::aggregate`, wrap in `{data: ...}`.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::aggregate::daily::{mood_aqi_correlation, mood_trend, CorrelationPoint, MoodTrendPoint};
use crate::aggregate::frequency::{emotion_composition, word_cloud, EmotionShare, WordCount, WORD_CLOUD_LIMIT};
use crate::aggregate::range::RangeToken;
use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::handlers::DataResponse;
use crate::models::emotion::UNKNOWN_EMOTION;
use crate::models::weather::extract_epa_index;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub range: Option<String>,
}

/// GET /api/stats/mood-trend — per-day mean mood score.
pub async fn mood_trend_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<DataResponse<Vec<MoodTrendPoint>>>> {
    // Day-grouped aggregation starts at a day boundary.
    let bound = RangeToken::parse(query.range.as_deref()).day_bound(Utc::now());

    let rows: Vec<(DateTime<Utc>, Option<f64>)> = match bound {
        Some(from) => {
            sqlx::query_as(
                r#"
                SELECT created_at, mood_score FROM journal_entries
                WHERE user_id = $1 AND created_at >= $2
                ORDER BY created_at ASC
                "#,
            )
            .bind(auth_user.id)
            .bind(from)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT created_at, mood_score FROM journal_entries
                WHERE user_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(DataResponse::new(mood_trend(rows))))
}

/// GET /api/stats/emotions — emotion composition of the filtered set.
pub async fn emotion_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<DataResponse<Vec<EmotionShare>>>> {
    let bound = RangeToken::parse(query.range.as_deref()).instant_bound(Utc::now());

    // Label resolved in the join; unlabeled rows hit the sentinel.
    let labels: Vec<(String,)> = match bound {
        Some(from) => {
            sqlx::query_as(
                r#"
                SELECT COALESCE(e.name, $3) FROM journal_entries j
                LEFT JOIN emotions e ON e.id = j.emotion_id
                WHERE j.user_id = $1 AND j.created_at >= $2
                "#,
            )
            .bind(auth_user.id)
            .bind(from)
            .bind(UNKNOWN_EMOTION)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT COALESCE(e.name, $2) FROM journal_entries j
                LEFT JOIN emotions e ON e.id = j.emotion_id
                WHERE j.user_id = $1
                "#,
            )
            .bind(auth_user.id)
            .bind(UNKNOWN_EMOTION)
            .fetch_all(&state.db)
            .await?
        }
    };

    let composition = emotion_composition(labels.into_iter().map(|(name,)| name));
    Ok(Json(DataResponse::new(composition)))
}

/// GET /api/stats/word-cloud — top journal words in the filtered set.
pub async fn word_cloud_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<DataResponse<Vec<WordCount>>>> {
    let bound = RangeToken::parse(query.range.as_deref()).instant_bound(Utc::now());

    let contents: Vec<(String,)> = match bound {
        Some(from) => {
            sqlx::query_as(
                "SELECT content FROM journal_entries WHERE user_id = $1 AND created_at >= $2",
            )
            .bind(auth_user.id)
            .bind(from)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT content FROM journal_entries WHERE user_id = $1")
                .bind(auth_user.id)
                .fetch_all(&state.db)
                .await?
        }
    };

    let words = word_cloud(
        contents.iter().map(|(content,)| content.as_str()),
        WORD_CLOUD_LIMIT,
    );
    Ok(Json(DataResponse::new(words)))
}

/// GET /api/stats/correlation — daily mood vs. air-quality series,
/// outer-joined on date.
pub async fn correlation_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<DataResponse<Vec<CorrelationPoint>>>> {
    let bound = RangeToken::parse(query.range.as_deref()).day_bound(Utc::now());

    let rows: Vec<(DateTime<Utc>, Option<f64>, Option<serde_json::Value>)> = match bound {
        Some(from) => {
            sqlx::query_as(
                r#"
                SELECT created_at, mood_score, weather_data FROM journal_entries
                WHERE user_id = $1 AND created_at >= $2
                ORDER BY created_at ASC
                "#,
            )
            .bind(auth_user.id)
            .bind(from)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT created_at, mood_score, weather_data FROM journal_entries
                WHERE user_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    let points = mood_aqi_correlation(rows.into_iter().map(|(ts, mood, weather)| {
        let epa = weather.as_ref().and_then(extract_epa_index);
        (ts, mood, epa)
    }));

    Ok(Json(DataResponse::new(points)))
}
