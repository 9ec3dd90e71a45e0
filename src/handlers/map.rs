use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::map::{summarize, MapPoint, MAX_MAP_POINTS};
use crate::aggregate::range::MapRange;
use crate::auth::middleware::MaybeAuthUser;
use crate::error::AppResult;
use crate::models::emotion::EmotionLookup;
use crate::models::weather::{extract_epa_index, extract_temperature};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub data: Vec<MapPoint>,
    pub avg_aqi: i64,
    pub dominant_emotion: Option<String>,
}

/// GET /api/map/points — entries with coordinates, projected for the
/// map view. Anonymous requests get 200 with empty data rather than
/// 401, so the public map view keeps rendering.
pub async fn map_points(
    State(state): State<AppState>,
    Extension(MaybeAuthUser(auth_user)): Extension<MaybeAuthUser>,
    Query(query): Query<MapQuery>,
) -> AppResult<Json<MapResponse>> {
    let Some(auth_user) = auth_user else {
        return Ok(Json(MapResponse {
            data: Vec::new(),
            avg_aqi: 0,
            dominant_emotion: None,
        }));
    };

    let from = MapRange::parse(query.time_range.as_deref()).lower_bound(Utc::now());
    let lookup = EmotionLookup::load(&state.db).await?;

    type Row = (
        f64,
        f64,
        Option<i32>,
        Option<f64>,
        Option<serde_json::Value>,
        DateTime<Utc>,
    );
    let rows: Vec<Row> = sqlx::query_as(
        r#"
        SELECT latitude, longitude, emotion_id, mood_score, weather_data, created_at
        FROM journal_entries
        WHERE user_id = $1 AND created_at >= $2
          AND latitude IS NOT NULL AND longitude IS NOT NULL
        ORDER BY created_at ASC
        LIMIT $3
        "#,
    )
    .bind(auth_user.id)
    .bind(from)
    .bind(MAX_MAP_POINTS)
    .fetch_all(&state.db)
    .await?;

    let points: Vec<MapPoint> = rows
        .into_iter()
        .map(|(lat, lng, emotion_id, mood_score, weather, _)| MapPoint {
            lat,
            lng,
            emotion: lookup.name_of(emotion_id),
            mood_score,
            epa_index: weather.as_ref().and_then(extract_epa_index),
            temperature: weather.as_ref().and_then(extract_temperature),
        })
        .collect();

    let summary = summarize(&points);

    Ok(Json(MapResponse {
        data: points,
        avg_aqi: summary.avg_aqi,
        dominant_emotion: summary.dominant_emotion,
    }))
}
