use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::handlers::DataResponse;
use crate::models::emotion::Emotion;
use crate::models::weather::{AqiLevel, AQI_LEVELS};
use crate::AppState;

/// GET /api/emotions — the emotion reference table.
pub async fn list_emotions(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Emotion>>>> {
    let emotions =
        sqlx::query_as::<_, Emotion>("SELECT id, name, color FROM emotions ORDER BY id")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(DataResponse::new(emotions)))
}

/// GET /api/aqi-levels — static severity bands for client rendering.
pub async fn list_aqi_levels() -> Json<DataResponse<Vec<AqiLevel>>> {
    Json(DataResponse::new(AQI_LEVELS.to_vec()))
}
