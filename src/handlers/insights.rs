use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::frequency::FrequencyTable;
use crate::aggregate::round2;
use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::emotion::UNKNOWN_EMOTION;
use crate::models::weather::{extract_epa_index, AqiLevel};
use crate::services::ai;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightResponse {
    pub summary: String,
    pub highlights: Vec<String>,
    pub suggestions: Vec<String>,
    pub mood_analysis: String,
    #[serde(default)]
    pub environment_note: Option<String>,
    #[serde(default)]
    pub source: String, // "claude" or "fallback"
}

struct MonthSnapshot {
    entry_count: usize,
    avg_mood: Option<f64>,
    dominant_emotion: Option<String>,
    avg_epa_index: Option<f64>,
}

/// GET /api/insights — model-written reflection on the last 30 days,
/// with a deterministic fallback when the service is unavailable.
pub async fn get_insights(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<InsightResponse>> {
    let thirty_days_ago = Utc::now() - chrono::Duration::days(30);

    let rows: Vec<(DateTime<Utc>, Option<f64>, Option<String>, Option<serde_json::Value>)> =
        sqlx::query_as(
            r#"
            SELECT j.created_at, j.mood_score, e.name, j.weather_data
            FROM journal_entries j
            LEFT JOIN emotions e ON e.id = j.emotion_id
            WHERE j.user_id = $1 AND j.created_at >= $2
            ORDER BY j.created_at ASC
            "#,
        )
        .bind(auth_user.id)
        .bind(thirty_days_ago)
        .fetch_all(&state.db)
        .await?;

    let snapshot = summarize_month(&rows);

    let prompt = format!(
        r#"You are a reflective journaling coach. Analyze this user's last 30 days and provide insights.

Entries written: {}
Average mood score (-1..1): {}
Dominant emotion: {}
Average air-quality index (1-6): {}

Provide a JSON response with this exact schema:
{{
  "summary": "2-3 sentence overview of the month",
  "highlights": ["specific positive observation 1", "observation 2"],
  "suggestions": ["actionable suggestion 1", "suggestion 2"],
  "mood_analysis": "pattern analysis of mood over time",
  "environment_note": "note on weather/air-quality influence, or null"
}}"#,
        snapshot.entry_count,
        snapshot
            .avg_mood
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown".into()),
        snapshot
            .dominant_emotion
            .as_deref()
            .unwrap_or(UNKNOWN_EMOTION),
        snapshot
            .avg_epa_index
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".into()),
    );

    let insight = match call_model(&state, &prompt).await {
        Ok(insight) => insight,
        Err(e) => {
            tracing::warn!(error = %e, "Claude API unavailable, using deterministic fallback");
            fallback_insight(&snapshot)
        }
    };

    Ok(Json(insight))
}

async fn call_model(state: &AppState, prompt: &str) -> Result<InsightResponse, anyhow::Error> {
    let text = ai::complete(&state.config, prompt).await?;
    let mut insight: InsightResponse = serde_json::from_str(text.trim())?;
    insight.source = "claude".to_string();
    Ok(insight)
}

fn summarize_month(
    rows: &[(DateTime<Utc>, Option<f64>, Option<String>, Option<serde_json::Value>)],
) -> MonthSnapshot {
    let moods: Vec<f64> = rows.iter().filter_map(|(_, m, _, _)| *m).collect();
    let avg_mood = if moods.is_empty() {
        None
    } else {
        Some(round2(moods.iter().sum::<f64>() / moods.len() as f64))
    };

    let mut emotions = FrequencyTable::new();
    for (_, _, name, _) in rows {
        emotions.add(name.as_deref().unwrap_or(UNKNOWN_EMOTION));
    }

    let indices: Vec<f64> = rows
        .iter()
        .filter_map(|(_, _, _, w)| w.as_ref().and_then(extract_epa_index))
        .collect();
    let avg_epa_index = if indices.is_empty() {
        None
    } else {
        Some(round2(indices.iter().sum::<f64>() / indices.len() as f64))
    };

    MonthSnapshot {
        entry_count: rows.len(),
        avg_mood,
        dominant_emotion: if rows.is_empty() {
            None
        } else {
            emotions.dominant()
        },
        avg_epa_index,
    }
}

fn fallback_insight(snapshot: &MonthSnapshot) -> InsightResponse {
    if snapshot.entry_count == 0 {
        return InsightResponse {
            summary: "You haven't written any entries in the last 30 days. Start journaling to see insights!".into(),
            highlights: vec![],
            suggestions: vec!["Write your first entry to get started".into()],
            mood_analysis: "No data available yet.".into(),
            environment_note: None,
            source: "fallback".into(),
        };
    }

    let mood_analysis = match snapshot.avg_mood {
        Some(m) if m > 0.3 => format!(
            "Your average mood score of {} points to a mostly positive month.",
            m
        ),
        Some(m) if m < -0.3 => format!(
            "Your average mood score of {} suggests a heavy month. Be kind to yourself.",
            m
        ),
        Some(m) => format!("Your average mood score of {} is fairly balanced.", m),
        None => "Not enough scored entries to read a mood pattern yet.".into(),
    };

    let mut highlights = vec![format!(
        "You wrote {} entries in the last 30 days — keep the streak going!",
        snapshot.entry_count
    )];
    if let Some(emotion) = &snapshot.dominant_emotion {
        if emotion != UNKNOWN_EMOTION {
            highlights.push(format!("{} showed up most often in your writing.", emotion));
        }
    }

    let environment_note = snapshot.avg_epa_index.map(|a| {
        let band = AqiLevel::classify(a.round() as i32)
            .map(|l| l.label)
            .unwrap_or("off the scale");
        format!(
            "Average air-quality index around your entries was {:.1} ({}) on the 1-6 EPA scale.",
            a, band
        )
    });

    InsightResponse {
        summary: format!(
            "Over the last 30 days you journaled {} times. Reflection is a habit, and you're building it.",
            snapshot.entry_count
        ),
        highlights,
        suggestions: vec![
            "Try writing at the same time each day to build the habit.".into(),
            "Add a location to your entries to see how environment tracks with mood.".into(),
        ],
        mood_analysis,
        environment_note,
        source: "fallback".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_handles_empty_month() {
        let insight = fallback_insight(&MonthSnapshot {
            entry_count: 0,
            avg_mood: None,
            dominant_emotion: None,
            avg_epa_index: None,
        });
        assert_eq!(insight.source, "fallback");
        assert!(insight.mood_analysis.contains("No data"));
    }

    #[test]
    fn fallback_names_the_aqi_band() {
        let insight = fallback_insight(&MonthSnapshot {
            entry_count: 3,
            avg_mood: Some(0.1),
            dominant_emotion: Some("Calm".into()),
            avg_epa_index: Some(2.4),
        });
        let note = insight.environment_note.unwrap();
        assert!(note.contains("2.4"));
        assert!(note.contains("Moderate"));
    }

    #[test]
    fn summarize_month_aggregates_rows() {
        let ts = Utc::now();
        let rows = vec![
            (ts, Some(0.5), Some("Joy".to_string()), None),
            (ts, Some(0.7), Some("Joy".to_string()), None),
            (ts, None, None, None),
        ];
        let snapshot = summarize_month(&rows);
        assert_eq!(snapshot.entry_count, 3);
        assert_eq!(snapshot.avg_mood, Some(0.6));
        assert_eq!(snapshot.dominant_emotion, Some("Joy".to_string()));
        assert_eq!(snapshot.avg_epa_index, None);
    }
}
