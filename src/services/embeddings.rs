//! Embedding pipeline: build a rich text context for an entry, chunk it,
//! embed each chunk, and store the vectors for retrieval-augmented chat.
//!
//! Chunks are submitted strictly in order with a fixed pause between
//! calls — a throttle for the provider's rate limit, not a scheduler.
//! A failed chunk logs a warning and the loop moves on; there is no
//! cancellation path.

use pgvector::Vector;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::models::entry::JournalEntry;
use crate::models::weather::{extract_epa_index, extract_temperature};

/// Split text into chunks of at most `max_chars` characters, breaking at
/// whitespace. A single token longer than `max_chars` is hard-split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let cs: Vec<char> = word.chars().collect();
            for piece in cs.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        // +1 for the joining space.
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Concatenated text representation of an entry: title, content, and
/// contextual metadata, used as embedding input.
pub fn rich_context(entry: &JournalEntry, emotion_name: Option<&str>) -> String {
    let mut parts = Vec::new();

    if let Some(title) = entry.title.as_deref() {
        parts.push(format!("Title: {}", title));
    }
    parts.push(format!("Date: {}", entry.created_at.date_naive()));
    if let Some(emotion) = emotion_name {
        parts.push(format!("Emotion: {}", emotion));
    }
    if let Some(mood) = entry.mood_score {
        parts.push(format!("Mood score: {:.2}", mood));
    }
    if let Some(weather) = entry.weather_data.as_ref() {
        if let Some(temp) = extract_temperature(weather) {
            parts.push(format!("Temperature: {}C", temp));
        }
        if let Some(epa) = extract_epa_index(weather) {
            parts.push(format!("Air quality index: {}", epa));
        }
    }
    parts.push(String::new());
    parts.push(entry.content.clone());

    parts.join("\n")
}

/// One embedding call against the provider.
pub async fn embed(config: &Config, text: &str) -> Result<Vec<f32>, anyhow::Error> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let response = client
        .post(&config.embedding_api_url)
        .json(&serde_json::json!({
            "model": config.embedding_model,
            "prompt": text,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("embedding API error {}", response.status());
    }

    let body: serde_json::Value = response.json().await?;
    let vector = body["embedding"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("embedding API returned no vector"))?
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();

    Ok(vector)
}

/// Replace an entry's stored vectors with a fresh set. Called after
/// every create/update; prior rows are dropped first so a re-run never
/// duplicates chunks.
pub async fn reindex_entry(
    db: &PgPool,
    config: &Config,
    entry: &JournalEntry,
    emotion_name: Option<&str>,
) {
    if let Err(e) = sqlx::query("DELETE FROM entry_embeddings WHERE entry_id = $1")
        .bind(entry.id)
        .execute(db)
        .await
    {
        tracing::warn!(entry_id = %entry.id, error = %e, "Failed to clear old embeddings");
        return;
    }

    let context = rich_context(entry, emotion_name);
    let chunks = chunk_text(&context, config.embedding_max_chunk_chars);
    let total = chunks.len();

    for (index, chunk) in chunks.into_iter().enumerate() {
        match embed(config, &chunk).await {
            Ok(vector) => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO entry_embeddings
                        (id, entry_id, user_id, chunk_index, chunk_text, embedding, model)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(entry.id)
                .bind(entry.user_id)
                .bind(index as i32)
                .bind(&chunk)
                .bind(Vector::from(vector))
                .bind(&config.embedding_model)
                .execute(db)
                .await;

                if let Err(e) = result {
                    tracing::warn!(entry_id = %entry.id, chunk = index, error = %e, "Failed to store embedding");
                }
            }
            Err(e) => {
                // One bad chunk never aborts the rest.
                tracing::warn!(entry_id = %entry.id, chunk = index, error = %e, "Embedding call failed");
            }
        }

        // Provider rate-limit pacing between consecutive calls.
        if index + 1 < total {
            tokio::time::sleep(std::time::Duration::from_millis(config.embedding_delay_ms)).await;
        }
    }

    tracing::debug!(entry_id = %entry.id, chunks = total, "Entry reindexed");
}

/// Fire-and-forget reindex after an entry write.
pub fn spawn_reindex(
    db: PgPool,
    config: Arc<Config>,
    entry: JournalEntry,
    emotion_name: Option<String>,
) {
    tokio::spawn(async move {
        reindex_entry(&db, &config, &entry, emotion_name.as_deref()).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn chunk_text_respects_max_and_breaks_at_whitespace() {
        let chunks = chunk_text("one two three four five", 9);
        assert_eq!(chunks, vec!["one two", "three", "four five"]);
        for c in &chunks {
            assert!(c.chars().count() <= 9);
        }
    }

    #[test]
    fn chunk_text_hard_splits_oversized_tokens() {
        let chunks = chunk_text("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn chunk_text_of_empty_input_is_empty() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("   \n  ", 100).is_empty());
    }

    #[test]
    fn rich_context_includes_metadata_and_content() {
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: Some("Morning walk".into()),
            content: "Crisp air by the river.".into(),
            mood_score: Some(0.7),
            emotion_id: Some(1),
            latitude: None,
            longitude: None,
            weather_data: Some(json!({
                "temp_c": 11.0,
                "air_quality": { "us_epa_index": 2 }
            })),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap(),
        };

        let context = rich_context(&entry, Some("Calm"));
        assert!(context.contains("Title: Morning walk"));
        assert!(context.contains("Date: 2026-03-01"));
        assert!(context.contains("Emotion: Calm"));
        assert!(context.contains("Mood score: 0.70"));
        assert!(context.contains("Temperature: 11C"));
        assert!(context.contains("Air quality index: 2"));
        assert!(context.ends_with("Crisp air by the river."));
    }
}
