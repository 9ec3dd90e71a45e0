//! Thin wrapper around the generative-text service. Text in, text out;
//! callers own prompt construction and response parsing.

use serde::Deserialize;

use crate::config::Config;

/// One completion call against the messages API, with a hard timeout to
/// prevent indefinite hangs.
pub async fn complete(config: &Config, prompt: &str) -> Result<String, anyhow::Error> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", &config.claude_api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "model": config.claude_model,
            "max_tokens": 1024,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Claude API error {}: {}", status, body);
    }

    let reply: serde_json::Value = response.json().await?;
    let text = reply["content"][0]["text"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Claude API returned no text content"))?;

    Ok(text.to_string())
}

#[derive(Debug, Deserialize)]
pub struct SentimentResult {
    /// Signed score in roughly [-1, 1].
    pub mood_score: f64,
    /// Emotion label, matched case-insensitively against the lookup.
    pub emotion: String,
}

/// Ask the model to score a journal entry. Failure degrades the entry
/// to unanalyzed; it never fails the write.
pub async fn analyze_sentiment(config: &Config, content: &str) -> Result<SentimentResult, anyhow::Error> {
    let prompt = format!(
        r#"Analyze the emotional sentiment of this journal entry.

Entry:
{}

Respond with JSON only, using this exact schema:
{{
  "mood_score": <number between -1.0 (very negative) and 1.0 (very positive)>,
  "emotion": "<one of: Joy, Calm, Surprise, Sadness, Fear, Anger, Disgust>"
}}"#,
        content
    );

    let text = complete(config, &prompt).await?;
    let result: SentimentResult = serde_json::from_str(text.trim())?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_result_parses_model_reply() {
        let reply = r#"{"mood_score": -0.4, "emotion": "Sadness"}"#;
        let parsed: SentimentResult = serde_json::from_str(reply).unwrap();
        assert_eq!(parsed.mood_score, -0.4);
        assert_eq!(parsed.emotion, "Sadness");
    }
}
