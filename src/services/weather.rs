//! Weather/air-quality snapshot client. A snapshot is captured once at
//! entry submission and stored verbatim in the `weather_data` column;
//! the tolerant readers in `models::weather` pull fields back out.

use serde_json::{json, Value};

use crate::config::Config;

pub async fn fetch_snapshot(
    config: &Config,
    latitude: f64,
    longitude: f64,
) -> Result<Value, anyhow::Error> {
    if config.weather_api_key.is_empty() {
        anyhow::bail!("weather API key not configured");
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/current.json", config.weather_api_url);
    let coords = format!("{},{}", latitude, longitude);
    let response = client
        .get(&url)
        .query(&[
            ("key", config.weather_api_key.as_str()),
            ("q", coords.as_str()),
            ("aqi", "yes"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("weather API error {}", response.status());
    }

    let body: Value = response.json().await?;
    Ok(flatten(&body))
}

/// Keep only the fields the app reads; the provider response carries a
/// lot of forecast noise we never use.
fn flatten(provider: &Value) -> Value {
    let current = provider.get("current").unwrap_or(provider);
    json!({
        "temp_c": current.get("temp_c"),
        "condition": current
            .get("condition")
            .and_then(|c| c.get("text")),
        "humidity": current.get("humidity"),
        "air_quality": current.get("air_quality"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::{extract_epa_index, extract_temperature};

    #[test]
    fn flatten_keeps_extractable_fields() {
        let provider = json!({
            "location": { "name": "Seoul" },
            "current": {
                "temp_c": 18.2,
                "humidity": 55,
                "condition": { "text": "Sunny", "icon": "x.png" },
                "air_quality": { "us_epa_index": 2, "pm2_5": 9.4 }
            }
        });
        let snapshot = flatten(&provider);
        assert_eq!(extract_temperature(&snapshot), Some(18.2));
        assert_eq!(extract_epa_index(&snapshot), Some(2.0));
        assert_eq!(snapshot["condition"], "Sunny");
    }

    #[test]
    fn flatten_tolerates_missing_blocks() {
        let snapshot = flatten(&json!({}));
        assert_eq!(extract_temperature(&snapshot), None);
        assert_eq!(extract_epa_index(&snapshot), None);
    }
}
