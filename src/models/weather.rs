use serde::Serialize;
use serde_json::Value;

/// One US-EPA severity band. Index ranges are inclusive on both ends.
#[derive(Debug, Clone, Serialize)]
pub struct AqiLevel {
    pub min: i32,
    pub max: i32,
    pub label: &'static str,
    pub color: &'static str,
}

/// The six EPA bands, ordered from Good to Hazardous. Served to the
/// client for rendering classification only; never used in aggregation.
pub const AQI_LEVELS: [AqiLevel; 6] = [
    AqiLevel { min: 1, max: 1, label: "Good", color: "#22c55e" },
    AqiLevel { min: 2, max: 2, label: "Moderate", color: "#eab308" },
    AqiLevel { min: 3, max: 3, label: "Unhealthy for Sensitive Groups", color: "#f97316" },
    AqiLevel { min: 4, max: 4, label: "Unhealthy", color: "#ef4444" },
    AqiLevel { min: 5, max: 5, label: "Very Unhealthy", color: "#a855f7" },
    AqiLevel { min: 6, max: 6, label: "Hazardous", color: "#7f1d1d" },
];

impl AqiLevel {
    pub fn classify(index: i32) -> Option<&'static AqiLevel> {
        AQI_LEVELS.iter().find(|l| index >= l.min && index <= l.max)
    }
}

/// Normalize a weather payload that may itself be a JSON-encoded string
/// (older rows stored the provider response serialized into TEXT before
/// the column became JSONB).
fn materialize(payload: &Value) -> Option<Value> {
    match payload {
        Value::String(s) => serde_json::from_str(s).ok(),
        Value::Object(_) => Some(payload.clone()),
        _ => None,
    }
}

/// Accept a JSON number or a numeric string; anything else is absent.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn air_quality_block(payload: &Value) -> Option<Value> {
    let root = materialize(payload)?;
    // Either our flattened snapshot or the raw provider response.
    root.get("air_quality")
        .or_else(|| root.get("current").and_then(|c| c.get("air_quality")))
        .cloned()
}

/// Tolerant accessor for the US-EPA index nested in a weather payload.
/// Any shape mismatch yields `None` rather than an error, so one
/// malformed row never aborts an aggregation pass.
pub fn extract_epa_index(payload: &Value) -> Option<f64> {
    let aq = air_quality_block(payload)?;
    aq.get("us_epa_index")
        .or_else(|| aq.get("us-epa-index"))
        .and_then(as_number)
}

/// Tolerant accessor for the temperature in a weather payload.
pub fn extract_temperature(payload: &Value) -> Option<f64> {
    let root = materialize(payload)?;
    root.get("temp_c")
        .or_else(|| root.get("current").and_then(|c| c.get("temp_c")))
        .and_then(as_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_from_structured_payload() {
        let payload = json!({
            "temp_c": 21.5,
            "condition": "Partly cloudy",
            "air_quality": { "us_epa_index": 2, "pm2_5": 8.1 }
        });
        assert_eq!(extract_epa_index(&payload), Some(2.0));
        assert_eq!(extract_temperature(&payload), Some(21.5));
    }

    #[test]
    fn extracts_from_raw_provider_shape() {
        let payload = json!({
            "current": {
                "temp_c": -3.0,
                "air_quality": { "us-epa-index": 4 }
            }
        });
        assert_eq!(extract_epa_index(&payload), Some(4.0));
        assert_eq!(extract_temperature(&payload), Some(-3.0));
    }

    #[test]
    fn extracts_from_stringified_payload() {
        let payload = json!(r#"{"air_quality":{"us_epa_index":"3"}}"#);
        assert_eq!(extract_epa_index(&payload), Some(3.0));
    }

    #[test]
    fn shape_mismatch_is_absent_not_error() {
        assert_eq!(extract_epa_index(&json!("not json at all")), None);
        assert_eq!(extract_epa_index(&json!(42)), None);
        assert_eq!(extract_epa_index(&json!({ "air_quality": "n/a" })), None);
        assert_eq!(
            extract_epa_index(&json!({ "air_quality": { "us_epa_index": "bad" } })),
            None
        );
        assert_eq!(extract_temperature(&json!({})), None);
    }

    #[test]
    fn classify_covers_all_bands() {
        assert_eq!(AqiLevel::classify(1).map(|l| l.label), Some("Good"));
        assert_eq!(AqiLevel::classify(6).map(|l| l.label), Some("Hazardous"));
        assert!(AqiLevel::classify(0).is_none());
        assert!(AqiLevel::classify(7).is_none());
    }
}
