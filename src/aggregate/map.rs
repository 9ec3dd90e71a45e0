use serde::Serialize;

use super::frequency::FrequencyTable;

/// Cap on points returned per request, bounding response size.
pub const MAX_MAP_POINTS: i64 = 500;

/// Flat projection of a journal entry for the map view. Display fields
/// stay `null` when absent; they are never coerced to 0.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub lat: f64,
    pub lng: f64,
    pub emotion: String,
    pub mood_score: Option<f64>,
    pub epa_index: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    /// Mean EPA index over points that carry one, rounded to the nearest
    /// integer. Explicitly 0 (not null) when no point has an index.
    pub avg_aqi: i64,
    pub dominant_emotion: Option<String>,
}

/// Corpus statistics over the returned point set.
pub fn summarize(points: &[MapPoint]) -> MapSummary {
    let indices: Vec<f64> = points.iter().filter_map(|p| p.epa_index).collect();
    let avg_aqi = if indices.is_empty() {
        0
    } else {
        (indices.iter().sum::<f64>() / indices.len() as f64).round() as i64
    };

    let mut emotions = FrequencyTable::new();
    for p in points {
        emotions.add(&p.emotion);
    }

    MapSummary {
        avg_aqi,
        dominant_emotion: emotions.dominant(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(emotion: &str, epa: Option<f64>) -> MapPoint {
        MapPoint {
            lat: 37.56,
            lng: 126.97,
            emotion: emotion.into(),
            mood_score: Some(0.2),
            epa_index: epa,
            temperature: None,
        }
    }

    #[test]
    fn avg_aqi_rounds_to_nearest_integer() {
        let points = vec![point("Joy", Some(2.0)), point("Joy", Some(3.0)), point("Calm", None)];
        let summary = summarize(&points);
        // (2 + 3) / 2 = 2.5 rounds to 3; the None point is excluded, not zero.
        assert_eq!(summary.avg_aqi, 3);
    }

    #[test]
    fn avg_aqi_is_zero_when_no_point_has_an_index() {
        // Deliberate asymmetry with the daily aggregator's null-on-empty.
        let points = vec![point("Joy", None), point("Fear", None)];
        assert_eq!(summarize(&points).avg_aqi, 0);
    }

    #[test]
    fn dominant_emotion_uses_first_seen_tie_break() {
        let points = vec![
            point("Calm", None),
            point("Joy", None),
            point("Joy", None),
            point("Calm", None),
        ];
        assert_eq!(summarize(&points).dominant_emotion, Some("Calm".into()));
    }

    #[test]
    fn empty_set_has_no_dominant_emotion() {
        let summary = summarize(&[]);
        assert_eq!(summary.avg_aqi, 0);
        assert_eq!(summary.dominant_emotion, None);
    }
}
