use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::round2;

/// One per-day accumulator. A value only lands here after passing its
/// type/range guard; a missing series stays empty and reduces to `None`,
/// which serializes as `null` — never conflated with `0`.
#[derive(Debug, Default)]
struct DayBucket {
    moods: Vec<f64>,
    epa_indices: Vec<f64>,
}

fn mean2(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

/// UTC calendar-day key, `YYYY-MM-DD`.
pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.date_naive().to_string()
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrendPoint {
    pub date: String,
    pub avg_mood: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPoint {
    pub date: String,
    pub avg_mood: Option<f64>,
    pub avg_epa_index: Option<f64>,
}

/// Group rows by UTC day and reduce mood scores to a per-day mean.
/// Input rows arrive in ascending creation order, so ascending date
/// order equals discovery order.
pub fn mood_trend<I>(rows: I) -> Vec<MoodTrendPoint>
where
    I: IntoIterator<Item = (DateTime<Utc>, Option<f64>)>,
{
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (ts, mood) in rows {
        let bucket = buckets.entry(day_key(ts)).or_default();
        if let Some(m) = mood {
            bucket.push(m);
        }
    }

    buckets
        .into_iter()
        .map(|(date, moods)| MoodTrendPoint {
            date,
            avg_mood: mean2(&moods),
        })
        .collect()
}

/// Build the mood and EPA-index daily series in one pass over the same
/// filtered row set, then merge by date. This is an outer join: a date
/// present in only one series still appears, with `null` in the other
/// field. A row contributes to one, both, or neither series depending
/// on which of its fields are present and valid.
pub fn mood_aqi_correlation<I>(rows: I) -> Vec<CorrelationPoint>
where
    I: IntoIterator<Item = (DateTime<Utc>, Option<f64>, Option<f64>)>,
{
    let mut buckets: BTreeMap<String, DayBucket> = BTreeMap::new();
    for (ts, mood, epa) in rows {
        let bucket = buckets.entry(day_key(ts)).or_default();
        if let Some(m) = mood {
            bucket.moods.push(m);
        }
        if let Some(e) = epa {
            bucket.epa_indices.push(e);
        }
    }

    buckets
        .into_iter()
        .map(|(date, b)| CorrelationPoint {
            date,
            avg_mood: mean2(&b.moods),
            avg_epa_index: mean2(&b.epa_indices),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn mean_rounds_to_two_decimals() {
        let points = mood_trend(vec![
            (ts(1, 8), Some(1.0)),
            (ts(1, 12), Some(1.0)),
            (ts(1, 20), Some(-1.0)),
        ]);
        assert_eq!(
            points,
            vec![MoodTrendPoint {
                date: "2026-03-01".into(),
                avg_mood: Some(0.33),
            }]
        );
    }

    #[test]
    fn day_without_valid_values_emits_null_not_zero() {
        let points = mood_trend(vec![(ts(2, 9), None), (ts(3, 9), Some(0.5))]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2026-03-02");
        assert_eq!(points[0].avg_mood, None);
        assert_eq!(points[1].avg_mood, Some(0.5));
    }

    #[test]
    fn rows_group_by_utc_calendar_day() {
        // 23:30 and next day 00:30 land in different buckets.
        let points = mood_trend(vec![
            (Utc.with_ymd_and_hms(2026, 3, 4, 23, 30, 0).unwrap(), Some(1.0)),
            (Utc.with_ymd_and_hms(2026, 3, 5, 0, 30, 0).unwrap(), Some(-1.0)),
        ]);
        assert_eq!(points[0].date, "2026-03-04");
        assert_eq!(points[1].date, "2026-03-05");
    }

    #[test]
    fn correlation_is_an_outer_join_on_date() {
        // Mood-only row on day 1, AQI-only row on day 2.
        let points = mood_aqi_correlation(vec![
            (ts(1, 10), Some(0.8), None),
            (ts(2, 10), None, Some(3.0)),
        ]);
        assert_eq!(
            points,
            vec![
                CorrelationPoint {
                    date: "2026-03-01".into(),
                    avg_mood: Some(0.8),
                    avg_epa_index: None,
                },
                CorrelationPoint {
                    date: "2026-03-02".into(),
                    avg_mood: None,
                    avg_epa_index: Some(3.0),
                },
            ]
        );
    }

    #[test]
    fn one_row_can_feed_both_series() {
        let points = mood_aqi_correlation(vec![(ts(6, 12), Some(-0.2), Some(2.0))]);
        assert_eq!(points[0].avg_mood, Some(-0.2));
        assert_eq!(points[0].avg_epa_index, Some(2.0));
    }

    #[test]
    fn output_is_ordered_ascending_by_date() {
        let points = mood_trend(vec![
            (ts(1, 1), Some(0.1)),
            (ts(2, 1), Some(0.2)),
            (ts(3, 1), Some(0.3)),
        ]);
        let dates: Vec<_> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-01", "2026-03-02", "2026-03-03"]);
    }

    #[test]
    fn rerun_is_deterministic() {
        let rows = || {
            vec![
                (ts(1, 8), Some(0.4), Some(1.0)),
                (ts(1, 9), Some(0.6), None),
                (ts(2, 9), None, Some(2.0)),
            ]
        };
        assert_eq!(mood_aqi_correlation(rows()), mood_aqi_correlation(rows()));
    }
}
