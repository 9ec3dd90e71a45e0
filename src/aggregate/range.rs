use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Client-supplied range token for the dashboard endpoints.
///
/// Unrecognized or absent tokens silently fall back to `All` (no lower
/// bound); the resolver never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Days7,
    Days30,
    All,
}

impl RangeToken {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("7") => Self::Days7,
            Some("30") => Self::Days30,
            _ => Self::All,
        }
    }

    fn days(self) -> Option<i64> {
        match self {
            Self::Days7 => Some(7),
            Self::Days30 => Some(30),
            Self::All => None,
        }
    }

    /// Lower bound as a raw instant: `now - N days`. Used where the
    /// aggregation only counts (word cloud, emotion composition).
    pub fn instant_bound(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    /// Lower bound truncated to the start of its UTC day. Used where the
    /// aggregation groups by calendar day (mood trend, correlation), so
    /// the first bucket is never a partial day.
    pub fn day_bound(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.instant_bound(now)
            .map(|b| b.date_naive().and_time(NaiveTime::MIN).and_utc())
    }
}

/// Range token for the map/heatmap family, which defaults to today
/// rather than all history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapRange {
    Today,
    Days7,
    Days30,
}

impl MapRange {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("7days") => Self::Days7,
            Some("30days") => Self::Days30,
            // "today", absent, or anything unrecognized.
            _ => Self::Today,
        }
    }

    /// The map family always has a lower bound.
    pub fn lower_bound(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Self::Days7 => now - Duration::days(7),
            Self::Days30 => now - Duration::days(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn parse_recognized_tokens() {
        assert_eq!(RangeToken::parse(Some("7")), RangeToken::Days7);
        assert_eq!(RangeToken::parse(Some("30")), RangeToken::Days30);
        assert_eq!(RangeToken::parse(Some("all")), RangeToken::All);
    }

    #[test]
    fn unrecognized_or_absent_means_no_filter() {
        assert_eq!(RangeToken::parse(None), RangeToken::All);
        assert_eq!(RangeToken::parse(Some("90")), RangeToken::All);
        assert_eq!(RangeToken::parse(Some("garbage")), RangeToken::All);
        assert_eq!(RangeToken::All.instant_bound(now()), None);
    }

    #[test]
    fn bounds_grow_monotonically_into_the_past() {
        let b7 = RangeToken::Days7.instant_bound(now()).unwrap();
        let b30 = RangeToken::Days30.instant_bound(now()).unwrap();
        assert!(b30 < b7, "30-day bound must be further back than 7-day");
        // `all` filters nothing, so its result set is a superset of 30's.
        assert!(RangeToken::All.instant_bound(now()).is_none());
    }

    #[test]
    fn day_bound_truncates_to_midnight() {
        let b = RangeToken::Days7.day_bound(now()).unwrap();
        assert_eq!(b.to_rfc3339(), "2026-03-08T00:00:00+00:00");
    }

    #[test]
    fn map_range_defaults_to_start_of_today() {
        assert_eq!(MapRange::parse(None), MapRange::Today);
        assert_eq!(MapRange::parse(Some("today")), MapRange::Today);
        assert_eq!(MapRange::parse(Some("weird")), MapRange::Today);
        let b = MapRange::Today.lower_bound(now());
        assert_eq!(b.to_rfc3339(), "2026-03-15T00:00:00+00:00");
    }

    #[test]
    fn map_range_day_windows_use_raw_instant() {
        assert_eq!(
            MapRange::Days7.lower_bound(now()),
            now() - Duration::days(7)
        );
        assert_eq!(
            MapRange::Days30.lower_bound(now()),
            now() - Duration::days(30)
        );
    }
}
