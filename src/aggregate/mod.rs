//! Pure aggregation pipeline behind the dashboard endpoints.
//!
//! Every function here is a single pass over already-fetched rows: no
//! store access, no shared state, deterministic for a given input. The
//! handlers fetch user-scoped rows and hand them to these reducers.

pub mod daily;
pub mod frequency;
pub mod map;
pub mod range;

/// Round to two decimal places, the precision every dashboard mean uses.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(0.335), 0.34);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.0), 2.0);
    }
}
