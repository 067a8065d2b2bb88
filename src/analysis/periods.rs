//! Rolling lookback windows.

use chrono::{DateTime, Duration, Utc};

/// Tags and spans (in days) of the lookback windows, shortest first.
pub const PERIOD_SPANS: [(&str, i64); 7] = [
    ("two_days", 2),
    ("three_days", 3),
    ("week", 7),
    ("month", 30),
    ("quarter", 90),
    ("half_year", 180),
    ("year", 365),
];

/// A named window covering `[start, now]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub name: &'static str,
    pub span_days: i64,
    pub start: DateTime<Utc>,
}

/// Build every lookback window ending at `now`, in declaration order.
///
/// Starts that would fall before the earliest representable instant are
/// clamped to it.
pub fn generate_periods(now: DateTime<Utc>) -> Vec<Period> {
    PERIOD_SPANS
        .iter()
        .map(|&(name, span_days)| Period {
            name,
            span_days,
            start: now
                .checked_sub_signed(Duration::days(span_days))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        })
        .collect()
}
