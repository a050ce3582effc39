//! Age and rate arithmetic.
//!
//! Ages are measured in fractional days between a creation timestamp and an
//! injected "now". An age is never zero or negative: anything that would be
//! (future timestamps, unparseable input, NaN) degrades to [`MIN_AGE_DAYS`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Age assigned when no positive age can be computed.
pub const MIN_AGE_DAYS: f64 = 1.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Days elapsed between `timestamp` and `now`, clamped to a positive value.
#[must_use]
pub fn days_since(timestamp: &str, now: DateTime<Utc>) -> f64 {
    let Some(created) = parse_timestamp(timestamp) else {
        return MIN_AGE_DAYS;
    };
    let millis = now.signed_duration_since(created).num_milliseconds();
    #[allow(clippy::cast_precision_loss, reason = "day fractions tolerate f64 precision")]
    let days = millis as f64 / MILLIS_PER_DAY;
    clamp_age(days)
}

/// Age for an optional timestamp; a missing timestamp counts as one day.
#[must_use]
pub fn age_or_default(timestamp: Option<&str>, now: DateTime<Utc>) -> f64 {
    timestamp.map_or(MIN_AGE_DAYS, |ts| days_since(ts, now))
}

/// Clamp a computed age so it stays positive after rounding to storage precision.
#[must_use]
pub fn clamp_age(days: f64) -> f64 {
    if days.is_finite() && round2(days) > 0.0 { days } else { MIN_AGE_DAYS }
}

/// `total / age_days`, rounded for storage.
#[must_use]
pub fn rate(total: u64, age_days: f64) -> f64 {
    #[allow(clippy::cast_precision_loss, reason = "download totals fit f64 mantissa")]
    let total = total as f64;
    round2(total / clamp_age(age_days))
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse the timestamp shapes the upstream catalog emits.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("valid date")
    }

    #[test]
    fn counts_whole_days() {
        assert!((days_since("2025-05-22T00:00:00Z", now()) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn counts_fractional_days() {
        assert!((days_since("2025-05-31T12:00:00.000Z", now()) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn future_timestamp_clamps_to_one() {
        assert_eq!(days_since("2030-01-01T00:00:00Z", now()), MIN_AGE_DAYS);
    }

    #[test]
    fn identical_timestamp_clamps_to_one() {
        assert_eq!(days_since("2025-06-01T00:00:00Z", now()), MIN_AGE_DAYS);
    }

    #[test]
    fn garbage_timestamp_clamps_to_one() {
        assert_eq!(days_since("not a date", now()), MIN_AGE_DAYS);
        assert_eq!(days_since("", now()), MIN_AGE_DAYS);
    }

    #[test]
    fn sub_precision_age_clamps_to_one() {
        assert_eq!(days_since("2025-05-31T23:59:59Z", now()), MIN_AGE_DAYS);
    }

    #[test]
    fn accepts_naive_and_date_only_shapes() {
        assert!((days_since("2025-05-30T00:00:00", now()) - 2.0).abs() < 1e-9);
        assert!((days_since("2025-05-29", now()) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn missing_timestamp_is_one_day() {
        assert_eq!(age_or_default(None, now()), MIN_AGE_DAYS);
    }

    #[test]
    fn rate_is_total_over_age() {
        assert_eq!(rate(100, 10.0), 10.0);
        assert_eq!(rate(10, 3.0), 3.33);
        assert_eq!(rate(5, 0.0), 5.0);
        assert_eq!(rate(5, f64::NAN), 5.0);
    }
}
