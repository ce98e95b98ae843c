//! Timestamp and duration normalization
//!
//! The platform stamps raw events with microsecond-precision RFC 3339 times;
//! Caliper wants millisecond precision with a literal `Z` suffix. Durations
//! travel as fractional seconds in payloads and as ISO-8601 strings on the
//! wire.

use chrono::{DateTime, Utc};

/// Normalize a platform timestamp to `YYYY-MM-DDTHH:MM:SS.mmmZ`
///
/// Sub-millisecond digits are truncated, not rounded, and any UTC offset is
/// folded into the time before formatting.
pub fn convert_datetime(raw: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    )
}

/// Render a duration in seconds as an ISO-8601 duration string
///
/// Whole values come out as `PT<n>S`; fractional values keep up to
/// millisecond precision with trailing zeros trimmed (`PT5.5S`).
pub fn duration_isoformat(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "PT0S".to_string();
    }
    if seconds.fract() == 0.0 {
        format!("PT{}S", seconds as i64)
    } else {
        let mut rendered = format!("{:.3}", seconds);
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
        format!("PT{}S", rendered)
    }
}

/// Parse an ISO-8601 duration of the `PT[nH][nM][nS]` family back to seconds
pub fn parse_iso_duration(text: &str) -> Option<f64> {
    let body = text.strip_prefix("PT")?;
    if body.is_empty() {
        return None;
    }
    let mut total = 0.0;
    let mut number = String::new();
    for ch in body.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'H' | 'M' | 'S' => {
                let value: f64 = number.parse().ok()?;
                total += match ch {
                    'H' => value * 3600.0,
                    'M' => value * 60.0,
                    _ => value,
                };
                number.clear();
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(total)
}
