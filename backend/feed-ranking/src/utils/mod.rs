// Utility functions for feed-ranking

use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;

/// Coerce a raw count to a non-negative finite value
pub fn sanitize_count(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Serde hook: accept any JSON number as a count, clamping bad values to 0
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(sanitize_count(raw.unwrap_or(0.0)).trunc() as u64)
}

/// `ln(1 + count)` for a counter
pub fn log_count(count: u64) -> f64 {
    (count as f64).ln_1p()
}

/// Descending comparison; NaN compares equal
pub fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
