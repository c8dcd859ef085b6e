/*
 * Fixed value/delay range tables and bucketing functions
 */

use crate::models::{Result, SwapRecord, SwaplensError};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// USD notional ranges, half-open `[min, max)`, ascending.
pub const VALUE_RANGES: [(u64, u64); 5] =
    [(0, 250), (250, 1_000), (1_000, 5_000), (5_000, 10_000), (10_000, 25_000)];

/// Fill-delay ranges in seconds, half-open `[min, max)`, ascending.
pub const DELAY_RANGES: [(u64, u64); 5] =
    [(0, 30), (30, 60), (60, 90), (90, 180), (180, 600)];

/// A trade-value bucket, identified by the exclusive upper bound of its
/// range. Values past the last range land in `Unbounded`, a sixth bucket
/// distinct from every finite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueBucket {
    Under(u64),
    Unbounded,
}

impl fmt::Display for ValueBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueBucket::Under(max) => write!(f, "{}", format_value(*max)),
            ValueBucket::Unbounded => write!(f, "$25K+"),
        }
    }
}

/// "$250" below a thousand, "$5K" style above.
#[must_use]
pub fn format_value(value: u64) -> String {
    if value >= 1_000 {
        format!("${}K", value / 1_000)
    } else {
        format!("${value}")
    }
}

/// Buckets a record by its USD fill value: the first range whose upper bound
/// exceeds the value. Malformed fill values are a capture defect and error.
pub fn value_bucket(record: &SwapRecord) -> Result<ValueBucket> {
    let fill_value = Decimal::from_str(&record.metadata.fill_value).map_err(|e| {
        SwaplensError::CalculationError(format!(
            "bad fillValue {:?}: {e}",
            record.metadata.fill_value
        ))
    })?;
    for (_, max) in VALUE_RANGES {
        if fill_value < Decimal::from(max) {
            return Ok(ValueBucket::Under(max));
        }
    }
    Ok(ValueBucket::Unbounded)
}

/// Half-open range membership for the flat per-delay-range reports, which
/// drop out-of-range delays instead of clamping them.
#[must_use]
pub fn delay_in(delay: f64, range: (u64, u64)) -> bool {
    delay >= range.0 as f64 && delay < range.1 as f64
}

/// Buckets a record by fill delay: the lower bound of the first range whose
/// upper bound exceeds the delay. Delays past the last range clamp into the
/// last bucket (unlike the value table, which has an overflow bucket).
#[must_use]
pub fn delay_bucket(record: &SwapRecord) -> u64 {
    let delay = record.metadata.fill_delay;
    for (min, max) in DELAY_RANGES {
        if delay < max as f64 {
            return min;
        }
    }
    DELAY_RANGES[DELAY_RANGES.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SwapRecord;
    use serde_json::json;

    fn record(fill_value: &str, fill_delay: f64) -> SwapRecord {
        serde_json::from_value(json!({
            "metadata": {
                "id": "t",
                "apiURL": "https://svc/a",
                "makerToken": "DAI",
                "takerToken": "ETH",
                "side": "sell",
                "fillValue": fill_value,
                "fillDelay": fill_delay,
                "swapResult": {
                    "gasUsed": 0,
                    "boughtAmount": "1",
                    "soldAmount": "1",
                    "revertData": "0x"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn value_boundaries_are_exclusive_upper_bounds() {
        assert_eq!(value_bucket(&record("0", 0.0)).unwrap(), ValueBucket::Under(250));
        assert_eq!(value_bucket(&record("249.99", 0.0)).unwrap(), ValueBucket::Under(250));
        // A boundary value belongs to the next range up.
        assert_eq!(value_bucket(&record("250", 0.0)).unwrap(), ValueBucket::Under(1_000));
        assert_eq!(value_bucket(&record("24999", 0.0)).unwrap(), ValueBucket::Under(25_000));
        assert_eq!(value_bucket(&record("25000", 0.0)).unwrap(), ValueBucket::Unbounded);
    }

    #[test]
    fn value_buckets_are_monotonic() {
        let values = ["0", "100", "250", "999", "1000", "5000", "10000", "25000", "90000"];
        let mut last = ValueBucket::Under(0);
        for v in values {
            let bucket = value_bucket(&record(v, 0.0)).unwrap();
            assert!(bucket >= last, "bucket went backwards at {v}");
            last = bucket;
        }
    }

    #[test]
    fn bad_fill_value_errors() {
        assert!(value_bucket(&record("abc", 0.0)).is_err());
    }

    #[test]
    fn bucket_labels_abbreviate_thousands() {
        assert_eq!(ValueBucket::Under(250).to_string(), "$250");
        assert_eq!(ValueBucket::Under(5_000).to_string(), "$5K");
        assert_eq!(ValueBucket::Unbounded.to_string(), "$25K+");
    }

    #[test]
    fn delay_buckets_label_by_lower_bound() {
        assert_eq!(delay_bucket(&record("1", 0.0)), 0);
        assert_eq!(delay_bucket(&record("1", 29.9)), 0);
        assert_eq!(delay_bucket(&record("1", 30.0)), 30);
        assert_eq!(delay_bucket(&record("1", 179.0)), 90);
        assert_eq!(delay_bucket(&record("1", 180.0)), 180);
    }

    #[test]
    fn delay_overflow_clamps_into_last_bucket() {
        assert_eq!(delay_bucket(&record("1", 599.0)), 180);
        assert_eq!(delay_bucket(&record("1", 600.0)), 180);
        assert_eq!(delay_bucket(&record("1", 10_000.0)), 180);
    }
}
