use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable closed-bar record, produced exactly once per
/// (instrument, bucket) pair that received at least one trendbar update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedBar {
    pub symbol: String,
    /// Bar-close time in seconds since epoch (closed bucket x period length).
    pub close_timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl ClosedBar {
    pub fn close_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.close_timestamp, 0).unwrap_or_default()
    }
}

impl fmt::Display for ClosedBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            self.symbol,
            self.close_time().to_rfc3339(),
            self.open,
            self.high,
            self.low,
            self.close
        )
    }
}
