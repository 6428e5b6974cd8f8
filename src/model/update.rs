//! Strict decoding of spot-event payloads into immutable `RawUpdate` values.
//!
//! The gateway's JSON rendering writes 64-bit integers as strings, so every
//! numeric field is normalized here. A non-numeric token is a decode error
//! for that update; it is never coerced to a default.

use serde_json::Value;

use crate::error::FeedError;

/// Cumulative-from-bar-start price deltas nested under `trendbar[0]`.
///
/// `low` is the bar's absolute low in raw venue units; open and high are
/// offsets from it. Values are snapshots of the whole bar so far, not
/// per-tick increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendbarFragment {
    pub low: i64,
    pub delta_open: i64,
    pub delta_high: i64,
}

/// One decoded spot/trendbar event, venue-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpdate {
    pub symbol_id: i64,
    /// Event time in milliseconds since epoch.
    pub timestamp_ms: i64,
    /// Bid in raw venue units (1/100000 of a price unit).
    pub bid: Option<i64>,
    /// Absent for pure spot ticks that carry no bar progress.
    pub trendbar: Option<TrendbarFragment>,
    /// Session-close events carry closing metadata, not a new tick.
    pub session_close: bool,
}

impl RawUpdate {
    /// Decode a spot-event payload.
    ///
    /// Fields are extracted into a fresh value; the input map is never
    /// mutated. Missing optional fields are fine, malformed ones are not.
    pub fn decode(payload: &Value) -> Result<Self, FeedError> {
        let symbol_id = require_int(payload, "symbolId")?;
        let timestamp_ms = require_int(payload, "timestamp")?;
        let bid = optional_int(payload, "bid")?;
        let session_close = flag(payload, "sessionClose");

        let trendbar = match payload
            .get("trendbar")
            .and_then(Value::as_array)
            .and_then(|bars| bars.first())
        {
            Some(frag) => Some(TrendbarFragment {
                low: require_int(frag, "low")?,
                delta_open: require_int(frag, "deltaOpen")?,
                delta_high: require_int(frag, "deltaHigh")?,
            }),
            None => None,
        };

        Ok(Self {
            symbol_id,
            timestamp_ms,
            bid,
            trendbar,
            session_close,
        })
    }
}

fn decode_error(field: &'static str, value: &Value) -> FeedError {
    FeedError::DecodeError {
        field,
        value: value.to_string(),
    }
}

fn parse_int(value: &Value, field: &'static str) -> Result<i64, FeedError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| decode_error(field, value)),
        Value::String(s) => s.parse().map_err(|_| decode_error(field, value)),
        _ => Err(decode_error(field, value)),
    }
}

fn require_int(obj: &Value, field: &'static str) -> Result<i64, FeedError> {
    let value = obj.get(field).ok_or(FeedError::DecodeError {
        field,
        value: "<missing>".to_string(),
    })?;
    parse_int(value, field)
}

fn optional_int(obj: &Value, field: &'static str) -> Result<Option<i64>, FeedError> {
    match obj.get(field) {
        Some(value) => parse_int(value, field).map(Some),
        None => Ok(None),
    }
}

// Proto3 JSON omits false booleans, so presence alone means set.
fn flag(obj: &Value, field: &str) -> bool {
    match obj.get(field) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_trendbar_event() {
        // Integers as strings, matching the gateway's int64 rendering.
        let payload = json!({
            "ctidTraderAccountId": "1234567",
            "symbolId": "10026",
            "timestamp": "6000000",
            "bid": "100300",
            "trendbar": [{
                "volume": "42",
                "period": "M1",
                "low": "100000",
                "deltaOpen": "500",
                "deltaHigh": "800",
                "utcTimestampInMinutes": 100
            }]
        });

        let update = RawUpdate::decode(&payload).unwrap();
        assert_eq!(update.symbol_id, 10026);
        assert_eq!(update.timestamp_ms, 6_000_000);
        assert_eq!(update.bid, Some(100_300));
        assert!(!update.session_close);

        let frag = update.trendbar.unwrap();
        assert_eq!(frag.low, 100_000);
        assert_eq!(frag.delta_open, 500);
        assert_eq!(frag.delta_high, 800);
    }

    #[test]
    fn test_decode_pure_spot_tick() {
        let payload = json!({
            "symbolId": 10029,
            "timestamp": 6_030_000_i64,
            "bid": 200_500_i64
        });

        let update = RawUpdate::decode(&payload).unwrap();
        assert!(update.trendbar.is_none());
        assert_eq!(update.bid, Some(200_500));
    }

    #[test]
    fn test_decode_session_close_flag() {
        let payload = json!({
            "symbolId": 10026,
            "timestamp": 6_000_000_i64,
            "sessionClose": true
        });

        assert!(RawUpdate::decode(&payload).unwrap().session_close);
    }

    #[test]
    fn test_non_numeric_token_is_a_decode_error() {
        let payload = json!({
            "symbolId": "10026",
            "timestamp": "not-a-number"
        });

        let err = RawUpdate::decode(&payload).unwrap_err();
        match err {
            FeedError::DecodeError { field, .. } => assert_eq!(field, "timestamp"),
            other => panic!("expected DecodeError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_fragment_field_is_a_decode_error() {
        let payload = json!({
            "symbolId": "10026",
            "timestamp": "6000000",
            "trendbar": [{"low": "100000", "deltaOpen": [], "deltaHigh": "800"}]
        });

        assert!(matches!(
            RawUpdate::decode(&payload),
            Err(FeedError::DecodeError {
                field: "deltaOpen",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let payload = json!({"timestamp": "6000000"});
        assert!(matches!(
            RawUpdate::decode(&payload),
            Err(FeedError::DecodeError {
                field: "symbolId",
                ..
            })
        ));
    }
}
