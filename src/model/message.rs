use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FeedError;

/// Payload type codes from the Open API protocol.
///
/// Only the handful this client actually exchanges; everything else is left
/// to fall through the dispatch match unhandled.
pub mod payload_type {
    /// Synthetic, emitted locally by the connection task when a socket is
    /// (re)established. The gateway never sends payload type 0, so the
    /// caller can restart the auth handshake from this frame.
    pub const CONNECTION_ESTABLISHED: u64 = 0;
    pub const HEARTBEAT_EVENT: u64 = 51;
    pub const APPLICATION_AUTH_REQ: u64 = 2100;
    pub const APPLICATION_AUTH_RES: u64 = 2101;
    pub const ACCOUNT_AUTH_REQ: u64 = 2102;
    pub const ACCOUNT_AUTH_RES: u64 = 2103;
    pub const SUBSCRIBE_SPOTS_REQ: u64 = 2127;
    pub const SUBSCRIBE_SPOTS_RES: u64 = 2128;
    pub const SPOT_EVENT: u64 = 2131;
    pub const SUBSCRIBE_LIVE_TRENDBAR_REQ: u64 = 2135;
    pub const ERROR_RES: u64 = 2142;
}

// The gateway wraps every message in the same two-field envelope.
// The payload stays a raw Value here; spot events get their strict
// decoding in model::update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "payloadType")]
    pub payload_type: u64,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_spot_event(&self) -> bool {
        self.payload_type == payload_type::SPOT_EVENT
    }

    /// Classify an `ERROR_RES` frame into the feed error taxonomy.
    ///
    /// Auth failures are terminal for the session; any other gateway error
    /// during setup is a subscription problem the caller may retry.
    pub fn gateway_error(&self) -> Option<FeedError> {
        if self.payload_type != payload_type::ERROR_RES {
            return None;
        }
        let code = self
            .payload
            .get("errorCode")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        let description = self
            .payload
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("");
        let detail = format!("{}: {}", code, description);

        if code.contains("AUTH") || code.contains("TOKEN") {
            Some(FeedError::AuthError(detail))
        } else {
            Some(FeedError::SubscriptionError(detail))
        }
    }
}

/// Frame the connection task pushes onto the event channel whenever a
/// socket is (re)established.
pub fn connected_frame() -> String {
    format!(
        r#"{{"payloadType":{},"payload":{{}}}}"#,
        payload_type::CONNECTION_ESTABLISHED
    )
}

/// Heartbeat frame the connection sends on a fixed interval to keep the
/// gateway from dropping an idle session.
pub fn heartbeat_frame() -> String {
    format!(
        r#"{{"payloadType":{},"payload":{{}}}}"#,
        payload_type::HEARTBEAT_EVENT
    )
}
