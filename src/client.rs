use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::FeedError;
use crate::model::message::payload_type;
use crate::model::period::Period;
use crate::network::connection::ConnectionManager;

/// Handle to a live gateway session.
///
/// Requests are fire-and-forget JSON envelopes pushed down the command
/// channel; responses and events come back on the event stream, which the
/// caller drives (the handshake is sequenced by watching response payload
/// types, see `demos/live_bars.rs`).
pub struct OpenApiClient {
    // Channel to send request frames to the connection task
    command_sender: mpsc::Sender<String>,

    // Channel to receive frames from the connection task.
    // Wrapped in Option so the caller can take ownership of the stream.
    event_receiver: Option<mpsc::Receiver<Result<String, FeedError>>>,
}

impl OpenApiClient {
    /// Connect to the gateway's JSON websocket endpoint.
    pub async fn connect(url: &str) -> Result<Self, FeedError> {
        let (tx_user_cmd, rx_engine_cmd) = mpsc::channel(32);
        let (tx_engine_event, rx_user_event) = mpsc::channel(100);

        let manager = ConnectionManager::new(url, tx_engine_event, rx_engine_cmd)?;
        tokio::spawn(manager.run());

        Ok(Self {
            command_sender: tx_user_cmd,
            event_receiver: Some(rx_user_event),
        })
    }

    /// First handshake leg: authenticate the application.
    pub async fn authenticate_application(
        &self,
        client_id: &str,
        secret: &str,
    ) -> Result<(), FeedError> {
        let payload = json!({
            "payloadType": payload_type::APPLICATION_AUTH_REQ,
            "payload": {
                "clientId": client_id,
                "clientSecret": secret,
            }
        });
        self.send_command(payload.to_string()).await
    }

    /// Second handshake leg: authenticate the trading account. Send this
    /// after the application-auth response arrives.
    pub async fn authenticate_account(
        &self,
        account_id: i64,
        access_token: &str,
    ) -> Result<(), FeedError> {
        let payload = json!({
            "payloadType": payload_type::ACCOUNT_AUTH_REQ,
            "payload": {
                "ctidTraderAccountId": account_id,
                "accessToken": access_token,
            }
        });
        self.send_command(payload.to_string()).await
    }

    /// Subscribe to spot prices; one request covers every instrument.
    /// Spot timestamps are requested so bar rollover can be detected.
    pub async fn subscribe_spots(
        &self,
        account_id: i64,
        symbol_ids: &[i64],
    ) -> Result<(), FeedError> {
        let payload = json!({
            "payloadType": payload_type::SUBSCRIBE_SPOTS_REQ,
            "payload": {
                "ctidTraderAccountId": account_id,
                "symbolId": symbol_ids,
                "subscribeToSpotTimestamp": true,
            }
        });
        self.send_command(payload.to_string()).await?;
        info!("Requested spot subscription for {} symbols", symbol_ids.len());
        Ok(())
    }

    /// Subscribe to live trendbars for one instrument at the given period.
    pub async fn subscribe_live_trendbars(
        &self,
        account_id: i64,
        symbol_id: i64,
        period: Period,
    ) -> Result<(), FeedError> {
        let payload = json!({
            "payloadType": payload_type::SUBSCRIBE_LIVE_TRENDBAR_REQ,
            "payload": {
                "ctidTraderAccountId": account_id,
                "period": period.proto_code(),
                "symbolId": symbol_id,
            }
        });
        self.send_command(payload.to_string()).await?;
        info!("Requested live {} trendbars for symbol {}", period, symbol_id);
        Ok(())
    }

    /// Push a raw JSON frame to the gateway.
    pub async fn send_command(&self, json: String) -> Result<(), FeedError> {
        self.command_sender
            .send(json)
            .await
            .map_err(|_| FeedError::ChannelClosed)
    }

    /// Take the event stream to listen for responses and spot events.
    pub fn stream(&mut self) -> mpsc::Receiver<Result<String, FeedError>> {
        self.event_receiver.take().expect("Stream already taken!")
    }
}
