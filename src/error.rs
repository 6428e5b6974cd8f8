use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network connection failed: {0}")]
    ConnectionError(String),

    #[error("WebSocket error: {0}")]
    SocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Non-numeric value in field '{field}': {value}")]
    DecodeError { field: &'static str, value: String },

    #[error("Internal channel closed")]
    ChannelClosed,

    #[error("Invalid URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Subscription failed: {0}")]
    SubscriptionError(String),

    #[error("Bad configuration: {0}")]
    ConfigError(String),
}
