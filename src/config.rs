//! Credential and feed configuration, loaded once at startup.
//!
//! Anything malformed here fails fast before a connection is attempted;
//! nothing in this module is consulted again mid-stream.

use std::path::Path;

use serde::Deserialize;

use crate::error::FeedError;
use crate::model::period::Period;

/// Demo-environment JSON gateway endpoint.
pub const DEMO_HOST: &str = "wss://demo.ctraderapi.com:5036";
/// Live-environment JSON gateway endpoint.
pub const LIVE_HOST: &str = "wss://live.ctraderapi.com:5036";

/// API credentials, stored in a JSON file kept out of version control.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "ClientId")]
    pub client_id: String,
    #[serde(rename = "Secret")]
    pub secret: String,
    #[serde(rename = "AccountId")]
    pub account_id: i64,
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    #[serde(rename = "HostType")]
    pub host_type: String,
}

impl Credentials {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FeedError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        serde_json::from_str(raw)
            .map_err(|e| FeedError::ConfigError(format!("bad credentials file: {}", e)))
    }

    /// Gateway endpoint for this credential set's environment.
    pub fn host(&self) -> &'static str {
        if self.host_type.eq_ignore_ascii_case("live") {
            LIVE_HOST
        } else {
            DEMO_HOST
        }
    }
}

/// Which instruments to watch and at what timeframe.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub symbol_ids: Vec<i64>,
    pub symbol_names: Vec<String>,
    pub period: String,
}

impl FeedConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FeedError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        serde_json::from_str(raw)
            .map_err(|e| FeedError::ConfigError(format!("bad feed config: {}", e)))
    }

    pub fn period(&self) -> Result<Period, FeedError> {
        self.period.parse()
    }

    /// Paired (id, display name) list in subscription order.
    pub fn instruments(&self) -> Result<Vec<(i64, String)>, FeedError> {
        if self.symbol_ids.len() != self.symbol_names.len() {
            return Err(FeedError::ConfigError(format!(
                "{} symbol ids but {} names",
                self.symbol_ids.len(),
                self.symbol_names.len()
            )));
        }
        Ok(self
            .symbol_ids
            .iter()
            .copied()
            .zip(self.symbol_names.iter().cloned())
            .collect())
    }
}

impl Default for FeedConfig {
    // The crypto set the feed was built around; overridable via feed.json.
    fn default() -> Self {
        Self {
            symbol_ids: vec![10026, 10029, 10028],
            symbol_names: vec!["BTCUSD".into(), "ETHUSD".into(), "BCHUSD".into()],
            period: "M1".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDS: &str = r#"{
        "ClientId": "my-client-id",
        "Secret": "my-secret",
        "AccountId": 1234567,
        "AccessToken": "token",
        "HostType": "demo"
    }"#;

    #[test]
    fn test_credentials_from_json() {
        let creds = Credentials::from_json(CREDS).unwrap();
        assert_eq!(creds.account_id, 1234567);
        assert_eq!(creds.host(), DEMO_HOST);
    }

    #[test]
    fn test_live_host_selection_is_case_insensitive() {
        let creds = Credentials::from_json(&CREDS.replace("demo", "Live")).unwrap();
        assert_eq!(creds.host(), LIVE_HOST);
    }

    #[test]
    fn test_malformed_credentials_fail_fast() {
        assert!(matches!(
            Credentials::from_json("{\"ClientId\": 42}"),
            Err(FeedError::ConfigError(_))
        ));
    }

    #[test]
    fn test_feed_config_pairs_in_order() {
        let config = FeedConfig {
            symbol_ids: vec![10026, 10029],
            symbol_names: vec!["BTCUSD".into(), "ETHUSD".into()],
            period: "M1".into(),
        };

        assert_eq!(config.period().unwrap(), Period::M1);
        assert_eq!(
            config.instruments().unwrap(),
            vec![(10026, "BTCUSD".to_string()), (10029, "ETHUSD".to_string())]
        );
    }

    #[test]
    fn test_feed_config_from_json() {
        let config = FeedConfig::from_json(
            r#"{"symbol_ids": [1, 2], "symbol_names": ["EURUSD", "GBPUSD"], "period": "M5"}"#,
        )
        .unwrap();
        assert_eq!(config.period().unwrap(), Period::M5);
        assert_eq!(config.instruments().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_feed_config_fails_fast() {
        assert!(matches!(
            FeedConfig::from_json(r#"{"symbol_ids": "all"}"#),
            Err(FeedError::ConfigError(_))
        ));
    }

    #[test]
    fn test_default_feed_config_is_valid() {
        let config = FeedConfig::default();
        assert_eq!(config.period().unwrap(), Period::M1);
        assert_eq!(config.instruments().unwrap()[0], (10026, "BTCUSD".to_string()));
    }

    #[test]
    fn test_feed_config_length_mismatch_fails() {
        let config = FeedConfig {
            symbol_ids: vec![10026],
            symbol_names: vec![],
            period: "M1".into(),
        };
        assert!(config.instruments().is_err());
    }
}
