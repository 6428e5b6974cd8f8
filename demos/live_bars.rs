//! End-to-end live bar feed: connect, authenticate, subscribe, and print
//! each instrument's closed OHLC bar exactly once per period.
//!
//! Expects a `credentials.json` next to the binary:
//! `{"ClientId": "...", "Secret": "...", "AccountId": 123, "AccessToken": "...", "HostType": "demo"}`
//!
//! Instruments and timeframe come from an optional `feed.json`
//! (`{"symbol_ids": [...], "symbol_names": [...], "period": "M1"}`);
//! without one the built-in crypto set is used.

use std::path::Path;

use tokio::time::{sleep, Duration};
use tracing::warn;

use trendbar_forge::{
    payload_type, BarDispatcher, Credentials, Envelope, FeedConfig, OpenApiClient,
};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();
    tracing_subscriber::fmt::init();

    // Malformed config is a startup failure, never a mid-stream one.
    let creds = Credentials::from_file("credentials.json").expect("credentials.json");
    let feed = if Path::new("feed.json").exists() {
        FeedConfig::from_file("feed.json").expect("feed.json")
    } else {
        FeedConfig::default()
    };
    let timeframe = feed.period().expect("feed timeframe");
    let instruments = feed.instruments().expect("feed instruments");

    // 1. Connect; the handshake is driven off the event stream below
    let mut client = OpenApiClient::connect(creds.host())
        .await
        .expect("connect failed");
    let mut events = client.stream();

    // 2. One aggregator per instrument, in subscription order
    let mut dispatcher = BarDispatcher::new(timeframe);
    for (id, name) in &instruments {
        dispatcher.add_instrument(*id, name.clone());
    }

    // 3. Drive the session off the event stream. The connection task
    // announces every (re)established socket, so the auth/subscribe flow
    // restarts from scratch after a reconnect.
    while let Some(event) = events.recv().await {
        let raw = match event {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Transport error: {}", e);
                continue;
            }
        };
        let envelope = match Envelope::parse(&raw) {
            Ok(env) => env,
            Err(e) => {
                warn!("Unparseable frame: {}", e);
                continue;
            }
        };

        match envelope.payload_type {
            payload_type::CONNECTION_ESTABLISHED => {
                println!("Connected, authenticating...");
                client
                    .authenticate_application(&creds.client_id, &creds.secret)
                    .await
                    .expect("send failed");
            }
            payload_type::APPLICATION_AUTH_RES => {
                println!("Application authenticated");
                client
                    .authenticate_account(creds.account_id, &creds.access_token)
                    .await
                    .expect("send failed");
            }
            payload_type::ACCOUNT_AUTH_RES => {
                println!("Account authenticated");
                client
                    .subscribe_spots(creds.account_id, &feed.symbol_ids)
                    .await
                    .expect("send failed");

                // Small stagger between trendbar subscriptions to stay
                // under the gateway's request rate limit.
                for (idx, (id, name)) in instruments.iter().enumerate() {
                    client
                        .subscribe_live_trendbars(creds.account_id, *id, timeframe)
                        .await
                        .expect("send failed");
                    println!("Subscribed to {}", name);
                    if idx < instruments.len() - 1 {
                        sleep(Duration::from_millis(500)).await;
                    }
                }
                println!("Subscribed to all symbols!");
            }
            payload_type::SPOT_EVENT => {
                for bar in dispatcher.process_payload(&envelope.payload) {
                    println!("{}", bar);
                }
            }
            payload_type::ERROR_RES => {
                if let Some(e) = envelope.gateway_error() {
                    warn!("Gateway error: {}", e);
                }
            }
            _ => {}
        }
    }
}
