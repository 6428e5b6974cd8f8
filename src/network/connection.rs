use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Duration};

use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{error, info, warn};
use url::Url;

use crate::error::FeedError;
use crate::model::message::{connected_frame, heartbeat_frame};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// The gateway drops sessions that stay silent; keep well under its timeout.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Owns the socket: forwards inbound frames to the event channel, drains the
/// command channel onto the wire, heartbeats, and reconnects on failure.
pub struct ConnectionManager {
    url: Url,
    event_sender: mpsc::Sender<Result<String, FeedError>>,
    command_receiver: mpsc::Receiver<String>,
}

impl ConnectionManager {
    pub fn new(
        url: &str,
        event_sender: mpsc::Sender<Result<String, FeedError>>,
        command_receiver: mpsc::Receiver<String>,
    ) -> Result<Self, FeedError> {
        Ok(Self {
            url: Url::parse(url)?,
            event_sender,
            command_receiver,
        })
    }

    // Runs until the client side hangs up. Authentication and subscriptions
    // do not survive a reconnect, so every established socket is announced
    // on the event channel and the caller restarts the handshake from that
    // frame.
    pub async fn run(mut self) {
        loop {
            info!("Connecting to {}...", self.url);

            match connect_async(self.url.as_str()).await {
                Ok((ws_stream, _)) => {
                    info!("Connected to gateway");

                    if self
                        .event_sender
                        .send(Ok(connected_frame()))
                        .await
                        .is_err()
                    {
                        return; // client dropped, stop the task
                    }

                    if self.serve(ws_stream).await {
                        return;
                    }
                }
                Err(e) => {
                    error!("Connection failed: {}. Retrying...", e);
                }
            }
            sleep(RECONNECT_DELAY).await;
        }
    }

    // One connection's lifetime. Returns true when the client dropped its
    // channels and the whole task should stop.
    async fn serve(&mut self, ws_stream: WsStream) -> bool {
        let (mut write, mut read) = ws_stream.split();
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if let Err(e) = write.send(Message::Text(heartbeat_frame().into())).await {
                        error!("Heartbeat send failed: {}", e);
                        return false;
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if self.event_sender.send(Ok(text.to_string())).await.is_err() {
                                return true; // client dropped, stop the task
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if write.send(Message::Pong(data)).await.is_err() {
                                return false;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            warn!("Gateway closed the connection: {:?}", frame);
                            return false;
                        }
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            let _ = self.event_sender.send(Err(e.into())).await;
                            return false;
                        }
                        None => {
                            warn!("Stream ended unexpectedly");
                            return false;
                        }
                        _ => {}
                    }
                }
                cmd = self.command_receiver.recv() => {
                    match cmd {
                        Some(payload) => {
                            if let Err(e) = write.send(Message::Text(payload.into())).await {
                                error!("Failed to send request frame: {}", e);
                                return false;
                            }
                        }
                        None => {
                            info!("Client command channel closed, shutting down...");
                            return true;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::payload_type;
    use crate::model::message::Envelope;

    // Loopback server standing in for the gateway.
    async fn local_ws_server() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Keep the socket open and drain whatever the client sends.
            while ws.next().await.is_some() {}
        });
        addr
    }

    #[tokio::test]
    async fn test_established_connection_is_announced() {
        let addr = local_ws_server().await;

        let (tx_event, mut rx_event) = mpsc::channel(8);
        // Held open so the manager does not shut down on a closed channel.
        let (_tx_cmd, rx_cmd) = mpsc::channel::<String>(8);

        let manager =
            ConnectionManager::new(&format!("ws://{}", addr), tx_event, rx_cmd).unwrap();
        tokio::spawn(manager.run());

        // The very first frame on the event channel is the synthetic
        // connection announcement, before any gateway traffic.
        let first = rx_event.recv().await.unwrap().unwrap();
        let env = Envelope::parse(&first).unwrap();
        assert_eq!(env.payload_type, payload_type::CONNECTION_ESTABLISHED);
    }
}
