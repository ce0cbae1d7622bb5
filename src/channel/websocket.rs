//! Push-service WebSocket connection and frame handling

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Build the push-service WebSocket URL from the platform base URL.
///
/// Auth is the bearer token as a query parameter, read once at connect time.
/// `epid` identifies this endpoint instance across reconnects.
pub fn ws_url(server_url: &str, token: &str, epid: &Uuid) -> String {
    let base = server_url
        .trim_end_matches('/')
        .replace("https://", "wss://")
        .replace("http://", "ws://");
    let e = |s: &str| url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>();
    format!("{}/socket?token={}&epid={}", base, e(token), epid)
}

pub struct PushSocket {
    stream: WsStream,
}

impl PushSocket {
    /// Connect to the push-service WebSocket endpoint.
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::info!("Connecting WebSocket to push service");
        tracing::debug!("WS url: {}", url);

        let (stream, response) = connect_async(url)
            .await
            .context("WebSocket connection failed")?;

        tracing::info!("WebSocket connected (status={})", response.status());

        Ok(Self { stream })
    }

    /// Send a text frame.
    pub async fn send_text(&mut self, msg: &str) -> Result<()> {
        tracing::debug!("WS send: {}", msg);
        self.stream
            .send(Message::Text(msg.to_string()))
            .await
            .context("Failed to send WebSocket message")
    }

    /// Send a ping frame (client heartbeat).
    pub async fn send_ping(&mut self) -> Result<()> {
        self.stream
            .send(Message::Ping(Vec::new()))
            .await
            .context("Failed to send ping")
    }

    /// Receive the next text frame, answering server pings transparently.
    ///
    /// Returns `Ok(None)` when the server closes the connection.
    pub async fn recv_frame(&mut self) -> Result<Option<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("WS recv: {}", text);
                    return Ok(Some(text));
                }
                Some(Ok(Message::Ping(data))) => {
                    self.stream
                        .send(Message::Pong(data))
                        .await
                        .context("Failed to send pong")?;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("WebSocket closed: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(other)) => {
                    tracing::debug!("WS frame (ignored): {:?}", other);
                }
                Some(Err(e)) => {
                    return Err(e).context("WebSocket receive error");
                }
                None => {
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_scheme_and_query() {
        let epid = Uuid::nil();
        let url = ws_url("https://api.refnet.app/", "tok/en+x", &epid);
        assert!(url.starts_with("wss://api.refnet.app/socket?token="));
        // Token must be percent-encoded.
        assert!(url.contains("tok%2Fen%2Bx"));
        assert!(url.ends_with(&format!("epid={}", epid)));

        let url = ws_url("http://localhost:5000", "t", &epid);
        assert!(url.starts_with("ws://localhost:5000/socket?"));
    }
}
