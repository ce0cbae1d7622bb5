//! Realtime push channel
//!
//! Maintains one WebSocket connection to the platform's push service and
//! fans incoming events out to subscribers. The connection is owned by a
//! background driver task; `Channel` is a cheap cloneable handle that is
//! constructed explicitly and passed to whatever needs it.

pub mod events;
pub mod websocket;

pub use events::{ClientEvent, JoinRoom, SendMessage, ServerEvent};

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::time;
use uuid::Uuid;

use websocket::PushSocket;

/// Reconnect backoff cap (1s, 2s, 4s, ... capped here).
const BACKOFF_CAP_SECS: u64 = 64;
/// A session that survives this long resets the backoff.
const STABLE_THRESHOLD: Duration = Duration::from_secs(60);
/// Client heartbeat interval.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Fan-out buffer; a subscriber that lags this far behind loses events.
const EVENT_BUFFER: usize = 256;

/// Handle to the shared push connection.
///
/// Emits are fire-and-forget: enqueueing always succeeds locally, delivery
/// depends on the connection state and is never awaited. Dropping every
/// handle shuts the driver down; dropping a subscription receiver detaches
/// that listener.
#[derive(Clone)]
pub struct Channel {
    cmd_tx: mpsc::UnboundedSender<ClientEvent>,
    events_tx: broadcast::Sender<ServerEvent>,
}

impl Channel {
    /// Spawn the connection driver and return a handle to it.
    ///
    /// The token is read once here; a later refresh does not re-authenticate
    /// the live connection.
    pub fn connect(server_url: &str, token: &str) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        let driver = Driver {
            server_url: server_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            epid: Uuid::new_v4(),
            cmd_rx,
            events_tx: events_tx.clone(),
            rooms: Vec::new(),
        };
        tokio::spawn(driver.run());

        Self { cmd_tx, events_tx }
    }

    /// Subscribe to inbound events. Drop the receiver to detach.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events_tx.subscribe()
    }

    /// Join a referral-request room. Fire-and-forget; the driver re-joins
    /// every known room after a reconnect.
    pub fn join_room(&self, request_id: &str) {
        self.emit(ClientEvent::JoinRoom(JoinRoom {
            request_id: request_id.to_string(),
        }));
    }

    /// Send a chat message into a room. Fire-and-forget.
    pub fn send_message(&self, request_id: &str, receiver: &str, text: &str, client_msg_id: &str) {
        self.emit(ClientEvent::SendMessage(SendMessage {
            request_id: request_id.to_string(),
            receiver: receiver.to_string(),
            text: text.to_string(),
            client_msg_id: client_msg_id.to_string(),
        }));
    }

    fn emit(&self, event: ClientEvent) {
        if self.cmd_tx.send(event).is_err() {
            tracing::warn!("Push channel driver is gone, dropping event");
        }
    }

    /// Handle with no driver behind it. Emits are swallowed by the command
    /// queue, which is exactly the offline behavior callers see.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(8);
        (Self { cmd_tx, events_tx }, cmd_rx)
    }
}

/// Background task owning the WebSocket and the reconnect policy.
struct Driver {
    server_url: String,
    token: String,
    epid: Uuid,
    cmd_rx: mpsc::UnboundedReceiver<ClientEvent>,
    events_tx: broadcast::Sender<ServerEvent>,
    /// Rooms joined on this connection's lifetime, replayed after reconnect.
    rooms: Vec<String>,
}

impl Driver {
    /// Run sessions until every handle is dropped, reconnecting with
    /// exponential backoff (1s doubling to 64s, reset after 60s stable).
    async fn run(mut self) {
        let mut backoff = 1u64;

        loop {
            let started = Instant::now();
            match self.run_session().await {
                Ok(()) => {
                    tracing::info!("Push channel shut down (all handles dropped)");
                    return;
                }
                Err(e) => {
                    if started.elapsed() >= STABLE_THRESHOLD {
                        backoff = 1;
                    }
                    tracing::warn!(
                        "Push channel disconnected: {:#}. Reconnecting in {}s...",
                        e,
                        backoff
                    );
                    if self
                        .sleep_with_commands(Duration::from_secs(backoff))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    backoff = (backoff * 2).min(BACKOFF_CAP_SECS);
                }
            }
        }
    }

    /// One full session: connect, replay room joins, pump events.
    ///
    /// Returns `Ok(())` only on clean shutdown (command side closed).
    async fn run_session(&mut self) -> Result<()> {
        let url = websocket::ws_url(&self.server_url, &self.token, &self.epid);
        let mut socket = PushSocket::connect(&url).await?;

        // Room subscriptions do not survive a reconnect server-side.
        for room in self.rooms.clone() {
            let frame = serde_json::to_string(&ClientEvent::JoinRoom(JoinRoom {
                request_id: room,
            }))?;
            socket.send_text(&frame).await.context("Room rejoin failed")?;
        }

        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                frame = socket.recv_frame() => {
                    match frame {
                        Ok(Some(text)) => self.handle_frame(&text),
                        Ok(None) => anyhow::bail!("WebSocket closed by server"),
                        Err(e) => return Err(e.context("WebSocket recv error")),
                    }
                }
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(event) => {
                            remember_room(&mut self.rooms, &event);
                            let frame = serde_json::to_string(&event)?;
                            socket.send_text(&frame).await.context("Event send failed")?;
                        }
                        None => return Ok(()),
                    }
                }
                _ = heartbeat.tick() => {
                    socket.send_ping().await.context("Heartbeat send failed")?;
                }
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<ServerEvent>(text) {
            // A send error only means no subscriber is attached right now.
            Ok(event) => {
                let _ = self.events_tx.send(event);
            }
            Err(e) => tracing::debug!("Unrecognized push frame ({}): {}", e, text),
        }
    }

    /// Wait out the backoff while still consuming commands: room joins are
    /// recorded for replay, message sends are dropped (no offline queue).
    ///
    /// Errors when the command side closed, i.e. clean shutdown.
    async fn sleep_with_commands(&mut self, duration: Duration) -> Result<(), ()> {
        let sleep = time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(event) => {
                            remember_room(&mut self.rooms, &event);
                            if matches!(event, ClientEvent::SendMessage(_)) {
                                tracing::warn!("Push channel is down, dropping send-message event");
                            }
                        }
                        None => return Err(()),
                    }
                }
            }
        }
    }
}

/// Record a joined room for replay after reconnects.
fn remember_room(rooms: &mut Vec<String>, event: &ClientEvent) {
    if let ClientEvent::JoinRoom(ref join) = event {
        if !rooms.iter().any(|r| r == &join.request_id) {
            rooms.push(join.request_id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_room_enqueues_event() {
        let (channel, mut cmd_rx) = Channel::detached();
        channel.join_room("r1");

        match cmd_rx.recv().await {
            Some(ClientEvent::JoinRoom(join)) => assert_eq!(join.request_id, "r1"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_survives_dead_driver() {
        let (channel, cmd_rx) = Channel::detached();
        drop(cmd_rx);
        // Fire-and-forget: no panic, no error surfaced.
        channel.send_message("r1", "u2", "hello", "c-1");
    }

    #[test]
    fn test_remember_room_dedups() {
        let mut rooms = Vec::new();
        let join = ClientEvent::JoinRoom(JoinRoom {
            request_id: "r1".into(),
        });
        remember_room(&mut rooms, &join);
        remember_room(&mut rooms, &join);
        remember_room(
            &mut rooms,
            &ClientEvent::SendMessage(SendMessage {
                request_id: "r2".into(),
                receiver: "u2".into(),
                text: "hi".into(),
                client_msg_id: "c-1".into(),
            }),
        );
        assert_eq!(rooms, vec!["r1".to_string()]);
    }
}
