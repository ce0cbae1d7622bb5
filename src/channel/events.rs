//! Wire events for the push channel
//!
//! Frames are JSON text with an `{ "event": ..., "data": ... }` envelope.
//! Payload fields are camelCase to match the platform's REST payloads.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Notification};

/// Client → server events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Subscribe to a referral-request room. Fire-and-forget, no ack.
    #[serde(rename = "join-room")]
    JoinRoom(JoinRoom),
    /// Send a chat message into a room.
    #[serde(rename = "send-message")]
    SendMessage(SendMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub request_id: String,
    pub receiver: String,
    pub text: String,
    /// Client-generated correlation id; lets the sender reconcile a server
    /// echo with its optimistic local copy.
    pub client_msg_id: String,
}

/// Server → client events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A chat message for a room this connection has joined.
    #[serde(rename = "receive-message")]
    ReceiveMessage(ChatMessage),
    /// A notification for the authenticated user.
    #[serde(rename = "new-notification")]
    NewNotification(Notification),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_wire_shape() {
        let frame = serde_json::to_value(ClientEvent::JoinRoom(JoinRoom {
            request_id: "r1".into(),
        }))
        .unwrap();
        assert_eq!(
            frame,
            serde_json::json!({"event": "join-room", "data": {"requestId": "r1"}})
        );
    }

    #[test]
    fn test_send_message_wire_shape() {
        let frame = serde_json::to_value(ClientEvent::SendMessage(SendMessage {
            request_id: "r1".into(),
            receiver: "u2".into(),
            text: "hello".into(),
            client_msg_id: "c-1".into(),
        }))
        .unwrap();
        assert_eq!(
            frame,
            serde_json::json!({
                "event": "send-message",
                "data": {"requestId": "r1", "receiver": "u2", "text": "hello", "clientMsgId": "c-1"}
            })
        );
    }

    #[test]
    fn test_server_event_parses_message() {
        let event: ServerEvent = serde_json::from_str(
            r#"{"event":"receive-message","data":{"id":"m1","sender":"u2","text":"hi","createdAt":"2026-08-01T09:30:00Z"}}"#,
        )
        .unwrap();
        match event {
            ServerEvent::ReceiveMessage(msg) => {
                assert_eq!(msg.id.as_deref(), Some("m1"));
                assert_eq!(msg.text.as_deref(), Some("hi"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_parses_notification() {
        let event: ServerEvent = serde_json::from_str(
            r#"{"event":"new-notification","data":{"id":"n1","type":"message","sender":{"name":"Ada"},"request":{"id":"r1"},"createdAt":"2026-08-01T09:30:00Z","isRead":false}}"#,
        )
        .unwrap();
        match event {
            ServerEvent::NewNotification(n) => {
                assert_eq!(n.id, "n1");
                assert_eq!(n.request.as_ref().map(|r| r.id.as_str()), Some("r1"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
