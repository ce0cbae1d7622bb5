//! Per-room message store
//!
//! Holds the ordered message list for exactly one referral-request room:
//! wholesale history loads, id-deduplicated merges of pushed messages,
//! optimistic sends, and the day-grouped presentation view.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::api::{chat, RefNetClient};
use crate::channel::Channel;
use crate::models::ChatMessage;

/// Fallback day label for a message with no timestamp (only possible for a
/// just-inserted optimistic entry).
const FALLBACK_DAY: &str = "Today";

/// A contiguous run of messages sharing one calendar day.
#[derive(Debug, Clone)]
pub struct DayGroup {
    pub day: String,
    pub messages: Vec<ChatMessage>,
}

/// Ordered, append-only message list for one room.
pub struct MessageStore {
    request_id: String,
    current_user_id: String,
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new(request_id: impl Into<String>, current_user_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            current_user_id: current_user_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Fetch the room's full history and replace the local list wholesale.
    pub async fn load(&mut self, api: &RefNetClient) -> Result<()> {
        let history = chat::fetch_history(api, &self.request_id).await?;
        self.replace_all(history);
        Ok(())
    }

    /// Replace the list with a freshly fetched snapshot.
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Merge one message, deduplicating against the current list.
    ///
    /// A confirmed id already present is a duplicate delivery: no-op. A
    /// `client_msg_id` matching a local optimistic entry is the server echo of
    /// our own send: the optimistic entry is upgraded in place. Everything
    /// else appends. Returns true only when the list grew.
    pub fn append_if_new(&mut self, msg: ChatMessage) -> bool {
        if let Some(ref id) = msg.id {
            if self
                .messages
                .iter()
                .any(|m| m.id.as_deref() == Some(id.as_str()))
            {
                return false;
            }
        }

        if let Some(ref client_id) = msg.client_msg_id {
            if let Some(local) = self
                .messages
                .iter_mut()
                .find(|m| !m.is_confirmed() && m.client_msg_id.as_deref() == Some(client_id.as_str()))
            {
                local.id = msg.id.clone();
                if msg.created_at.is_some() {
                    local.created_at = msg.created_at;
                }
                return false;
            }
        }

        self.messages.push(msg);
        true
    }

    /// Send a text message: emit over the channel and append an optimistic
    /// local copy immediately, regardless of the emission's outcome.
    ///
    /// Whitespace-only text is a no-op. Returns true when a message was sent.
    pub fn send(&mut self, channel: &Channel, receiver: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let client_msg_id = Uuid::new_v4().to_string();
        channel.send_message(&self.request_id, receiver, text, &client_msg_id);

        self.messages.push(ChatMessage {
            id: None,
            client_msg_id: Some(client_msg_id),
            sender: self.current_user_id.clone(),
            text: Some(text.to_string()),
            image: None,
            document: None,
            gif: None,
            created_at: Some(Utc::now()),
        });
        true
    }

    /// Partition the list into contiguous runs sharing a calendar day.
    ///
    /// Pure derivation, recomputed on every call; concatenating the groups in
    /// order reproduces the list exactly.
    pub fn group_by_day(&self) -> Vec<DayGroup> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for msg in &self.messages {
            let day = day_label(msg);
            match groups.last_mut() {
                Some(group) if group.day == day => group.messages.push(msg.clone()),
                _ => groups.push(DayGroup {
                    day,
                    messages: vec![msg.clone()],
                }),
            }
        }
        groups
    }
}

/// Calendar-day label, e.g. "Monday, June 3". Formatted in UTC so the
/// grouping is independent of the host timezone.
fn day_label(msg: &ChatMessage) -> String {
    match msg.created_at {
        Some(ts) => ts.format("%A, %B %-d").to_string(),
        None => FALLBACK_DAY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn confirmed(id: &str, text: &str, at: &str) -> ChatMessage {
        ChatMessage {
            id: Some(id.to_string()),
            client_msg_id: None,
            sender: "u2".to_string(),
            text: Some(text.to_string()),
            image: None,
            document: None,
            gif: None,
            created_at: Some(ts(at)),
        }
    }

    #[test]
    fn test_append_if_new_dedups_by_id() {
        let mut store = MessageStore::new("r1", "u1");
        store.replace_all(vec![
            confirmed("a", "first", "2026-08-01T09:00:00Z"),
            confirmed("b", "second", "2026-08-01T09:01:00Z"),
        ]);

        // Duplicate delivery of "a" must not grow the list.
        assert!(!store.append_if_new(confirmed("a", "first", "2026-08-01T09:00:00Z")));
        assert_eq!(store.len(), 2);

        assert!(store.append_if_new(confirmed("c", "third", "2026-08-01T09:02:00Z")));
        assert_eq!(store.len(), 3);

        // No two entries share a confirmed id.
        let mut ids: Vec<_> = store
            .messages()
            .iter()
            .filter_map(|m| m.id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), store.len());
    }

    #[tokio::test]
    async fn test_send_trims_and_skips_empty() {
        let (channel, mut cmd_rx) = Channel::detached();
        let mut store = MessageStore::new("r1", "u1");

        assert!(!store.send(&channel, "u2", ""));
        assert!(!store.send(&channel, "u2", "   \t  "));
        assert!(store.is_empty());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_appends_optimistically() {
        let (channel, mut cmd_rx) = Channel::detached();
        let mut store = MessageStore::new("r1", "u1");

        assert!(store.send(&channel, "u2", "  hello  "));
        assert_eq!(store.len(), 1);

        let local = &store.messages()[0];
        assert_eq!(local.id, None);
        assert_eq!(local.sender, "u1");
        assert_eq!(local.text.as_deref(), Some("hello"));
        assert!(local.created_at.is_some());
        assert!(local.client_msg_id.is_some());

        match cmd_rx.try_recv().unwrap() {
            crate::channel::ClientEvent::SendMessage(send) => {
                assert_eq!(send.request_id, "r1");
                assert_eq!(send.receiver, "u2");
                assert_eq!(send.text, "hello");
                assert_eq!(Some(send.client_msg_id), local.client_msg_id.clone());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_works_without_live_connection() {
        let (channel, cmd_rx) = Channel::detached();
        drop(cmd_rx); // nothing is listening, as if the network were gone
        let mut store = MessageStore::new("r1", "u1");

        assert!(store.send(&channel, "u2", "hello"));
        assert_eq!(store.messages()[0].text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_server_echo_upgrades_optimistic_entry() {
        let (channel, _cmd_rx) = Channel::detached();
        let mut store = MessageStore::new("r1", "u1");

        store.send(&channel, "u2", "hello");
        let client_id = store.messages()[0].client_msg_id.clone().unwrap();

        let mut echo = confirmed("m9", "hello", "2026-08-01T09:00:00Z");
        echo.client_msg_id = Some(client_id);
        echo.sender = "u1".to_string();

        assert!(!store.append_if_new(echo));
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].id.as_deref(), Some("m9"));
    }

    #[test]
    fn test_group_by_day_empty() {
        let store = MessageStore::new("r1", "u1");
        assert!(store.group_by_day().is_empty());
    }

    #[test]
    fn test_group_by_day_partitions_and_preserves_order() {
        let mut store = MessageStore::new("r1", "u1");
        store.replace_all(vec![
            confirmed("a", "1", "2026-08-03T09:00:00Z"),
            confirmed("b", "2", "2026-08-03T17:30:00Z"),
            confirmed("c", "3", "2026-08-04T08:00:00Z"),
            confirmed("d", "4", "2026-08-06T12:00:00Z"),
            confirmed("e", "5", "2026-08-06T12:01:00Z"),
        ]);

        let groups = store.group_by_day();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].day, "Monday, August 3");
        assert_eq!(groups[1].day, "Tuesday, August 4");
        assert_eq!(groups[2].day, "Thursday, August 6");

        // Concatenation reproduces the original list order.
        let flat: Vec<_> = groups
            .iter()
            .flat_map(|g| g.messages.iter())
            .filter_map(|m| m.id.clone())
            .collect();
        assert_eq!(flat, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_group_by_day_missing_timestamp_falls_back() {
        let mut store = MessageStore::new("r1", "u1");
        let mut bare = confirmed("a", "hi", "2026-08-03T09:00:00Z");
        bare.created_at = None;
        store.replace_all(vec![bare]);

        let groups = store.group_by_day();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].day, "Today");
    }
}
