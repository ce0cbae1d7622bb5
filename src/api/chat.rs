//! Chat REST endpoints: room history and attachment upload

use anyhow::{Context, Result};
use std::path::Path;

use super::client::RefNetClient;
use crate::models::ChatMessage;
use crate::store::MessageStore;

/// Fetch the ordered message history for one referral-request room.
pub async fn fetch_history(client: &RefNetClient, request_id: &str) -> Result<Vec<ChatMessage>> {
    let resp = client.get(&format!("/api/chat/{}", request_id)).await?;
    resp.json()
        .await
        .context("Failed to parse chat history response")
}

/// Upload an attachment into a room. The server stores the file and returns
/// the resulting message, which callers merge like any pushed message.
pub async fn upload_attachment(
    client: &RefNetClient,
    request_id: &str,
    receiver: &str,
    file_path: &Path,
) -> Result<ChatMessage> {
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Attachment path has no usable file name")?
        .to_string();
    let bytes = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let form = reqwest::multipart::Form::new()
        .part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        )
        .text("requestId", request_id.to_string())
        .text("receiver", receiver.to_string());

    let resp = client.post_multipart("/api/chat/upload", form).await?;
    resp.json().await.context("Failed to parse upload response")
}

/// Print a room's history, grouped by calendar day (most recent `limit`
/// messages).
pub async fn history(request_id: &str, limit: usize) -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let mut messages = fetch_history(&client, request_id).await?;
    if messages.len() > limit {
        messages = messages.split_off(messages.len() - limit);
    }

    let mut store = MessageStore::new(request_id, user.id.clone());
    store.replace_all(messages);

    if store.is_empty() {
        println!("(no messages)");
        return Ok(());
    }

    for group in store.group_by_day() {
        println!();
        println!("{}", group.day);
        println!("{:-<60}", "");
        for msg in &group.messages {
            println!("{}", format_message_line(msg, &user.id));
        }
    }

    Ok(())
}

/// Upload an attachment and print the resulting message.
pub async fn upload(request_id: &str, receiver: &str, file_path: &Path) -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let msg = upload_attachment(&client, request_id, receiver, file_path).await?;
    println!("Attachment uploaded.");
    println!("{}", format_message_line(&msg, &user.id));
    Ok(())
}

/// One display line: `[HH:MM] sender: body`. Our own messages render as "me";
/// an unconfirmed optimistic entry is flagged as pending.
pub fn format_message_line(msg: &ChatMessage, current_user_id: &str) -> String {
    let time = msg
        .created_at
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    let who = if msg.sender == current_user_id {
        "me"
    } else {
        msg.sender.as_str()
    };
    let pending = if msg.is_confirmed() { "" } else { " (sending)" };
    format!("[{}] {}: {}{}", time, who, msg.body_line(), pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_line() {
        let msg = ChatMessage {
            id: Some("m1".into()),
            client_msg_id: None,
            sender: "u2".into(),
            text: Some("hello".into()),
            image: None,
            document: None,
            gif: None,
            created_at: Some("2026-08-01T09:05:00Z".parse().unwrap()),
        };
        assert_eq!(format_message_line(&msg, "u1"), "[09:05] u2: hello");
        assert_eq!(format_message_line(&msg, "u2"), "[09:05] me: hello");
    }

    #[test]
    fn test_format_pending_message() {
        let msg = ChatMessage {
            id: None,
            client_msg_id: Some("c1".into()),
            sender: "u1".into(),
            text: Some("hi".into()),
            image: None,
            document: None,
            gif: None,
            created_at: None,
        };
        assert_eq!(format_message_line(&msg, "u1"), "[--:--] me: hi (sending)");
    }
}
