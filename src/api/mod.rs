//! REST API client module for the RefNet platform

pub mod chat;
pub mod client;
pub mod notifications;

pub use client::RefNetClient;

use anyhow::Result;
use std::path::Path;

/// Print a room's message history, grouped by day
pub async fn history(request_id: &str, limit: usize) -> Result<()> {
    chat::history(request_id, limit).await
}

/// Upload a chat attachment into a room
pub async fn upload(request_id: &str, receiver: &str, file: &Path) -> Result<()> {
    chat::upload(request_id, receiver, file).await
}

/// Print the notification list and unread count
pub async fn list_notifications(unread_only: bool) -> Result<()> {
    notifications::list(unread_only).await
}

/// Mark one notification as read
pub async fn mark_read(id: &str) -> Result<()> {
    notifications::mark_one_read(id).await
}

/// Mark every notification as read
pub async fn mark_all_read() -> Result<()> {
    notifications::mark_everything_read().await
}
