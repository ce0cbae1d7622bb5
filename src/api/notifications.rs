//! Notification REST endpoints and CLI commands

use anyhow::{Context, Result};

use super::client::RefNetClient;
use crate::models::Notification;
use crate::store::{navigation_target, NotificationStore};

/// Fetch the full notification snapshot for the authenticated user.
pub async fn fetch_notifications(client: &RefNetClient) -> Result<Vec<Notification>> {
    let resp = client.get("/api/notifications").await?;
    resp.json()
        .await
        .context("Failed to parse notifications response")
}

/// Mark one notification read server-side.
pub async fn mark_read(client: &RefNetClient, id: &str) -> Result<()> {
    client
        .patch(&format!("/api/notifications/{}/read", id))
        .await?;
    Ok(())
}

/// Mark every notification read server-side in one call.
pub async fn mark_all_read(client: &RefNetClient) -> Result<()> {
    client.patch("/api/notifications/mark-all-read").await?;
    Ok(())
}

/// Print the notification list with unread count; `unread_only` filters the
/// output, not the store.
pub async fn list(unread_only: bool) -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let mut store = NotificationStore::new();
    store.load(&client).await?;

    let shown: Vec<_> = store
        .notifications()
        .iter()
        .filter(|n| !unread_only || !n.is_read)
        .collect();

    if shown.is_empty() {
        println!(
            "(no {}notifications)",
            if unread_only { "unread " } else { "" }
        );
        return Ok(());
    }

    println!();
    for &n in &shown {
        let marker = if n.is_read { " " } else { "*" };
        let target = navigation_target(n, user.role);
        let mut line = format!(
            "{} {}  {}  {}",
            marker,
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.id,
            n.summary()
        );
        if let Some(ref request_id) = target.open_chat_for_request {
            line.push_str(&format!("  (chat: {})", request_id));
        }
        println!("{}", line);
    }
    println!();
    println!("{} unread", store.unread_count());

    Ok(())
}

/// Mark one notification read (optimistic local flip + REST call) and show
/// where a click on it would navigate.
pub async fn mark_one_read(id: &str) -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let mut store = NotificationStore::new();
    store.load(&client).await?;

    match store.click(&client, id, user.role).await? {
        Some(target) => {
            println!("Marked {} as read.", id);
            match target.open_chat_for_request {
                Some(request_id) => {
                    println!("Opens: {} (chat {})", target.route, request_id)
                }
                None => println!("Opens: {}", target.route),
            }
        }
        None => println!("No notification with id {}.", id),
    }

    println!("{} unread", store.unread_count());
    Ok(())
}

/// Mark everything read.
pub async fn mark_everything_read() -> Result<()> {
    let client = RefNetClient::new()?;

    let mut store = NotificationStore::new();
    store.load(&client).await?;
    store.mark_all_read(&client).await?;

    println!("All notifications marked as read.");
    Ok(())
}
