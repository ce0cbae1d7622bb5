//! Interactive terminal surfaces: chat session, event watcher, one-shot send

use anyhow::{bail, Result};
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::{wrappers::LinesStream, StreamExt};
use uuid::Uuid;

use crate::api::{chat as chat_api, RefNetClient};
use crate::channel::websocket::{ws_url, PushSocket};
use crate::channel::{Channel, ClientEvent, SendMessage, ServerEvent};
use crate::store::{navigation_target, MessageStore, NotificationStore};

/// Interactive chat session for one referral-request room.
///
/// Loads history, joins the room on the push channel, then multiplexes stdin
/// lines (sends) with pushed events until Ctrl-C or EOF.
pub async fn chat(request_id: &str, receiver: &str) -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let mut store = MessageStore::new(request_id, user.id.clone());
    store.load(&client).await?;
    tracing::debug!("Loaded {} messages for room {}", store.len(), request_id);

    for group in store.group_by_day() {
        println!();
        println!("{}", group.day);
        println!("{:-<60}", "");
        for msg in &group.messages {
            println!("{}", chat_api::format_message_line(msg, &user.id));
        }
    }

    let channel = Channel::connect(&client.server_url(), client.token());
    channel.join_room(store.request_id());
    let mut events = channel.subscribe();

    println!();
    println!(
        "Joined room {}. Type a message and press Enter (Ctrl-C to leave).",
        request_id
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = LinesStream::new(stdin.lines());

    loop {
        tokio::select! {
            line = lines.next() => {
                match line {
                    Some(Ok(text)) => {
                        if store.send(&channel, receiver, &text) {
                            if let Some(msg) = store.messages().last() {
                                println!("{}", chat_api::format_message_line(msg, &user.id));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!("stdin read error: {:#}", e);
                        break;
                    }
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(ServerEvent::ReceiveMessage(msg)) => {
                        if store.append_if_new(msg) {
                            if let Some(msg) = store.messages().last() {
                                println!("{}", chat_api::format_message_line(msg, &user.id));
                            }
                        }
                    }
                    Ok(ServerEvent::NewNotification(n)) => {
                        tracing::info!("Notification: {}", n.summary());
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Dropped {} push events (slow consumer)", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Leaving chat.");
                break;
            }
        }
    }

    Ok(())
}

/// Stream push events to stdout until Ctrl-C.
///
/// Keeps a notification store so the running unread count stays accurate and
/// duplicate pushes are suppressed.
pub async fn watch() -> Result<()> {
    let client = RefNetClient::new()?;
    let user = client.current_user()?;

    let mut store = NotificationStore::new();
    if let Err(e) = store.load(&client).await {
        tracing::warn!("Could not load notification snapshot: {:#}", e);
    }
    println!("{} unread notification(s)", store.unread_count());

    let channel = Channel::connect(&client.server_url(), client.token());
    let mut events = channel.subscribe();

    println!("Listening for events... (Ctrl-C to stop)");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(ServerEvent::NewNotification(n)) => {
                        if store.on_push(n.clone()) {
                            let target = navigation_target(&n, user.role);
                            match target.open_chat_for_request {
                                Some(ref room) => println!(
                                    "[NOTIF] {} (chat {}, {} unread)",
                                    n.summary(),
                                    room,
                                    store.unread_count()
                                ),
                                None => println!(
                                    "[NOTIF] {} ({} unread)",
                                    n.summary(),
                                    store.unread_count()
                                ),
                            }
                        }
                    }
                    Ok(ServerEvent::ReceiveMessage(msg)) => {
                        println!("[MSG] {}", chat_api::format_message_line(&msg, &user.id));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Dropped {} push events (slow consumer)", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down...");
                break;
            }
        }
    }

    Ok(())
}

/// One-shot send: open a socket, emit the event, wait for the flush, exit.
///
/// Uses the socket directly rather than the channel handle so the process
/// cannot exit before the frame is written.
pub async fn send_once(request_id: &str, receiver: &str, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Refusing to send an empty message");
    }

    let client = RefNetClient::new()?;
    let epid = Uuid::new_v4();
    let url = ws_url(&client.server_url(), client.token(), &epid);
    let mut socket = PushSocket::connect(&url).await?;

    let event = ClientEvent::SendMessage(SendMessage {
        request_id: request_id.to_string(),
        receiver: receiver.to_string(),
        text: text.to_string(),
        client_msg_id: Uuid::new_v4().to_string(),
    });
    socket.send_text(&serde_json::to_string(&event)?).await?;

    println!("Message sent.");
    Ok(())
}
