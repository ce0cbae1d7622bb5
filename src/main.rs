//! RefNet CLI - Lightweight referral-platform client
//!
//! A terminal client for the RefNet referral-matching platform: chat with
//! your referral counterpart, follow notifications, and stream realtime
//! events.

mod api;
mod auth;
mod channel;
mod config;
mod console;
mod models;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "refnet-cli")]
#[command(about = "Lightweight CLI client for the RefNet referral platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a platform-issued bearer token
    Login {
        /// Token issued by the RefNet web app (JWT)
        #[arg(short, long)]
        token: String,

        /// Override the platform base URL
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Log out and clear cached credentials
    Logout,

    /// Show current authentication status
    Status,

    /// Show current user info decoded from the stored token
    Whoami,

    /// Print a chat room's message history, grouped by day
    History {
        /// Referral-request id (identifies the room)
        request_id: String,

        /// Maximum number of messages to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Open an interactive chat session for a referral request
    Chat {
        /// Referral-request id (identifies the room)
        request_id: String,

        /// Counterpart user id messages are addressed to
        #[arg(short, long)]
        receiver: String,
    },

    /// Send a single message into a chat room
    Send {
        /// Referral-request id (identifies the room)
        #[arg(short, long)]
        to: String,

        /// Counterpart user id the message is addressed to
        #[arg(short, long)]
        receiver: String,

        /// Message content
        message: String,
    },

    /// Upload an attachment into a chat room
    Upload {
        /// Referral-request id (identifies the room)
        #[arg(short, long)]
        to: String,

        /// Counterpart user id the attachment is addressed to
        #[arg(short, long)]
        receiver: String,

        /// File to upload
        file: PathBuf,
    },

    /// List notifications and the unread count
    Notifications {
        /// Only show unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark one notification as read
    MarkRead {
        /// Notification id
        id: String,
    },

    /// Mark every notification as read
    MarkAllRead,

    /// Connect to the push channel and stream events
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Login { token, server } => {
            auth::login(&token, server.as_deref())?;
        }
        Commands::Logout => {
            auth::logout()?;
        }
        Commands::Status => {
            auth::status()?;
        }
        Commands::Whoami => {
            auth::whoami()?;
        }
        Commands::History { request_id, limit } => {
            api::history(&request_id, limit).await?;
        }
        Commands::Chat {
            request_id,
            receiver,
        } => {
            console::chat(&request_id, &receiver).await?;
        }
        Commands::Send {
            to,
            receiver,
            message,
        } => {
            tracing::info!("Sending message...");
            console::send_once(&to, &receiver, &message).await?;
        }
        Commands::Upload { to, receiver, file } => {
            tracing::info!("Uploading attachment...");
            api::upload(&to, &receiver, &file).await?;
        }
        Commands::Notifications { unread } => {
            api::list_notifications(unread).await?;
        }
        Commands::MarkRead { id } => {
            api::mark_read(&id).await?;
        }
        Commands::MarkAllRead => {
            api::mark_all_read().await?;
        }
        Commands::Watch => {
            console::watch().await?;
        }
    }

    Ok(())
}
