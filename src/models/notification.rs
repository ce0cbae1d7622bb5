//! Notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of notification kinds pushed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    RequestAccepted,
    RequestRejected,
    RequestReceived,
}

/// Display-only reference to the user who triggered a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderRef {
    pub name: Option<String>,
}

/// Back-reference to the referral request a notification belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRef {
    pub id: String,
}

/// A notification as returned by the REST snapshot or pushed over the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestRef>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    /// Sender display name with a placeholder when absent.
    pub fn sender_name(&self) -> &str {
        self.sender
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("Someone")
    }

    /// Human-readable summary line for terminal display.
    pub fn summary(&self) -> String {
        match self.kind {
            NotificationKind::Message => format!("{} sent you a message", self.sender_name()),
            NotificationKind::RequestAccepted => {
                format!("{} accepted your referral request", self.sender_name())
            }
            NotificationKind::RequestRejected => {
                format!("{} declined your referral request", self.sender_name())
            }
            NotificationKind::RequestReceived => {
                format!("{} sent you a referral request", self.sender_name())
            }
        }
    }
}
