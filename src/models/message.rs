//! Chat message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message within a referral-request room.
///
/// `id` is assigned by the server; a locally echoed message that has not been
/// confirmed yet carries `id: None` and a `client_msg_id` used to reconcile it
/// with the server copy if one arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<String>,
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gif: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// True once the server has assigned an id.
    pub fn is_confirmed(&self) -> bool {
        self.id.is_some()
    }

    /// One-line body for terminal display. Media variants render as a
    /// bracketed marker followed by the URL.
    pub fn body_line(&self) -> String {
        if let Some(ref text) = self.text {
            return text.clone();
        }
        if let Some(ref url) = self.image {
            return format!("[image] {}", url);
        }
        if let Some(ref url) = self.document {
            return format!("[document] {}", url);
        }
        if let Some(ref url) = self.gif {
            return format!("[gif] {}", url);
        }
        String::from("(empty message)")
    }
}
