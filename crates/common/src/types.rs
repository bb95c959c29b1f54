use serde::{Deserialize, Serialize};

/// A notification payload as emitted by the forum's notification system.
///
/// Field names follow the forum's wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification kind tag (e.g. "post_flag:12:uid:3"), used for filtering
    pub nid: Option<String>,
    /// Post the notification refers to
    pub pid: Option<i64>,
    /// Short title text, translated per recipient before delivery
    #[serde(rename = "bodyShort")]
    pub body_short: String,
    /// Long body text; may arrive HTML-escaped and tag-laden
    #[serde(rename = "bodyLong", default)]
    pub body_long: String,
    /// Explicit target path; overrides the composed topic permalink
    pub path: Option<String>,
}

/// An inbound notification event: one payload addressed to a set of recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub notification: Notification,
    pub uids: Vec<i64>,
}

/// Persisted Telegram channel configuration, stored under the
/// `telegrambot-token` key. Absence means the relay stays inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Bot API token used to establish the polling connection
    pub token: String,
    /// Onboarding reply template with a `{userid}` placeholder
    pub msg: Option<String>,
}

/// A forum user row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub uid: i64,
    pub username: String,
    /// Linked Telegram chat identifier; null until the user registers one
    pub telegram_id: Option<i64>,
    pub admin: bool,
}

/// Outcome of one recipient's delivery task, reported on the dispatch
/// result channel and consumed only for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Message handed to the outbound channel
    Sent { uid: i64 },
    /// Recipient has no linked Telegram id; the send step was skipped
    Skipped { uid: i64 },
    /// A pipeline step failed for this recipient
    Failed { uid: i64, reason: String },
}
