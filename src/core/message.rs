use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One message in a session. Content grows in place while an assistant
/// reply is streaming; the backend serializes the creation time as
/// `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "message_id")]
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub sender: Sender,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new_user(session_id: String, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            content,
            sender: Sender::User,
            created_at: Utc::now(),
        }
    }

    /// Empty assistant placeholder, published before the first fragment
    /// arrives so the UI can render it immediately.
    pub fn new_assistant(session_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            content: String::new(),
            sender: Sender::Assistant,
            created_at: Utc::now(),
        }
    }
}
