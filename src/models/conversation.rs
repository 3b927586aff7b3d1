use serde::{Deserialize, Serialize};

use crate::utils::format_timestamp;

/// Title shown for conversations without one
pub const NO_TITLE: &str = "No Title";
/// Author role used when a message carries none
pub const UNKNOWN_ROLE: &str = "unknown";
/// Content shown for messages with no displayable text
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable";

/// A row of the `Conversations` table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationRow {
    pub conversation_id: String,
    pub title: Option<String>,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    /// Serialized conversation document (tree form), when the import kept one
    pub conversation_data: Option<String>,
}

impl ConversationRow {
    /// Whether this conversation carries an embedded tree payload
    pub fn has_payload(&self) -> bool {
        self.conversation_data.as_deref().is_some_and(|data| !data.trim().is_empty())
    }
}

/// A row of the `Messages` table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageRow {
    pub message_id: String,
    /// `None` while the message is orphaned
    pub conversation_id: Option<String>,
    pub author_role: Option<String>,
    pub content: Option<String>,
    pub create_time: Option<f64>,
    pub status: Option<String>,
}

/// Display-ready message, identical for tree and row sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: String,
    pub author_role: String,
    pub content: String,
    /// Raw epoch seconds, used for ordering
    pub create_time: Option<f64>,
    /// `create_time` rendered for display
    pub timestamp: String,
    pub status: Option<String>,
    /// Distance from the tree roots, used only for indentation
    pub depth: usize,
}

impl MessageView {
    /// Build a view applying the placeholder defaults for role and content
    pub fn new(
        message_id: String,
        author_role: Option<&str>,
        content: String,
        create_time: Option<f64>,
        status: Option<String>,
        depth: usize,
    ) -> Self {
        let author_role = match author_role {
            Some(role) if !role.is_empty() => role.to_string(),
            _ => UNKNOWN_ROLE.to_string(),
        };
        let content = if content.is_empty() { CONTENT_UNAVAILABLE.to_string() } else { content };

        Self {
            message_id,
            author_role,
            content,
            timestamp: format_timestamp(&create_time),
            create_time,
            status,
            depth,
        }
    }

    /// Map a flat message row (always top-level)
    pub fn from_row(row: &MessageRow) -> Self {
        Self::new(
            row.message_id.clone(),
            row.author_role.as_deref(),
            row.content.clone().unwrap_or_default(),
            row.create_time,
            row.status.clone(),
            0,
        )
    }

    /// Sort key: missing timestamps sort first
    pub fn sort_time(&self) -> f64 {
        self.create_time.unwrap_or(0.0)
    }
}

/// A conversation ready for display or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationView {
    pub conversation_id: String,
    pub title: String,
    pub create_time: String,
    pub update_time: String,
    pub messages: Vec<MessageView>,
}
