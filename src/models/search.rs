use serde::{Deserialize, Serialize};

/// One recorded search, appended to the search log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub query: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    /// Local time the search ran, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

/// Compact message shape used in search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub message_id: String,
    pub conversation_id: Option<String>,
    pub author_role: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchHit {
    Conversation {
        conversation_id: String,
        title: String,
        content_snippet: String,
        timestamp: String,
    },
    Message {
        #[serde(rename = "match")]
        hit: MessageSummary,
        context: Vec<MessageSummary>,
    },
}

/// Row shown in the paginated conversation listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub title: String,
    pub create_time: String,
    pub update_time: String,
    pub message_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    pub total_records: usize,
    pub total_pages: usize,
}
