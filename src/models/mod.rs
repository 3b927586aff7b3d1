//! Data models for the conversation archive.
//!
//! - [`ConversationRow`] / [`MessageRow`] - rows as stored in the archive database
//! - [`MessageView`] / [`ConversationView`] - display-ready records produced by the flattener
//! - [`Feedback`] / [`ModelComparison`] - auxiliary per-message records
//! - [`SearchHit`] / [`SearchLogEntry`] / [`Page`] - search and listing results

pub mod conversation;
pub mod feedback;
pub mod search;

pub use conversation::{
    CONTENT_UNAVAILABLE, ConversationRow, ConversationView, MessageRow, MessageView, NO_TITLE,
    UNKNOWN_ROLE,
};
pub use feedback::{Feedback, MessageDetail, ModelComparison};
pub use search::{ConversationSummary, MessageSummary, Page, SearchHit, SearchLogEntry};
