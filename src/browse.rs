//! Read-only views over the archive: listing, conversation and message detail, statistics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::flatten::{display_title, flatten_payload, flatten_rows};
use crate::models::{ConversationSummary, ConversationView, MessageDetail, MessageView, Page};
use crate::storage::{Archive, ArchiveError, ConversationQuery, reader};
use crate::utils::format_timestamp;

pub const DEFAULT_PER_PAGE: usize = 20;

/// Parse a `YYYY-MM-DD` filter date
pub fn parse_date(value: &str) -> Result<NaiveDate, ArchiveError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ArchiveError::InvalidDate { value: value.to_string() })
}

/// Like [`parse_date`], treating a missing or blank value as no filter
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, ArchiveError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

/// Build the display view of one conversation.
///
/// Conversations carrying a serialized document are flattened from it; the rest are built
/// from their rows in the `Messages` table.
pub fn load_conversation_view(
    archive: &Archive,
    conversation_id: &str,
) -> Result<ConversationView, ArchiveError> {
    let row = reader::get_conversation(archive.conn(), conversation_id)?;

    if let Some(payload) = row.conversation_data.as_deref().filter(|_| row.has_payload()) {
        tracing::debug!(conversation_id, "Flattening conversation from payload");
        let mut view = flatten_payload(conversation_id, payload);
        // Row metadata wins over whatever the payload carried
        if row.title.as_deref().is_some_and(|t| !t.is_empty()) {
            view.title = display_title(row.title.as_deref());
        }
        if row.create_time.is_some() {
            view.create_time = format_timestamp(&row.create_time);
        }
        if row.update_time.is_some() {
            view.update_time = format_timestamp(&row.update_time);
        }
        return Ok(view);
    }

    let messages = reader::messages_for_conversation(archive.conn(), conversation_id)?;
    Ok(flatten_rows(&row, &messages))
}

/// One page of conversations matching `query`, newest first. `page` is 1-based.
pub fn list_conversations(
    archive: &Archive,
    query: &ConversationQuery,
    page: usize,
    per_page: usize,
) -> Result<Page<ConversationSummary>, ArchiveError> {
    let page = page.max(1);
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };

    let total_records = reader::count_conversations(archive.conn(), query)?;
    // An offset past usize::MAX is past the last record too
    let rows = match (page - 1).checked_mul(per_page) {
        Some(offset) => reader::list_conversations(archive.conn(), query, per_page, offset)?,
        None => Vec::new(),
    };

    let items = rows
        .into_iter()
        .map(|row| {
            let message_count = reader::message_count(archive.conn(), &row.conversation_id)?;
            Ok(ConversationSummary {
                title: display_title(row.title.as_deref()),
                create_time: format_timestamp(&row.create_time),
                update_time: format_timestamp(&row.update_time),
                conversation_id: row.conversation_id,
                message_count,
            })
        })
        .collect::<Result<Vec<_>, ArchiveError>>()?;

    Ok(Page { items, page, per_page, total_records, total_pages: total_records.div_ceil(per_page) })
}

/// A message with its feedback and model comparisons
pub fn message_detail(archive: &Archive, message_id: &str) -> Result<MessageDetail, ArchiveError> {
    let row = reader::get_message(archive.conn(), message_id)?;
    Ok(MessageDetail {
        message: MessageView::from_row(&row),
        feedback: reader::feedback_for_message(archive.conn(), message_id)?,
        model_comparisons: reader::comparisons_for_message(archive.conn(), message_id)?,
        conversation_id: row.conversation_id,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveStats {
    pub conversations: usize,
    pub messages: usize,
    pub orphaned_messages: usize,
}

pub fn archive_stats(archive: &Archive) -> Result<ArchiveStats, ArchiveError> {
    let (conversations, messages, orphaned_messages) = reader::table_counts(archive.conn())?;
    Ok(ArchiveStats { conversations, messages, orphaned_messages })
}
