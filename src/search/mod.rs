//! Text search over the archive, plus the append-only search log.
//!
//! Matching is a case-insensitive substring test (SQLite `LIKE`, ASCII case folding).
//! Conversations match on title or serialized payload; messages match on content and
//! come back with up to [`CONTEXT_RANGE`] neighbouring messages on each side.

pub mod log;

use std::collections::HashMap;

pub use log::{DEFAULT_RECENT_LIMIT, log_search, recent_searches};

use crate::flatten::display_title;
use crate::models::{MessageRow, MessageSummary, MessageView, SearchHit};
use crate::storage::{Archive, ArchiveError, reader};
use crate::utils::format_timestamp;

/// Neighbouring messages shown on each side of a message hit
pub const CONTEXT_RANGE: usize = 2;

/// Characters kept on each side of the match in a conversation snippet
const SNIPPET_RADIUS: usize = 40;

/// Conversation hits first (newest first), then message hits in creation order
pub fn search(archive: &Archive, query: &str) -> Result<Vec<SearchHit>, ArchiveError> {
    let needle = query.trim();
    if needle.is_empty() {
        return Err(ArchiveError::EmptyQuery);
    }

    let mut hits = Vec::new();

    for row in reader::search_conversations(archive.conn(), needle)? {
        let title = display_title(row.title.as_deref());
        let content_snippet = row
            .title
            .as_deref()
            .and_then(|t| snippet(t, needle))
            .or_else(|| row.conversation_data.as_deref().and_then(|d| snippet(d, needle)))
            .unwrap_or_else(|| needle.to_string());
        hits.push(SearchHit::Conversation {
            conversation_id: row.conversation_id,
            title,
            content_snippet,
            timestamp: format_timestamp(&row.create_time),
        });
    }

    let mut threads: HashMap<String, Vec<MessageRow>> = HashMap::new();
    for row in reader::search_messages(archive.conn(), needle)? {
        let context = match row.conversation_id.as_deref() {
            Some(conversation_id) => {
                if !threads.contains_key(conversation_id) {
                    let thread = reader::messages_for_conversation(archive.conn(), conversation_id)?;
                    threads.insert(conversation_id.to_string(), thread);
                }
                threads
                    .get(conversation_id)
                    .map(|thread| context_around(thread, &row.message_id))
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };
        hits.push(SearchHit::Message { hit: summarize(&row), context });
    }

    tracing::debug!(query = needle, hits = hits.len(), "Search finished");
    Ok(hits)
}

fn summarize(row: &MessageRow) -> MessageSummary {
    let view = MessageView::from_row(row);
    MessageSummary {
        message_id: view.message_id,
        conversation_id: row.conversation_id.clone(),
        author_role: view.author_role,
        content: view.content,
        timestamp: view.timestamp,
    }
}

/// `message_id` with up to `CONTEXT_RANGE` messages on each side, in thread order
fn context_around(thread: &[MessageRow], message_id: &str) -> Vec<MessageSummary> {
    let Some(pos) = thread.iter().position(|m| m.message_id == message_id) else {
        return Vec::new();
    };
    let start = pos.saturating_sub(CONTEXT_RANGE);
    let end = (pos + CONTEXT_RANGE + 1).min(thread.len());

    thread[start..end].iter().map(summarize).collect()
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        haystack
            .get(i..i + needle.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}

/// A single-line excerpt around the first occurrence of `needle`
fn snippet(text: &str, needle: &str) -> Option<String> {
    let pos = find_ignore_ascii_case(text, needle)?;
    let match_end = pos + needle.len();

    let start = text[..pos]
        .char_indices()
        .rev()
        .take(SNIPPET_RADIUS)
        .last()
        .map_or(pos, |(i, _)| i);
    let end = text[match_end..]
        .char_indices()
        .nth(SNIPPET_RADIUS)
        .map_or(text.len(), |(i, _)| match_end + i);

    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push_str("...");
    }
    excerpt.extend(text[start..end].chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
    if end < text.len() {
        excerpt.push_str("...");
    }
    Some(excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationRow;
    use crate::storage::writer;

    fn message(id: &str, conversation: Option<&str>, content: &str, time: f64) -> MessageRow {
        MessageRow {
            message_id: id.into(),
            conversation_id: conversation.map(String::from),
            author_role: Some("user".into()),
            content: Some(content.into()),
            create_time: Some(time),
            status: None,
        }
    }

    fn seeded() -> Archive {
        let archive = Archive::open_in_memory().unwrap();
        let conn = archive.conn();
        writer::insert_conversation(
            conn,
            &ConversationRow {
                conversation_id: "c1".into(),
                title: Some("Quarterly Budget".into()),
                create_time: Some(1000.0),
                ..Default::default()
            },
        )
        .unwrap();
        for (i, content) in ["one", "two", "the budget line", "four", "five", "six"].iter().enumerate()
        {
            writer::insert_message(conn, &message(&format!("m{i}"), Some("c1"), content, i as f64))
                .unwrap();
        }
        writer::insert_message(conn, &message("lost", None, "stray budget note", 99.0)).unwrap();
        archive
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let archive = seeded();
        assert!(matches!(search(&archive, "   "), Err(ArchiveError::EmptyQuery)));
    }

    #[test]
    fn test_hits_with_context() {
        let archive = seeded();
        let hits = search(&archive, "BUDGET").unwrap();
        assert_eq!(hits.len(), 3);

        match &hits[0] {
            SearchHit::Conversation { conversation_id, title, content_snippet, .. } => {
                assert_eq!(conversation_id, "c1");
                assert_eq!(title, "Quarterly Budget");
                assert_eq!(content_snippet, "Quarterly Budget");
            }
            other => panic!("expected conversation hit, got {other:?}"),
        }

        match &hits[1] {
            SearchHit::Message { hit, context } => {
                assert_eq!(hit.message_id, "m2");
                let ids: Vec<&str> = context.iter().map(|m| m.message_id.as_str()).collect();
                assert_eq!(ids, vec!["m0", "m1", "m2", "m3", "m4"]);
            }
            other => panic!("expected message hit, got {other:?}"),
        }

        match &hits[2] {
            SearchHit::Message { hit, context } => {
                assert_eq!(hit.message_id, "lost");
                assert!(hit.conversation_id.is_none());
                assert!(context.is_empty());
            }
            other => panic!("expected message hit, got {other:?}"),
        }
    }

    #[test]
    fn test_context_at_thread_edges() {
        let thread: Vec<MessageRow> =
            (0..3).map(|i| message(&format!("m{i}"), Some("c"), "x", i as f64)).collect();
        let ids = |v: Vec<MessageSummary>| v.into_iter().map(|m| m.message_id).collect::<Vec<_>>();
        assert_eq!(ids(context_around(&thread, "m0")), vec!["m0", "m1", "m2"]);
        assert_eq!(ids(context_around(&thread, "m2")), vec!["m0", "m1", "m2"]);
        assert!(context_around(&thread, "missing").is_empty());
    }

    #[test]
    fn test_snippet_windows() {
        assert_eq!(snippet("Budget", "budget").as_deref(), Some("Budget"));
        assert_eq!(snippet("abc", "zzz"), None);

        let long = format!("{}needle{}", "a".repeat(100), "b\n".repeat(50));
        let excerpt = snippet(&long, "NEEDLE").unwrap();
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains("needle"));
        assert!(!excerpt.contains('\n'));
    }

    #[test]
    fn test_find_respects_char_boundaries() {
        assert_eq!(find_ignore_ascii_case("héllo wörld", "WÖ"), None);
        assert_eq!(find_ignore_ascii_case("héllo world", "WORLD"), Some(7));
    }
}
