//! Conversation flattening: turns either source of a conversation into a [`ConversationView`].
//!
//! Two sources exist in archives built over time:
//!
//! - **Tree payloads**: the conversation row carries the exported document with its node
//!   mapping. [`flatten_payload`] decodes it and walks the tree ([`tree::flatten_mapping`]).
//! - **Flat rows**: messages live in the `Messages` table keyed by conversation id.
//!   [`flatten_rows`] maps them one-to-one.
//!
//! Both produce the same [`MessageView`](crate::models::MessageView) fields, so callers do
//! not care which source a conversation came from.

pub mod rows;
pub mod tree;

pub use rows::flatten_rows;
pub use tree::{flatten_mapping, message_rows};

use crate::models::{ConversationView, NO_TITLE};
use crate::parsers::ConversationDocument;
use crate::utils::format_timestamp;

/// Flatten a decoded document
pub fn flatten_document(conversation_id: &str, document: &ConversationDocument) -> ConversationView {
    ConversationView {
        conversation_id: conversation_id.to_string(),
        title: display_title(document.title.as_deref()),
        create_time: format_timestamp(&document.create_time),
        update_time: format_timestamp(&document.update_time),
        messages: flatten_mapping(&document.mapping),
    }
}

/// Decode and flatten a serialized payload.
///
/// Never fails: a payload that is not a JSON object produces title `"No Title"`, times
/// `"N/A"` and no messages, with a warning logged for `conversation_id`.
///
/// # Examples
///
/// ```
/// use chat_archive_explorer::flatten::flatten_payload;
///
/// let view = flatten_payload("c1", "definitely not json");
/// assert_eq!(view.title, "No Title");
/// assert!(view.messages.is_empty());
/// ```
pub fn flatten_payload(conversation_id: &str, payload: &str) -> ConversationView {
    let document = ConversationDocument::decode(payload, conversation_id);
    flatten_document(conversation_id, &document)
}

pub(crate) fn display_title(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NO_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::utils::NOT_AVAILABLE;

    /// Log sink shared between the subscriber and the assertions
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn flatten_with_logs(conversation_id: &str, payload: &str) -> (ConversationView, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let view = tracing::subscriber::with_default(subscriber, || {
            flatten_payload(conversation_id, payload)
        });
        (view, logs.text())
    }

    #[test]
    fn test_malformed_payload_is_logged_but_empty_one_is_not() {
        let (broken, logs) = flatten_with_logs("conv-broken", "{not json");
        assert!(broken.messages.is_empty());
        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("Malformed conversation payload"), "logs: {logs}");
        assert!(logs.contains("conv-broken"), "logs: {logs}");

        let (empty, logs) = flatten_with_logs("conv-empty", "{}");
        assert!(empty.messages.is_empty());
        assert_eq!(empty.title, broken.title);
        assert!(!logs.contains("WARN"), "logs: {logs}");
        assert!(!logs.contains("conv-empty"), "logs: {logs}");
    }

    #[test]
    fn test_invalid_payload_degrades_to_placeholders() {
        let view = flatten_payload("c1", "<html>not a document</html>");
        assert_eq!(view.conversation_id, "c1");
        assert_eq!(view.title, NO_TITLE);
        assert_eq!(view.create_time, NOT_AVAILABLE);
        assert_eq!(view.update_time, NOT_AVAILABLE);
        assert!(view.messages.is_empty());
    }

    #[test]
    fn test_payload_flattened_with_metadata() {
        let payload = r#"{
            "title": "Trip planning",
            "create_time": 1700000000,
            "update_time": 1700000500,
            "mapping": {
                "root": {"message": null, "children": ["u"]},
                "u": {"message": {"id": "u", "author": {"role": "user"},
                      "content": {"parts": ["Where to?"]}, "create_time": 1700000001},
                      "children": ["a"]},
                "a": {"message": {"id": "a", "author": {"role": "assistant"},
                      "content": {"parts": ["Lisbon."]}, "create_time": 1700000002},
                      "children": []}
            }
        }"#;

        let view = flatten_payload("c9", payload);
        assert_eq!(view.title, "Trip planning");
        assert_ne!(view.create_time, NOT_AVAILABLE);
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[0].content, "Where to?");
        assert_eq!(view.messages[1].author_role, "assistant");
    }

    #[test]
    fn test_empty_document_is_valid() {
        let view = flatten_payload("c1", "{}");
        assert_eq!(view.title, NO_TITLE);
        assert!(view.messages.is_empty());
    }

    #[test]
    fn test_display_title() {
        assert_eq!(display_title(Some("x")), "x");
        assert_eq!(display_title(Some("")), NO_TITLE);
        assert_eq!(display_title(None), NO_TITLE);
    }
}
