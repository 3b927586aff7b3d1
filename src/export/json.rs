use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::ConversationView;

#[derive(Debug, Serialize)]
struct ExportedMessage<'a> {
    message_id: &'a str,
    author_role: &'a str,
    content: &'a str,
    timestamp: &'a str,
}

#[derive(Debug, Serialize)]
struct ExportedConversation<'a> {
    conversation_id: &'a str,
    title: &'a str,
    create_time: &'a str,
    update_time: &'a str,
    messages: Vec<ExportedMessage<'a>>,
}

/// Pretty-printed JSON document of a conversation
pub fn render_json(view: &ConversationView) -> Result<String> {
    let document = ExportedConversation {
        conversation_id: &view.conversation_id,
        title: &view.title,
        create_time: &view.create_time,
        update_time: &view.update_time,
        messages: view
            .messages
            .iter()
            .map(|m| ExportedMessage {
                message_id: &m.message_id,
                author_role: &m.author_role,
                content: &m.content,
                timestamp: &m.timestamp,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize conversation export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageView;

    #[test]
    fn test_json_export_shape() {
        let view = ConversationView {
            conversation_id: "c1".into(),
            title: "Notes".into(),
            create_time: "N/A".into(),
            update_time: "N/A".into(),
            messages: vec![MessageView::new("m1".into(), None, "hi".into(), None, None, 3)],
        };

        let json: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();
        assert_eq!(json["conversation_id"], "c1");
        assert_eq!(json["messages"][0]["author_role"], "unknown");
        assert_eq!(json["messages"][0]["timestamp"], "N/A");
        // depth and raw times are display concerns, not part of the document
        assert!(json["messages"][0].get("depth").is_none());
    }
}
