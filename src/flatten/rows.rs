use crate::models::{ConversationRow, ConversationView, MessageRow, MessageView};
use crate::utils::format_timestamp;

use super::display_title;

/// Build a view from a conversation row and its message rows
///
/// `messages` are expected in creation-time order, as returned by the archive reader. Each
/// row maps 1:1 to a top-level [`MessageView`] (depth 0); no tree is reconstructed.
pub fn flatten_rows(conversation: &ConversationRow, messages: &[MessageRow]) -> ConversationView {
    ConversationView {
        conversation_id: conversation.conversation_id.clone(),
        title: display_title(conversation.title.as_deref()),
        create_time: format_timestamp(&conversation.create_time),
        update_time: format_timestamp(&conversation.update_time),
        messages: messages.iter().map(MessageView::from_row).collect(),
    }
}
