use rusqlite::{Connection, params};

use super::ArchiveError;
use crate::models::{ConversationRow, Feedback, MessageRow, ModelComparison};

/// Set the conversation reference of an orphaned message.
///
/// Returns `false` when nothing changed: the message does not exist or is already linked.
/// Existing links are never overwritten.
pub fn link_message(
    conn: &Connection,
    message_id: &str,
    conversation_id: &str,
) -> Result<bool, ArchiveError> {
    let changed = conn.execute(
        "UPDATE Messages SET conversation_id = ?1
         WHERE message_id = ?2 AND conversation_id IS NULL",
        params![conversation_id, message_id],
    )?;
    Ok(changed > 0)
}

/// Insert a conversation unless its id already exists. Returns whether a row was added.
pub fn insert_conversation(conn: &Connection, row: &ConversationRow) -> Result<bool, ArchiveError> {
    let added = conn.execute(
        "INSERT OR IGNORE INTO Conversations
         (conversation_id, title, create_time, update_time, conversation_data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.conversation_id,
            row.title,
            row.create_time,
            row.update_time,
            row.conversation_data
        ],
    )?;
    Ok(added > 0)
}

pub fn insert_message(conn: &Connection, row: &MessageRow) -> Result<bool, ArchiveError> {
    let added = conn.execute(
        "INSERT OR IGNORE INTO Messages
         (message_id, conversation_id, author_role, content, create_time, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.message_id,
            row.conversation_id,
            row.author_role,
            row.content,
            row.create_time,
            row.status
        ],
    )?;
    Ok(added > 0)
}

pub fn insert_feedback(conn: &Connection, feedback: &Feedback) -> Result<bool, ArchiveError> {
    let added = conn.execute(
        "INSERT OR IGNORE INTO Feedback (feedback_id, message_id, feedback_type, feedback_content)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            feedback.feedback_id,
            feedback.message_id,
            feedback.feedback_type,
            feedback.feedback_content
        ],
    )?;
    Ok(added > 0)
}

pub fn insert_model_comparison(
    conn: &Connection,
    comparison: &ModelComparison,
) -> Result<bool, ArchiveError> {
    let added = conn.execute(
        "INSERT OR IGNORE INTO ModelComparisons
         (comparison_id, message_id, model_name, response_time, comparison_data)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comparison.comparison_id,
            comparison.message_id,
            comparison.model_name,
            comparison.response_time,
            comparison.comparison_data
        ],
    )?;
    Ok(added > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Archive, reader};

    fn orphan(id: &str) -> MessageRow {
        MessageRow {
            message_id: id.to_string(),
            content: Some("hello".into()),
            create_time: Some(100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_message_only_touches_orphans() {
        let archive = Archive::open_in_memory().unwrap();
        let conn = archive.conn();
        insert_message(conn, &orphan("m1")).unwrap();

        assert!(link_message(conn, "m1", "c1").unwrap());
        // Second attempt must not overwrite the existing link
        assert!(!link_message(conn, "m1", "c2").unwrap());
        assert!(!link_message(conn, "missing", "c1").unwrap());

        let row = reader::get_message(conn, "m1").unwrap();
        assert_eq!(row.conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_inserts_ignore_duplicates() {
        let archive = Archive::open_in_memory().unwrap();
        let conn = archive.conn();
        let conversation = ConversationRow {
            conversation_id: "c1".into(),
            title: Some("First".into()),
            ..Default::default()
        };
        assert!(insert_conversation(conn, &conversation).unwrap());

        let renamed = ConversationRow { title: Some("Second".into()), ..conversation };
        assert!(!insert_conversation(conn, &renamed).unwrap());
        assert_eq!(reader::get_conversation(conn, "c1").unwrap().title.as_deref(), Some("First"));

        assert!(insert_message(conn, &orphan("m1")).unwrap());
        assert!(!insert_message(conn, &orphan("m1")).unwrap());
    }

    #[test]
    fn test_auxiliary_inserts() {
        let archive = Archive::open_in_memory().unwrap();
        let conn = archive.conn();
        let feedback = Feedback {
            feedback_id: "f1".into(),
            message_id: "m1".into(),
            feedback_type: Some("thumbs_down".into()),
            feedback_content: None,
        };
        let comparison = ModelComparison {
            comparison_id: "x1".into(),
            message_id: "m1".into(),
            model_name: Some("model-a".into()),
            response_time: Some("0.8".into()),
            comparison_data: None,
        };
        assert!(insert_feedback(conn, &feedback).unwrap());
        assert!(insert_model_comparison(conn, &comparison).unwrap());

        assert_eq!(reader::feedback_for_message(conn, "m1").unwrap(), vec![feedback]);
        assert_eq!(reader::comparisons_for_message(conn, "m1").unwrap(), vec![comparison]);
    }
}
