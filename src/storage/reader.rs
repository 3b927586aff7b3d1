use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::ArchiveError;
use crate::models::{ConversationRow, Feedback, MessageRow, ModelComparison};
use crate::utils::AsEpoch;

const CONVERSATION_COLUMNS: &str =
    "conversation_id, title, create_time, update_time, conversation_data";
const MESSAGE_COLUMNS: &str =
    "message_id, conversation_id, author_role, content, create_time, status";

/// Messages are ordered by numeric creation time; rows without one come first
const MESSAGE_ORDER: &str = "ORDER BY CAST(create_time AS REAL) ASC, rowid ASC";

impl AsEpoch for Value {
    fn as_epoch(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => i.as_epoch(),
            Value::Real(f) => f.as_epoch(),
            Value::Text(s) => s.as_epoch(),
            Value::Null | Value::Blob(_) => None,
        }
    }
}

/// Filters for the paginated conversation listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationQuery {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Inclusive lower bound on the creation date (UTC)
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date (UTC)
    pub end_date: Option<NaiveDate>,
}

impl ConversationQuery {
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clause = String::from("WHERE 1=1");
        let mut values = Vec::new();

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            clause.push_str(" AND title LIKE ? ESCAPE '\\'");
            values.push(Value::Text(like_pattern(title)));
        }
        if let Some(start) = self.start_date {
            clause.push_str(" AND date(CAST(create_time AS REAL), 'unixepoch') >= ?");
            values.push(Value::Text(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            clause.push_str(" AND date(CAST(create_time AS REAL), 'unixepoch') <= ?");
            values.push(Value::Text(end.format("%Y-%m-%d").to_string()));
        }

        (clause, values)
    }
}

/// Substring LIKE pattern with `%`, `_` and `\` in the needle escaped
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn text_column(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get::<_, Value>(idx)? {
        Value::Null => None,
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

fn epoch_column(row: &Row, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(row.get::<_, Value>(idx)?.as_epoch())
}

fn row_to_conversation(row: &Row) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        conversation_id: text_column(row, 0)?.unwrap_or_default(),
        title: text_column(row, 1)?,
        create_time: epoch_column(row, 2)?,
        update_time: epoch_column(row, 3)?,
        conversation_data: text_column(row, 4)?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: text_column(row, 0)?.unwrap_or_default(),
        conversation_id: text_column(row, 1)?,
        author_role: text_column(row, 2)?,
        content: text_column(row, 3)?,
        create_time: epoch_column(row, 4)?,
        status: text_column(row, 5)?,
    })
}

pub fn get_conversation(conn: &Connection, id: &str) -> Result<ConversationRow, ArchiveError> {
    let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM Conversations WHERE conversation_id = ?1");
    conn.query_row(&sql, params![id], row_to_conversation)
        .optional()?
        .ok_or_else(|| ArchiveError::not_found("Conversation", id))
}

/// Messages linked to a conversation, oldest first
pub fn messages_for_conversation(
    conn: &Connection,
    conversation_id: &str,
) -> Result<Vec<MessageRow>, ArchiveError> {
    let sql =
        format!("SELECT {MESSAGE_COLUMNS} FROM Messages WHERE conversation_id = ?1 {MESSAGE_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![conversation_id], row_to_message)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Every conversation, as reconciliation candidates
pub fn all_conversations(conn: &Connection) -> Result<Vec<ConversationRow>, ArchiveError> {
    let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM Conversations ORDER BY conversation_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_conversation)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Messages with no conversation reference
pub fn orphaned_messages(conn: &Connection) -> Result<Vec<MessageRow>, ArchiveError> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM Messages WHERE conversation_id IS NULL ORDER BY rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_message)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn get_message(conn: &Connection, id: &str) -> Result<MessageRow, ArchiveError> {
    let sql = format!("SELECT {MESSAGE_COLUMNS} FROM Messages WHERE message_id = ?1");
    conn.query_row(&sql, params![id], row_to_message)
        .optional()?
        .ok_or_else(|| ArchiveError::not_found("Message", id))
}

pub fn feedback_for_message(
    conn: &Connection,
    message_id: &str,
) -> Result<Vec<Feedback>, ArchiveError> {
    let mut stmt = conn.prepare(
        "SELECT feedback_id, message_id, feedback_type, feedback_content
         FROM Feedback WHERE message_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map(params![message_id], |row| {
            Ok(Feedback {
                feedback_id: text_column(row, 0)?.unwrap_or_default(),
                message_id: text_column(row, 1)?.unwrap_or_default(),
                feedback_type: text_column(row, 2)?,
                feedback_content: text_column(row, 3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn comparisons_for_message(
    conn: &Connection,
    message_id: &str,
) -> Result<Vec<ModelComparison>, ArchiveError> {
    let mut stmt = conn.prepare(
        "SELECT comparison_id, message_id, model_name, response_time, comparison_data
         FROM ModelComparisons WHERE message_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map(params![message_id], |row| {
            Ok(ModelComparison {
                comparison_id: text_column(row, 0)?.unwrap_or_default(),
                message_id: text_column(row, 1)?.unwrap_or_default(),
                model_name: text_column(row, 2)?,
                response_time: text_column(row, 3)?,
                comparison_data: text_column(row, 4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn count_conversations(
    conn: &Connection,
    query: &ConversationQuery,
) -> Result<usize, ArchiveError> {
    let (clause, values) = query.where_clause();
    let sql = format!("SELECT COUNT(*) FROM Conversations {clause}");
    let count: i64 = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count as usize)
}

/// One page of conversations, newest first. Bounds beyond `i64::MAX` are clamped to it.
pub fn list_conversations(
    conn: &Connection,
    query: &ConversationQuery,
    limit: usize,
    offset: usize,
) -> Result<Vec<ConversationRow>, ArchiveError> {
    let (clause, mut values) = query.where_clause();
    let sql = format!(
        "SELECT {CONVERSATION_COLUMNS} FROM Conversations {clause}
         ORDER BY CAST(create_time AS REAL) DESC, conversation_id ASC
         LIMIT ? OFFSET ?"
    );
    // A negative LIMIT means "no limit" to SQLite
    values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), row_to_conversation)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn message_count(conn: &Connection, conversation_id: &str) -> Result<usize, ArchiveError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM Messages WHERE conversation_id = ?1",
        params![conversation_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Conversations whose title or payload contains `needle`
pub fn search_conversations(
    conn: &Connection,
    needle: &str,
) -> Result<Vec<ConversationRow>, ArchiveError> {
    let sql = format!(
        "SELECT {CONVERSATION_COLUMNS} FROM Conversations
         WHERE title LIKE ?1 ESCAPE '\\' OR conversation_data LIKE ?1 ESCAPE '\\'
         ORDER BY CAST(create_time AS REAL) DESC, conversation_id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![like_pattern(needle)], row_to_conversation)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Messages whose content contains `needle`
pub fn search_messages(conn: &Connection, needle: &str) -> Result<Vec<MessageRow>, ArchiveError> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM Messages WHERE content LIKE ?1 ESCAPE '\\' {MESSAGE_ORDER}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![like_pattern(needle)], row_to_message)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Row counts: (conversations, messages, orphaned messages)
pub fn table_counts(conn: &Connection) -> Result<(usize, usize, usize), ArchiveError> {
    let count = |sql: &str| -> Result<usize, ArchiveError> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    };
    Ok((
        count("SELECT COUNT(*) FROM Conversations")?,
        count("SELECT COUNT(*) FROM Messages")?,
        count("SELECT COUNT(*) FROM Messages WHERE conversation_id IS NULL")?,
    ))
}
