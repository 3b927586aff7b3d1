use rusqlite::Connection;

/// Archive tables. Timestamp columns are declared REAL but older archives stored numeric
/// text, so readers accept INTEGER, REAL and TEXT values.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Conversations (
        conversation_id TEXT PRIMARY KEY,
        title TEXT,
        create_time REAL,
        update_time REAL,
        conversation_data TEXT
    );

    CREATE TABLE IF NOT EXISTS Messages (
        message_id TEXT PRIMARY KEY,
        conversation_id TEXT,
        author_role TEXT,
        content TEXT,
        create_time REAL,
        status TEXT
    );

    CREATE TABLE IF NOT EXISTS Feedback (
        feedback_id TEXT PRIMARY KEY,
        message_id TEXT,
        feedback_type TEXT,
        feedback_content TEXT
    );

    CREATE TABLE IF NOT EXISTS ModelComparisons (
        comparison_id TEXT PRIMARY KEY,
        message_id TEXT,
        model_name TEXT,
        response_time TEXT,
        comparison_data TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_messages_conversation ON Messages(conversation_id);
    CREATE INDEX IF NOT EXISTS idx_feedback_message ON Feedback(message_id);
    CREATE INDEX IF NOT EXISTS idx_comparisons_message ON ModelComparisons(message_id);
";

/// Create all tables and indexes; safe to run on an existing archive
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
