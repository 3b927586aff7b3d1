//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chat_archive_explorer::models::{ConversationRow, Feedback, MessageRow, ModelComparison};
use chat_archive_explorer::storage::{Archive, writer};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for an on-disk archive database inside a temp directory
pub struct ArchiveBuilder {
    temp_dir: TempDir,
    conversations: Vec<ConversationBuilder>,
    messages: Vec<MessageBuilder>,
    feedback: Vec<Feedback>,
    comparisons: Vec<ModelComparison>,
}

/// A built archive; the temp directory lives as long as this value
pub struct TestArchive {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl TestArchive {
    pub fn open(&self) -> Archive {
        Archive::open(&self.db_path).expect("Failed to open test archive")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            conversations: Vec::new(),
            messages: Vec::new(),
            feedback: Vec::new(),
            comparisons: Vec::new(),
        }
    }

    pub fn with_conversation(mut self, conversation: ConversationBuilder) -> Self {
        self.conversations.push(conversation);
        self
    }

    pub fn with_message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_feedback(mut self, feedback_id: &str, message_id: &str, kind: &str) -> Self {
        self.feedback.push(Feedback {
            feedback_id: feedback_id.to_string(),
            message_id: message_id.to_string(),
            feedback_type: Some(kind.to_string()),
            feedback_content: None,
        });
        self
    }

    pub fn with_comparison(mut self, comparison_id: &str, message_id: &str, model: &str) -> Self {
        self.comparisons.push(ModelComparison {
            comparison_id: comparison_id.to_string(),
            message_id: message_id.to_string(),
            model_name: Some(model.to_string()),
            response_time: Some("1.5".to_string()),
            comparison_data: None,
        });
        self
    }

    /// Write everything to `archive.db` and return the handle (consumes self)
    pub fn build(self) -> TestArchive {
        let db_path = self.temp_dir.path().join("archive.db");
        {
            let archive = Archive::open(&db_path).expect("Failed to create archive");
            let conn = archive.conn();
            for conversation in &self.conversations {
                writer::insert_conversation(conn, &conversation.to_row())
                    .expect("Failed to insert conversation");
            }
            for message in &self.messages {
                writer::insert_message(conn, &message.to_row()).expect("Failed to insert message");
            }
            for feedback in &self.feedback {
                writer::insert_feedback(conn, feedback).expect("Failed to insert feedback");
            }
            for comparison in &self.comparisons {
                writer::insert_model_comparison(conn, comparison)
                    .expect("Failed to insert comparison");
            }
        }
        TestArchive { temp_dir: self.temp_dir, db_path }
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for conversation rows, optionally carrying a tree payload
#[derive(Clone)]
pub struct ConversationBuilder {
    id: String,
    title: Option<String>,
    create_time: Option<f64>,
    payload: Option<String>,
}

impl ConversationBuilder {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), title: None, create_time: None, payload: None }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn created(mut self, epoch: f64) -> Self {
        self.create_time = Some(epoch);
        self
    }

    /// Raw payload text, valid or not
    pub fn payload(mut self, payload: &str) -> Self {
        self.payload = Some(payload.to_string());
        self
    }

    /// Payload document built from tree nodes
    pub fn tree(mut self, nodes: &[NodeBuilder]) -> Self {
        self.payload = Some(export_document(&self.id, self.title.as_deref(), nodes).to_string());
        self
    }

    pub fn to_row(&self) -> ConversationRow {
        ConversationRow {
            conversation_id: self.id.clone(),
            title: self.title.clone(),
            create_time: self.create_time,
            update_time: self.create_time,
            conversation_data: self.payload.clone(),
        }
    }
}

/// Builder for flat message rows
#[derive(Clone)]
pub struct MessageBuilder {
    id: String,
    conversation_id: Option<String>,
    role: String,
    content: String,
    create_time: Option<f64>,
}

impl MessageBuilder {
    /// Orphaned user message with default text
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            conversation_id: None,
            role: "user".to_string(),
            content: format!("Message {}", id),
            create_time: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = Some(conversation_id.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn created(mut self, epoch: f64) -> Self {
        self.create_time = Some(epoch);
        self
    }

    pub fn to_row(&self) -> MessageRow {
        MessageRow {
            message_id: self.id.clone(),
            conversation_id: self.conversation_id.clone(),
            author_role: Some(self.role.clone()),
            content: Some(self.content.clone()),
            create_time: self.create_time,
            status: Some("finished_successfully".to_string()),
        }
    }
}

/// Builder for a node of a conversation mapping
#[derive(Clone)]
pub struct NodeBuilder {
    id: String,
    message: Option<(String, String, Option<f64>)>,
    children: Vec<String>,
}

impl NodeBuilder {
    /// Node without a message payload
    pub fn structural(id: &str) -> Self {
        Self { id: id.to_string(), message: None, children: Vec::new() }
    }

    pub fn message(id: &str, role: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            message: Some((role.to_string(), text.to_string(), None)),
            children: Vec::new(),
        }
    }

    pub fn at(mut self, epoch: f64) -> Self {
        if let Some(message) = self.message.as_mut() {
            message.2 = Some(epoch);
        }
        self
    }

    pub fn children(mut self, children: &[&str]) -> Self {
        self.children = children.iter().map(|c| c.to_string()).collect();
        self
    }

    fn to_json(&self) -> Value {
        let message = match &self.message {
            Some((role, text, time)) => json!({
                "id": self.id,
                "author": {"role": role},
                "content": {"content_type": "text", "parts": [text]},
                "create_time": time,
                "status": "finished_successfully",
            }),
            None => Value::Null,
        };
        json!({"id": self.id, "message": message, "children": self.children})
    }
}

/// A ChatGPT-style export conversation object
pub fn export_document(id: &str, title: Option<&str>, nodes: &[NodeBuilder]) -> Value {
    let mut mapping = serde_json::Map::new();
    for node in nodes {
        mapping.insert(node.id.clone(), node.to_json());
    }
    json!({
        "id": id,
        "title": title,
        "create_time": 1_700_000_000.0,
        "update_time": 1_700_000_600.0,
        "mapping": mapping,
    })
}

/// Builder for an export folder as produced by a data export
pub struct ExportFolderBuilder {
    temp_dir: TempDir,
}

impl ExportFolderBuilder {
    pub fn new() -> Self {
        Self { temp_dir: TempDir::new().expect("Failed to create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `value` as JSON to `relative` (parent directories are created)
    pub fn with_file(self, relative: &str, value: &Value) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create export dir");
        }
        fs::write(&path, serde_json::to_string_pretty(value).unwrap())
            .expect("Failed to write export file");
        self
    }

    pub fn with_raw_file(self, relative: &str, contents: &str) -> Self {
        fs::write(self.temp_dir.path().join(relative), contents).expect("Failed to write file");
        self
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ExportFolderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Export folder with two conversations, standalone orphans and auxiliary records
pub fn realistic_export() -> TempDir {
    let planning = export_document(
        "conv-trip",
        Some("Trip planning"),
        &[
            NodeBuilder::structural("root").children(&["u1"]),
            NodeBuilder::message("u1", "user", "Where should we go in May?")
                .at(1_700_000_010.0)
                .children(&["a1", "a2"]),
            NodeBuilder::message("a1", "assistant", "Lisbon is lovely in May.").at(1_700_000_020.0),
            NodeBuilder::message("a2", "assistant", "Consider Porto as well.").at(1_700_000_030.0),
        ],
    );
    let budget = json!({
        "id": "conv-budget",
        "title": "Discussing the quarterly budget report",
        "create_time": 1_700_090_000.0,
        "update_time": 1_700_090_500.0,
        "mapping": {}
    });

    ExportFolderBuilder::new()
        .with_file("conversations.json", &json!([planning, budget]))
        .with_file(
            "extra/messages.json",
            &json!([
                {"message_id": "orphan-near", "role": "user", "content": "And hotels?",
                 "create_time": 1_700_000_300.0},
                {"message_id": "orphan-text", "role": "user",
                 "content": "quarterly budget report discussion", "create_time": 1_700_040_000.0},
                {"message_id": "orphan-lost", "role": "user",
                 "content": "zebra xylophone", "create_time": 1_600_000_000.0}
            ]),
        )
        .with_file(
            "message_feedback.json",
            &json!([{"feedback_id": "fb1", "message_id": "a1", "feedback_type": "thumbs_up",
                     "feedback_content": "Helpful"}]),
        )
        .with_file(
            "model_comparisons.json",
            &json!([{"comparison_id": "cmp1", "message_id": "a1", "model_name": "model-b",
                     "response_time": "2.1", "comparison_data": {"preferred": "a"}}]),
        )
        .build()
}
