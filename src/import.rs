//! Loading ChatGPT-style export folders into the archive.
//!
//! Every folder is walked recursively and the files below are recognised by name:
//!
//! - `conversations.json`: conversation documents; each becomes a `Conversations` row
//!   (payload kept verbatim) and its tree messages become `Messages` rows
//! - `messages.json`: standalone message rows, possibly without a conversation
//! - `message_feedback.json` and `model_comparisons.json`: auxiliary rows
//!
//! A file holds either an array of objects or a single object. Rows are inserted with
//! `INSERT OR IGNORE`, so importing the same export twice changes nothing, and each file
//! loads inside one transaction.
//!
//! # Error Handling
//!
//! Files that cannot be read or parsed are skipped with a warning and counted in the
//! [`ImportReport`]; so are items that are not JSON objects. Database errors abort the
//! import.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::flatten::{message_rows, tree::join_content_parts};
use crate::models::{ConversationRow, Feedback, MessageRow, ModelComparison};
use crate::parsers::ConversationDocument;
use crate::parsers::deserializers::{deserialize_epoch, deserialize_text};
use crate::storage::{Archive, writer};
use crate::utils::safe_open_file;

/// Upper bound on recognised files per import, against runaway directory trees
const MAX_IMPORT_FILES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ExportFile {
    Conversations,
    Messages,
    Feedback,
    ModelComparisons,
}

impl ExportFile {
    fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "conversations.json" => Some(Self::Conversations),
            "messages.json" => Some(Self::Messages),
            "message_feedback.json" => Some(Self::Feedback),
            "model_comparisons.json" => Some(Self::ModelComparisons),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub items_skipped: usize,
    pub conversations: usize,
    pub messages: usize,
    pub feedback: usize,
    pub model_comparisons: usize,
}

#[derive(Debug, Deserialize)]
struct MessageRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    message_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    conversation_id: Option<String>,
    #[serde(default, alias = "role", deserialize_with = "deserialize_text")]
    author_role: Option<String>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default, alias = "timestamp", deserialize_with = "deserialize_epoch")]
    create_time: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_text")]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedbackRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    feedback_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    message_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    feedback_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    feedback_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComparisonRecord {
    #[serde(default, deserialize_with = "deserialize_text")]
    comparison_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    message_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    model_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    response_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    comparison_data: Option<String>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Import every recognised file below `folders`
pub fn import_folders(archive: &mut Archive, folders: &[PathBuf]) -> Result<ImportReport> {
    let files = discover_files(folders)?;
    let mut report = ImportReport::default();

    for (kind, path) in files {
        let items = match read_items(&path) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "Skipping export file");
                report.files_skipped += 1;
                continue;
            }
        };

        let tx = archive.conn_mut().transaction().context("Failed to start import transaction")?;
        for item in &items {
            let loaded = match kind {
                ExportFile::Conversations => load_conversation(&tx, item, &mut report),
                ExportFile::Messages => load_message(&tx, item, &mut report),
                ExportFile::Feedback => load_feedback(&tx, item, &mut report),
                ExportFile::ModelComparisons => load_comparison(&tx, item, &mut report),
            }
            .with_context(|| format!("Failed to import {}", path.display()))?;
            if !loaded {
                report.items_skipped += 1;
            }
        }
        tx.commit().with_context(|| format!("Failed to commit {}", path.display()))?;

        tracing::info!(path = %path.display(), items = items.len(), "Imported export file");
        report.files_loaded += 1;
    }

    Ok(report)
}

/// Recognised files, conversations first so their embedded messages win over duplicates
fn discover_files(folders: &[PathBuf]) -> Result<Vec<(ExportFile, PathBuf)>> {
    let mut files = Vec::new();

    for folder in folders {
        if !folder.is_dir() {
            bail!("Import folder not found: {}", folder.display());
        }

        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(folder = %folder.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(kind) = entry.file_name().to_str().and_then(ExportFile::from_file_name) else {
                continue;
            };

            files.push((kind, entry.into_path()));
            if files.len() > MAX_IMPORT_FILES {
                bail!("Too many export files (max {})", MAX_IMPORT_FILES);
            }
        }
    }

    files.sort_by_key(|(kind, _)| *kind);
    Ok(files)
}

/// Read a file as a list of JSON values; a single object counts as a one-item list
fn read_items(path: &Path) -> Result<Vec<Value>> {
    let mut file = safe_open_file(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        other => bail!(
            "Unexpected top-level JSON in {}: expected array or object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn load_conversation(conn: &Connection, item: &Value, report: &mut ImportReport) -> Result<bool> {
    let Some(object) = item.as_object() else {
        return Ok(false);
    };
    let Some(document) = ConversationDocument::from_value(item) else {
        return Ok(false);
    };

    // Keep the document itself as payload, unwrapping a `conversation_data` envelope
    let payload = match object.get("conversation_data") {
        Some(Value::String(text)) if !object.contains_key("mapping") => Some(text.clone()),
        Some(inner) if inner.is_object() && !object.contains_key("mapping") => {
            Some(serde_json::to_string(inner)?)
        }
        _ => Some(serde_json::to_string(item)?),
    };

    let conversation_id = document.conversation_id.clone().unwrap_or_else(new_id);
    let row = ConversationRow {
        conversation_id: conversation_id.clone(),
        title: document.title.clone(),
        create_time: document.create_time,
        update_time: document.update_time,
        conversation_data: payload,
    };
    if writer::insert_conversation(conn, &row)? {
        report.conversations += 1;
    }

    for message in message_rows(&document.mapping, &conversation_id) {
        if writer::insert_message(conn, &message)? {
            report.messages += 1;
        }
    }
    Ok(true)
}

/// Message content is either plain text or a `{ "parts": [...] }` object
fn message_content(content: Option<Value>) -> Option<String> {
    match content? {
        Value::Null => None,
        Value::String(text) => Some(text),
        value @ Value::Object(_) if value.get("parts").is_some() => {
            Some(join_content_parts(Some(&value))).filter(|text| !text.is_empty())
        }
        other => Some(other.to_string()),
    }
}

fn load_message(conn: &Connection, item: &Value, report: &mut ImportReport) -> Result<bool> {
    if !item.is_object() {
        return Ok(false);
    }
    let Ok(record) = MessageRecord::deserialize(item) else {
        return Ok(false);
    };
    let row = MessageRow {
        message_id: record.message_id.unwrap_or_else(new_id),
        conversation_id: record.conversation_id.filter(|id| !id.is_empty()),
        author_role: record.author_role,
        content: message_content(record.content),
        create_time: record.create_time,
        status: record.status,
    };
    if writer::insert_message(conn, &row)? {
        report.messages += 1;
    }
    Ok(true)
}

fn load_feedback(conn: &Connection, item: &Value, report: &mut ImportReport) -> Result<bool> {
    if !item.is_object() {
        return Ok(false);
    }
    let Ok(record) = FeedbackRecord::deserialize(item) else {
        return Ok(false);
    };
    let Some(message_id) = record.message_id else {
        return Ok(false);
    };
    let feedback = Feedback {
        feedback_id: record.feedback_id.unwrap_or_else(new_id),
        message_id,
        feedback_type: record.feedback_type,
        feedback_content: record.feedback_content,
    };
    if writer::insert_feedback(conn, &feedback)? {
        report.feedback += 1;
    }
    Ok(true)
}

fn load_comparison(conn: &Connection, item: &Value, report: &mut ImportReport) -> Result<bool> {
    if !item.is_object() {
        return Ok(false);
    }
    let Ok(record) = ComparisonRecord::deserialize(item) else {
        return Ok(false);
    };
    let Some(message_id) = record.message_id else {
        return Ok(false);
    };
    let comparison = ModelComparison {
        comparison_id: record.comparison_id.unwrap_or_else(new_id),
        message_id,
        model_name: record.model_name,
        response_time: record.response_time,
        comparison_data: record.comparison_data,
    };
    if writer::insert_model_comparison(conn, &comparison)? {
        report.model_comparisons += 1;
    }
    Ok(true)
}
