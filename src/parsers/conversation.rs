use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::utils::AsEpoch;

/// Decoded form of a conversation's serialized payload
///
/// Only the top-level shape is checked here. Node entries inside `mapping` stay as raw JSON
/// so the flattener can skip malformed ones individually.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationDocument {
    pub conversation_id: Option<String>,
    pub title: Option<String>,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    /// node id -> `{ "message"?: {...}, "children"?: [...] }`, in document order
    pub mapping: Map<String, Value>,
}

impl ConversationDocument {
    /// Parse a payload, failing when it is not a JSON object
    pub fn parse(payload: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(payload).context("Conversation payload is not valid JSON")?;
        match Self::from_value(&value) {
            Some(document) => Ok(document),
            None => bail!("Conversation payload is not a JSON object"),
        }
    }

    /// Best-effort decode that never fails
    ///
    /// A payload that cannot be parsed yields an empty document and a warning naming
    /// `conversation_id`, which is what distinguishes it from a conversation that is
    /// genuinely empty.
    pub fn decode(payload: &str, conversation_id: &str) -> Self {
        match Self::parse(payload) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    conversation_id,
                    error = %format!("{:#}", e),
                    "Malformed conversation payload, showing placeholders"
                );
                Self::default()
            }
        }
    }

    /// Build a document from an already-parsed JSON value, `None` if it is not an object
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        // Some exports wrap the actual document in a `conversation_data` field
        if !object.contains_key("mapping")
            && let Some(inner) = object.get("conversation_data").filter(|v| v.is_object())
        {
            let mut document = Self::from_value(inner)?;
            if document.conversation_id.is_none() {
                document.conversation_id = string_field(object, "conversation_id");
            }
            return Some(document);
        }

        let mapping = match object.get("mapping") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Some(Self {
            conversation_id: string_field(object, "conversation_id")
                .or_else(|| string_field(object, "id")),
            title: string_field(object, "title"),
            create_time: object.get("create_time").as_epoch(),
            update_time: object.get("update_time").as_epoch(),
            mapping,
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
