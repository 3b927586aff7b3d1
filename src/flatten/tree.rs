//! Depth-first flattening of a conversation's node mapping.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::models::{MessageRow, MessageView};
use crate::utils::AsEpoch;

/// Flatten a node mapping into display order.
///
/// Every root (a key no other node lists as a child) is walked depth-first, parent before
/// children, children in their listed order. Nodes without a message payload emit nothing but
/// their children are still walked. The result is then stably sorted by raw timestamp
/// (missing = 0), so traversal order only decides ties.
///
/// Non-object nodes, non-string content parts and dangling child ids are ignored. Each node is
/// emitted at most once, and nodes reachable only through a cycle are walked last in mapping
/// order.
pub fn flatten_mapping(mapping: &Map<String, Value>) -> Vec<MessageView> {
    let referenced: HashSet<&str> =
        mapping.values().filter_map(Value::as_object).flat_map(child_ids).collect();

    let roots = mapping.keys().map(String::as_str).filter(|id| !referenced.contains(id));
    let leftovers = mapping.keys().map(String::as_str);

    let mut visited: HashSet<&str> = HashSet::with_capacity(mapping.len());
    let mut stack: Vec<(&str, usize)> = Vec::new();
    let mut views = Vec::new();

    for start in roots.chain(leftovers) {
        if visited.contains(start) {
            continue;
        }
        stack.push((start, 0));

        while let Some((node_id, depth)) = stack.pop() {
            if !visited.insert(node_id) {
                continue;
            }
            let Some(node) = mapping.get(node_id).and_then(Value::as_object) else {
                continue;
            };

            if let Some(view) = message_view(node_id, node, depth) {
                views.push(view);
            }

            // Reverse so the first listed child is popped first
            let children = child_ids(node);
            for child in children.into_iter().rev() {
                if !visited.contains(child) {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    views.sort_by(|a, b| a.sort_time().total_cmp(&b.sort_time()));
    views
}

fn child_ids(node: &Map<String, Value>) -> Vec<&str> {
    node.get("children")
        .and_then(Value::as_array)
        .map(|children| children.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn message_view(node_id: &str, node: &Map<String, Value>, depth: usize) -> Option<MessageView> {
    let row = node_message(node_id, node)?;
    let mut view = MessageView::from_row(&row);
    view.depth = depth;
    Some(view)
}

/// Raw message fields of a node, `None` for structural nodes
fn node_message(node_id: &str, node: &Map<String, Value>) -> Option<MessageRow> {
    let message = node.get("message")?.as_object()?;
    if message.is_empty() {
        return None;
    }

    let message_id = message.get("id").and_then(Value::as_str).unwrap_or(node_id).to_string();
    let role = message.get("author").and_then(|author| author.get("role")).and_then(Value::as_str);
    let content = join_content_parts(message.get("content"));

    Some(MessageRow {
        message_id,
        conversation_id: None,
        author_role: role.map(str::to_string),
        content: (!content.is_empty()).then_some(content),
        create_time: message.get("create_time").as_epoch(),
        status: message.get("status").and_then(Value::as_str).map(str::to_string),
    })
}

/// Message rows for every payload-carrying node, in mapping order, without display defaults
pub fn message_rows(mapping: &Map<String, Value>, conversation_id: &str) -> Vec<MessageRow> {
    mapping
        .iter()
        .filter_map(|(node_id, node)| node_message(node_id, node.as_object()?))
        .map(|row| MessageRow { conversation_id: Some(conversation_id.to_string()), ..row })
        .collect()
}

/// Join the string entries of `content.parts` with newlines, dropping everything else
pub fn join_content_parts(content: Option<&Value>) -> String {
    let Some(parts) = content.and_then(|c| c.get("parts")).and_then(Value::as_array) else {
        return String::new();
    };
    parts.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("\n")
}
