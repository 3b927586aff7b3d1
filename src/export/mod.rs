//! Conversation export to JSON data files and standalone HTML documents.

pub mod html;
pub mod json;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

pub use html::render_html;
pub use json::render_json;

use crate::models::ConversationView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

/// `conversation_<id>.<ext>`, with path separators in the id replaced
pub fn default_file_name(conversation_id: &str, format: ExportFormat) -> String {
    let safe_id: String = conversation_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    format!("conversation_{}.{}", safe_id, format.extension())
}

pub fn render(view: &ConversationView, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => render_json(view),
        ExportFormat::Html => Ok(render_html(view)),
    }
}

/// Render `view` and write it to `path`, creating missing parent directories
pub fn export_to_file(view: &ConversationView, format: ExportFormat, path: &Path) -> Result<()> {
    let document = render(view, format)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, document)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    tracing::info!(conversation_id = %view.conversation_id, path = %path.display(), "Exported conversation");
    Ok(())
}
