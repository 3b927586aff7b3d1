//! Chat Archive Explorer - browse, search and repair an archive of exported chat conversations
//!
//! The archive is a SQLite database of conversations, messages, feedback and model
//! comparisons, usually built from ChatGPT data exports. This library provides:
//!
//! - Flattening conversation trees (or flat message rows) into ordered, display-ready views
//! - Reconciling orphaned messages with their conversation by creation time, falling back to
//!   text similarity
//! - Paginated listing, text search with surrounding context, and a search log
//! - JSON and HTML export, and import of export folders
//!
//! # Example
//!
//! ```no_run
//! use chat_archive_explorer::{Archive, load_conversation_view};
//! use std::path::Path;
//!
//! let archive = Archive::open(Path::new("chat_archive.db"))?;
//! let view = load_conversation_view(&archive, "6f1c2a")?;
//! for message in &view.messages {
//!     println!("[{}] {}: {}", message.timestamp, message.author_role, message.content);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod browse;
pub mod cli;
pub mod config;
pub mod export;
pub mod flatten;
pub mod import;
pub mod models;
pub mod parsers;
pub mod reconcile;
pub mod search;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use browse::{list_conversations, load_conversation_view, message_detail};
pub use flatten::{flatten_mapping, flatten_payload, flatten_rows};
pub use reconcile::{ReconcileOutcome, ReconcilePolicy, reconcile, reconcile_archive};
pub use storage::{Archive, ArchiveError};
pub use utils::{format_path_with_tilde, format_timestamp};
