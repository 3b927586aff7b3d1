//! Parsers for serialized conversation payloads and export records
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **graceful degradation** approach:
//!
//! - **Malformed payloads**: [`ConversationDocument::decode`] never fails. A payload that is
//!   not a JSON object becomes an empty document and a `tracing` warning is emitted, so a
//!   broken record degrades to placeholders instead of failing a whole listing.
//!
//! - **Lenient fields**: Epoch and free-form text fields accept the mix of numbers, numeric
//!   strings and nested JSON found in real exports (see [`deserializers`]).
//!
//! - **Strict variant**: [`ConversationDocument::parse`] returns an `anyhow::Result` for callers
//!   that need the failure itself; [`decode`](ConversationDocument::decode) is built on it.

pub mod conversation;
pub mod deserializers;

pub use conversation::ConversationDocument;
