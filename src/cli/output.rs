//! Plain-text rendering of command results.
//!
//! Every writer takes `impl Write` so commands print to stdout and tests render into a
//! buffer.

use std::io::{self, Write};

use crate::browse::ArchiveStats;
use crate::import::ImportReport;
use crate::models::{
    ConversationSummary, ConversationView, MessageDetail, MessageSummary, Page, SearchHit,
    SearchLogEntry,
};
use crate::reconcile::{ReconcileOutcome, ReconcileRun};

const PREVIEW_CHARS: usize = 100;

/// First line of `text`, cut to `PREVIEW_CHARS` characters
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut cut: String = line.chars().take(PREVIEW_CHARS).collect();
    if cut.len() < line.len() || text.lines().nth(1).is_some() {
        cut.push_str("...");
    }
    cut
}

pub fn write_page(out: &mut impl Write, page: &Page<ConversationSummary>) -> io::Result<()> {
    if page.items.is_empty() {
        writeln!(out, "No conversations found")?;
        return Ok(());
    }
    for item in &page.items {
        writeln!(
            out,
            "{}  {}  {} ({} messages)",
            item.create_time, item.conversation_id, item.title, item.message_count
        )?;
    }
    writeln!(
        out,
        "\nPage {} of {} ({} conversations)",
        page.page,
        page.total_pages.max(1),
        page.total_records
    )
}

pub fn write_conversation(out: &mut impl Write, view: &ConversationView) -> io::Result<()> {
    writeln!(out, "{}", view.title)?;
    writeln!(out, "{}", "=".repeat(view.title.chars().count().clamp(3, 80)))?;
    writeln!(out, "ID: {}", view.conversation_id)?;
    writeln!(out, "Created: {}", view.create_time)?;
    writeln!(out, "Updated: {}", view.update_time)?;

    for message in &view.messages {
        let indent = "  ".repeat(message.depth);
        writeln!(out)?;
        writeln!(out, "{indent}[{}] {}:", message.timestamp, message.author_role)?;
        for line in message.content.lines() {
            writeln!(out, "{indent}  {line}")?;
        }
    }
    Ok(())
}

pub fn write_message_detail(out: &mut impl Write, detail: &MessageDetail) -> io::Result<()> {
    let message = &detail.message;
    writeln!(out, "Message: {}", message.message_id)?;
    writeln!(out, "Conversation: {}", detail.conversation_id.as_deref().unwrap_or("(orphaned)"))?;
    writeln!(out, "Author: {}", message.author_role)?;
    writeln!(out, "Time: {}", message.timestamp)?;
    writeln!(out, "\n{}", message.content)?;

    if !detail.feedback.is_empty() {
        writeln!(out, "\nFeedback:")?;
        for feedback in &detail.feedback {
            writeln!(
                out,
                "  - {}: {}",
                feedback.feedback_type.as_deref().unwrap_or("unknown"),
                feedback.feedback_content.as_deref().unwrap_or("")
            )?;
        }
    }
    if !detail.model_comparisons.is_empty() {
        writeln!(out, "\nModel comparisons:")?;
        for comparison in &detail.model_comparisons {
            writeln!(
                out,
                "  - {} (response time: {})",
                comparison.model_name.as_deref().unwrap_or("unknown"),
                comparison.response_time.as_deref().unwrap_or("N/A")
            )?;
        }
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, prefix: &str, message: &MessageSummary) -> io::Result<()> {
    writeln!(
        out,
        "{prefix}[{}] {}: {}",
        message.timestamp,
        message.author_role,
        preview(&message.content)
    )
}

pub fn write_hits(out: &mut impl Write, hits: &[SearchHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "No results")?;
        return Ok(());
    }
    for hit in hits {
        match hit {
            SearchHit::Conversation { conversation_id, title, content_snippet, timestamp } => {
                writeln!(out, "conversation {conversation_id}  {title}  ({timestamp})")?;
                writeln!(out, "    {content_snippet}")?;
            }
            SearchHit::Message { hit, context } => {
                writeln!(
                    out,
                    "message {} in {}",
                    hit.message_id,
                    hit.conversation_id.as_deref().unwrap_or("(orphaned)")
                )?;
                if context.is_empty() {
                    write_summary(out, "    > ", hit)?;
                }
                for message in context {
                    let marker = if message.message_id == hit.message_id { "    > " } else { "      " };
                    write_summary(out, marker, message)?;
                }
            }
        }
    }
    writeln!(out, "\n{} result(s)", hits.len())
}

pub fn write_recent(out: &mut impl Write, entries: &[SearchLogEntry]) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "No recent searches")?;
        return Ok(());
    }
    for entry in entries.iter().rev() {
        let mut range = String::new();
        if !entry.start_date.is_empty() || !entry.end_date.is_empty() {
            range = format!("  [{} .. {}]", entry.start_date, entry.end_date);
        }
        writeln!(out, "{}  {}{}", entry.timestamp, entry.query, range)?;
    }
    Ok(())
}

pub fn write_reconcile(out: &mut impl Write, run: &ReconcileRun) -> io::Result<()> {
    for outcome in &run.outcomes {
        match outcome {
            ReconcileOutcome::Matched(m) => writeln!(
                out,
                "{} -> {} ({}, confidence {:.3})",
                m.message_id, m.conversation_id, m.method, m.confidence
            )?,
            ReconcileOutcome::Unmatched { message_id } => writeln!(out, "{message_id} -> unmatched")?,
        }
    }

    writeln!(
        out,
        "\n{} orphaned message(s), {} matched",
        run.outcomes.len(),
        run.matched_count()
    )?;
    match &run.applied {
        Some(report) => {
            writeln!(
                out,
                "Linked: {}  Already linked: {}  Unmatched: {}  Failed: {}",
                report.linked,
                report.already_linked,
                report.unmatched,
                report.failures.len()
            )?;
            for failure in &report.failures {
                writeln!(out, "  failed {}: {}", failure.message_id, failure.error)?;
            }
        }
        None => writeln!(out, "Dry run: re-run with --apply to link the matches")?,
    }
    Ok(())
}

pub fn write_import(out: &mut impl Write, report: &ImportReport) -> io::Result<()> {
    writeln!(out, "Files loaded: {}", report.files_loaded)?;
    writeln!(out, "Files skipped: {}", report.files_skipped)?;
    writeln!(out, "Conversations added: {}", report.conversations)?;
    writeln!(out, "Messages added: {}", report.messages)?;
    writeln!(out, "Feedback added: {}", report.feedback)?;
    writeln!(out, "Model comparisons added: {}", report.model_comparisons)?;
    if report.items_skipped > 0 {
        writeln!(out, "Items skipped: {}", report.items_skipped)?;
    }
    Ok(())
}

pub fn write_stats(out: &mut impl Write, stats: &ArchiveStats, location: &str) -> io::Result<()> {
    writeln!(out, "Chat Archive Statistics")?;
    writeln!(out, "=======================")?;
    writeln!(out, "Conversations: {}", stats.conversations)?;
    writeln!(out, "Messages: {}", stats.messages)?;
    writeln!(out, "  Orphaned: {}", stats.orphaned_messages)?;
    writeln!(out)?;
    writeln!(out, "Archive: {location}")
}
