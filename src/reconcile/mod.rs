//! Orphan reconciliation: links messages that lost their conversation reference.
//!
//! Matching runs in two stages per message:
//!
//! 1. **Temporal**: the conversation created closest in time, if strictly inside the
//!    policy window ([`TimeWindow::Strict`] 600s, [`TimeWindow::Loose`] 3600s or custom).
//! 2. **Content**: only when stage 1 found nothing. The conversation whose title (or
//!    payload, see [`MatchTarget`]) is most similar to the message content, if the ratio
//!    is above [`CONTENT_MATCH_THRESHOLD`].
//!
//! [`reconcile`] is pure and returns one [`ReconcileOutcome`] per orphan; [`apply_matches`]
//! writes the accepted links through a [`MessageLinker`]. Linking only ever fills an empty
//! reference, so reruns are harmless.

pub mod apply;
pub mod matcher;
pub mod similarity;

use std::collections::HashMap;

use serde::Serialize;

pub use apply::{ApplyReport, LinkFailure, MessageLinker, apply_matches};
pub use matcher::{
    CONTENT_MATCH_THRESHOLD, LOOSE_WINDOW_SECS, MatchMethod, MatchTarget, ReconcileMatch,
    ReconcileOutcome, ReconcilePolicy, STRICT_WINDOW_SECS, TimeWindow, reconcile,
};
pub use similarity::{TextMatcher, similarity_ratio};

use crate::storage::{Archive, ArchiveError, reader};
use crate::utils::format_timestamp;

/// Result of a reconciliation run against an archive
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRun {
    pub outcomes: Vec<ReconcileOutcome>,
    /// `None` for a dry run
    pub applied: Option<ApplyReport>,
}

impl ReconcileRun {
    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.as_match().is_some()).count()
    }
}

/// Load orphans and candidates, match them, and optionally persist the matches
pub fn reconcile_archive(
    archive: &mut Archive,
    policy: &ReconcilePolicy,
    apply: bool,
) -> Result<ReconcileRun, ArchiveError> {
    let orphans = reader::orphaned_messages(archive.conn())?;
    let conversations = reader::all_conversations(archive.conn())?;
    tracing::info!(
        orphans = orphans.len(),
        conversations = conversations.len(),
        window_secs = policy.window_secs,
        "Reconciling orphaned messages"
    );

    let outcomes = reconcile(&orphans, &conversations, policy);

    let message_times: HashMap<&str, Option<f64>> =
        orphans.iter().map(|m| (m.message_id.as_str(), m.create_time)).collect();
    let conversation_times: HashMap<&str, Option<f64>> =
        conversations.iter().map(|c| (c.conversation_id.as_str(), c.create_time)).collect();

    for outcome in &outcomes {
        let message_time = message_times.get(outcome.message_id()).copied().flatten();
        match outcome {
            ReconcileOutcome::Matched(m) => {
                let conversation_time =
                    conversation_times.get(m.conversation_id.as_str()).copied().flatten();
                tracing::info!(
                    message_id = %m.message_id,
                    conversation_id = %m.conversation_id,
                    method = %m.method,
                    confidence = m.confidence,
                    message_time = %format_timestamp(&message_time),
                    conversation_time = %format_timestamp(&conversation_time),
                    "Matched orphaned message"
                );
            }
            ReconcileOutcome::Unmatched { message_id } => {
                tracing::info!(
                    message_id = %message_id,
                    message_time = %format_timestamp(&message_time),
                    "No matching conversation"
                );
            }
        }
    }

    let applied = apply.then(|| apply_matches(archive, &outcomes));
    Ok(ReconcileRun { outcomes, applied })
}
