use serde::Serialize;

use super::matcher::ReconcileOutcome;
use crate::storage::{Archive, ArchiveError, writer};

/// Persists a message → conversation link.
///
/// Implementations must leave messages that already have a conversation untouched and
/// report `Ok(false)` for them.
pub trait MessageLinker {
    fn link_message(&mut self, message_id: &str, conversation_id: &str)
    -> Result<bool, ArchiveError>;
}

impl MessageLinker for Archive {
    fn link_message(
        &mut self,
        message_id: &str,
        conversation_id: &str,
    ) -> Result<bool, ArchiveError> {
        writer::link_message(self.conn(), message_id, conversation_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFailure {
    pub message_id: String,
    pub conversation_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    pub linked: usize,
    /// Matches whose message was linked by someone else in the meantime
    pub already_linked: usize,
    pub unmatched: usize,
    pub failures: Vec<LinkFailure>,
}

/// Persist every accepted match.
///
/// Each link is written on its own; a failed write is recorded and the remaining matches
/// are still applied, so a rerun picks up whatever is left.
pub fn apply_matches<L: MessageLinker + ?Sized>(
    linker: &mut L,
    outcomes: &[ReconcileOutcome],
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for outcome in outcomes {
        let Some(m) = outcome.as_match() else {
            report.unmatched += 1;
            continue;
        };

        match linker.link_message(&m.message_id, &m.conversation_id) {
            Ok(true) => report.linked += 1,
            Ok(false) => report.already_linked += 1,
            Err(e) => {
                tracing::warn!(
                    message_id = %m.message_id,
                    conversation_id = %m.conversation_id,
                    error = %e,
                    "Failed to link message"
                );
                report.failures.push(LinkFailure {
                    message_id: m.message_id.clone(),
                    conversation_id: m.conversation_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::reconcile::{MatchMethod, ReconcileMatch};

    /// In-memory linker; ids listed in `broken` fail to write
    #[derive(Default)]
    struct MemoryLinker {
        links: HashMap<String, String>,
        broken: Vec<String>,
    }

    impl MessageLinker for MemoryLinker {
        fn link_message(
            &mut self,
            message_id: &str,
            conversation_id: &str,
        ) -> Result<bool, ArchiveError> {
            if self.broken.iter().any(|id| id == message_id) {
                return Err(ArchiveError::not_found("Message", message_id));
            }
            if self.links.contains_key(message_id) {
                return Ok(false);
            }
            self.links.insert(message_id.to_string(), conversation_id.to_string());
            Ok(true)
        }
    }

    fn matched(message_id: &str, conversation_id: &str) -> ReconcileOutcome {
        ReconcileOutcome::Matched(ReconcileMatch {
            message_id: message_id.to_string(),
            conversation_id: conversation_id.to_string(),
            method: MatchMethod::Temporal,
            confidence: 1.0,
        })
    }

    #[test]
    fn test_apply_counts_each_outcome() {
        let mut linker = MemoryLinker::default();
        let outcomes = vec![
            matched("m1", "c1"),
            ReconcileOutcome::Unmatched { message_id: "m2".into() },
            matched("m3", "c1"),
        ];

        let report = apply_matches(&mut linker, &outcomes);
        assert_eq!(report.linked, 2);
        assert_eq!(report.unmatched, 1);
        assert!(report.failures.is_empty());
        assert_eq!(linker.links.get("m3").map(String::as_str), Some("c1"));
    }

    #[test]
    fn test_reapply_changes_nothing() {
        let mut linker = MemoryLinker::default();
        let outcomes = vec![matched("m1", "c1")];
        apply_matches(&mut linker, &outcomes);

        let again = apply_matches(&mut linker, &[matched("m1", "c2")]);
        assert_eq!(again.linked, 0);
        assert_eq!(again.already_linked, 1);
        assert_eq!(linker.links["m1"], "c1");
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let mut linker = MemoryLinker { broken: vec!["m1".into()], ..Default::default() };
        let outcomes = vec![matched("m1", "c1"), matched("m2", "c1")];

        let report = apply_matches(&mut linker, &outcomes);
        assert_eq!(report.linked, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].message_id, "m1");
        assert!(report.failures[0].error.contains("not found"));
        assert!(linker.links.contains_key("m2"));
    }
}
