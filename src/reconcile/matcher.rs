use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use super::similarity::TextMatcher;
use crate::models::{ConversationRow, MessageRow};

/// Time window of the strict mode, in seconds
pub const STRICT_WINDOW_SECS: f64 = 600.0;
/// Time window of the loose mode, in seconds
pub const LOOSE_WINDOW_SECS: f64 = 3600.0;
/// A content match is accepted only when its ratio is strictly above this
pub const CONTENT_MATCH_THRESHOLD: f64 = 0.6;

/// Preset temporal windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimeWindow {
    /// 600 seconds
    #[default]
    Strict,
    /// 3600 seconds
    Loose,
}

impl TimeWindow {
    pub fn seconds(self) -> f64 {
        match self {
            TimeWindow::Strict => STRICT_WINDOW_SECS,
            TimeWindow::Loose => LOOSE_WINDOW_SECS,
        }
    }
}

/// Which text of a conversation a message is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTarget {
    #[default]
    Title,
    /// The serialized conversation payload, falling back to the title when absent
    Payload,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilePolicy {
    pub window_secs: f64,
    pub target: MatchTarget,
    pub threshold: f64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self::new(TimeWindow::default())
    }
}

impl ReconcilePolicy {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window_secs: window.seconds(),
            target: MatchTarget::default(),
            threshold: CONTENT_MATCH_THRESHOLD,
        }
    }

    pub fn with_window_secs(mut self, secs: f64) -> Self {
        self.window_secs = secs;
        self
    }

    pub fn with_target(mut self, target: MatchTarget) -> Self {
        self.target = target;
        self
    }

    fn representative_text<'a>(&self, conversation: &'a ConversationRow) -> &'a str {
        let title = conversation.title.as_deref().unwrap_or_default();
        match self.target {
            MatchTarget::Title => title,
            MatchTarget::Payload => conversation
                .conversation_data
                .as_deref()
                .filter(|data| !data.trim().is_empty())
                .unwrap_or(title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Temporal,
    Content,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Temporal => write!(f, "temporal"),
            MatchMethod::Content => write!(f, "content"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileMatch {
    pub message_id: String,
    pub conversation_id: String,
    pub method: MatchMethod,
    /// Seconds between the two creation times for temporal matches, similarity ratio for
    /// content matches
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Matched(ReconcileMatch),
    Unmatched { message_id: String },
}

impl ReconcileOutcome {
    pub fn message_id(&self) -> &str {
        match self {
            ReconcileOutcome::Matched(m) => &m.message_id,
            ReconcileOutcome::Unmatched { message_id } => message_id,
        }
    }

    pub fn as_match(&self) -> Option<&ReconcileMatch> {
        match self {
            ReconcileOutcome::Matched(m) => Some(m),
            ReconcileOutcome::Unmatched { .. } => None,
        }
    }
}

/// Find a conversation for every orphaned message.
///
/// Messages that already reference a conversation are not candidates and produce no
/// outcome. Every other message yields exactly one outcome, in input order.
pub fn reconcile(
    orphans: &[MessageRow],
    conversations: &[ConversationRow],
    policy: &ReconcilePolicy,
) -> Vec<ReconcileOutcome> {
    // Built on first use; the payload target can make these large
    let mut content_index: Option<Vec<TextMatcher>> = None;

    orphans
        .iter()
        .filter(|message| message.conversation_id.is_none())
        .map(|message| {
            if let Some((conversation, delta)) = temporal_match(message, conversations, policy) {
                return matched(message, conversation, MatchMethod::Temporal, delta);
            }

            let index = content_index.get_or_insert_with(|| {
                conversations
                    .iter()
                    .map(|c| TextMatcher::new(policy.representative_text(c)))
                    .collect()
            });
            match content_match(message, conversations, index, policy) {
                Some((conversation, ratio)) => {
                    matched(message, conversation, MatchMethod::Content, ratio)
                }
                None => ReconcileOutcome::Unmatched { message_id: message.message_id.clone() },
            }
        })
        .collect()
}

fn matched(
    message: &MessageRow,
    conversation: &ConversationRow,
    method: MatchMethod,
    confidence: f64,
) -> ReconcileOutcome {
    ReconcileOutcome::Matched(ReconcileMatch {
        message_id: message.message_id.clone(),
        conversation_id: conversation.conversation_id.clone(),
        method,
        confidence,
    })
}

/// Closest conversation by creation time within the window; ties go to the lowest id
fn temporal_match<'a>(
    message: &MessageRow,
    conversations: &'a [ConversationRow],
    policy: &ReconcilePolicy,
) -> Option<(&'a ConversationRow, f64)> {
    let message_time = message.create_time?;
    let mut best: Option<(&ConversationRow, f64)> = None;

    for conversation in conversations {
        let Some(created) = conversation.create_time else {
            continue;
        };
        let delta = (created - message_time).abs();
        if delta >= policy.window_secs {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, best_delta)) => {
                delta < best_delta
                    || (delta == best_delta
                        && conversation.conversation_id < current.conversation_id)
            }
        };
        if better {
            best = Some((conversation, delta));
        }
    }

    best
}

/// Most similar conversation above the threshold; ties go to the lowest id
fn content_match<'a>(
    message: &MessageRow,
    conversations: &'a [ConversationRow],
    index: &[TextMatcher],
    policy: &ReconcilePolicy,
) -> Option<(&'a ConversationRow, f64)> {
    let content = message.content.as_deref().filter(|c| !c.trim().is_empty())?;
    let mut best: Option<(&ConversationRow, f64)> = None;

    for (conversation, matcher) in conversations.iter().zip(index) {
        let ratio = matcher.ratio(content);
        let better = match best {
            None => true,
            Some((current, best_ratio)) => {
                ratio > best_ratio
                    || (ratio == best_ratio
                        && conversation.conversation_id < current.conversation_id)
            }
        };
        if better {
            best = Some((conversation, ratio));
        }
    }

    best.filter(|(_, ratio)| *ratio > policy.threshold)
}
