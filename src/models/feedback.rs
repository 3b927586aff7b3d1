use serde::{Deserialize, Serialize};

use super::conversation::MessageView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback_id: String,
    pub message_id: String,
    pub feedback_type: Option<String>,
    pub feedback_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub comparison_id: String,
    pub message_id: String,
    pub model_name: Option<String>,
    pub response_time: Option<String>,
    pub comparison_data: Option<String>,
}

/// A single message together with its auxiliary records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub message: MessageView,
    pub conversation_id: Option<String>,
    pub feedback: Vec<Feedback>,
    pub model_comparisons: Vec<ModelComparison>,
}
