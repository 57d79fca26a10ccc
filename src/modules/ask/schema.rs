use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Liveness check question; answered without touching any model.
pub const PING: &str = "ping";
pub const PONG: &str = "pong";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub conversation_history: Option<Vec<ConversationTurn>>,
}

/// True when the raw body's `question` is the ping literal, whatever else it carries.
pub fn is_ping(body: &Value) -> bool {
    body.get("question").and_then(Value::as_str) == Some(PING)
}

impl AskRequest {
    pub fn history(&self) -> &[ConversationTurn] {
        self.conversation_history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
}

impl AskResponse {
    pub fn pong() -> Self {
        Self {
            answer: PONG.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
