use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionTurn {
    pub role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionTurn {
    pub fn new(role: Role, message: String) -> Self {
        Self {
            role,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn user(message: String) -> Self {
        Self::new(Role::User, message)
    }

    pub fn bot(message: String) -> Self {
        Self::new(Role::Bot, message)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionState {
    pub session_id: String,
    pub history: Vec<SessionTurn>,
}

impl SessionState {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            history: Vec::new(),
        }
    }

    pub fn add_turn(&mut self, turn: SessionTurn) {
        self.history.push(turn);
    }
}

/// Fresh opaque session token.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
