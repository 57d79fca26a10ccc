use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::modules::session::model::{SessionState, SessionTurn};

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-session conversation state keyed by the cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError>;

    /// Replaces the whole session.
    async fn put(&self, state: SessionState) -> Result<(), SessionStoreError>;

    /// Appends turns atomically, creating the session if absent. Returns the new history length.
    async fn append(&self, session_id: &str, turns: Vec<SessionTurn>) -> Result<usize, SessionStoreError>;
}

/// Process-local store; state lives as long as the server.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn put(&self, state: SessionState) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(state.session_id.clone(), state);
        Ok(())
    }

    async fn append(&self, session_id: &str, turns: Vec<SessionTurn>) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id.to_string()));

        for turn in turns {
            state.add_turn(turn);
        }

        Ok(state.history.len())
    }
}

/// Stores each history as a Redis list of JSON turns with a sliding TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager, ttl: u64) -> Self {
        Self { redis, ttl }
    }

    fn history_key(session_id: &str) -> String {
        format!("session:{session_id}:history")
    }

    fn encode(turns: &[SessionTurn]) -> Result<Vec<String>, SessionStoreError> {
        turns
            .iter()
            .map(|t| serde_json::to_string(t).map_err(SessionStoreError::from))
            .collect()
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError> {
        let key = Self::history_key(session_id);
        let mut redis = self.redis.clone();

        let raw: Vec<String> = redis.lrange(&key, 0, -1).await?;
        if raw.is_empty() {
            return Ok(None);
        }

        let mut state = SessionState::new(session_id.to_string());
        for entry in raw {
            match serde_json::from_str::<SessionTurn>(&entry) {
                Ok(turn) => state.add_turn(turn),
                Err(e) => tracing::warn!(session_id, error = %e, "skipping malformed session turn"),
            }
        }

        Ok(Some(state))
    }

    async fn put(&self, state: SessionState) -> Result<(), SessionStoreError> {
        let key = Self::history_key(&state.session_id);
        let encoded = Self::encode(&state.history)?;
        let mut redis = self.redis.clone();

        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        if !encoded.is_empty() {
            pipe.rpush(&key, encoded).ignore();
            pipe.expire(&key, self.ttl as i64).ignore();
        }
        let () = pipe.query_async(&mut redis).await?;

        Ok(())
    }

    async fn append(&self, session_id: &str, turns: Vec<SessionTurn>) -> Result<usize, SessionStoreError> {
        let key = Self::history_key(session_id);
        let encoded = Self::encode(&turns)?;
        let mut redis = self.redis.clone();

        if encoded.is_empty() {
            let len: usize = redis.llen(&key).await?;
            return Ok(len);
        }

        let (len,): (usize,) = redis::pipe()
            .atomic()
            .rpush(&key, encoded)
            .expire(&key, self.ttl as i64)
            .ignore()
            .query_async(&mut redis)
            .await?;

        Ok(len)
    }
}
