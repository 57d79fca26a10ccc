#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_extra::extract::cookie::Key;
use axum_test::TestServer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parrot_chat::modules::session::crud::MemorySessionStore;
use parrot_chat::services::llm::{ChatModel, LlmError};
use parrot_chat::services::paraphrase::{ParaphraseError, Paraphraser};
use parrot_chat::services::ModelRegistry;
use parrot_chat::{modules, AppState};

/// Replies with the transcript it was given and records every call.
#[derive(Default)]
pub struct EchoChat {
    pub transcripts: Mutex<Vec<String>>,
}

impl EchoChat {
    pub fn calls(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    pub fn last_transcript(&self) -> Option<String> {
        self.transcripts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatModel for EchoChat {
    async fn generate(&self, transcript: &str) -> Result<String, LlmError> {
        self.transcripts.lock().unwrap().push(transcript.to_string());
        Ok(format!("Reply to: {transcript}"))
    }

    fn name(&self) -> &str {
        "echo-chat"
    }
}

pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn generate(&self, _transcript: &str) -> Result<String, LlmError> {
        Err(LlmError::ApiError("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing-chat"
    }
}

/// Upper-cases its input.
#[derive(Default)]
pub struct ShoutParaphraser {
    calls: AtomicUsize,
}

impl ShoutParaphraser {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Paraphraser for ShoutParaphraser {
    async fn paraphrase(&self, text: &str) -> Result<String, ParaphraseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.to_uppercase())
    }

    fn name(&self) -> &str {
        "shout"
    }
}

pub struct FailingParaphraser;

#[async_trait]
impl Paraphraser for FailingParaphraser {
    async fn paraphrase(&self, _text: &str) -> Result<String, ParaphraseError> {
        Err(ParaphraseError::InvalidResponse("No candidates in response".to_string()))
    }

    fn name(&self) -> &str {
        "failing-paraphraser"
    }
}

pub struct Harness {
    pub server: TestServer,
    pub chat: Arc<EchoChat>,
    pub paraphraser: Arc<ShoutParaphraser>,
    pub sessions: Arc<MemorySessionStore>,
}

pub fn state_with(
    chat: Arc<dyn ChatModel>,
    paraphraser: Arc<dyn Paraphraser>,
    sessions: Arc<MemorySessionStore>,
) -> AppState {
    AppState {
        models: ModelRegistry::new(chat, paraphraser),
        sessions,
        cookie_key: Key::generate(),
    }
}

pub fn server_for(state: AppState) -> TestServer {
    let app = Router::new()
        .merge(modules::ask::routes::routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

pub fn setup_test_server() -> Harness {
    let chat = Arc::new(EchoChat::default());
    let paraphraser = Arc::new(ShoutParaphraser::default());
    let sessions = Arc::new(MemorySessionStore::new());

    let server = server_for(state_with(chat.clone(), paraphraser.clone(), sessions.clone()));

    Harness {
        server,
        chat,
        paraphraser,
        sessions,
    }
}
