use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Style directives placed ahead of every transcript sent to the chat model.
pub const SYSTEM_PROMPT: &str = "\
You are a friendly, professional, and approachable AI assistant. Your responses should be:
1. Clear and concise.
2. Well-structured and easy to understand.
3. Engaging, with a natural conversational tone.
4. Avoid being overly formal or robotic.
5. Provide relevant examples if necessary to clarify your response.
6. If asked a question, answer directly with as much helpful information as possible.
7. Avoid long, unnecessary sentences or jargon unless the context requires it.

Answer the following question in a human-like, friendly manner:
";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Prompt-in, text-out chat model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, transcript: &str) -> Result<String, LlmError>;

    fn name(&self) -> &str;
}

pub fn build_prompt(transcript: &str) -> String {
    format!("{SYSTEM_PROMPT}\n{transcript}")
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// Client for a local Ollama server's `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn generate(&self, transcript: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(transcript),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(LlmError::ApiError(error_response.error));
            }
            return Err(LlmError::ApiError(format!("{status}: {error_text}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        tracing::debug!(model = %self.model, eval_count = ?body.eval_count, "chat model replied");

        Ok(body.response)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
