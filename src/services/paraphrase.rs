use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::services::truncate::InputTruncator;

/// Task marker the paraphrasing model was fine-tuned with.
pub const INPUT_PREFIX: &str = "paraphraser: ";

#[derive(Error, Debug)]
pub enum ParaphraseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

/// Rewrites text; implementations return the best candidate only.
#[async_trait]
pub trait Paraphraser: Send + Sync {
    async fn paraphrase(&self, text: &str) -> Result<String, ParaphraseError>;

    fn name(&self) -> &str;
}

/// Diverse beam search settings sent with every request as `generate` kwargs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DecodingParams {
    pub num_beams: u32,
    pub num_beam_groups: u32,
    pub num_return_sequences: u32,
    pub repetition_penalty: f32,
    pub diversity_penalty: f32,
    pub no_repeat_ngram_size: u32,
    pub temperature: f32,
    pub max_length: u32,
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            num_beams: 4,
            num_beam_groups: 4,
            num_return_sequences: 4,
            repetition_penalty: 10.0,
            diversity_penalty: 3.0,
            no_repeat_ngram_size: 2,
            temperature: 0.8,
            max_length: 64,
        }
    }
}

impl DecodingParams {
    /// Keeps beams and groups equal to the candidate count so groups stay one beam wide.
    pub fn with_candidates(candidates: u32) -> Self {
        let candidates = candidates.max(1);
        Self {
            num_beams: candidates,
            num_beam_groups: candidates,
            num_return_sequences: candidates,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: String,
    parameters: &'a DecodingParams,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// Client for a Hugging Face style text2text inference endpoint.
#[derive(Clone)]
pub struct HfParaphraser {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    params: DecodingParams,
    truncator: InputTruncator,
}

impl HfParaphraser {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        params: DecodingParams,
        truncator: InputTruncator,
        timeout: Duration,
    ) -> Result<Self, ParaphraseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            params,
            truncator,
        })
    }

    /// Every candidate the endpoint produced, in rank order.
    pub async fn candidates(&self, text: &str) -> Result<Vec<String>, ParaphraseError> {
        let prefixed = format!("{INPUT_PREFIX}{text}");
        let inputs = self.truncator.truncate(&prefixed)?;
        if inputs.len() < prefixed.len() {
            tracing::debug!(
                max_tokens = self.truncator.max_tokens(),
                kept_bytes = inputs.len(),
                dropped_bytes = prefixed.len() - inputs.len(),
                "paraphraser input truncated"
            );
        }

        let request = InferenceRequest {
            inputs: inputs.to_string(),
            parameters: &self.params,
            options: InferenceOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        let mut builder = self
            .client
            .post(format!("{}/models/{}", self.base_url, self.model))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(ParaphraseError::ApiError(error_response.error));
            }
            return Err(ParaphraseError::ApiError(format!("{status}: {error_text}")));
        }

        let candidates: Vec<Candidate> = response
            .json()
            .await
            .map_err(|e| ParaphraseError::InvalidResponse(e.to_string()))?;

        Ok(candidates.into_iter().map(|c| c.generated_text).collect())
    }
}

#[async_trait]
impl Paraphraser for HfParaphraser {
    async fn paraphrase(&self, text: &str) -> Result<String, ParaphraseError> {
        let candidates = self.candidates(text).await?;
        tracing::debug!(model = %self.model, count = candidates.len(), "paraphrase candidates received");

        first_candidate(candidates)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn first_candidate(candidates: Vec<String>) -> Result<String, ParaphraseError> {
    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ParaphraseError::InvalidResponse("No candidates in response".to_string()))?;

    if first.trim().is_empty() {
        return Err(ParaphraseError::InvalidResponse("First candidate is empty".to_string()));
    }

    Ok(first)
}
