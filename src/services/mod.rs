pub mod llm;
pub mod paraphrase;
pub mod truncate;

use std::sync::Arc;

use crate::config::AppConfig;
use llm::{ChatModel, LlmError, OllamaClient};
use paraphrase::{DecodingParams, HfParaphraser, ParaphraseError, Paraphraser};
use truncate::InputTruncator;

/// Model clients built once at startup and shared by every request.
#[derive(Clone)]
pub struct ModelRegistry {
    pub chat: Arc<dyn ChatModel>,
    pub paraphraser: Arc<dyn Paraphraser>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("chat model client: {0}")]
    Chat(#[from] LlmError),
    #[error("paraphraser client: {0}")]
    Paraphrase(#[from] ParaphraseError),
}

impl ModelRegistry {
    pub fn new(chat: Arc<dyn ChatModel>, paraphraser: Arc<dyn Paraphraser>) -> Self {
        Self { chat, paraphraser }
    }

    /// Loads the paraphraser's tokenizer from `PARAPHRASE_TOKENIZER` or the hub. Blocks.
    pub fn load_truncator(config: &AppConfig) -> Result<InputTruncator, ParaphraseError> {
        match &config.paraphrase_tokenizer {
            Some(path) => InputTruncator::from_file(path),
            None => InputTruncator::from_pretrained(&config.paraphrase_model),
        }
    }

    pub fn from_config(config: &AppConfig, truncator: InputTruncator) -> Result<Self, RegistryError> {
        let chat = OllamaClient::new(&config.ollama_base_url, &config.chat_model, config.model_timeout)?;
        let paraphraser = HfParaphraser::new(
            &config.paraphrase_base_url,
            &config.paraphrase_model,
            config.paraphrase_api_key.clone(),
            DecodingParams::with_candidates(config.paraphrase_candidates),
            truncator,
            config.model_timeout,
        )?;

        Ok(Self::new(Arc::new(chat), Arc::new(paraphraser)))
    }
}
