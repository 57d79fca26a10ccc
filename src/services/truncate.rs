use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::services::paraphrase::ParaphraseError;

/// Token budget for paraphraser input, special tokens included.
pub const MAX_INPUT_TOKENS: usize = 64;

/// Cuts text to the paraphrasing model's input budget using the model's own tokenizer.
#[derive(Clone)]
pub struct InputTruncator {
    tokenizer: Arc<Tokenizer>,
    max_tokens: usize,
}

impl InputTruncator {
    pub fn new(tokenizer: Tokenizer, max_tokens: usize) -> Self {
        Self {
            tokenizer: Arc::new(tokenizer),
            max_tokens,
        }
    }

    /// Loads `tokenizer.json` from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParaphraseError> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| ParaphraseError::Tokenizer(e.to_string()))?;
        Ok(Self::new(tokenizer, MAX_INPUT_TOKENS))
    }

    /// Fetches the tokenizer for `model` from the Hugging Face hub. Blocks.
    pub fn from_pretrained(model: &str) -> Result<Self, ParaphraseError> {
        let tokenizer =
            Tokenizer::from_pretrained(model, None).map_err(|e| ParaphraseError::Tokenizer(e.to_string()))?;
        Ok(Self::new(tokenizer, MAX_INPUT_TOKENS))
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Longest prefix of `input` that encodes to at most `max_tokens` tokens.
    pub fn truncate<'a>(&self, input: &'a str) -> Result<&'a str, ParaphraseError> {
        let encoding = self
            .tokenizer
            .encode(input, true)
            .map_err(|e| ParaphraseError::Tokenizer(e.to_string()))?;

        if encoding.len() <= self.max_tokens {
            return Ok(input);
        }

        let special = encoding.get_special_tokens_mask();
        let budget = self
            .max_tokens
            .saturating_sub(special.iter().filter(|&&m| m == 1).count());

        let end = encoding
            .get_offsets()
            .iter()
            .zip(special)
            .filter(|(_, m)| **m == 0)
            .take(budget)
            .map(|(&(_, end), _)| end)
            .max()
            .unwrap_or(0);

        Ok(input.get(..end).unwrap_or(input))
    }
}
