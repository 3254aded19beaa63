//! Precise token counting backed by tiktoken.

use tiktoken_rs::CoreBPE;

use crate::services::token_budget::{TokenCounter, TokenizerError};

/// BPE token counter for models tiktoken knows about.
pub struct TiktokenCounter {
    model: String,
    tokenizer: CoreBPE,
}

impl TiktokenCounter {
    /// Load the tokenizer for `model`.
    ///
    /// Local and self-hosted model names usually have no known encoding;
    /// callers treat that error as "use the heuristic".
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        let tokenizer = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|_| TokenizerError::UnknownModel(model.to_string()))?;

        Ok(Self {
            model: model.to_string(),
            tokenizer,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.tokenizer.encode_with_special_tokens(text).len())
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
