//! Token budget enforcement for embedding inputs.
//!
//! Counts are taken with a model tokenizer when one is available and with
//! a 4 chars/token heuristic otherwise. Cutting always uses the heuristic,
//! so a truncated text holds at most `max_tokens * 4` characters whichever
//! counter measured it.

use thiserror::Error;

/// Approximate characters per token (conservative heuristic).
pub const CHARS_PER_TOKEN: usize = 4;

/// Default input budget when nothing else is configured.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 32_000;

/// Failures of a precise token counter. Never surfaced to adapter callers.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("No tokenizer available for model: {0}")]
    UnknownModel(String),

    #[error("Tokenizer failed: {0}")]
    Failed(String),
}

/// A model-specific token counter.
pub trait TokenCounter: Send + Sync {
    /// Exact token count of `text` for this counter's model.
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// Heuristic token count: one token per four characters, at least one.
pub fn heuristic_token_count(text: &str) -> usize {
    (text.chars().count() / CHARS_PER_TOKEN).max(1)
}

/// Estimate tokens with `counter`, falling back to the heuristic when
/// there is no counter or it fails.
pub fn estimate_token_count(counter: Option<&dyn TokenCounter>, text: &str) -> usize {
    let Some(counter) = counter else {
        return heuristic_token_count(text);
    };

    match counter.count_tokens(text) {
        Ok(count) => count,
        Err(err) => {
            tracing::debug!(error = %err, "tokenizer failed, using heuristic estimate");
            heuristic_token_count(text)
        }
    }
}

/// Cut `text` to its first `max_chars` characters without splitting a code point.
fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_offset, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_offset);
    }
    text
}

/// Bring every text within `max_tokens`.
///
/// Texts under budget are returned untouched; oversized ones are cut to
/// `max_tokens * 4` characters and reported with a warning.
pub fn truncate_to_limit(
    texts: Vec<String>,
    max_tokens: usize,
    counter: Option<&dyn TokenCounter>,
) -> Vec<String> {
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);

    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let estimated = estimate_token_count(counter, &text);
            if estimated <= max_tokens {
                return text;
            }

            tracing::warn!(
                index,
                original_tokens = estimated,
                max_tokens,
                "embedding input exceeds token limit, truncating to {} chars",
                max_chars,
            );
            truncate_chars(text, max_chars)
        })
        .collect()
}
