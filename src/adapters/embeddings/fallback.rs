//! Recovery from servers that reject the `dimensions` parameter.
//!
//! Several OpenAI-compatible servers (Qwen and other matryoshka-less
//! models) answer 400 when `dimensions` is present. The only signal is
//! the error text, so detection lives in one predicate that can be swapped
//! for a structured error code once servers expose one.

use super::wire::EmbeddingParameters;

const REJECTION_MARKERS: [&str; 2] = ["dimensions", "matryoshka"];

/// Does this upstream error message reject the dimensionality parameter?
pub fn is_dimension_rejection_error(message: &str) -> bool {
    let message = message.to_lowercase();
    REJECTION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Parameters for the single permitted retry, if the failure warrants one.
pub fn retry_parameters(
    params: &EmbeddingParameters,
    message: &str,
) -> Option<EmbeddingParameters> {
    (params.has_dimensions() && is_dimension_rejection_error(message))
        .then(|| params.without_dimensions())
}
