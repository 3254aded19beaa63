pub mod token_budget;

pub use token_budget::{TokenCounter, TokenizerError, estimate_token_count, truncate_to_limit};
