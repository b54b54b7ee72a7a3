//! Token counting capability injected into the assembler.
//!
//! The budget check needs the same tokenizer the downstream model uses;
//! where no tokenizer file is available the heuristic counter gives a
//! conservative-enough estimate (~4 characters per token).

use std::path::Path;

use crate::errors::RetrievalError;

/// Counts language-model tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Counter backed by a Hugging Face tokenizer file.
pub struct HfTokenCounter {
    tokenizer: tokenizers::Tokenizer,
}

impl HfTokenCounter {
    /// Load a tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let tokenizer = tokenizers::Tokenizer::from_file(path.as_ref())
            .map_err(|err| RetrievalError::Tokenizer(err.to_string()))?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> usize {
        // Encoding failures fall back to the estimate so a single odd
        // fragment cannot abort assembly.
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.len())
            .unwrap_or_else(|_| estimate_tokens(text))
    }
}

/// Estimation-based counter: ~4 characters per token for English text.
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

fn estimate_tokens(text: &str) -> usize {
    (text.len() + 3) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_counts() {
        let counter = HeuristicTokenCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
        assert!(counter.count("This is a longer sentence.") > counter.count("Hi"));
    }

    #[test]
    fn test_missing_tokenizer_file_is_an_error() {
        let result = HfTokenCounter::from_file("/nonexistent/tokenizer.json");
        assert!(matches!(result, Err(RetrievalError::Tokenizer(_))));
    }
}
