//! Metrics tracking and token estimation for extraction runs.

use std::time::Duration;

/// Metrics collected during an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionMetrics {
    /// Model attempts made, including the successful one.
    pub total_attempts: usize,
    /// Wall-clock time of the whole run.
    pub wall_time: Duration,
    /// Characters of sanitized input sent to the model.
    pub sanitized_chars: usize,
    /// The sanitizer failed and the run continued with empty input.
    pub sanitization_degraded: bool,
    /// Estimated input tokens sent to the model.
    pub estimated_input_tokens: usize,
    /// Estimated output tokens received from the model.
    pub estimated_output_tokens: usize,
}

/// Average characters per model token for English prose and markup.
const CHARS_PER_TOKEN: usize = 4;

/// Rough token count for `text`, rounded up.
///
/// Counts Unicode scalar values rather than bytes, so non-Latin text is not
/// inflated. Good enough for logging prompt sizes; not a tokenizer.
///
/// ```
/// use scrape_extract::extraction::estimate_tokens;
///
/// assert_eq!(estimate_tokens("<a href=\"/about\">About</a>"), 7);
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tokens_round_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("Andover"), 2);
        assert_eq!(estimate_tokens("Phillips"), 2);
        assert_eq!(estimate_tokens("Phillips Academy"), 4);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "Académie française";
        assert!(text.len() > text.chars().count());
        assert_eq!(estimate_tokens(text), 5);
    }
}
