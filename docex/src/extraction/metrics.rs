//! Token metrics collected during an extraction call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tokens::count_tokens;

/// Metric prefix for the classification stage.
pub const CLASSIFICATION: &str = "classification";
/// Metric prefix for the extraction stage.
pub const EXTRACTION: &str = "extraction";

/// Token usage of a single gateway round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt sent to the gateway.
    pub prompt_tokens: u64,
    /// Tokens in the text the gateway returned.
    pub response_tokens: u64,
}

impl TokenUsage {
    /// Measures a prompt/response pair for `model`.
    #[must_use]
    pub fn measure(prompt: &str, response: &str, model: &str) -> Self {
        Self {
            prompt_tokens: count_tokens(prompt, model) as u64,
            response_tokens: count_tokens(response, model) as u64,
        }
    }

    /// Prompt and response tokens combined.
    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.response_tokens
    }
}

/// Named token counters accumulated across the stages of one extraction call.
///
/// Serializes as a flat `{name: count}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, u64>);

impl Metrics {
    /// Creates an empty metrics map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `<stage>_prompt_tokens`, `<stage>_response_tokens` and
    /// `<stage>_total_tokens`, replacing any earlier values for `stage`.
    pub fn record(&mut self, stage: &str, usage: TokenUsage) {
        self.0
            .insert(format!("{stage}_prompt_tokens"), usage.prompt_tokens);
        self.0
            .insert(format!("{stage}_response_tokens"), usage.response_tokens);
        self.0
            .insert(format!("{stage}_total_tokens"), usage.total_tokens());
    }

    /// Looks up a single counter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// Iterates counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of counters recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
