//! Schema selection through the LLM gateway.

use tracing::info;

use super::config::ExtractionConfig;
use super::error::ExtractionError;
use super::gateway::{LlmGateway, LlmRequest};
use super::metrics::TokenUsage;
use crate::registry::SchemaRegistry;

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Identifier of the chosen schema; always a registry key.
    pub schema_id: String,
    /// Tokens spent on the classification round trip.
    pub usage: TokenUsage,
}

/// Head and tail of `text`, `chars` characters each.
///
/// Text no longer than both ends together is returned whole, not as a head
/// and tail that repeat it (or their overlap).
fn excerpt(text: &str, chars: usize) -> String {
    let total = text.chars().count();
    if total <= chars * 2 {
        return text.to_string();
    }
    let head: String = text.chars().take(chars).collect();
    let tail: String = text.chars().skip(total - chars).collect();
    format!("{head}{tail}")
}

/// Builds the classification prompt for `text` over the registry's identifiers.
#[must_use]
pub fn build_classification_prompt(
    text: &str,
    registry: &SchemaRegistry,
    excerpt_chars: usize,
) -> String {
    let ids = serde_json::to_string(&registry.ids().collect::<Vec<_>>())
        .unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are given document text and a set of available schema IDs. Schema IDs: {ids}\n\
         Document text: {}...\n\
         Which schema_id best matches this document? Respond with only the schema_id.",
        excerpt(text, excerpt_chars)
    )
}

/// Asks the gateway which registry schema best matches `text`.
///
/// # Errors
///
/// Returns `ExtractionError::ModelCall` if the gateway fails and
/// `ExtractionError::Classification` if the answer is not a registry key.
pub async fn classify_document(
    text: &str,
    registry: &SchemaRegistry,
    gateway: &dyn LlmGateway,
    config: &ExtractionConfig,
) -> Result<Classification, ExtractionError> {
    let prompt = build_classification_prompt(text, registry, config.excerpt_chars);

    info!("Classification started.");
    let request = LlmRequest {
        model: config.model.clone(),
        prompt,
        temperature: config.temperature,
    };
    tracing::debug!(model = %request.model, prompt_chars = request.prompt.len(), "Sending classification prompt");
    let response = gateway.complete(&request).await?;

    let usage = TokenUsage::measure(&request.prompt, &response.output_text, &config.model);
    let schema_id = response.output_text.trim().to_string();

    if !registry.contains(&schema_id) {
        return Err(ExtractionError::Classification { schema_id });
    }

    info!(schema_id = %schema_id, "Classification successful.");
    Ok(Classification { schema_id, usage })
}
