//! Prompted extraction and parsing of the model's JSON output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::info;

use super::config::ExtractionConfig;
use super::error::ExtractionError;
use super::gateway::{LlmGateway, LlmRequest};
use super::metrics::TokenUsage;
use crate::registry::Schema;

#[allow(clippy::expect_used)]
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^```(?:json)?\s*|\s*```$").expect("code fence pattern is valid")
});

/// Outcome of a successful extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Parsed model output, not yet validated.
    pub data: Value,
    /// Tokens spent on the extraction round trip.
    pub usage: TokenUsage,
}

/// Removes Markdown code fences (```` ```json ```` or ```` ``` ````) and
/// surrounding whitespace.
///
/// # Examples
///
/// ```
/// use docex::extraction::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
/// ```
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw.trim(), "").trim().to_string()
}

/// Builds the extraction prompt embedding the document and the schema.
#[must_use]
pub fn build_extraction_prompt(text: &str, schema: &Schema) -> String {
    let schema_json = serde_json::to_string_pretty(schema.document())
        .unwrap_or_else(|_| schema.document().to_string());
    format!(
        "You are an information extraction engine.\n\
         Extract the required fields from this document text.\n\n\
         Document text: {text}\n\n\
         Output JSON MUST strictly conform to this JSON Schema:\n\
         {schema_json}"
    )
}

/// Parses gateway output as JSON after stripping code fences.
///
/// # Errors
///
/// Returns `ExtractionError::Parse`, carrying the raw output, when the cleaned
/// text is not JSON.
pub fn parse_model_output(raw_output: &str) -> Result<Value, ExtractionError> {
    let cleaned = strip_code_fences(raw_output);
    serde_json::from_str(&cleaned).map_err(|e| ExtractionError::Parse {
        message: e.to_string(),
        raw_output: raw_output.to_string(),
    })
}

/// Asks the gateway for JSON conforming to `schema` and parses it.
///
/// The parsed value is returned as-is; conformance is checked separately by
/// [`validate_against_schema`](super::validate_against_schema).
///
/// # Errors
///
/// Returns `ExtractionError::ModelCall` if the gateway fails and
/// `ExtractionError::Parse` if the output is not JSON.
pub async fn call_llm_extract(
    text: &str,
    schema: &Schema,
    gateway: &dyn LlmGateway,
    config: &ExtractionConfig,
) -> Result<Extraction, ExtractionError> {
    let request = LlmRequest {
        model: config.model.clone(),
        prompt: build_extraction_prompt(text, schema),
        temperature: config.temperature,
    };

    info!("Extraction started.");
    tracing::debug!(model = %request.model, prompt_chars = request.prompt.len(), "Sending extraction prompt");
    let response = gateway.complete(&request).await?;

    let usage = TokenUsage::measure(&request.prompt, &response.output_text, &config.model);
    let data = parse_model_output(&response.output_text)?;

    info!("Extraction successful.");
    Ok(Extraction { data, usage })
}
