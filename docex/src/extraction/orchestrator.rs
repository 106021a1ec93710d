//! The classify → extract → validate pipeline with its bounded retry loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn, Instrument};

use super::classifier::classify_document;
use super::config::ExtractionConfig;
use super::error::{AttemptRecord, ExtractionError, ExtractionFailure, Stage};
use super::gateway::LlmGateway;
use super::metrics::{Metrics, TokenUsage, CLASSIFICATION, EXTRACTION};
use super::output::call_llm_extract;
use super::validator::validate_against_schema;
use crate::registry::{Schema, SchemaRegistry};

/// Identifier used for a caller-supplied schema that declares no `$id`.
pub const UNKNOWN_SCHEMA_ID: &str = "unknown";

/// A validated extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Identifier of the schema the data conforms to.
    pub doc_type: String,
    /// The schema's declared `version`, if any.
    pub schema_version: Option<Value>,
    /// Extracted data, validated against the schema.
    pub data: Value,
    /// Token counters of the stages that produced this result.
    pub metrics: Metrics,
}

/// Runs extraction attempts against an LLM gateway.
///
/// Classification, extraction and validation share one attempt budget. A
/// validation failure is retried once; a second validation failure ends the
/// call even if budget remains.
pub struct ExtractionOrchestrator<'a> {
    gateway: &'a dyn LlmGateway,
    config: ExtractionConfig,
}

impl<'a> ExtractionOrchestrator<'a> {
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(gateway: &'a dyn LlmGateway) -> Self {
        Self {
            gateway,
            config: ExtractionConfig::default(),
        }
    }

    /// Creates an orchestrator with the given configuration.
    #[must_use]
    pub const fn with_config(gateway: &'a dyn LlmGateway, config: ExtractionConfig) -> Self {
        Self { gateway, config }
    }

    /// Sets the maximum number of attempts (fluent builder pattern).
    #[must_use]
    pub fn max_attempts(mut self, max: usize) -> Self {
        self.config = self.config.with_max_attempts(max);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts schema-conforming data from `text`.
    ///
    /// When `schema` is given it is used directly and classification is
    /// skipped; otherwise the classifier picks a schema from `registry`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Failed` with the full attempt history when no
    /// attempt produced valid data. Stage-level errors are never returned
    /// directly.
    pub async fn extract(
        &self,
        text: &str,
        registry: &SchemaRegistry,
        schema: Option<&Schema>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let span = tracing::info_span!("extract", extraction_id = %uuid::Uuid::new_v4());
        self.run(text, registry, schema).instrument(span).await
    }

    async fn run(
        &self,
        text: &str,
        registry: &SchemaRegistry,
        schema: Option<&Schema>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let max_attempts = self.config.max_attempts;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ExtractionError> = None;
        let mut metrics = Metrics::new();
        let mut validation_failed = false;

        for attempt in 0..max_attempts {
            info!("Attempt {}", attempt + 1);

            // Step 1: select schema
            let (schema_id, selected, classification) =
                match self.select_schema(text, registry, schema).await {
                    Ok(selection) => selection,
                    Err(e) => {
                        record_failure(&mut attempts, &mut last_error, Stage::Classify, None, e);
                        continue;
                    }
                };
            if let Some(usage) = classification {
                metrics.record(CLASSIFICATION, usage);
            }

            // Step 2: extract
            let extraction =
                match call_llm_extract(text, selected, self.gateway, &self.config).await {
                    Ok(extraction) => extraction,
                    Err(e) => {
                        let stage = Stage::Extract;
                        record_failure(&mut attempts, &mut last_error, stage, Some(&schema_id), e);
                        continue;
                    }
                };
            metrics.record(EXTRACTION, extraction.usage);

            // Step 3: validate
            if let Err(e) = validate_against_schema(&extraction.data, selected) {
                let stage = Stage::Validate;
                record_failure(&mut attempts, &mut last_error, stage, Some(&schema_id), e);
                if validation_failed {
                    break;
                }
                validation_failed = true;
                continue;
            }

            return Ok(ExtractionResult {
                doc_type: schema_id,
                schema_version: selected.version().cloned(),
                data: extraction.data,
                metrics,
            });
        }

        let last_error = last_error.map_or_else(|| "None".to_string(), |e| e.to_string());
        Err(ExtractionError::Failed(Box::new(ExtractionFailure {
            message: format!("Extraction failed after {max_attempts} attempts."),
            attempts,
            last_error,
        })))
    }

    /// Resolves the schema for one attempt, classifying only when none was supplied.
    async fn select_schema<'s>(
        &self,
        text: &str,
        registry: &'s SchemaRegistry,
        schema: Option<&'s Schema>,
    ) -> Result<(String, &'s Schema, Option<TokenUsage>), ExtractionError> {
        if let Some(schema) = schema {
            let id = schema.id().unwrap_or(UNKNOWN_SCHEMA_ID).to_string();
            return Ok((id, schema, None));
        }

        let classification = classify_document(text, registry, self.gateway, &self.config).await?;
        let selected = registry.get(&classification.schema_id).ok_or_else(|| {
            ExtractionError::Classification {
                schema_id: classification.schema_id.clone(),
            }
        })?;
        Ok((classification.schema_id, selected, Some(classification.usage)))
    }
}

fn record_failure(
    attempts: &mut Vec<AttemptRecord>,
    last_error: &mut Option<ExtractionError>,
    stage: Stage,
    schema: Option<&str>,
    error: ExtractionError,
) {
    warn!(stage = %stage, schema = schema.unwrap_or("-"), error = %error, "Attempt failed");
    attempts.push(AttemptRecord::new(stage, schema, &error));
    *last_error = Some(error);
}

/// Runs the pipeline once over `text` with `model`.
///
/// Convenience wrapper over [`ExtractionOrchestrator`] with default settings
/// apart from the model.
///
/// # Errors
///
/// See [`ExtractionOrchestrator::extract`].
pub async fn extract(
    text: &str,
    registry: &SchemaRegistry,
    gateway: &dyn LlmGateway,
    schema: Option<&Schema>,
    model: &str,
) -> Result<ExtractionResult, ExtractionError> {
    let config = ExtractionConfig::default().with_model(model);
    ExtractionOrchestrator::with_config(gateway, config)
        .extract(text, registry, schema)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::gateway::ScriptedGateway;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_schema_without_id_is_unknown() {
        let gateway = ScriptedGateway::new([r#"{"name": "x"}"#]);
        let result = extract("doc", &SchemaRegistry::new(), &gateway, Some(&schema()), "fake")
            .await
            .unwrap();
        assert_eq!(result.doc_type, UNKNOWN_SCHEMA_ID);
        assert_eq!(result.schema_version, None);
        assert!(result.metrics.get("classification_total_tokens").is_none());
    }

    #[tokio::test]
    async fn test_larger_budget_still_stops_on_second_validation_failure() {
        let gateway = ScriptedGateway::new(["{}", "{}", r#"{"name": "x"}"#]);
        let orchestrator = ExtractionOrchestrator::new(&gateway).max_attempts(3);
        let err = orchestrator
            .extract("doc", &SchemaRegistry::new(), Some(&schema()))
            .await
            .unwrap_err();

        assert_eq!(gateway.calls(), 2);
        assert_eq!(err.attempts().len(), 2);
        assert!(err.to_string().starts_with("Extraction failed after 3 attempts."));
    }

    #[tokio::test]
    async fn test_larger_budget_retries_transient_failures() {
        let gateway = ScriptedGateway::new(["oops", "{}", r#"{"name": "x"}"#]);
        let orchestrator = ExtractionOrchestrator::new(&gateway).max_attempts(3);
        let result = orchestrator
            .extract("doc", &SchemaRegistry::new(), Some(&schema()))
            .await
            .unwrap();

        assert_eq!(result.data, json!({"name": "x"}));
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let gateway = ScriptedGateway::new(["oops"]);
        let orchestrator = ExtractionOrchestrator::new(&gateway).max_attempts(1);
        let err = orchestrator
            .extract("doc", &SchemaRegistry::new(), Some(&schema()))
            .await
            .unwrap_err();

        let failure = err.failure().unwrap();
        assert_eq!(failure.message, "Extraction failed after 1 attempts.");
        assert_eq!(failure.attempts.len(), 1);
        assert_eq!(failure.attempts[0].stage, Stage::Extract);
        assert_eq!(failure.attempts[0].schema.as_deref(), Some(UNKNOWN_SCHEMA_ID));
    }
}
