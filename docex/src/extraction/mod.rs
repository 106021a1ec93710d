//! Structured extraction pipeline.
//!
//! - [`ExtractionOrchestrator`] - classify → extract → validate with a bounded retry loop
//! - [`classify_document`] - schema selection through the gateway
//! - [`call_llm_extract`] - prompted extraction with code-fence tolerant parsing
//! - [`validate_against_schema`] - JSON Schema validation
//! - [`count_tokens`] - token counts feeding [`Metrics`]
//! - [`ExtractionError`] - typed errors with attempt history
//! - [`LlmGateway`] - the contract an LLM backend implements

pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod orchestrator;
pub mod output;
pub mod tokens;
pub mod validator;

pub use classifier::{build_classification_prompt, classify_document, Classification};
pub use config::{ExtractionConfig, DEFAULT_MODEL};
pub use error::{AttemptRecord, ExtractionError, ExtractionFailure, Stage};
pub use gateway::{GatewayError, LlmGateway, LlmRequest, LlmResponse, ScriptedGateway};
pub use metrics::{Metrics, TokenUsage};
pub use orchestrator::{extract, ExtractionOrchestrator, ExtractionResult, UNKNOWN_SCHEMA_ID};
pub use output::{
    build_extraction_prompt, call_llm_extract, parse_model_output, strip_code_fences, Extraction,
};
pub use tokens::{count_tokens, encoding_for_model, Encoding};
pub use validator::{collect_validation_errors, validate_against_schema};
