//! Error types for extraction operations with attempt history tracking.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::gateway::GatewayError;

/// Pipeline stage an attempt failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Schema selection (classification).
    Classify,
    /// Prompted extraction, including parsing the model output.
    Extract,
    /// Schema validation of the parsed output.
    Validate,
}

impl Stage {
    /// Lower-case name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Extract => "extract",
            Self::Validate => "validate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// The stage that failed.
    pub stage: Stage,
    /// Schema identifier in play, `None` when schema selection itself failed.
    pub schema: Option<String>,
    /// Message of the error raised by the stage.
    pub error: String,
}

impl AttemptRecord {
    /// Builds a record from a stage-level error.
    #[must_use]
    pub fn new(stage: Stage, schema: Option<&str>, error: &ExtractionError) -> Self {
        Self {
            stage,
            schema: schema.map(ToString::to_string),
            error: error.to_string(),
        }
    }
}

/// Aggregated failure of a whole extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Fixed summary message.
    pub message: String,
    /// Every failed attempt, in chronological order.
    pub attempts: Vec<AttemptRecord>,
    /// Message of the most recent stage error.
    pub last_error: String,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages = self
            .attempts
            .iter()
            .map(|attempt| attempt.stage.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{} Failed stages: [{stages}]. Last error: {}",
            self.message, self.last_error
        )
    }
}

/// Errors that can occur during extraction operations.
///
/// The stage-level variants are absorbed by the orchestrator into
/// [`AttemptRecord`]s; only [`ExtractionError::Failed`] reaches callers of
/// [`extract`](super::extract).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The gateway answered with an identifier that is not in the registry.
    #[error("Classification failed. Unknown schema_id: {schema_id}")]
    Classification {
        /// The trimmed identifier the gateway returned.
        schema_id: String,
    },

    /// The gateway call itself failed (transport, auth, rate limit, ...).
    #[error("LLM call failed: {0}")]
    ModelCall(#[from] GatewayError),

    /// Gateway output could not be parsed as JSON after fence stripping.
    #[error("Could not parse LLM output as JSON: {message}\nRaw output: {raw_output}")]
    Parse {
        /// Parser error message.
        message: String,
        /// Gateway output exactly as received.
        raw_output: String,
    },

    /// Parsed output does not satisfy the schema.
    #[error("Schema validation failed: {message}")]
    SchemaValidation {
        /// Message of the first violation.
        message: String,
        /// Every violation, with instance paths.
        errors: Vec<String>,
    },

    /// The schema's validation document could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Every attempt failed.
    #[error("{0}")]
    Failed(Box<ExtractionFailure>),
}

impl ExtractionError {
    /// The aggregated failure payload, when this is [`ExtractionError::Failed`].
    #[must_use]
    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Attempt history, empty for stage-level errors.
    #[must_use]
    pub fn attempts(&self) -> &[AttemptRecord] {
        self.failure()
            .map_or(&[], |failure| failure.attempts.as_slice())
    }
}
