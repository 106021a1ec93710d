//! Schema-validated structured extraction from document text.
//!
//! A document is classified against a [`SchemaRegistry`](registry::SchemaRegistry),
//! an LLM is prompted for JSON matching the chosen schema, and the output is
//! validated before it is returned. LLM access goes through the
//! [`LlmGateway`](extraction::LlmGateway) trait, so any backend (or a scripted
//! fake) can be plugged in.

pub mod extraction;
pub mod registry;

/// Common traits and types for ergonomic usage of the pipeline.
pub mod prelude {
    pub use crate::extraction::{
        extract, ExtractionConfig, ExtractionError, ExtractionFailure, ExtractionOrchestrator,
        ExtractionResult, GatewayError, LlmGateway, LlmRequest, LlmResponse, Metrics, Stage,
    };
    pub use crate::registry::{Schema, SchemaRegistry};
}
