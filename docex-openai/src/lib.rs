//! OpenAI Responses API gateway for the docex extraction pipeline.
//!
//! [`OpenAiGateway`] implements [`docex::extraction::LlmGateway`] by posting
//! each prompt to `{base_url}/responses` and returning the response's output
//! text.

/// Gateway client.
pub mod client;
/// Error types returned by the gateway.
pub mod error;
/// Request and response payloads.
pub mod types;

pub use client::{OpenAiGateway, API_KEY_ENV_VAR, BASE_URL_ENV_VAR, DEFAULT_BASE_URL};
pub use error::OpenAiError;
pub use types::output_text_from_response;
