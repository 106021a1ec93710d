//! The request/response contract the pipeline requires from an LLM service.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

/// A single prompt sent to a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// Model identifier.
    pub model: String,
    /// Full prompt text.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Text returned by a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    /// The model's textual output.
    pub output_text: String,
}

impl LlmResponse {
    /// Wraps output text.
    #[must_use]
    pub fn new(output_text: impl Into<String>) -> Self {
        Self {
            output_text: output_text.into(),
        }
    }
}

/// Failure of a gateway call. Opaque to the pipeline, which wraps it uniformly.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed (connection, DNS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials were missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service refused the request because of rate limiting.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The service answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP-style status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },

    /// A local model process failed.
    #[error("model process failed: {0}")]
    Process(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// A capability that turns a prompt into text.
///
/// Implementations own their transport concerns (timeouts, credentials,
/// transport-level retries); the pipeline only sees success or [`GatewayError`].
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Sends one prompt and waits for the complete response.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GatewayError>;
}

/// Deterministic gateway that replays a fixed script of outputs.
///
/// Each call pops the next scripted entry and records the request. Once the
/// script is exhausted every call fails with [`GatewayError::Other`].
///
/// # Examples
///
/// ```
/// use docex::extraction::{LlmGateway, LlmRequest, ScriptedGateway};
///
/// # async fn example() {
/// let gateway = ScriptedGateway::new(["w2"]);
/// let request = LlmRequest {
///     model: "fake".to_string(),
///     prompt: "Which schema?".to_string(),
///     temperature: 0.0,
/// };
/// let response = gateway.complete(&request).await.unwrap();
/// assert_eq!(response.output_text, "w2");
/// assert_eq!(gateway.calls(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedGateway {
    /// Creates a gateway that answers with `outputs`, in order.
    #[must_use]
    pub fn new<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(outputs.into_iter().map(|o| Ok(o.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Appends a successful output to the script.
    #[must_use]
    pub fn then_output(self, output: impl Into<String>) -> Self {
        self.lock_script().push_back(Ok(output.into()));
        self
    }

    /// Appends a failure to the script.
    #[must_use]
    pub fn then_error(self, error: GatewayError) -> Self {
        self.lock_script().push_back(Err(error));
        self
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock_requests().len()
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.lock_requests().clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, GatewayError>>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<LlmRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GatewayError> {
        self.lock_requests().push(request.clone());
        match self.lock_script().pop_front() {
            Some(Ok(output)) => Ok(LlmResponse::new(output)),
            Some(Err(error)) => Err(error),
            None => Err(GatewayError::Other(
                "No more scripted responses available".to_string(),
            )),
        }
    }
}
