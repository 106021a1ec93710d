use docex::extraction::GatewayError;
use thiserror::Error;

/// Errors raised by the OpenAI gateway.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// No API key was configured.
    #[error("Missing {0} env var. Set it before running.")]
    MissingApiKey(&'static str),

    /// The HTTP request failed before a response arrived.
    #[error("OpenAI HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("OpenAI API returned status {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("OpenAI JSON decode: {0}")]
    Decode(String),
}

impl From<OpenAiError> for GatewayError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::MissingApiKey(_) => Self::Auth(err.to_string()),
            OpenAiError::Http(e) => Self::Transport(e.to_string()),
            OpenAiError::Api { status: 401 | 403, body } => Self::Auth(body),
            OpenAiError::Api { status: 429, body } => Self::RateLimited(body),
            OpenAiError::Api { status, body } => Self::Status { status, body },
            OpenAiError::Decode(msg) => Self::Other(msg),
        }
    }
}
